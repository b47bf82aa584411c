//! Shared helpers for invoking tools.
//!
//! Every executor call made by this crate goes through [`invoke_tool`], which
//! times the call and turns a panic inside the executor into an ordinary
//! error value instead of unwinding through the caller.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use dashagent_domain::core::string::first_line;
use dashagent_domain::tool::{ErrorCategory, ToolArguments, ToolError, ToolResult, traits::Tool};
use futures::FutureExt;
use thiserror::Error;

/// Generic text shown for failures that carry no safe message
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Why an invocation produced no result
#[derive(Error, Debug, Clone)]
pub enum InvocationError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// The executor panicked; the payload text is kept for logs only
    #[error("tool panicked: {0}")]
    Panicked(String),
}

impl InvocationError {
    /// Text safe to show to the human
    pub fn user_message(&self) -> String {
        match self {
            InvocationError::Tool(err) => err.user_message(),
            InvocationError::Panicked(_) => UNEXPECTED_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn into_tool_error(self) -> ToolError {
        match self {
            InvocationError::Tool(err) => err,
            InvocationError::Panicked(_) => {
                ToolError::new(ErrorCategory::OperationFailed, UNEXPECTED_ERROR_MESSAGE, "")
            }
        }
    }
}

/// Outcome of one timed invocation
#[derive(Debug)]
pub struct Invocation {
    pub outcome: Result<ToolResult, InvocationError>,
    pub elapsed_ms: u64,
}

impl Invocation {
    /// Collapse into an envelope: errors become `success:false`, and the
    /// measured time fills `executionTime` when the tool left it unset.
    pub fn into_result(self) -> ToolResult {
        let result = match self.outcome {
            Ok(result) => result,
            Err(InvocationError::Tool(err)) => ToolResult::from(err),
            Err(err) => ToolResult::failure(err.user_message()),
        };
        result.backfill_execution_time(self.elapsed_ms)
    }
}

/// Run `tool` with `args`, containing panics and measuring wall time
pub async fn invoke_tool(tool: &dyn Tool, args: ToolArguments) -> Invocation {
    let start = Instant::now();
    let outcome = match AssertUnwindSafe(tool.execute(args)).catch_unwind().await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(err)) => Err(InvocationError::Tool(err)),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(tool = tool.name(), panic = %message, "Tool executor panicked");
            Err(InvocationError::Panicked(message))
        }
    };

    Invocation {
        outcome,
        elapsed_ms: start.elapsed().as_millis() as u64,
    }
}

/// Best-effort text of a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        first_line(s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        first_line(s).to_string()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashagent_domain::tool::{FnTool, ToolDefinition};
    use serde_json::json;

    fn tool<F, Fut>(handler: F) -> FnTool
    where
        F: Fn(ToolArguments) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<ToolResult, ToolError>> + Send + 'static,
    {
        FnTool::new(ToolDefinition::new("probe", "test tool"), handler)
    }

    #[tokio::test]
    async fn test_success_backfills_time() {
        let t = tool(|_| async { Ok(ToolResult::success(json!({"ok": true}))) });
        let result = invoke_tool(&t, ToolArguments::new()).await.into_result();

        assert!(result.success);
        assert!(result.execution_time_ms().is_some());
    }

    #[tokio::test]
    async fn test_tool_error_becomes_failure() {
        let t = tool(|_| async { Err(ToolError::service_unavailable("Radarr")) });
        let invocation = invoke_tool(&t, ToolArguments::new()).await;

        match &invocation.outcome {
            Err(InvocationError::Tool(err)) => assert_eq!(err.category, ErrorCategory::ServiceUnavailable),
            other => panic!("unexpected outcome: {other:?}"),
        }
        let result = invocation.into_result();
        assert!(!result.success);
        assert!(result.error().unwrap().contains("Radarr"));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        fn explode() -> Result<ToolResult, ToolError> {
            panic!("boom\nwith a backtrace line")
        }

        let t = tool(|_| async { explode() });
        let invocation = invoke_tool(&t, ToolArguments::new()).await;

        match &invocation.outcome {
            Err(InvocationError::Panicked(msg)) => assert_eq!(msg, "boom"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        let result = invocation.into_result();
        assert!(!result.success);
        assert_eq!(result.error(), Some(UNEXPECTED_ERROR_MESSAGE));
    }

    #[test]
    fn test_into_tool_error() {
        let err = InvocationError::Panicked("x".into()).into_tool_error();
        assert_eq!(err.category, ErrorCategory::OperationFailed);
        assert_eq!(err.user_message(), UNEXPECTED_ERROR_MESSAGE);
    }
}
