//! Confirmation tools: cancel_confirmation, list_pending_confirmations

use std::sync::Arc;

use async_trait::async_trait;
use dashagent_application::use_cases::tool_context::ToolContext;
use dashagent_domain::confirmation::PendingConfirmation;
use dashagent_domain::tool::{
    CONFIRMATION_ID_ARG, ToolDefinition, ToolError, ToolParameter, ToolResult, TypedTool,
};
use serde::{Deserialize, Serialize};

/// Tool name constants
pub const CANCEL_CONFIRMATION: &str = "cancel_confirmation";
pub const LIST_PENDING_CONFIRMATIONS: &str = "list_pending_confirmations";

/// Get the tool definition for cancel_confirmation
pub fn cancel_confirmation_definition() -> ToolDefinition {
    ToolDefinition::new(
        CANCEL_CONFIRMATION,
        "Cancel a pending destructive action when the user declines it",
    )
    .with_parameter(ToolParameter::new(
        CONFIRMATION_ID_ARG,
        "ID returned with the confirmation request",
        true,
    ))
}

/// Get the tool definition for list_pending_confirmations
pub fn list_pending_confirmations_definition() -> ToolDefinition {
    ToolDefinition::new(
        LIST_PENDING_CONFIRMATIONS,
        "List destructive actions still waiting for confirmation",
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelConfirmationParams {
    pub confirmation_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelConfirmationOutput {
    pub confirmation_id: String,
    /// False when the id was already consumed, cancelled or expired
    pub cancelled: bool,
}

pub struct CancelConfirmationTool {
    ctx: Arc<ToolContext>,
    definition: ToolDefinition,
}

impl CancelConfirmationTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self {
            ctx,
            definition: cancel_confirmation_definition(),
        }
    }
}

#[async_trait]
impl TypedTool for CancelConfirmationTool {
    type Params = CancelConfirmationParams;
    type Output = CancelConfirmationOutput;

    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn run(
        &self,
        params: CancelConfirmationParams,
    ) -> Result<ToolResult<CancelConfirmationOutput>, ToolError> {
        let gate = self.ctx.confirmations();
        let cancelled = gate.get_pending(&params.confirmation_id).is_some();
        gate.cancel_action(&params.confirmation_id);

        Ok(ToolResult::success(CancelConfirmationOutput {
            confirmation_id: params.confirmation_id,
            cancelled,
        }))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListPendingParams {}

#[derive(Debug, Serialize)]
pub struct ListPendingOutput {
    pub pending: Vec<PendingConfirmation>,
    pub count: usize,
}

pub struct ListPendingConfirmationsTool {
    ctx: Arc<ToolContext>,
    definition: ToolDefinition,
}

impl ListPendingConfirmationsTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self {
            ctx,
            definition: list_pending_confirmations_definition(),
        }
    }
}

#[async_trait]
impl TypedTool for ListPendingConfirmationsTool {
    type Params = ListPendingParams;
    type Output = ListPendingOutput;

    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn run(&self, _params: ListPendingParams) -> Result<ToolResult<ListPendingOutput>, ToolError> {
        let pending = self.ctx.confirmations().list_pending();
        Ok(ToolResult::success(ListPendingOutput {
            count: pending.len(),
            pending,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::builtin::test_context;
    use dashagent_domain::confirmation::{ConfirmationRequest, Severity};

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let ctx = test_context();
        let id = ctx.confirmations().request_confirmation(ConfirmationRequest::new(
            "Delete movie",
            "Dune (2021)",
            Severity::High,
            "delete_media",
        ));
        let tool = CancelConfirmationTool::new(Arc::clone(&ctx));

        let first = tool
            .run(CancelConfirmationParams { confirmation_id: id.clone() })
            .await
            .unwrap();
        assert!(first.data().unwrap().cancelled);
        assert!(!ctx.confirmations().confirm_action(&id));

        let second = tool
            .run(CancelConfirmationParams { confirmation_id: id })
            .await
            .unwrap();
        assert!(second.success);
        assert!(!second.data().unwrap().cancelled);
    }

    #[tokio::test]
    async fn test_list_pending() {
        let ctx = test_context();
        let tool = ListPendingConfirmationsTool::new(Arc::clone(&ctx));
        assert_eq!(tool.run(ListPendingParams {}).await.unwrap().data().unwrap().count, 0);

        ctx.confirmations().request_confirmation(ConfirmationRequest::new(
            "Restart",
            "Radarr",
            Severity::Medium,
            "restart_service",
        ));
        let result = tool.run(ListPendingParams {}).await.unwrap();
        let output = result.data().unwrap();
        assert_eq!(output.count, 1);
        assert_eq!(output.pending[0].tool_name, "restart_service");
    }
}
