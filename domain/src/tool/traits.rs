//! Tool domain traits
//!
//! [`Tool`] is the contract every callable operation satisfies. Tools with a
//! concrete parameter type implement [`TypedTool`] instead and are adapted
//! with [`Typed`], which turns serde deserialization into the parameter
//! validator. [`ToolValidator`] checks raw arguments against a
//! [`ToolDefinition`] without any I/O.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::entities::{CONFIRMATION_ID_ARG, ToolArguments, ToolDefinition};
use super::value_objects::{ToolError, ToolResult};

/// A named, schema-validated, asynchronous operation.
///
/// An `Err` is the equivalent of a thrown error: the catalog boundary and the
/// workflow engine both turn it into a failure, never a crash.
#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> &ToolDefinition;

    fn name(&self) -> &str {
        &self.definition().name
    }

    async fn execute(&self, args: ToolArguments) -> Result<ToolResult, ToolError>;
}

/// A tool with typed parameters and output.
#[async_trait]
pub trait TypedTool: Send + Sync {
    /// Parameter schema; deserialization failures become `INVALID_PARAMETERS`
    type Params: DeserializeOwned + Send;
    /// Payload of a successful result
    type Output: Serialize + Send;

    fn definition(&self) -> &ToolDefinition;

    async fn run(&self, params: Self::Params) -> Result<ToolResult<Self::Output>, ToolError>;
}

/// Adapter exposing a [`TypedTool`] as a [`Tool`].
pub struct Typed<T>(pub T);

#[async_trait]
impl<T: TypedTool> Tool for Typed<T> {
    fn definition(&self) -> &ToolDefinition {
        self.0.definition()
    }

    async fn execute(&self, args: ToolArguments) -> Result<ToolResult, ToolError> {
        let params: T::Params = serde_json::from_value(serde_json::Value::Object(args))
            .map_err(|e| {
                ToolError::invalid_parameters(format!(
                    "Invalid parameters for {}: {}",
                    self.0.definition().name,
                    e
                ))
            })?;

        let result = self.0.run(params).await?;
        result.into_json().map_err(|e| {
            ToolError::operation_failed(format!(
                "Failed to serialize result of {}: {}",
                self.0.definition().name,
                e
            ))
        })
    }
}

type HandlerFuture = Pin<Box<dyn Future<Output = Result<ToolResult, ToolError>> + Send>>;
type BoxedHandler = Arc<dyn Fn(ToolArguments) -> HandlerFuture + Send + Sync>;

/// A tool backed by a closure.
///
/// Handy for hosts that contribute small ad-hoc capabilities, and for fakes.
pub struct FnTool {
    definition: ToolDefinition,
    handler: BoxedHandler,
}

impl FnTool {
    pub fn new<F, Fut>(definition: ToolDefinition, handler: F) -> Self
    where
        F: Fn(ToolArguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolResult, ToolError>> + Send + 'static,
    {
        Self {
            definition,
            handler: Arc::new(move |args| Box::pin(handler(args))),
        }
    }
}

#[async_trait]
impl Tool for FnTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, args: ToolArguments) -> Result<ToolResult, ToolError> {
        (self.handler)(args).await
    }
}

/// Validator for raw tool arguments
///
/// Pure domain check against a [`ToolDefinition`], no I/O.
pub trait ToolValidator {
    fn validate(&self, args: &ToolArguments, definition: &ToolDefinition) -> Result<(), ToolError>;
}

/// Default implementation of ToolValidator
///
/// Required parameters must be present and non-null, unknown arguments are
/// rejected (the confirmation id is always allowed) and present values must
/// match the declared JSON type.
#[derive(Debug, Clone, Default)]
pub struct DefaultToolValidator;

impl ToolValidator for DefaultToolValidator {
    fn validate(&self, args: &ToolArguments, definition: &ToolDefinition) -> Result<(), ToolError> {
        for param in definition.required_parameters() {
            match args.get(&param.name) {
                None | Some(serde_json::Value::Null) => {
                    return Err(ToolError::invalid_parameters(format!(
                        "Missing required parameter '{}' for tool '{}'",
                        param.name, definition.name
                    )));
                }
                Some(_) => {}
            }
        }

        for (name, value) in args {
            if name == CONFIRMATION_ID_ARG {
                continue;
            }
            let Some(param) = definition.parameter(name) else {
                return Err(ToolError::invalid_parameters(format!(
                    "Unknown parameter '{}' for tool '{}'",
                    name, definition.name
                )));
            };
            if !value.is_null() && !param.param_type.accepts(value) {
                return Err(ToolError::invalid_parameters(format!(
                    "Parameter '{}' for tool '{}' must be of type {}",
                    name, definition.name, param.param_type
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::{ParamType, ToolParameter};
    use crate::tool::value_objects::ErrorCategory;
    use serde::Deserialize;
    use serde_json::json;

    fn args(value: serde_json::Value) -> ToolArguments {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn search_definition() -> ToolDefinition {
        ToolDefinition::new("search_media", "Search")
            .with_parameter(ToolParameter::new("query", "Search text", true))
            .with_parameter(
                ToolParameter::new("limit", "Max results", false).with_type(ParamType::Integer),
            )
    }

    #[test]
    fn test_validator_accepts_valid_args() {
        let validator = DefaultToolValidator;
        let result = validator.validate(&args(json!({"query": "Dune", "limit": 5})), &search_definition());
        assert!(result.is_ok());
    }

    #[test]
    fn test_validator_missing_required() {
        let err = DefaultToolValidator
            .validate(&args(json!({"limit": 5})), &search_definition())
            .unwrap_err();
        assert_eq!(err.category, ErrorCategory::InvalidParameters);
        assert!(err.message.contains("query"));
    }

    #[test]
    fn test_validator_null_required_is_missing() {
        let err = DefaultToolValidator
            .validate(&args(json!({"query": null})), &search_definition())
            .unwrap_err();
        assert!(err.message.contains("Missing required parameter"));
    }

    #[test]
    fn test_validator_unknown_param() {
        let err = DefaultToolValidator
            .validate(&args(json!({"query": "x", "colour": "red"})), &search_definition())
            .unwrap_err();
        assert!(err.message.contains("Unknown parameter 'colour'"));
    }

    #[test]
    fn test_validator_wrong_type() {
        let err = DefaultToolValidator
            .validate(&args(json!({"query": "x", "limit": "five"})), &search_definition())
            .unwrap_err();
        assert!(err.message.contains("must be of type integer"));
    }

    #[test]
    fn test_validator_allows_confirmation_id() {
        let result = DefaultToolValidator.validate(
            &args(json!({"query": "x", "confirmationId": "abc"})),
            &search_definition(),
        );
        assert!(result.is_ok());
    }

    struct EchoTool {
        definition: ToolDefinition,
    }

    #[derive(Deserialize)]
    struct EchoParams {
        query: String,
        #[serde(default)]
        limit: Option<u32>,
    }

    #[derive(Serialize)]
    struct EchoOutput {
        echoed: String,
        limit: u32,
    }

    #[async_trait]
    impl TypedTool for EchoTool {
        type Params = EchoParams;
        type Output = EchoOutput;

        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn run(&self, params: EchoParams) -> Result<ToolResult<EchoOutput>, ToolError> {
            Ok(ToolResult::success(EchoOutput {
                echoed: params.query,
                limit: params.limit.unwrap_or(10),
            }))
        }
    }

    #[tokio::test]
    async fn test_typed_tool_parses_params() {
        let tool = Typed(EchoTool {
            definition: search_definition(),
        });

        let result = tool
            .execute(args(json!({"query": "Dune", "confirmationId": "ignored"})))
            .await
            .unwrap();

        assert!(result.is_success());
        assert_eq!(result.data().unwrap()["echoed"], "Dune");
        assert_eq!(result.data().unwrap()["limit"], 10);
        assert_eq!(tool.name(), "search_media");
    }

    #[tokio::test]
    async fn test_typed_tool_rejects_bad_params() {
        let tool = Typed(EchoTool {
            definition: search_definition(),
        });

        let err = tool.execute(args(json!({"limit": 3}))).await.unwrap_err();
        assert_eq!(err.category, ErrorCategory::InvalidParameters);
        assert!(err.message.starts_with("Invalid parameters for search_media"));
    }

    #[tokio::test]
    async fn test_fn_tool() {
        let tool = FnTool::new(ToolDefinition::new("ping", "Ping"), |_args| async {
            Ok(ToolResult::success(json!("pong")))
        });

        let result = tool.execute(ToolArguments::new()).await.unwrap();
        assert_eq!(result.data(), Some(&json!("pong")));
    }
}
