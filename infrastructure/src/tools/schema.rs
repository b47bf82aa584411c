//! External-format tool adapter.
//!
//! [`ExternalTool`] exposes a registered tool the way a model's tool-use
//! API expects it: `{name, description, input_schema}` plus an `invoke`
//! entry point taking raw JSON. `invoke` never fails: argument errors,
//! `ToolError`s and panics inside the executor all come back as a
//! `success: false` envelope.
//!
//! Parameter type → JSON Schema type is one-to-one
//! (`string`, `number`, `integer`, `boolean`, `array`, `object`).

use std::sync::Arc;
use std::time::Instant;

use dashagent_application::use_cases::tool_helpers::invoke_tool;
use dashagent_domain::tool::{
    DefaultToolValidator, ToolArguments, ToolDefinition, ToolError, ToolResult, ToolValidator, traits::Tool,
};
use serde::Serialize;
use serde_json::{Value, json};

/// JSON Schema of a tool's input
pub fn input_schema(definition: &ToolDefinition) -> Value {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();

    for param in &definition.parameters {
        properties.insert(
            param.name.clone(),
            json!({
                "type": param.param_type.as_str(),
                "description": param.description,
            }),
        );
        if param.required {
            required.push(json!(param.name));
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Serializable description handed to the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalToolSchema {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// A tool wrapped for an external invocation protocol
#[derive(Clone)]
pub struct ExternalTool {
    schema: ExternalToolSchema,
    tool: Arc<dyn Tool>,
}

impl ExternalTool {
    pub fn new(tool: Arc<dyn Tool>) -> Self {
        let definition = tool.definition();
        let schema = ExternalToolSchema {
            name: definition.name.clone(),
            description: definition.description.clone(),
            input_schema: input_schema(definition),
        };
        Self { schema, tool }
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn schema(&self) -> &ExternalToolSchema {
        &self.schema
    }

    pub fn to_json(&self) -> Value {
        json!({
            "name": self.schema.name,
            "description": self.schema.description,
            "input_schema": self.schema.input_schema,
        })
    }

    /// Validate raw arguments, execute, and contain every failure
    pub async fn invoke(&self, raw_args: Value) -> ToolResult {
        let start = Instant::now();

        let result = match self.prepare(raw_args) {
            Ok(args) => invoke_tool(self.tool.as_ref(), args).await.into_result(),
            Err(err) => {
                tracing::debug!(tool = %self.schema.name, error = %err, "Rejected tool arguments");
                ToolResult::from(err)
            }
        };

        let result = result.backfill_execution_time(start.elapsed().as_millis() as u64);
        if result.success {
            result
        } else {
            result.with_extra("toolName", self.schema.name.clone())
        }
    }

    fn prepare(&self, raw_args: Value) -> Result<ToolArguments, ToolError> {
        let args = match raw_args {
            Value::Object(map) => map,
            Value::Null => ToolArguments::new(),
            other => {
                return Err(ToolError::invalid_parameters(format!(
                    "Arguments for {} must be a JSON object, got {}.",
                    self.schema.name,
                    json_type(&other)
                )));
            }
        };
        DefaultToolValidator.validate(&args, self.tool.definition())?;
        Ok(args)
    }
}

impl std::fmt::Debug for ExternalTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalTool").field("schema", &self.schema).finish()
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
