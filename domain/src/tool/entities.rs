//! Tool domain entities

use serde::{Deserialize, Serialize};

/// Raw arguments of a tool invocation: a flat JSON object.
pub type ToolArguments = serde_json::Map<String, serde_json::Value>;

/// Reserved argument carrying a previously issued confirmation id.
pub const CONFIRMATION_ID_ARG: &str = "confirmationId";

/// JSON type of a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    /// JSON Schema `type` keyword for this parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Integer => "integer",
            ParamType::Boolean => "boolean",
            ParamType::Array => "array",
            ParamType::Object => "object",
        }
    }

    /// Whether a JSON value is acceptable for this type
    pub fn accepts(&self, value: &serde_json::Value) -> bool {
        use serde_json::Value;
        match (self, value) {
            (ParamType::String, Value::String(_)) => true,
            (ParamType::Number, Value::Number(_)) => true,
            (ParamType::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (ParamType::Boolean, Value::Bool(_)) => true,
            (ParamType::Array, Value::Array(_)) => true,
            (ParamType::Object, Value::Object(_)) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Definition of a tool that can be invoked by the agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "search_media")
    pub name: String,
    /// Human-readable description shown to the model
    pub description: String,
    /// Parameter specifications
    pub parameters: Vec<ToolParameter>,
}

/// Parameter specification for a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub param_type: ParamType,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ToolParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn required_parameters(&self) -> impl Iterator<Item = &ToolParameter> {
        self.parameters.iter().filter(|p| p.required)
    }
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: ParamType::String,
        }
    }

    pub fn with_type(mut self, param_type: ParamType) -> Self {
        self.param_type = param_type;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_definition() {
        let tool = ToolDefinition::new("search_media", "Search across media services")
            .with_parameter(ToolParameter::new("query", "Search text", true))
            .with_parameter(
                ToolParameter::new("limit", "Maximum results", false).with_type(ParamType::Integer),
            );

        assert_eq!(tool.name, "search_media");
        assert_eq!(tool.parameters.len(), 2);
        assert_eq!(tool.required_parameters().count(), 1);
        assert_eq!(tool.parameter("limit").unwrap().param_type, ParamType::Integer);
        assert!(tool.parameter("missing").is_none());
    }

    #[test]
    fn test_param_type_accepts() {
        assert!(ParamType::String.accepts(&json!("x")));
        assert!(!ParamType::String.accepts(&json!(1)));
        assert!(ParamType::Integer.accepts(&json!(3)));
        assert!(!ParamType::Integer.accepts(&json!(3.5)));
        assert!(ParamType::Number.accepts(&json!(3.5)));
        assert!(ParamType::Boolean.accepts(&json!(false)));
        assert!(ParamType::Array.accepts(&json!(["a"])));
        assert!(ParamType::Object.accepts(&json!({"a": 1})));
    }
}
