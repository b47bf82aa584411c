//! Workflow error types

use thiserror::Error;

use crate::tool::value_objects::{ErrorCategory, ToolError};

/// Workflow-level configuration errors.
///
/// These abort a whole registration or run, never a single step.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("Workflow not found: {0}")]
    NotFound(String),

    #[error("Workflow already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Invalid workflow '{workflow_id}': {reason}")]
    InvalidDefinition { workflow_id: String, reason: String },
}

impl WorkflowError {
    pub fn invalid(workflow_id: impl Into<String>, reason: impl Into<String>) -> Self {
        WorkflowError::InvalidDefinition {
            workflow_id: workflow_id.into(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::InvalidParameters
    }
}

impl From<WorkflowError> for ToolError {
    fn from(err: WorkflowError) -> Self {
        ToolError::new(
            err.category(),
            err.to_string(),
            "Check the workflow definition and its registration.",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(WorkflowError::NotFound("x".into()).to_string(), "Workflow not found: x");
        assert_eq!(
            WorkflowError::invalid("w", "no steps").to_string(),
            "Invalid workflow 'w': no steps"
        );
    }

    #[test]
    fn test_into_tool_error() {
        let err: ToolError = WorkflowError::AlreadyRegistered("w".into()).into();
        assert_eq!(err.category, ErrorCategory::InvalidParameters);
        assert!(err.message.contains("already registered"));
    }
}
