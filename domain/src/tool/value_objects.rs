//! Tool domain value objects — the result envelope and error taxonomy
//!
//! Every tool invocation produces a [`ToolResult`], the only channel through
//! which a tool reports its outcome. Tools signal expected failures with a
//! [`ToolError`], whose [`ErrorCategory`] drives the user-facing phrasing
//! (never the control flow: every category is handled the same way at the
//! catalog boundary).
//!
//! | Category | Typical cause |
//! |----------|---------------|
//! | `SERVICE_NOT_CONFIGURED` | No connector of the requested type |
//! | `AUTH_FAILED` | Rejected API key |
//! | `SERVICE_UNAVAILABLE` | Service down or unreachable |
//! | `INVALID_PARAMETERS` | Bad arguments, broken workflow definition |
//! | `OPERATION_FAILED` | The service refused or failed the operation |
//! | `NETWORK_ERROR` | Transport failure |
//! | `RATE_LIMIT_EXCEEDED` | Too many requests |

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Category of a [`ToolError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    ServiceNotConfigured,
    AuthFailed,
    ServiceUnavailable,
    InvalidParameters,
    OperationFailed,
    NetworkError,
    RateLimitExceeded,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::ServiceNotConfigured => "SERVICE_NOT_CONFIGURED",
            ErrorCategory::AuthFailed => "AUTH_FAILED",
            ErrorCategory::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorCategory::InvalidParameters => "INVALID_PARAMETERS",
            ErrorCategory::OperationFailed => "OPERATION_FAILED",
            ErrorCategory::NetworkError => "NETWORK_ERROR",
            ErrorCategory::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised deliberately by a tool implementation.
///
/// The catalog renders it to the user as [`user_message`](Self::user_message):
/// the message followed by the actionable hint.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("[{category}] {message}")]
#[serde(rename_all = "camelCase")]
pub struct ToolError {
    /// What went wrong
    pub message: String,
    /// Taxonomy bucket
    pub category: ErrorCategory,
    /// What the user can do about it
    pub actionable_hint: String,
    /// Opaque diagnostic payload
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub details: Option<serde_json::Value>,
}

impl ToolError {
    pub fn new(
        category: ErrorCategory,
        message: impl Into<String>,
        actionable_hint: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            category,
            actionable_hint: actionable_hint.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<serde_json::Value>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// `message + " " + actionable_hint` (hint omitted when empty)
    pub fn user_message(&self) -> String {
        if self.actionable_hint.is_empty() {
            self.message.clone()
        } else {
            format!("{} {}", self.message, self.actionable_hint)
        }
    }

    // ==================== Common error constructors ====================

    pub fn service_not_configured(service_type: impl AsRef<str>) -> Self {
        let service_type = service_type.as_ref();
        Self::new(
            ErrorCategory::ServiceNotConfigured,
            format!("No {} service is configured.", service_type),
            format!(
                "Add a {} service in Settings > Services and make sure it is enabled.",
                service_type
            ),
        )
    }

    pub fn auth_failed(service_name: impl AsRef<str>) -> Self {
        let service_name = service_name.as_ref();
        Self::new(
            ErrorCategory::AuthFailed,
            format!("Authentication failed for {}.", service_name),
            format!(
                "Check the API key for {} in its service settings.",
                service_name
            ),
        )
    }

    pub fn service_unavailable(service_name: impl AsRef<str>) -> Self {
        let service_name = service_name.as_ref();
        Self::new(
            ErrorCategory::ServiceUnavailable,
            format!("{} is not reachable.", service_name),
            format!(
                "Verify that {} is running and that its URL is correct.",
                service_name
            ),
        )
    }

    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::new(
            ErrorCategory::InvalidParameters,
            message,
            "Check the provided parameters and try again.",
        )
    }

    pub fn operation_failed(message: impl Into<String>) -> Self {
        Self::new(
            ErrorCategory::OperationFailed,
            message,
            "The operation could not be completed. Try again later.",
        )
    }

    pub fn network_error(message: impl Into<String>) -> Self {
        Self::new(
            ErrorCategory::NetworkError,
            message,
            "Check the network connection to the service.",
        )
    }

    pub fn rate_limit_exceeded(service_name: impl AsRef<str>) -> Self {
        let service_name = service_name.as_ref();
        Self::new(
            ErrorCategory::RateLimitExceeded,
            format!("Rate limit exceeded for {}.", service_name),
            "Wait a moment before trying again.",
        )
    }
}

/// Structured metadata about a tool execution.
///
/// Serialized flat: `extra` entries sit next to the named fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResultMetadata {
    /// Wall-clock duration of the executor in milliseconds
    #[serde(rename = "executionTime", skip_serializing_if = "Option::is_none", default)]
    pub execution_time_ms: Option<u64>,
    /// Connector that served the request
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub service_id: Option<String>,
    /// Type of that connector (e.g. "radarr")
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub service_type: Option<String>,
    /// Tool-specific extras
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Uniform result envelope of a tool execution.
///
/// `success == false` implies `data` is absent, `success == true` implies
/// `error` is absent. Use the constructors; they keep the two apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult<T = serde_json::Value> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub metadata: Option<ToolResultMetadata>,
}

impl<T> ToolResult<T> {
    /// Create a successful result
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            metadata: None,
        }
    }

    /// Create a successful result without payload
    pub fn empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            metadata: None,
        }
    }

    /// Create a failed result
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: ToolResultMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.metadata_mut().execution_time_ms = Some(ms);
        self
    }

    pub fn with_service(mut self, service_id: impl Into<String>, service_type: impl Into<String>) -> Self {
        let metadata = self.metadata_mut();
        metadata.service_id = Some(service_id.into());
        metadata.service_type = Some(service_type.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata_mut().extra.insert(key.into(), value.into());
        self
    }

    /// Set the execution time only if the tool did not report one itself.
    pub fn backfill_execution_time(mut self, ms: u64) -> Self {
        let metadata = self.metadata_mut();
        if metadata.execution_time_ms.is_none() {
            metadata.execution_time_ms = Some(ms);
        }
        self
    }

    fn metadata_mut(&mut self) -> &mut ToolResultMetadata {
        self.metadata.get_or_insert_with(ToolResultMetadata::default)
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn execution_time_ms(&self) -> Option<u64> {
        self.metadata.as_ref().and_then(|m| m.execution_time_ms)
    }
}

impl<T: Serialize> ToolResult<T> {
    /// Erase the payload type into JSON.
    pub fn into_json(self) -> Result<ToolResult, serde_json::Error> {
        let data = self.data.map(serde_json::to_value).transpose()?;
        Ok(ToolResult {
            success: self.success,
            data,
            error: self.error,
            metadata: self.metadata,
        })
    }
}

impl ToolResult {
    /// Read the JSON payload back as a concrete type.
    pub fn data_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.data
            .as_ref()
            .and_then(|d| serde_json::from_value(d.clone()).ok())
    }
}

impl From<ToolError> for ToolResult {
    fn from(error: ToolError) -> Self {
        ToolResult::failure(error.user_message())
            .with_extra("errorCategory", error.category.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_message_appends_hint() {
        let err = ToolError::service_not_configured("radarr");
        assert_eq!(err.category, ErrorCategory::ServiceNotConfigured);
        assert_eq!(
            err.user_message(),
            "No radarr service is configured. Add a radarr service in Settings > Services and make sure it is enabled."
        );
    }

    #[test]
    fn test_user_message_without_hint() {
        let err = ToolError::new(ErrorCategory::OperationFailed, "Boom", "");
        assert_eq!(err.user_message(), "Boom");
    }

    #[test]
    fn test_display_includes_category() {
        let err = ToolError::auth_failed("Sonarr");
        assert_eq!(err.to_string(), "[AUTH_FAILED] Authentication failed for Sonarr.");
    }

    #[test]
    fn test_success_and_failure_are_exclusive() {
        let ok = ToolResult::success(json!({"id": 1}));
        assert!(ok.is_success());
        assert!(ok.error().is_none());

        let failed: ToolResult = ToolResult::failure("nope");
        assert!(!failed.is_success());
        assert!(failed.data().is_none());
        assert_eq!(failed.error(), Some("nope"));
    }

    #[test]
    fn test_backfill_does_not_overwrite() {
        let result = ToolResult::success(json!(1)).with_execution_time(7);
        assert_eq!(result.backfill_execution_time(99).execution_time_ms(), Some(7));

        let result = ToolResult::success(json!(1));
        assert_eq!(result.backfill_execution_time(99).execution_time_ms(), Some(99));
    }

    #[test]
    fn test_serializes_camel_case_with_flat_extras() {
        let result = ToolResult::success(json!({"ok": true}))
            .with_service("radarr-1", "radarr")
            .with_execution_time(12)
            .with_extra("toolName", "search_media");

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["metadata"]["executionTime"], 12);
        assert_eq!(value["metadata"]["serviceId"], "radarr-1");
        assert_eq!(value["metadata"]["serviceType"], "radarr");
        assert_eq!(value["metadata"]["toolName"], "search_media");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_into_json_and_back() {
        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        struct Movie {
            title: String,
        }

        let typed = ToolResult::success(Movie {
            title: "Dune".into(),
        });
        let erased = typed.into_json().unwrap();
        assert_eq!(erased.data().unwrap()["title"], "Dune");
        assert_eq!(
            erased.data_as::<Movie>(),
            Some(Movie {
                title: "Dune".into()
            })
        );
    }

    #[test]
    fn test_from_tool_error() {
        let result: ToolResult = ToolError::invalid_parameters("query is empty").into();
        assert!(!result.is_success());
        assert!(result.error().unwrap().starts_with("query is empty"));
        assert_eq!(
            result.metadata.unwrap().extra["errorCategory"],
            "INVALID_PARAMETERS"
        );
    }
}
