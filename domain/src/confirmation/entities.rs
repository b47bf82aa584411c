//! Confirmation domain entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tool::entities::ToolArguments;
use crate::tool::value_objects::ToolResult;

/// How dangerous a destructive action is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a tool asks the gate to hold until a human approves it
#[derive(Debug, Clone)]
pub struct ConfirmationRequest {
    /// Verb phrase, e.g. "Delete movie"
    pub action: String,
    /// What the action applies to, e.g. "Dune (2021)"
    pub target: String,
    pub severity: Severity,
    pub tool_name: String,
    pub params: ToolArguments,
}

impl ConfirmationRequest {
    pub fn new(
        action: impl Into<String>,
        target: impl Into<String>,
        severity: Severity,
        tool_name: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            target: target.into(),
            severity,
            tool_name: tool_name.into(),
            params: ToolArguments::new(),
        }
    }

    pub fn with_params(mut self, params: ToolArguments) -> Self {
        self.params = params;
        self
    }
}

/// A destructive action held by the confirmation gate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingConfirmation {
    pub confirmation_id: String,
    pub action: String,
    pub target: String,
    pub severity: Severity,
    pub tool_name: String,
    pub params: ToolArguments,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl PendingConfirmation {
    pub fn from_request(
        confirmation_id: impl Into<String>,
        request: ConfirmationRequest,
        created_at: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> Self {
        Self {
            confirmation_id: confirmation_id.into(),
            action: request.action,
            target: request.target,
            severity: request.severity,
            tool_name: request.tool_name,
            params: request.params,
            created_at,
            expires_at: created_at + ttl,
        }
    }

    /// Expired once `now` reaches `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Text the host shows to the human
    pub fn prompt(&self) -> String {
        format!(
            "Please confirm: {} {}. This is a {}-severity action. Reply with the confirmation ID {} to proceed.",
            self.action, self.target, self.severity, self.confirmation_id
        )
    }
}

/// Payload returned instead of performing a destructive action
///
/// Serialized as `{requiresConfirmation, confirmationId, confirmationPrompt,
/// severity}` inside a successful [`ToolResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationRequired {
    pub requires_confirmation: bool,
    pub confirmation_id: String,
    pub confirmation_prompt: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub severity: Option<Severity>,
}

impl ConfirmationRequired {
    pub fn from_pending(pending: &PendingConfirmation) -> Self {
        Self {
            requires_confirmation: true,
            confirmation_id: pending.confirmation_id.clone(),
            confirmation_prompt: pending.prompt(),
            severity: Some(pending.severity),
        }
    }

    /// Recognize a confirmation request in a tool's result payload
    pub fn from_data(data: &serde_json::Value) -> Option<Self> {
        let is_request = data
            .get("requiresConfirmation")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        if !is_request {
            return None;
        }
        serde_json::from_value(data.clone()).ok()
    }

    pub fn into_tool_result(self) -> ToolResult {
        let mut data = serde_json::json!({
            "requiresConfirmation": self.requires_confirmation,
            "confirmationId": self.confirmation_id,
            "confirmationPrompt": self.confirmation_prompt,
        });
        if let (Some(severity), Some(map)) = (self.severity, data.as_object_mut()) {
            map.insert("severity".to_string(), severity.as_str().into());
        }
        ToolResult::success(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pending(ttl_secs: i64) -> PendingConfirmation {
        let request = ConfirmationRequest::new("Delete movie", "Dune (2021)", Severity::High, "delete_media");
        PendingConfirmation::from_request("c-1", request, Utc::now(), chrono::Duration::seconds(ttl_secs))
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert_eq!(Severity::High.to_string(), "high");
    }

    #[test]
    fn test_expiry() {
        let p = pending(300);
        assert!(!p.is_expired_at(p.created_at));
        assert!(p.is_expired_at(p.expires_at));
        assert!(pending(0).is_expired_at(Utc::now()));
    }

    #[test]
    fn test_prompt_mentions_action_and_id() {
        let prompt = pending(300).prompt();
        assert!(prompt.contains("Delete movie Dune (2021)"));
        assert!(prompt.contains("high-severity"));
        assert!(prompt.contains("c-1"));
    }

    #[test]
    fn test_confirmation_required_result_shape() {
        let result = ConfirmationRequired::from_pending(&pending(300)).into_tool_result();
        assert!(result.is_success());
        let data = result.data().unwrap();
        assert_eq!(data["requiresConfirmation"], true);
        assert_eq!(data["confirmationId"], "c-1");
        assert_eq!(data["severity"], "high");
        assert!(data["confirmationPrompt"].as_str().unwrap().starts_with("Please confirm"));
    }

    #[test]
    fn test_from_data() {
        let data = json!({
            "requiresConfirmation": true,
            "confirmationId": "c-9",
            "confirmationPrompt": "Please confirm"
        });
        let parsed = ConfirmationRequired::from_data(&data).unwrap();
        assert_eq!(parsed.confirmation_id, "c-9");
        assert!(parsed.severity.is_none());

        assert!(ConfirmationRequired::from_data(&json!({"results": []})).is_none());
        assert!(ConfirmationRequired::from_data(&json!({"requiresConfirmation": false})).is_none());
    }
}
