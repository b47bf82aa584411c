//! Destructive-action classification
//!
//! A static table of `(tool name, optional predicate over params) → severity`.
//! It is the single source of truth for what needs human confirmation; tools
//! consult it before any delete, unmonitor, bulk-remove or restart.
//! Rules are checked in order and the first match wins, so a rule with a
//! predicate must come before the catch-all rule for the same tool.

use crate::confirmation::Severity;

use super::entities::ToolArguments;

/// Predicate over raw tool arguments
pub type ParamPredicate = fn(&ToolArguments) -> bool;

/// One row of the classification table
#[derive(Debug, Clone)]
pub struct DestructiveRule {
    pub tool_name: String,
    pub predicate: Option<ParamPredicate>,
    pub severity: Severity,
}

impl DestructiveRule {
    pub fn new(tool_name: impl Into<String>, severity: Severity) -> Self {
        Self {
            tool_name: tool_name.into(),
            predicate: None,
            severity,
        }
    }

    pub fn when(mut self, predicate: ParamPredicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    fn matches(&self, tool_name: &str, params: &ToolArguments) -> bool {
        self.tool_name == tool_name && self.predicate.is_none_or(|p| p(params))
    }
}

fn deletes_files(params: &ToolArguments) -> bool {
    params
        .get("deleteFiles")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false)
}

/// Ordered classification table
#[derive(Debug, Clone)]
pub struct DestructiveActionTable {
    rules: Vec<DestructiveRule>,
}

impl DestructiveActionTable {
    /// A table with no rules: nothing is destructive
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: DestructiveRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Severity of `(tool_name, params)`, or `None` when it is safe
    pub fn classify(&self, tool_name: &str, params: &ToolArguments) -> Option<Severity> {
        self.rules
            .iter()
            .find(|rule| rule.matches(tool_name, params))
            .map(|rule| rule.severity)
    }

    pub fn is_destructive(&self, tool_name: &str, params: &ToolArguments) -> bool {
        self.classify(tool_name, params).is_some()
    }

    pub fn rules(&self) -> &[DestructiveRule] {
        &self.rules
    }
}

impl Default for DestructiveActionTable {
    fn default() -> Self {
        Self::empty()
            .with_rule(DestructiveRule::new("delete_media", Severity::High))
            .with_rule(DestructiveRule::new("remove_download", Severity::High).when(deletes_files))
            .with_rule(DestructiveRule::new("remove_download", Severity::Medium))
            .with_rule(DestructiveRule::new("bulk_remove_downloads", Severity::High))
            .with_rule(DestructiveRule::new("unmonitor_media", Severity::Medium))
            .with_rule(DestructiveRule::new("restart_service", Severity::Medium))
            .with_rule(DestructiveRule::new("clear_download_history", Severity::Low))
    }
}
