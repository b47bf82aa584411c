//! Shared execution context handed to every tool.
//!
//! Explicitly constructed and injected: connector access, the search
//! facility, the confirmation gate, the destructive-action table, plus the
//! formatting and error-rendering helpers tools share.

use std::any::Any;
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use dashagent_domain::confirmation::{ConfirmationRequest, ConfirmationRequired, Severity};
use dashagent_domain::core::string::first_line;
use dashagent_domain::date;
use dashagent_domain::media::{self, SearchResult};
use dashagent_domain::tool::{
    CONFIRMATION_ID_ARG, DestructiveActionTable, ErrorCategory, ToolArguments, ToolError, ToolResult,
};
use tracing::debug;

use super::confirmation_gate::ConfirmationGate;
use super::tool_helpers::{InvocationError, UNEXPECTED_ERROR_MESSAGE};
use crate::ports::connector_directory::{Connector, ConnectorDirectory};
use crate::ports::search::SearchFacility;

/// Outcome of [`ToolContext::guard_destructive`]
#[derive(Debug, Clone)]
pub enum GuardDecision {
    /// Safe, or confirmed by the human: perform the action
    Proceed,
    /// Return this result to the caller instead of acting
    RequiresConfirmation(ToolResult),
}

impl GuardDecision {
    pub fn is_proceed(&self) -> bool {
        matches!(self, GuardDecision::Proceed)
    }
}

pub struct ToolContext {
    connectors: Arc<dyn ConnectorDirectory>,
    search: Arc<dyn SearchFacility>,
    confirmations: Arc<ConfirmationGate>,
    destructive: DestructiveActionTable,
}

impl ToolContext {
    pub fn new(
        connectors: Arc<dyn ConnectorDirectory>,
        search: Arc<dyn SearchFacility>,
        confirmations: Arc<ConfirmationGate>,
    ) -> Self {
        Self {
            connectors,
            search,
            confirmations,
            destructive: DestructiveActionTable::default(),
        }
    }

    pub fn with_destructive_table(mut self, table: DestructiveActionTable) -> Self {
        self.destructive = table;
        self
    }

    pub fn connectors(&self) -> &Arc<dyn ConnectorDirectory> {
        &self.connectors
    }

    pub fn search_facility(&self) -> &Arc<dyn SearchFacility> {
        &self.search
    }

    pub fn confirmations(&self) -> &Arc<ConfirmationGate> {
        &self.confirmations
    }

    // ==================== Connectors ====================

    pub fn connectors_by_type(&self, service_type: &str) -> Vec<Arc<dyn Connector>> {
        self.connectors.connectors_by_type(service_type)
    }

    pub fn connector(&self, id: &str) -> Option<Arc<dyn Connector>> {
        self.connectors.connector(id)
    }

    /// First enabled connector of `service_type`
    pub fn require_connector(&self, service_type: &str) -> Result<Arc<dyn Connector>, ToolError> {
        self.connectors_by_type(service_type)
            .into_iter()
            .next()
            .ok_or_else(|| ToolError::service_not_configured(service_type))
    }

    // ==================== Dates & formatting ====================

    /// Resolve a relative or absolute date against the local clock
    pub fn parse_relative_date(&self, text: &str) -> Result<NaiveDateTime, ToolError> {
        date::parse_relative_date(text, Local::now().naive_local())
    }

    pub fn format_result(&self, result: &SearchResult) -> String {
        media::format_result(result)
    }

    pub fn format_results(&self, results: &[SearchResult], max: usize) -> String {
        media::format_results(results, max)
    }

    /// User-facing text for any error
    ///
    /// A [`ToolError`] renders as message plus hint; anything else as a
    /// generic sentence with the first line of its message only.
    pub fn format_error(err: &(dyn std::error::Error + 'static)) -> String {
        if let Some(tool_error) = err.downcast_ref::<ToolError>() {
            return tool_error.user_message();
        }
        if let Some(invocation) = err.downcast_ref::<InvocationError>() {
            return invocation.user_message();
        }
        format!("An error occurred: {}", first_line(&err.to_string()))
    }

    /// User-facing text for a caught panic payload
    pub fn format_panic(_payload: &(dyn Any + Send)) -> String {
        UNEXPECTED_ERROR_MESSAGE.to_string()
    }

    // ==================== Destructive actions ====================

    pub fn classify_destructive(&self, tool_name: &str, params: &ToolArguments) -> Option<Severity> {
        self.destructive.classify(tool_name, params)
    }

    /// Gate a destructive action behind the confirmation flow
    ///
    /// Without a `confirmationId` argument a confirmation is requested and
    /// its prompt returned; with one, the pending entry must have been
    /// requested by `tool_name` with the same arguments and severity, and is
    /// consumed. None of the built-in tools is destructive, so this is only
    /// reached through tools the host registers:
    ///
    /// ```ignore
    /// async fn execute(&self, args: ToolArguments) -> Result<ToolResult, ToolError> {
    ///     let target = format!("download {}", args["id"]);
    ///     match self.ctx.guard_destructive("remove_download", &args, "Remove", &target)? {
    ///         GuardDecision::RequiresConfirmation(prompt) => Ok(prompt),
    ///         GuardDecision::Proceed => self.remove(&args).await,
    ///     }
    /// }
    /// ```
    pub fn guard_destructive(
        &self,
        tool_name: &str,
        args: &ToolArguments,
        action: &str,
        target: &str,
    ) -> Result<GuardDecision, ToolError> {
        let Some(severity) = self.classify_destructive(tool_name, args) else {
            return Ok(GuardDecision::Proceed);
        };

        let mut params = args.clone();
        params.remove(CONFIRMATION_ID_ARG);

        match args.get(CONFIRMATION_ID_ARG).and_then(serde_json::Value::as_str) {
            None => {
                let request = ConfirmationRequest::new(action, target, severity, tool_name).with_params(params);
                let id = self.confirmations.request_confirmation(request);
                let pending = self.confirmations.get_pending(&id).ok_or_else(|| {
                    ToolError::operation_failed("The confirmation request expired before it could be shown.")
                })?;
                Ok(GuardDecision::RequiresConfirmation(
                    ConfirmationRequired::from_pending(&pending).into_tool_result(),
                ))
            }
            Some(id) => {
                if self.confirmations.confirm_action_with(id, tool_name, &params, severity) {
                    debug!(tool = tool_name, confirmation_id = id, "Destructive action confirmed");
                    Ok(GuardDecision::Proceed)
                } else {
                    Err(ToolError::new(
                        ErrorCategory::InvalidParameters,
                        format!("Confirmation {} is expired, unknown or was issued for a different request.", id),
                        "Request the action again to get a new confirmation ID.",
                    ))
                }
            }
        }
    }
}
