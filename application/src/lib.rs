//! Application layer for dashagent
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{EngineParams, UnresolvedBindingPolicy};
pub use ports::{
    connector_directory::{Connector, ConnectorDescriptor, ConnectorDirectory},
    search::{SearchFacility, SearchQuery},
    tool_catalog::{CatalogError, ToolCatalogPort},
    workflow_progress::{NoWorkflowProgress, StepCallback, WorkflowProgressNotifier},
};
pub use use_cases::confirmation_gate::{Clock, ConfirmationGate, DEFAULT_CONFIRMATION_TTL, SystemClock};
pub use use_cases::execute_workflow::{WorkflowEngine, workflow_confirmation_tool};
pub use use_cases::fan_out_search::FanOutSearch;
pub use use_cases::tool_context::{GuardDecision, ToolContext};
pub use use_cases::tool_helpers::{
    Invocation, InvocationError, UNEXPECTED_ERROR_MESSAGE, invoke_tool, panic_message,
};
