//! Domain layer for dashagent
//!
//! This crate contains the pure building blocks of the tool-orchestration
//! core. It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Tool
//!
//! A named, typed, asynchronous operation the agent may invoke. Every tool
//! reports through the uniform [`ToolResult`] envelope and fails with a
//! categorized [`ToolError`] that always carries an actionable hint.
//!
//! ## Workflow
//!
//! A validated DAG of tool invocations whose parameters may bind to initial
//! parameters or prior step results through `{{...}}` expressions.
//!
//! ## Confirmation
//!
//! Destructive actions are classified by the [`DestructiveActionTable`] and
//! held as a [`PendingConfirmation`] until a human approves them.

pub mod confirmation;
pub mod core;
pub mod date;
pub mod media;
pub mod tool;
pub mod workflow;

// Re-export commonly used types
pub use confirmation::{ConfirmationRequest, ConfirmationRequired, PendingConfirmation, Severity};
pub use core::string::{first_line, truncate};
pub use date::parse_relative_date;
pub use media::{SearchResult, format_result, format_results};
pub use tool::{
    destructive::{DestructiveActionTable, DestructiveRule},
    entities::{CONFIRMATION_ID_ARG, ParamType, ToolArguments, ToolDefinition, ToolParameter},
    traits::{DefaultToolValidator, FnTool, Tool, ToolValidator, Typed, TypedTool},
    value_objects::{ErrorCategory, ToolError, ToolResult, ToolResultMetadata},
};
pub use workflow::{
    CompiledStep, CompiledWorkflow, ParamBinding, Reference, ResolutionScope, ResolvedParams,
    StepBindings, StepPath, StepResults, StepState, StepTransform, Workflow, WorkflowError,
    WorkflowResult, WorkflowStep, resolve_template_variables, resolve_variable,
};
