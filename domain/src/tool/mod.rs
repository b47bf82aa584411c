//! Tool domain module
//!
//! This module defines the **Tool Contract**: the shape every callable
//! operation offered to the agent satisfies, and the uniform envelope it
//! reports outcomes through.
//!
//! # Overview
//!
//! ```text
//! ┌────────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ ToolDefinition │───▶│ ToolArguments│───▶│ ToolResult   │
//! │ (name, params) │    │ (raw JSON)   │    │ (envelope)   │
//! └───────┬────────┘    └──────────────┘    └──────────────┘
//!         │
//!         └─ Tool / TypedTool: async executor
//! ```
//!
//! - [`ToolDefinition`] — name, description and typed parameter list
//! - [`Tool`] — async executor over raw JSON arguments
//! - [`TypedTool`] + [`Typed`] — executor over a deserialized parameter struct
//! - [`ToolResult`] — `{success, data?, error?, metadata?}`
//! - [`ToolError`] — categorized, actionable error
//! - [`DestructiveActionTable`] — which calls need human confirmation
//!
//! # Architecture
//!
//! - **Domain** (this module): pure definitions, no I/O
//! - **Application** (`ToolCatalogPort`): port for looking tools up
//! - **Infrastructure** (`ToolCatalog`): registry plus the external
//!   invocation adapter that contains every executor failure

pub mod destructive;
pub mod entities;
pub mod traits;
pub mod value_objects;

pub use destructive::{DestructiveActionTable, DestructiveRule};
pub use entities::{CONFIRMATION_ID_ARG, ParamType, ToolArguments, ToolDefinition, ToolParameter};
pub use traits::{DefaultToolValidator, FnTool, Tool, ToolValidator, Typed, TypedTool};
pub use value_objects::{ErrorCategory, ToolError, ToolResult, ToolResultMetadata};
