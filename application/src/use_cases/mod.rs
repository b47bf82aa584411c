//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod confirmation_gate;
pub mod execute_workflow;
pub mod fan_out_search;
pub mod tool_context;
pub mod tool_helpers;
