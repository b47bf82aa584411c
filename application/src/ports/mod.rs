//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod connector_directory;
pub mod search;
pub mod tool_catalog;
pub mod workflow_progress;
