//! Infrastructure layer for dashagent
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer (tool catalog, connector directory),
//! the built-in tools, configuration file loading, and the default
//! wiring of the orchestration core.

pub mod bootstrap;
pub mod config;
pub mod connectors;
pub mod tools;

// Re-export commonly used types
pub use bootstrap::{OrchestrationRuntime, RuntimeError};
pub use config::{
    ConfigLoader, ConfigSource, ConfigValidationError, FileConfig, FileConfirmationConfig, FileLoggingConfig,
    FileServiceConfig, FileWorkflowConfig,
};
pub use connectors::{ConfiguredConnector, ConfiguredConnectorDirectory};
pub use tools::{ExternalTool, ExternalToolSchema, ToolCatalog, builtin_tools, register_builtin_tools};
