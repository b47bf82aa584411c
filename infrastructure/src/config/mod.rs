//! Configuration file loading for dashagent
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `DASHAGENT_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./dashagent.toml` or `./.dashagent.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/dashagent/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileConfirmationConfig, FileLoggingConfig, FileServiceConfig,
    FileWorkflowConfig, MAX_TTL_SECONDS,
};
pub use loader::{ConfigLoader, ConfigSource, ENV_PREFIX, PROJECT_CONFIG_FILES};
