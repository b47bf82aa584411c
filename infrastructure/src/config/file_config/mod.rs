//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate
//! (`[[workflows]]` entries are domain [`Workflow`]s).

mod confirmation;
mod logging;
mod services;
mod workflow;

pub use confirmation::{FileConfirmationConfig, MAX_TTL_SECONDS};
pub use logging::FileLoggingConfig;
pub use services::FileServiceConfig;
pub use workflow::FileWorkflowConfig;

use std::collections::HashSet;

use dashagent_domain::workflow::Workflow;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("workflow.max_parallel_steps cannot be 0")]
    ZeroParallelSteps,

    #[error("confirmation.ttl_seconds cannot be 0")]
    ZeroConfirmationTtl,

    #[error("confirmation.ttl_seconds cannot exceed {max} (got {value})")]
    ConfirmationTtlTooLarge { value: u64, max: u64 },

    #[error("services[{index}]: id cannot be empty")]
    EmptyServiceId { index: usize },

    #[error("services[{index}]: type cannot be empty")]
    EmptyServiceType { index: usize },

    #[error("duplicate service id '{0}'")]
    DuplicateServiceId(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Workflow engine settings
    pub workflow: FileWorkflowConfig,
    /// Confirmation gate settings
    pub confirmation: FileConfirmationConfig,
    /// Logging settings
    pub logging: FileLoggingConfig,
    /// Media services exposed through the connector directory
    pub services: Vec<FileServiceConfig>,
    /// Declarative workflows registered at startup
    pub workflows: Vec<Workflow>,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Workflow definitions are validated separately when they are
    /// registered with the engine.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        if self.workflow.max_parallel_steps == 0 {
            issues.push(ConfigValidationError::ZeroParallelSteps);
        }

        match self.confirmation.ttl_seconds {
            0 => issues.push(ConfigValidationError::ZeroConfirmationTtl),
            value if value > MAX_TTL_SECONDS => {
                issues.push(ConfigValidationError::ConfirmationTtlTooLarge {
                    value,
                    max: MAX_TTL_SECONDS,
                });
            }
            _ => {}
        }

        let mut seen = HashSet::new();
        for (index, service) in self.services.iter().enumerate() {
            let id = service.id.trim();
            if id.is_empty() {
                issues.push(ConfigValidationError::EmptyServiceId { index });
                continue;
            }
            if service.service_type.trim().is_empty() {
                issues.push(ConfigValidationError::EmptyServiceType { index });
            }
            if !seen.insert(id.to_string()) {
                issues.push(ConfigValidationError::DuplicateServiceId(id.to_string()));
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashagent_application::config::UnresolvedBindingPolicy;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[workflow]
max_parallel_steps = 2
unresolved_binding = "omit"

[confirmation]
ttl_seconds = 120

[logging]
level = "debug"

[[services]]
id = "radarr-main"
type = "radarr"
name = "Radarr"
url = "http://localhost:7878"

[[services]]
id = "sonarr-main"
type = "sonarr"
enabled = false

[[workflows]]
id = "search-and-add"
name = "Search and add"
description = "Find a title and add the best match"
tags = ["media"]

[[workflows.steps]]
id = "search"
tool = "search_media"
params = { query = "{{query}}" }

[[workflows.steps]]
id = "add"
tool = "add_media"
depends_on = ["search"]
params = { title = "{{search.data.results[0].title}}" }
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.workflow.max_parallel_steps, 2);
        assert_eq!(config.workflow.unresolved_binding, UnresolvedBindingPolicy::Omit);
        assert_eq!(config.confirmation.ttl_seconds, 120);
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert_eq!(config.services.len(), 2);
        assert!(!config.services[1].enabled);

        let workflow = &config.workflows[0];
        assert_eq!(workflow.steps.len(), 2);
        assert!(!workflow.requires_confirmation);
        assert_eq!(workflow.steps[1].tool_name, "add_media");
        assert_eq!(workflow.steps[1].depends_on, vec!["search"]);
        assert_eq!(workflow.steps[1].params["title"], "{{search.data.results[0].title}}");
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: FileConfig = toml::from_str("[confirmation]\nttl_seconds = 60\n").unwrap();
        assert_eq!(config.confirmation.ttl_seconds, 60);
        // Defaults should apply
        assert_eq!(config.workflow.max_parallel_steps, 1);
        assert!(config.services.is_empty());
        assert!(config.logging.level.is_none());
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.workflow.unresolved_binding, UnresolvedBindingPolicy::Fail);
        assert_eq!(config.confirmation.ttl_seconds, 300);
        assert!(config.workflows.is_empty());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_every_issue() {
        let toml_str = r#"
[workflow]
max_parallel_steps = 0

[confirmation]
ttl_seconds = 0

[[services]]
id = " "
type = "radarr"

[[services]]
id = "sonarr"
type = "sonarr"

[[services]]
id = "sonarr"
type = ""
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.validate(),
            vec![
                ConfigValidationError::ZeroParallelSteps,
                ConfigValidationError::ZeroConfirmationTtl,
                ConfigValidationError::EmptyServiceId { index: 0 },
                ConfigValidationError::EmptyServiceType { index: 2 },
                ConfigValidationError::DuplicateServiceId("sonarr".into()),
            ]
        );
    }

    #[test]
    fn test_validate_ttl_upper_bound() {
        let mut config = FileConfig::default();
        config.confirmation.ttl_seconds = MAX_TTL_SECONDS + 1;
        assert!(matches!(
            config.validate()[..],
            [ConfigValidationError::ConfirmationTtlTooLarge { .. }]
        ));
    }
}
