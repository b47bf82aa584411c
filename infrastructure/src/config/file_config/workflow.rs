//! Workflow engine configuration from TOML (`[workflow]` section)

use dashagent_application::config::{EngineParams, UnresolvedBindingPolicy};
use serde::{Deserialize, Serialize};

/// Raw workflow engine configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWorkflowConfig {
    /// Steps allowed to run at once (1 = strictly sequential)
    pub max_parallel_steps: usize,
    /// What to do with a `{{...}}` reference that resolves to nothing
    pub unresolved_binding: UnresolvedBindingPolicy,
}

impl Default for FileWorkflowConfig {
    fn default() -> Self {
        let defaults = EngineParams::default();
        Self {
            max_parallel_steps: defaults.max_parallel_steps,
            unresolved_binding: defaults.unresolved_binding,
        }
    }
}

impl FileWorkflowConfig {
    pub fn to_engine_params(&self) -> EngineParams {
        EngineParams::default()
            .with_max_parallel_steps(self.max_parallel_steps)
            .with_unresolved_binding(self.unresolved_binding)
    }
}
