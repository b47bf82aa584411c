//! Confirmation gate configuration from TOML (`[confirmation]` section)

use std::time::Duration;

use dashagent_application::use_cases::confirmation_gate::DEFAULT_CONFIRMATION_TTL;
use serde::{Deserialize, Serialize};

/// Longest accepted confirmation lifetime (one day)
pub const MAX_TTL_SECONDS: u64 = 24 * 60 * 60;

/// Raw confirmation configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfirmationConfig {
    /// Seconds a pending confirmation stays valid
    pub ttl_seconds: u64,
}

impl Default for FileConfirmationConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_CONFIRMATION_TTL.as_secs(),
        }
    }
}

impl FileConfirmationConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}
