//! Tool catalog port
//!
//! The read side of the tool registry, as seen by use cases. The concrete
//! registry (and its external-format adapter) lives in the infrastructure
//! layer.

use std::sync::Arc;

use dashagent_domain::tool::traits::Tool;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Tool already registered: {0}")]
    AlreadyRegistered(String),
}

/// Port for looking tools up by name
pub trait ToolCatalogPort: Send + Sync {
    fn get(&self, name: &str) -> Option<Arc<dyn Tool>>;

    fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered names, sorted
    fn names(&self) -> Vec<String>;
}
