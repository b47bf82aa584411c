//! Tool Catalog
//!
//! The [`ToolCatalog`] owns every registered tool and implements
//! [`ToolCatalogPort`]. Names are unique: a second registration under the
//! same name fails and leaves the catalog untouched.
//!
//! # Usage
//!
//! ```ignore
//! use dashagent_infrastructure::tools::ToolCatalog;
//!
//! let catalog = ToolCatalog::new();
//! catalog.register(Typed(ParseDateTool::new(ctx.clone())))?;
//!
//! assert!(catalog.has("parse_date"));
//!
//! // Hand the catalog to a model as JSON-Schema tools
//! for tool in catalog.to_external_format() {
//!     let result = tool.invoke(json!({"text": "tomorrow"})).await;
//! }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dashagent_application::ports::tool_catalog::{CatalogError, ToolCatalogPort};
use dashagent_domain::tool::traits::Tool;

use super::schema::ExternalTool;

/// Registry of tools keyed by name
#[derive(Default)]
pub struct ToolCatalog {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<dyn Tool>>> {
        self.tools.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<dyn Tool>>> {
        self.tools.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a tool
    pub fn register<T: Tool + 'static>(&self, tool: T) -> Result<(), CatalogError> {
        self.register_arc(Arc::new(tool))
    }

    /// Register a tool (Arc version)
    pub fn register_arc(&self, tool: Arc<dyn Tool>) -> Result<(), CatalogError> {
        let name = tool.name().to_string();
        let mut tools = self.write();
        if tools.contains_key(&name) {
            tracing::warn!(tool = %name, "Tool already registered");
            return Err(CatalogError::AlreadyRegistered(name));
        }
        tracing::debug!(tool = %name, "Registered tool");
        tools.insert(name, tool);
        Ok(())
    }

    /// Register several tools, stopping at the first duplicate
    ///
    /// Tools registered before the duplicate stay registered.
    pub fn register_all<I>(&self, tools: I) -> Result<usize, CatalogError>
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        let mut count = 0;
        for tool in tools {
            self.register_arc(tool)?;
            count += 1;
        }
        Ok(count)
    }

    pub fn unregister(&self, name: &str) -> bool {
        let removed = self.write().remove(name).is_some();
        if removed {
            tracing::debug!(tool = %name, "Unregistered tool");
        }
        removed
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.read().get(name).cloned()
    }

    /// Every tool, sorted by name
    pub fn get_all(&self) -> Vec<Arc<dyn Tool>> {
        let mut tools: Vec<Arc<dyn Tool>> = self.read().values().cloned().collect();
        tools.sort_by(|a, b| a.name().cmp(b.name()));
        tools
    }

    pub fn has(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    pub fn count(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Adapters for an external invocation protocol, sorted by name
    pub fn to_external_format(&self) -> Vec<ExternalTool> {
        self.get_all().into_iter().map(ExternalTool::new).collect()
    }

    /// One adapter by name
    pub fn external(&self, name: &str) -> Option<ExternalTool> {
        self.get(name).map(ExternalTool::new)
    }
}

impl ToolCatalogPort for ToolCatalog {
    fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        ToolCatalog::get(self, name)
    }

    fn has(&self, name: &str) -> bool {
        ToolCatalog::has(self, name)
    }

    fn names(&self) -> Vec<String> {
        ToolCatalog::names(self)
    }
}
