//! Connector directory port
//!
//! Tools reach external media services only through this port; the core
//! itself never talks to a network.

use std::sync::Arc;

use async_trait::async_trait;
use dashagent_domain::media::SearchResult;
use dashagent_domain::tool::value_objects::ToolError;
use serde::{Deserialize, Serialize};

/// Static description of a configured service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorDescriptor {
    pub id: String,
    /// e.g. "radarr", "sonarr", "qbittorrent"
    pub service_type: String,
    pub name: String,
    pub base_url: String,
    pub enabled: bool,
}

/// Handle to one external service
#[async_trait]
pub trait Connector: Send + Sync {
    fn descriptor(&self) -> &ConnectorDescriptor;

    /// Search this service; services without search yield nothing
    async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<SearchResult>, ToolError> {
        Ok(Vec::new())
    }
}

/// Port for enumerating configured connectors
pub trait ConnectorDirectory: Send + Sync {
    /// Every connector, enabled or not
    fn all(&self) -> Vec<Arc<dyn Connector>>;

    /// Enabled connectors of one service type (case-insensitive)
    fn connectors_by_type(&self, service_type: &str) -> Vec<Arc<dyn Connector>> {
        self.all()
            .into_iter()
            .filter(|c| {
                let d = c.descriptor();
                d.enabled && d.service_type.eq_ignore_ascii_case(service_type)
            })
            .collect()
    }

    fn connector(&self, id: &str) -> Option<Arc<dyn Connector>> {
        self.all().into_iter().find(|c| c.descriptor().id == id)
    }

    fn enabled(&self) -> Vec<Arc<dyn Connector>> {
        self.all().into_iter().filter(|c| c.descriptor().enabled).collect()
    }
}
