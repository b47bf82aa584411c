//! Connector directory built from configuration
//!
//! Each `[[services]]` entry becomes a [`ConfiguredConnector`]: a descriptor
//! without a network client, whose search yields nothing. Hosts that ship
//! real service adapters replace entries with
//! [`ConfiguredConnectorDirectory::with_connector`].

use std::sync::Arc;

use async_trait::async_trait;
use dashagent_application::ports::connector_directory::{Connector, ConnectorDescriptor, ConnectorDirectory};
use dashagent_domain::media::SearchResult;
use dashagent_domain::tool::ToolError;

/// Descriptor-only connector
#[derive(Debug, Clone)]
pub struct ConfiguredConnector {
    descriptor: ConnectorDescriptor,
}

impl ConfiguredConnector {
    pub fn new(descriptor: ConnectorDescriptor) -> Self {
        Self { descriptor }
    }
}

#[async_trait]
impl Connector for ConfiguredConnector {
    fn descriptor(&self) -> &ConnectorDescriptor {
        &self.descriptor
    }

    async fn search(&self, query: &str, _limit: usize) -> Result<Vec<SearchResult>, ToolError> {
        tracing::debug!(
            connector = %self.descriptor.id,
            query,
            "No search adapter attached; returning no results"
        );
        Ok(Vec::new())
    }
}

/// Ordered set of connectors, unique by id
#[derive(Default, Clone)]
pub struct ConfiguredConnectorDirectory {
    connectors: Vec<Arc<dyn Connector>>,
}

impl ConfiguredConnectorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from descriptors; a later duplicate id replaces the earlier one
    pub fn from_descriptors<I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = ConnectorDescriptor>,
    {
        descriptors.into_iter().fold(Self::new(), |directory, descriptor| {
            directory.with_connector(Arc::new(ConfiguredConnector::new(descriptor)))
        })
    }

    /// Add a connector, replacing any with the same id in place
    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        let id = connector.descriptor().id.clone();
        match self.connectors.iter().position(|c| c.descriptor().id == id) {
            Some(index) => {
                tracing::debug!(connector = %id, "Replacing connector");
                self.connectors[index] = connector;
            }
            None => {
                tracing::debug!(connector = %id, "Added connector");
                self.connectors.push(connector);
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}

impl ConnectorDirectory for ConfiguredConnectorDirectory {
    fn all(&self) -> Vec<Arc<dyn Connector>> {
        self.connectors.clone()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Connector answering from an in-memory title list
    pub(crate) struct StaticConnector {
        descriptor: ConnectorDescriptor,
        titles: Vec<SearchResult>,
    }

    impl StaticConnector {
        pub(crate) fn new(id: &str, service_type: &str, titles: Vec<SearchResult>) -> Arc<dyn Connector> {
            Arc::new(Self {
                descriptor: descriptor(id, service_type, true),
                titles,
            })
        }
    }

    #[async_trait]
    impl Connector for StaticConnector {
        fn descriptor(&self) -> &ConnectorDescriptor {
            &self.descriptor
        }

        async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, ToolError> {
            let needle = query.to_lowercase();
            Ok(self
                .titles
                .iter()
                .filter(|r| r.title.to_lowercase().contains(&needle))
                .take(limit)
                .cloned()
                .collect())
        }
    }

    pub(crate) fn descriptor(id: &str, service_type: &str, enabled: bool) -> ConnectorDescriptor {
        ConnectorDescriptor {
            id: id.to_string(),
            service_type: service_type.to_string(),
            name: id.to_string(),
            base_url: format!("http://{id}.local"),
            enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{StaticConnector, descriptor};
    use super::*;

    #[test]
    fn test_from_descriptors_keeps_order_and_dedupes() {
        let directory = ConfiguredConnectorDirectory::from_descriptors([
            descriptor("radarr", "radarr", true),
            descriptor("sonarr", "sonarr", false),
            descriptor("radarr", "radarr", false),
        ]);

        assert_eq!(directory.len(), 2);
        let ids: Vec<String> = directory.all().iter().map(|c| c.descriptor().id.clone()).collect();
        assert_eq!(ids, vec!["radarr", "sonarr"]);
        assert!(!directory.connector("radarr").unwrap().descriptor().enabled);
    }

    #[test]
    fn test_enabled_and_by_type() {
        let directory = ConfiguredConnectorDirectory::from_descriptors([
            descriptor("radarr-4k", "radarr", true),
            descriptor("radarr-old", "radarr", false),
            descriptor("sonarr", "sonarr", true),
        ]);

        assert_eq!(directory.enabled().len(), 2);
        assert_eq!(directory.connectors_by_type("Radarr").len(), 1);
    }

    #[tokio::test]
    async fn test_configured_connector_search_is_empty() {
        let connector = ConfiguredConnector::new(descriptor("radarr", "radarr", true));
        assert!(connector.search("dune", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_with_connector_replaces_descriptor_only_entry() {
        let directory = ConfiguredConnectorDirectory::from_descriptors([descriptor("radarr", "radarr", true)])
            .with_connector(StaticConnector::new(
                "radarr",
                "radarr",
                vec![SearchResult::new("Dune", "movie", "Radarr")],
            ));

        assert_eq!(directory.len(), 1);
        let hits = directory.connector("radarr").unwrap().search("du", 5).await.unwrap();
        assert_eq!(hits.len(), 1);
    }
}
