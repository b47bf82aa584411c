//! Search across every matching connector at once.
//!
//! One connector failing never fails the search: its error is logged and
//! its results are simply missing from the merged list.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use dashagent_domain::media::SearchResult;
use dashagent_domain::tool::value_objects::ToolError;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::ports::connector_directory::{Connector, ConnectorDirectory};
use crate::ports::search::{SearchFacility, SearchQuery};

pub struct FanOutSearch {
    directory: Arc<dyn ConnectorDirectory>,
}

impl FanOutSearch {
    pub fn new(directory: Arc<dyn ConnectorDirectory>) -> Self {
        Self { directory }
    }

    fn targets(&self, query: &SearchQuery) -> Vec<Arc<dyn Connector>> {
        if query.service_types.is_empty() {
            return self.directory.enabled();
        }
        let mut targets: Vec<Arc<dyn Connector>> = Vec::new();
        for service_type in &query.service_types {
            for connector in self.directory.connectors_by_type(service_type) {
                if !targets.iter().any(|t| t.descriptor().id == connector.descriptor().id) {
                    targets.push(connector);
                }
            }
        }
        targets
    }
}

/// Highest rating first (unrated last), then title
fn by_rating_then_title(a: &SearchResult, b: &SearchResult) -> Ordering {
    match (a.rating, b.rating) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.title.cmp(&b.title))
}

#[async_trait]
impl SearchFacility for FanOutSearch {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, ToolError> {
        let targets = self.targets(query);
        if targets.is_empty() {
            let wanted = if query.service_types.is_empty() {
                "media".to_string()
            } else {
                query.service_types.join("/")
            };
            return Err(ToolError::service_not_configured(wanted));
        }

        let searches = targets.iter().map(|connector| async move {
            (connector, connector.search(&query.query, query.limit).await)
        });

        let mut merged = Vec::new();
        for (connector, outcome) in join_all(searches).await {
            let descriptor = connector.descriptor();
            match outcome {
                Ok(results) => {
                    debug!(connector = %descriptor.id, count = results.len(), "Connector search finished");
                    merged.extend(results);
                }
                Err(e) => {
                    warn!(
                        connector = %descriptor.id,
                        service_type = %descriptor.service_type,
                        error = %e,
                        "Connector search failed; skipping"
                    );
                }
            }
        }

        merged.sort_by(by_rating_then_title);
        merged.truncate(query.limit);
        Ok(merged)
    }
}
