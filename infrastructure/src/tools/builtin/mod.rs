//! Built-in tools
//!
//! Every built-in tool holds the shared [`ToolContext`]. Registration is
//! idempotent: names already present in the catalog are skipped, so a host
//! may call [`register_builtin_tools`] more than once or pre-register its
//! own replacement for any of them.

pub mod confirmation;
pub mod date;
pub mod media;
pub mod services;

use std::sync::Arc;

use dashagent_application::use_cases::tool_context::ToolContext;
use dashagent_domain::tool::{Tool, Typed};

use super::catalog::ToolCatalog;

pub use confirmation::{
    CANCEL_CONFIRMATION, CancelConfirmationTool, LIST_PENDING_CONFIRMATIONS, ListPendingConfirmationsTool,
};
pub use date::{PARSE_DATE, ParseDateTool};
pub use media::{SEARCH_MEDIA, SearchMediaTool};
pub use services::{LIST_SERVICES, ListServicesTool};

/// Every built-in tool, in registration order
pub fn builtin_tools(ctx: Arc<ToolContext>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(Typed(ListServicesTool::new(Arc::clone(&ctx)))),
        Arc::new(Typed(SearchMediaTool::new(Arc::clone(&ctx)))),
        Arc::new(Typed(ParseDateTool::new(Arc::clone(&ctx)))),
        Arc::new(Typed(CancelConfirmationTool::new(Arc::clone(&ctx)))),
        Arc::new(Typed(ListPendingConfirmationsTool::new(ctx))),
    ]
}

/// Register the built-in tools not yet in the catalog
///
/// Returns how many were registered.
pub fn register_builtin_tools(catalog: &ToolCatalog, ctx: Arc<ToolContext>) -> usize {
    let mut registered = 0;
    for tool in builtin_tools(ctx) {
        if catalog.has(tool.name()) {
            tracing::debug!(tool = %tool.name(), "Built-in tool already registered; skipping");
            continue;
        }
        match catalog.register_arc(tool) {
            Ok(()) => registered += 1,
            Err(e) => tracing::warn!(error = %e, "Skipped built-in tool"),
        }
    }
    tracing::debug!(registered, "Registered built-in tools");
    registered
}

#[cfg(test)]
pub(crate) fn test_context() -> Arc<ToolContext> {
    use crate::connectors::ConfiguredConnectorDirectory;
    use crate::connectors::testing::{StaticConnector, descriptor};
    use dashagent_application::ports::connector_directory::ConnectorDirectory;
    use dashagent_application::use_cases::confirmation_gate::ConfirmationGate;
    use dashagent_application::use_cases::fan_out_search::FanOutSearch;
    use dashagent_domain::media::SearchResult;

    let directory: Arc<dyn ConnectorDirectory> = Arc::new(
        ConfiguredConnectorDirectory::from_descriptors([
            descriptor("sonarr-main", "sonarr", true),
            descriptor("lidarr-old", "lidarr", false),
        ])
        .with_connector(StaticConnector::new(
            "radarr-main",
            "radarr",
            vec![
                SearchResult::new("Dune", "movie", "Radarr")
                    .with_year(2021)
                    .with_rating(8.0),
                SearchResult::new("Dune: Part Two", "movie", "Radarr")
                    .with_year(2024)
                    .with_rating(7.5),
                SearchResult::new("Arrival", "movie", "Radarr").with_year(2016),
            ],
        )),
    );
    let search = Arc::new(FanOutSearch::new(Arc::clone(&directory)));
    Arc::new(ToolContext::new(directory, search, Arc::new(ConfirmationGate::default())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashagent_domain::tool::{FnTool, ToolDefinition, ToolResult};
    use serde_json::json;

    #[test]
    fn test_register_builtin_tools_is_idempotent() {
        let catalog = ToolCatalog::new();

        assert_eq!(register_builtin_tools(&catalog, test_context()), 5);
        assert_eq!(register_builtin_tools(&catalog, test_context()), 0);
        assert_eq!(
            catalog.names(),
            vec![
                CANCEL_CONFIRMATION,
                LIST_PENDING_CONFIRMATIONS,
                LIST_SERVICES,
                PARSE_DATE,
                SEARCH_MEDIA,
            ]
        );
    }

    #[tokio::test]
    async fn test_host_replacement_is_kept() {
        let catalog = ToolCatalog::new();
        catalog
            .register(FnTool::new(ToolDefinition::new(PARSE_DATE, "host version"), |_| async {
                Ok(ToolResult::success(json!({"host": true})))
            }))
            .unwrap();

        assert_eq!(register_builtin_tools(&catalog, test_context()), 4);
        let result = catalog.external(PARSE_DATE).unwrap().invoke(json!({})).await;
        assert_eq!(result.data().unwrap()["host"], true);
    }

    #[tokio::test]
    async fn test_search_through_external_adapter() {
        let catalog = ToolCatalog::new();
        register_builtin_tools(&catalog, test_context());

        let result = catalog
            .external(SEARCH_MEDIA)
            .unwrap()
            .invoke(json!({"query": "dune", "limit": 1}))
            .await;

        assert!(result.success);
        let data = result.data().unwrap();
        assert_eq!(data["count"], 1);
        assert_eq!(data["results"][0]["title"], "Dune");
        assert_eq!(data["results"][0]["mediaType"], "movie");
    }
}
