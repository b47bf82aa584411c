//! Media search tool: search_media

use std::sync::Arc;

use async_trait::async_trait;
use dashagent_application::ports::search::SearchQuery;
use dashagent_application::use_cases::tool_context::ToolContext;
use dashagent_domain::media::SearchResult;
use dashagent_domain::tool::{ParamType, ToolDefinition, ToolError, ToolParameter, ToolResult, TypedTool};
use serde::{Deserialize, Serialize};

/// Tool name constant
pub const SEARCH_MEDIA: &str = "search_media";

/// Upper bound for `limit`
const MAX_LIMIT: usize = 50;

/// Entries rendered in the summary text
const SUMMARY_ENTRIES: usize = 10;

/// Get the tool definition for search_media
pub fn search_media_definition() -> ToolDefinition {
    ToolDefinition::new(
        SEARCH_MEDIA,
        "Search movies, shows and music across the configured media services",
    )
    .with_parameter(ToolParameter::new("query", "Title or keywords to search for", true))
    .with_parameter(
        ToolParameter::new(
            "serviceTypes",
            "Service types to search (default: every enabled service)",
            false,
        )
        .with_type(ParamType::Array),
    )
    .with_parameter(
        ToolParameter::new("limit", "Maximum number of results (default: 10, max: 50)", false)
            .with_type(ParamType::Integer),
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMediaParams {
    pub query: String,
    #[serde(default)]
    pub service_types: Vec<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchMediaOutput {
    pub results: Vec<SearchResult>,
    pub count: usize,
    pub summary: String,
}

pub struct SearchMediaTool {
    ctx: Arc<ToolContext>,
    definition: ToolDefinition,
}

impl SearchMediaTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self {
            ctx,
            definition: search_media_definition(),
        }
    }
}

#[async_trait]
impl TypedTool for SearchMediaTool {
    type Params = SearchMediaParams;
    type Output = SearchMediaOutput;

    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn run(&self, params: SearchMediaParams) -> Result<ToolResult<SearchMediaOutput>, ToolError> {
        let query = params.query.trim();
        if query.is_empty() {
            return Err(ToolError::invalid_parameters("The search query must not be empty."));
        }
        let limit = match params.limit {
            Some(0) => return Err(ToolError::invalid_parameters("limit must be at least 1.")),
            Some(n) => n.min(MAX_LIMIT),
            None => SearchQuery::DEFAULT_LIMIT,
        };

        let search = SearchQuery::new(query)
            .with_service_types(params.service_types)
            .with_limit(limit);
        let results = self.ctx.search_facility().search(&search).await?;
        tracing::debug!(query, count = results.len(), "search_media finished");

        Ok(ToolResult::success(SearchMediaOutput {
            count: results.len(),
            summary: self.ctx.format_results(&results, SUMMARY_ENTRIES),
            results,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::builtin::test_context;
    use dashagent_domain::tool::ErrorCategory;

    fn params(query: &str, service_types: &[&str], limit: Option<usize>) -> SearchMediaParams {
        SearchMediaParams {
            query: query.to_string(),
            service_types: service_types.iter().map(|s| s.to_string()).collect(),
            limit,
        }
    }

    #[tokio::test]
    async fn test_search_returns_results_and_summary() {
        let tool = SearchMediaTool::new(test_context());
        let result = tool.run(params("dune", &[], None)).await.unwrap();

        let output = result.data().unwrap();
        assert_eq!(output.count, 2);
        assert_eq!(output.results[0].title, "Dune");
        assert!(output.summary.starts_with("1. Dune (2021) [movie] via Radarr"));
    }

    #[tokio::test]
    async fn test_limit_applies() {
        let tool = SearchMediaTool::new(test_context());
        let result = tool.run(params("dune", &["radarr"], Some(1))).await.unwrap();
        assert_eq!(result.data().unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_rejects_blank_query_and_zero_limit() {
        let tool = SearchMediaTool::new(test_context());

        let err = tool.run(params("   ", &[], None)).await.unwrap_err();
        assert_eq!(err.category, ErrorCategory::InvalidParameters);

        let err = tool.run(params("dune", &[], Some(0))).await.unwrap_err();
        assert_eq!(err.category, ErrorCategory::InvalidParameters);
    }

    #[tokio::test]
    async fn test_unknown_service_type_is_not_configured() {
        let tool = SearchMediaTool::new(test_context());
        let err = tool.run(params("dune", &["lidarr"], None)).await.unwrap_err();
        assert_eq!(err.category, ErrorCategory::ServiceNotConfigured);
    }
}
