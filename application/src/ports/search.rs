//! Search facility port

use async_trait::async_trait;
use dashagent_domain::media::SearchResult;
use dashagent_domain::tool::value_objects::ToolError;

/// A search across one or more media services
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    /// Empty means every enabled service
    pub service_types: Vec<String>,
    pub limit: usize,
}

impl SearchQuery {
    pub const DEFAULT_LIMIT: usize = 10;

    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            service_types: Vec::new(),
            limit: Self::DEFAULT_LIMIT,
        }
    }

    pub fn with_service_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.service_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

#[async_trait]
pub trait SearchFacility: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, ToolError>;
}
