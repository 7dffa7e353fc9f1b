//! Search trait — the abstraction over web search engines.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ToolError;

/// A single search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

/// The core SearchBackend trait.
///
/// Implementations: DuckDuckGo (HTML), SearXNG (JSON API), mock (offline).
/// An empty result list is not an error; retry policy lives above this trait.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// The engine name (e.g., "duckduckgo").
    fn name(&self) -> &str;

    /// Run a query and return at most `max_results` hits.
    async fn search(&self, query: &str, max_results: usize) -> std::result::Result<Vec<SearchHit>, ToolError>;
}
