//! Web search for MiniAgent.
//!
//! Backends implement [`SearchBackend`]; [`WebSearch`] adds retries and
//! renders results into the digest the agent stores in its history.

pub mod duckduckgo;
pub mod mock;
pub mod searxng;
pub mod web_search;

use std::sync::Arc;
use miniagent_config::SearchConfig;
use miniagent_core::error::ToolError;
use miniagent_core::search::SearchBackend;

pub use duckduckgo::DuckDuckGoBackend;
pub use mock::MockSearchBackend;
pub use searxng::SearxngBackend;
pub use web_search::{WebSearch, no_results, render_digest};

/// Build the backend named by `search.engine`.
pub fn build_backend(config: &SearchConfig) -> Result<Arc<dyn SearchBackend>, ToolError> {
    match config.engine.as_str() {
        "duckduckgo" => Ok(Arc::new(DuckDuckGoBackend::new())),
        "searxng" => {
            let url = config.searxng_url.as_deref().ok_or_else(|| {
                ToolError::InvalidArguments("search.searxng_url is not set".into())
            })?;
            Ok(Arc::new(SearxngBackend::new(url)))
        }
        "mock" => Ok(Arc::new(MockSearchBackend)),
        other => Err(ToolError::NotFound(format!("search engine '{other}'"))),
    }
}

/// Build the configured backend wrapped in a [`WebSearch`].
pub fn build_from_config(config: &SearchConfig) -> Result<WebSearch, ToolError> {
    let backend = build_backend(config)?;
    Ok(WebSearch::from_config(backend, config))
}
