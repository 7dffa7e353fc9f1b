//! Web search tool — retries a backend and renders results as a markdown digest.
//!
//! The digest is what lands in the response history, so its layout is stable:
//!
//! ```text
//! ## Search results
//! ### "<title>"
//! **URL:** <url>  
//! **Excerpt:** "<excerpt>"
//! ```

use std::sync::Arc;
use std::time::Duration;
use miniagent_config::SearchConfig;
use miniagent_core::error::ToolError;
use miniagent_core::search::{SearchBackend, SearchHit};
use tracing::{debug, warn};

const DIGEST_HEADER: &str = "## Search results";

pub struct WebSearch {
    backend: Arc<dyn SearchBackend>,
    max_results: usize,
    max_attempts: u32,
    backoff: Duration,
}

impl WebSearch {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            max_results: 3,
            max_attempts: 3,
            backoff: Duration::from_secs(1),
        }
    }

    pub fn from_config(backend: Arc<dyn SearchBackend>, config: &SearchConfig) -> Self {
        Self {
            backend,
            max_results: config.max_results.max(1),
            max_attempts: config.max_attempts.max(1),
            backoff: Duration::from_millis(config.backoff_ms),
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Search and render a digest.
    ///
    /// Empty result lists and backend errors are retried with a fixed backoff.
    /// If every attempt came back empty the "no results" digest is returned;
    /// if the last attempt failed its error is returned.
    pub async fn run(&self, query: &str) -> Result<String, ToolError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(no_results(query));
        }

        let mut last_error = None;
        for attempt in 1..=self.max_attempts {
            match self.backend.search(query, self.max_results).await {
                Ok(mut hits) if !hits.is_empty() => {
                    debug!(query, attempt, hits = hits.len(), "Search succeeded");
                    hits.truncate(self.max_results);
                    return Ok(render_digest(&hits));
                }
                Ok(_) => {
                    debug!(query, attempt, "Search returned no results");
                    last_error = None;
                }
                Err(e) => {
                    warn!(query, attempt, error = %e, "Search attempt failed");
                    last_error = Some(e);
                }
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(self.backoff).await;
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => Ok(no_results(query)),
        }
    }
}

pub fn render_digest(hits: &[SearchHit]) -> String {
    let entries: Vec<String> = hits
        .iter()
        .map(|hit| {
            let excerpt = match &hit.excerpt {
                Some(text) => format!("\"{text}\""),
                None => "N/A".to_string(),
            };
            format!(
                "### \"{}\"\n**URL:** {}  \n**Excerpt:** {}",
                hit.title, hit.url, excerpt
            )
        })
        .collect();

    format!("{DIGEST_HEADER}\n{}", entries.join("\n\n"))
}

pub fn no_results(query: &str) -> String {
    format!("{DIGEST_HEADER}\nNo results found for \"{query}\".")
}
