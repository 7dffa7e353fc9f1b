//! SearXNG backend using the instance's JSON API.

use async_trait::async_trait;
use miniagent_core::error::ToolError;
use miniagent_core::search::{SearchBackend, SearchHit};
use serde::Deserialize;
use tracing::debug;

pub struct SearxngBackend {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct SearxngResponse {
    #[serde(default)]
    results: Vec<SearxngResult>,
}

#[derive(Deserialize)]
struct SearxngResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: Option<String>,
}

impl SearxngBackend {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl SearchBackend for SearxngBackend {
    fn name(&self) -> &str {
        "searxng"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, ToolError> {
        let failed = |reason: String| ToolError::ExecutionFailed {
            tool_name: "web_search".into(),
            reason,
        };

        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", query), ("format", "json"), ("categories", "general")])
            .send()
            .await
            .map_err(|e| failed(format!("SearXNG request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(failed(format!("SearXNG returned {}", response.status())));
        }

        let body: SearxngResponse = response
            .json()
            .await
            .map_err(|e| failed(format!("SearXNG response unreadable: {e}")))?;

        let hits: Vec<SearchHit> = body
            .results
            .into_iter()
            .filter(|r| !r.url.is_empty())
            .take(max_results)
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
                excerpt: r.content.filter(|c| !c.trim().is_empty()),
            })
            .collect();

        debug!(query, hits = hits.len(), "SearXNG search done");
        Ok(hits)
    }
}
