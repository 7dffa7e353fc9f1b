//! DuckDuckGo backend scraping the HTML endpoint.
//!
//! No API key needed. Results are cut out of the markup by class name, so a
//! layout change on DuckDuckGo's side shows up as an empty result list.

use async_trait::async_trait;
use miniagent_core::error::ToolError;
use miniagent_core::search::{SearchBackend, SearchHit};
use tracing::debug;

const DDG_HTML_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

pub struct DuckDuckGoBackend {
    endpoint: String,
    client: reqwest::Client,
}

impl DuckDuckGoBackend {
    pub fn new() -> Self {
        Self::with_endpoint(DDG_HTML_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            endpoint: endpoint.into(),
            client,
        }
    }
}

impl Default for DuckDuckGoBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoBackend {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, ToolError> {
        let failed = |reason: String| ToolError::ExecutionFailed {
            tool_name: "web_search".into(),
            reason,
        };

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| failed(format!("DuckDuckGo request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(failed(format!("DuckDuckGo returned {}", response.status())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| failed(format!("DuckDuckGo body unreadable: {e}")))?;

        let hits = parse_results(&body, max_results);
        debug!(query, hits = hits.len(), "DuckDuckGo search done");
        Ok(hits)
    }
}

/// Cut result blocks out of the HTML page.
pub(crate) fn parse_results(html: &str, max_results: usize) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    for block in html.split("class=\"result__a\"").skip(1) {
        if hits.len() >= max_results {
            break;
        }

        let href = block
            .split("href=\"")
            .nth(1)
            .and_then(|s| s.split('"').next())
            .unwrap_or("");
        let url = resolve_redirect(&decode_entities(href));
        if url.is_empty() {
            continue;
        }

        let title = block
            .split_once('>')
            .and_then(|(_, rest)| rest.split("</a>").next())
            .map(|raw| decode_entities(&strip_tags(raw)))
            .unwrap_or_default();

        let excerpt = block
            .split("class=\"result__snippet\"")
            .nth(1)
            .and_then(|s| s.split_once('>'))
            .and_then(|(_, rest)| rest.split("</a>").next())
            .map(|raw| decode_entities(&strip_tags(raw)))
            .filter(|s| !s.is_empty());

        hits.push(SearchHit {
            title: title.trim().to_string(),
            url,
            excerpt,
        });
    }

    hits
}

/// DuckDuckGo wraps result links in `//duckduckgo.com/l/?uddg=<target>`.
fn resolve_redirect(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };

    match reqwest::Url::parse(&absolute) {
        Ok(url) => url
            .query_pairs()
            .find(|(k, _)| k == "uddg")
            .map(|(_, v)| v.into_owned())
            .unwrap_or(absolute),
        Err(_) => absolute,
    }
}

fn strip_tags(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
