//! Offline search backend with deterministic, topic-keyed results.
//!
//! Used by the benchmark and tests so runs never depend on the network.

use async_trait::async_trait;
use miniagent_core::error::ToolError;
use miniagent_core::search::{SearchBackend, SearchHit};

#[derive(Debug, Default)]
pub struct MockSearchBackend;

#[async_trait]
impl SearchBackend for MockSearchBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, ToolError> {
        Ok(generate_mock_results(query, max_results))
    }
}

fn hit(title: &str, url: &str, excerpt: &str) -> SearchHit {
    SearchHit {
        title: title.into(),
        url: url.into(),
        excerpt: Some(excerpt.into()),
    }
}

fn generate_mock_results(query: &str, count: usize) -> Vec<SearchHit> {
    let q = query.to_lowercase();

    // Context-aware results for common topics.
    let templates: Vec<(&str, Vec<SearchHit>)> = vec![
        ("rust", vec![
            hit(
                "The Rust Programming Language",
                "https://doc.rust-lang.org/book/",
                "Rust is a systems programming language focused on safety, speed, and concurrency.",
            ),
            hit(
                "Rust by Example",
                "https://doc.rust-lang.org/rust-by-example/",
                "A collection of runnable examples that illustrate Rust concepts and standard library usage.",
            ),
            hit(
                "crates.io: Rust Package Registry",
                "https://crates.io/",
                "The Rust community's crate registry for sharing and discovering Rust libraries.",
            ),
        ]),
        ("weather", vec![
            hit(
                "Weather Forecast - National Weather Service",
                "https://weather.gov/",
                "Current conditions and forecasts for locations across the United States.",
            ),
            hit(
                "OpenWeatherMap",
                "https://openweathermap.org/",
                "Free weather API providing current weather data and forecasts for any location.",
            ),
        ]),
        ("news", vec![
            hit(
                "Top Stories - Reuters",
                "https://www.reuters.com/",
                "Breaking international news and top stories from around the world.",
            ),
            hit(
                "AP News",
                "https://apnews.com/",
                "Independent global news coverage from the Associated Press.",
            ),
        ]),
    ];

    for (keyword, results) in templates {
        if q.contains(keyword) {
            return results.into_iter().take(count).collect();
        }
    }

    // Generic fallback.
    (0..count)
        .map(|i| SearchHit {
            title: format!("Result {} for: {}", i + 1, query),
            url: format!("https://example.com/search?q={}&p={}", query.replace(' ', "+"), i + 1),
            excerpt: Some(format!("An offline search result about '{query}'.")),
        })
        .collect()
}
