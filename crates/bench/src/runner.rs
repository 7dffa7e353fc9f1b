//! Benchmark runner — replays the agent loop for every model × scenario pair.
//!
//! Runs execute on a bounded pool. Each run owns everything it mutates: a
//! storage namespace `runs_dir/<model>/<scenario>/<run-id>`, a memory store,
//! a decision engine with its own failure counter, an event bus and a
//! scripted user. Only the search backend is shared.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use miniagent_agent::{AgentLoop, DebugRecorder, DecisionSettings};
use miniagent_channels::ScriptedChannel;
use miniagent_config::AppConfig;
use miniagent_core::error::ProviderError;
use miniagent_core::event::{AgentEvent, EventBus};
use miniagent_memory::{MemoryStore, StoreLimits, Summarizer};
use miniagent_providers::Gateway;
use miniagent_tools::WebSearch;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, warn};
use crate::metrics::{MetricsCollector, RunMetrics};
use crate::scenario::Scenario;

/// Outcome of one model × scenario run, as written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub model: String,
    pub scenario: String,
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
    pub duration_secs: f64,
    pub metrics: RunMetrics,
    /// The fatal error that ended the run early, if any
    pub error: Option<String>,
    pub storage_dir: PathBuf,
    pub scenario_config: Scenario,
}

pub struct BenchmarkRunner {
    gateway: Gateway,
    summary_max_tokens: u32,
    limits: StoreLimits,
    decision: DecisionSettings,
    search: Arc<WebSearch>,
    runs_dir: PathBuf,
    results_dir: PathBuf,
    concurrency: usize,
    iteration_delay: Duration,
}

impl BenchmarkRunner {
    pub fn from_config(gateway: Gateway, search: Arc<WebSearch>, config: &AppConfig) -> Self {
        Self {
            gateway,
            summary_max_tokens: config.llm.summary_max_tokens,
            limits: StoreLimits::from_config(&config.memory),
            decision: DecisionSettings::from(&config.decision),
            search,
            runs_dir: config.benchmark.runs_dir.clone(),
            results_dir: config.benchmark.results_dir.clone(),
            concurrency: config.benchmark.concurrency.max(1),
            iteration_delay: Duration::from_millis(config.benchmark.iteration_delay_ms),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_iteration_delay(mut self, delay: Duration) -> Self {
        self.iteration_delay = delay;
        self
    }

    pub fn with_decision_settings(mut self, settings: DecisionSettings) -> Self {
        self.decision = settings;
        self
    }

    pub fn with_dirs(mut self, runs_dir: impl Into<PathBuf>, results_dir: impl Into<PathBuf>) -> Self {
        self.runs_dir = runs_dir.into();
        self.results_dir = results_dir.into();
        self
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// The models to benchmark: the requested ones, else whatever the
    /// provider lists, else the configured model.
    pub async fn resolve_models(&self, requested: &[String]) -> Result<Vec<String>, ProviderError> {
        if !requested.is_empty() {
            return Ok(requested.to_vec());
        }
        let listed = self.gateway.provider().list_models().await?;
        if listed.is_empty() {
            return Ok(vec![self.gateway.model().to_string()]);
        }
        Ok(listed)
    }

    /// Run every pair on the worker pool and save each result as it lands.
    pub async fn run_all(&self, models: &[String], scenarios: &[Scenario]) -> Vec<RunResult> {
        let pairs: Vec<(&String, &Scenario)> = models
            .iter()
            .flat_map(|m| scenarios.iter().map(move |s| (m, s)))
            .collect();
        info!(
            runs = pairs.len(),
            concurrency = self.concurrency,
            "Starting benchmark"
        );

        futures::stream::iter(pairs)
            .map(|(model, scenario)| async move {
                let result = self.run_scenario(model, scenario).await;
                if let Err(e) = self.save_result(&result).await {
                    warn!(model = %model, scenario = %scenario.name, error = %e, "Could not save result");
                }
                result
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }

    /// Run one scenario against one model in a fresh namespace.
    pub async fn run_scenario(&self, model: &str, scenario: &Scenario) -> RunResult {
        let run_id = uuid::Uuid::new_v4().simple().to_string()[..12].to_string();
        let storage_dir = self
            .runs_dir
            .join(sanitize(model))
            .join(&scenario.name)
            .join(&run_id);
        info!(model, scenario = %scenario.name, run_id = %run_id, "Run started");

        let gateway = self.gateway.with_model(model);
        let memory = Arc::new(MemoryStore::new(
            storage_dir.join("memory"),
            self.limits,
            Summarizer::new(gateway.clone(), self.summary_max_tokens),
        ));
        let events = Arc::new(EventBus::new(1024));
        let collector = tokio::spawn(collect(events.subscribe()));
        let channel = Arc::new(ScriptedChannel::new(scenario.user_replies.clone()));

        let agent = AgentLoop::new(gateway, memory, channel, self.search.clone(), events)
            .with_decision_settings(self.decision.clone())
            .with_debug_recorder(DebugRecorder::new(storage_dir.join("debug")));

        let started = Instant::now();
        let outcome = async {
            agent.reset().await?;
            agent
                .run_iterations(scenario.iterations, self.iteration_delay)
                .await
        }
        .await;
        let duration_secs = started.elapsed().as_secs_f64();

        // Dropping the loop closes the bus and ends the collector.
        drop(agent);
        let metrics = match collector.await {
            Ok(collector) => collector.finish(&scenario.expected_actions),
            Err(e) => {
                warn!(error = %e, "Metrics collector failed");
                RunMetrics::default()
            }
        };

        let error = outcome.err().map(|e| {
            warn!(model, scenario = %scenario.name, error = %e, "Run ended early");
            e.to_string()
        });

        info!(
            model,
            scenario = %scenario.name,
            iterations = metrics.iterations_completed,
            error_rate = metrics.error_rate,
            "Run finished"
        );

        RunResult {
            model: model.to_string(),
            scenario: scenario.name.clone(),
            run_id,
            timestamp: Utc::now(),
            duration_secs,
            metrics,
            error,
            storage_dir,
            scenario_config: scenario.clone(),
        }
    }

    /// Write `result_<model>_<scenario>_<timestamp>_<run-id>.json` into the results dir.
    pub async fn save_result(&self, result: &RunResult) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.results_dir).await?;
        let path = self.results_dir.join(format!(
            "result_{}_{}_{}_{}.json",
            sanitize(&result.model),
            result.scenario,
            result.timestamp.format("%Y%m%d_%H%M%S"),
            result.run_id
        ));
        let body = serde_json::to_vec_pretty(result).map_err(std::io::Error::other)?;
        tokio::fs::write(&path, body).await?;
        info!(path = %path.display(), "Result saved");
        Ok(path)
    }
}

async fn collect(mut rx: broadcast::Receiver<Arc<AgentEvent>>) -> MetricsCollector {
    let mut collector = MetricsCollector::default();
    loop {
        match rx.recv().await {
            Ok(event) => collector.observe(&event),
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!(missed, "Metrics collector lagged behind");
            }
            Err(broadcast::error::RecvError::Closed) => return collector,
        }
    }
}

/// Make a model id safe to use as a path segment.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
