//! End-to-end tests for the MiniAgent loop.
//!
//! These wire the real crates together (memory on disk, mock search, a
//! scripted channel) and only fake the LLM server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use miniagent_agent::{AgentLoop, DecisionSettings, IterationOutcome, prompts};
use miniagent_bench::{BenchmarkRunner, find_scenario};
use miniagent_channels::ScriptedChannel;
use miniagent_config::AppConfig;
use miniagent_core::error::{DecisionError, ProviderError};
use miniagent_core::event::EventBus;
use miniagent_core::message::{Message, system_prompt};
use miniagent_core::provider::{Provider, ProviderRequest, ProviderResponse};
use miniagent_core::Error;
use miniagent_memory::{MemoryStore, StoreLimits, Summarizer};
use miniagent_providers::Gateway;
use miniagent_tools::{MockSearchBackend, WebSearch};

// ── Fake LLM server ──────────────────────────────────────────────────────

/// Answers think calls with a fixed thought and decide calls with a reply
/// chosen per model.
struct FakeLlm {
    thought: String,
    decide: Box<dyn Fn(&str, usize) -> String + Send + Sync>,
    decide_calls: Mutex<usize>,
}

impl FakeLlm {
    fn new(thought: &str, decide: impl Fn(&str, usize) -> String + Send + Sync + 'static) -> Self {
        Self {
            thought: thought.into(),
            decide: Box::new(decide),
            decide_calls: Mutex::new(0),
        }
    }

    /// Every decide call returns `reply`.
    fn always(thought: &str, reply: &str) -> Self {
        let reply = reply.to_string();
        Self::new(thought, move |_, _| reply.clone())
    }

    fn decide_calls(&self) -> usize {
        *self.decide_calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl Provider for FakeLlm {
    fn name(&self) -> &str {
        "fake"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let text = match system_prompt(&request.messages) {
            Some(p) if p == prompts::THINK_PROMPT => self.thought.clone(),
            Some(p) if p == prompts::decide_prompt() => {
                let mut calls = self.decide_calls.lock().unwrap();
                *calls += 1;
                (self.decide)(&request.model, *calls)
            }
            _ => "summary".to_string(),
        };
        Ok(ProviderResponse {
            message: Message::assistant(text),
            usage: None,
            model: request.model,
        })
    }

    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        Ok(vec!["fake-model".into()])
    }
}

fn web_search(query: &str) -> String {
    serde_json::json!({"command": {"name": "web_search", "args": {"query": query}}}).to_string()
}

fn send_message(text: &str) -> String {
    serde_json::json!({"command": {"name": "send_message", "args": {"message": text}}}).to_string()
}

fn ask_user(question: &str) -> String {
    serde_json::json!({"command": {"name": "ask_user", "args": {"message": question}}}).to_string()
}

struct Harness {
    agent: AgentLoop,
    llm: Arc<FakeLlm>,
    channel: Arc<ScriptedChannel>,
    _dir: tempfile::TempDir,
}

fn harness(llm: FakeLlm, limits: StoreLimits, replies: &[&str]) -> Harness {
    let llm = Arc::new(llm);
    let gateway = Gateway::new(llm.clone(), "fake-model");
    let dir = tempfile::tempdir().unwrap();
    let memory = Arc::new(MemoryStore::new(
        dir.path().join("memory"),
        limits,
        Summarizer::new(gateway.clone(), 100),
    ));
    let channel = Arc::new(ScriptedChannel::new(replies.iter().copied()));
    let search = Arc::new(WebSearch::new(Arc::new(MockSearchBackend)).with_backoff(Duration::ZERO));

    let agent = AgentLoop::new(gateway, memory, channel.clone(), search, Arc::new(EventBus::default()))
        .with_decision_settings(DecisionSettings {
            retry_backoff: Duration::ZERO,
            ..DecisionSettings::default()
        });

    Harness {
        agent,
        llm,
        channel,
        _dir: dir,
    }
}

// ── Full iterations ──────────────────────────────────────────────────────

#[tokio::test]
async fn search_iteration_records_one_digest_entry() {
    let h = harness(
        FakeLlm::always("I should search for X", &web_search("X")),
        StoreLimits::default(),
        &[],
    );
    h.agent.reset().await.unwrap();

    let outcome = h.agent.step().await.unwrap();
    assert_eq!(
        outcome,
        IterationOutcome::Dispatched {
            command: "web_search".into(),
            success: true
        }
    );

    let history = h.agent.memory().load_responses().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].question, "called web_search: X");
    assert!(history[0].response.starts_with("## Search results"));

    let thoughts = h.agent.memory().load_thoughts().await.unwrap();
    assert_eq!(thoughts.len(), 1);
    assert!(h.channel.prompts().is_empty());
}

#[tokio::test]
async fn conversation_reaches_user_and_is_remembered() {
    let llm = FakeLlm::new("Time to check in.", |_, call| {
        if call == 1 {
            ask_user("How was your day?")
        } else {
            send_message("Glad to hear it!")
        }
    });
    let h = harness(llm, StoreLimits::default(), &["Pretty good"]);
    h.agent.reset().await.unwrap();

    let outcomes = h.agent.run_iterations(2, Duration::ZERO).await.unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(h.channel.prompts(), vec!["How was your day?".to_string()]);
    assert_eq!(h.channel.notifications(), vec!["Glad to hear it!".to_string()]);

    let history = h.agent.memory().load_responses().await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].question, "How was your day?");
    assert_eq!(history[0].response, "Pretty good");
}

#[tokio::test]
async fn histories_stay_bounded_over_many_iterations() {
    let limits = StoreLimits {
        thought_cap: 3,
        response_cap: 4,
        ..StoreLimits::default()
    };
    let llm = FakeLlm::new("Keep talking.", |_, call| send_message(&format!("note {call}")));
    let h = harness(llm, limits, &[]);
    h.agent.reset().await.unwrap();

    h.agent.run_iterations(10, Duration::ZERO).await.unwrap();

    let thoughts = h.agent.memory().load_thoughts().await.unwrap();
    let responses = h.agent.memory().load_responses().await.unwrap();
    assert_eq!(thoughts.len(), 3);
    assert_eq!(responses.len(), 4);
    let last: Vec<&str> = responses.iter().map(|r| r.response.as_str()).collect();
    assert_eq!(last, vec!["note 7", "note 8", "note 9", "note 10"]);
}

#[tokio::test]
async fn wrapped_json_is_repaired_end_to_end() {
    let reply = format!("here is my answer: {} thanks", send_message("hi"));
    let h = harness(FakeLlm::always("Say hi.", &reply), StoreLimits::default(), &[]);

    let outcome = h.agent.step().await.unwrap();
    assert!(matches!(outcome, IterationOutcome::Dispatched { success: true, .. }));
    assert_eq!(h.channel.notifications(), vec!["hi".to_string()]);
}

#[tokio::test]
async fn garbage_decisions_give_up_after_the_budget() {
    let h = harness(
        FakeLlm::always("Hmm.", "I am not sure what to do."),
        StoreLimits::default(),
        &[],
    );
    let agent = h.agent.with_decision_settings(DecisionSettings {
        max_failures: 5,
        retry_backoff: Duration::ZERO,
        ..DecisionSettings::default()
    });

    let err = agent.step().await.unwrap_err();
    assert!(matches!(err, Error::Decision(DecisionError::GaveUp { failures: 5 })));
    assert!(err.is_fatal());
    assert_eq!(h.llm.decide_calls(), 5);
    assert!(agent.memory().load_responses().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_command_leaves_history_untouched() {
    let reply = r#"{"command":{"name":"launch_rocket","args":{}}}"#;
    let h = harness(FakeLlm::always("Why not?", reply), StoreLimits::default(), &[]);

    let outcome = h.agent.step().await.unwrap();
    assert_eq!(
        outcome,
        IterationOutcome::Unknown {
            name: "launch_rocket".into()
        }
    );
    assert!(h.agent.memory().load_responses().await.unwrap().is_empty());
}

// ── Config-driven wiring ─────────────────────────────────────────────────

#[tokio::test]
async fn config_file_drives_limits_and_debug_dumps() {
    let dir = tempfile::tempdir().unwrap();
    let memory_dir = dir.path().join("memory");
    let debug_dir = dir.path().join("debug");
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        format!(
            r#"
[memory]
dir = {memory:?}
thought_cap = 2
response_cap = 2

[decision]
max_failures = 3
retry_backoff_ms = 0

[search]
engine = "mock"

[agent]
channel = "console"
debug_dir = {debug:?}
"#,
            memory = memory_dir.display().to_string(),
            debug = debug_dir.display().to_string(),
        ),
    )
    .unwrap();

    let config = AppConfig::load_from(&path).unwrap();
    assert_eq!(config.memory.thought_cap, 2);

    let llm = Arc::new(FakeLlm::new("Plan.", |_, call| {
        if call == 1 {
            "not json".to_string()
        } else {
            send_message("ok")
        }
    }));
    let gateway = Gateway::new(llm.clone(), "fake-model");
    let memory = Arc::new(MemoryStore::new(
        config.memory.dir.clone(),
        StoreLimits::from_config(&config.memory),
        Summarizer::new(gateway.clone(), config.llm.summary_max_tokens),
    ));
    let search = Arc::new(miniagent_tools::build_from_config(&config.search).unwrap());
    let channel = Arc::new(ScriptedChannel::new(Vec::<String>::new()));

    let agent = AgentLoop::new(gateway, memory, channel, search, Arc::new(EventBus::default()))
        .with_config(&config);
    assert_eq!(agent.decider().settings().max_failures, 3);

    agent.reset().await.unwrap();
    agent.run_iterations(3, Duration::ZERO).await.unwrap();

    assert_eq!(agent.memory().load_responses().await.unwrap().len(), 2);
    assert_eq!(agent.memory().load_thoughts().await.unwrap().len(), 2);
    assert!(memory_dir.exists());
    let dumps = std::fs::read_dir(&debug_dir).unwrap().count();
    assert!(dumps >= 1);
}

// ── Benchmark ────────────────────────────────────────────────────────────

#[tokio::test]
async fn benchmark_run_scores_expected_actions() {
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(FakeLlm::new("Research time.", |model, _| match model {
        "searcher" => web_search("rust async"),
        _ => send_message("hello"),
    }));
    let gateway = Gateway::new(llm, "fake-model");
    let search = Arc::new(WebSearch::new(Arc::new(MockSearchBackend)).with_backoff(Duration::ZERO));

    let runner = BenchmarkRunner::from_config(gateway, search, &AppConfig::default())
        .with_dirs(dir.path().join("runs"), dir.path().join("results"))
        .with_iteration_delay(Duration::ZERO)
        .with_decision_settings(DecisionSettings {
            retry_backoff: Duration::ZERO,
            ..DecisionSettings::default()
        });
    let scenario = find_scenario("web_research").unwrap();

    let models = runner.resolve_models(&[]).await.unwrap();
    assert_eq!(models, vec!["fake-model".to_string()]);

    let results = runner
        .run_all(&["searcher".to_string(), "chatter".to_string()], &[scenario.clone()])
        .await;
    assert_eq!(results.len(), 2);

    let searcher = results.iter().find(|r| r.model == "searcher").unwrap();
    assert!(searcher.error.is_none());
    assert_eq!(searcher.metrics.iterations_completed, scenario.iterations);
    assert_eq!(searcher.metrics.action_distribution["web_search"], 1.0);
    assert_eq!(searcher.metrics.error_rate, 0.0);

    let saved = std::fs::read_dir(runner.results_dir()).unwrap().count();
    assert_eq!(saved, 2);
}
