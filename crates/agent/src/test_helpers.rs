//! Shared test fixtures: a provider that answers by call type, and a
//! store in a temp directory.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use miniagent_core::error::ProviderError;
use miniagent_core::event::EventBus;
use miniagent_core::message::{Message, system_prompt};
use miniagent_core::provider::{Provider, ProviderRequest, ProviderResponse};
use miniagent_memory::{MemoryStore, StoreLimits, Summarizer};
use miniagent_providers::Gateway;
use miniagent_tools::{MockSearchBackend, WebSearch};
use crate::prompts;

pub(crate) const SEND_HI: &str = r#"{"command":{"name":"send_message","args":{"message":"hi"}}}"#;

/// Which call a request belongs to, told apart by its system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Route {
    Think,
    Decide,
    Evaluate,
    Summarize,
}

fn route(messages: &[Message]) -> Route {
    match system_prompt(messages) {
        Some(p) if p == prompts::THINK_PROMPT => Route::Think,
        Some(p) if p == prompts::decide_prompt() => Route::Decide,
        Some(p) if p == prompts::evaluate_prompt() => Route::Evaluate,
        _ => Route::Summarize,
    }
}

pub(crate) struct ScriptedProvider {
    thought: Option<String>,
    decisions: Mutex<VecDeque<Result<String, ProviderError>>>,
    fallback_decision: String,
    evaluation: Option<Result<String, ProviderError>>,
    requests: Mutex<Vec<(Route, Vec<Message>)>>,
}

impl ScriptedProvider {
    pub(crate) fn new() -> Self {
        Self {
            thought: Some("I should say hello to the user.".into()),
            decisions: Mutex::new(VecDeque::new()),
            fallback_decision: SEND_HI.into(),
            evaluation: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn thinking(mut self, thought: &str) -> Self {
        self.thought = Some(thought.into());
        self
    }

    /// Every think call fails with a network error.
    pub(crate) fn failing_thoughts(mut self) -> Self {
        self.thought = None;
        self
    }

    /// Replies for the next decide calls, in order.
    pub(crate) fn deciding<I, S>(self, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.decisions
            .lock()
            .unwrap()
            .extend(replies.into_iter().map(|r| Ok(r.into())));
        self
    }

    pub(crate) fn decide_error(self) -> Self {
        self.decisions
            .lock()
            .unwrap()
            .push_back(Err(ProviderError::Network("connection reset".into())));
        self
    }

    /// Reply used once the scripted decide replies run out.
    pub(crate) fn always_deciding(mut self, reply: &str) -> Self {
        self.fallback_decision = reply.into();
        self
    }

    pub(crate) fn evaluating(mut self, reply: Result<&str, ProviderError>) -> Self {
        self.evaluation = Some(reply.map(String::from));
        self
    }

    pub(crate) fn calls(&self, which: Route) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| *r == which)
            .count()
    }

    pub(crate) fn last_request(&self, which: Route) -> Option<Vec<Message>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(r, _)| *r == which)
            .map(|(_, m)| m.clone())
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let which = route(&request.messages);
        self.requests
            .lock()
            .unwrap()
            .push((which, request.messages.clone()));

        let text = match which {
            Route::Think => self
                .thought
                .clone()
                .ok_or_else(|| ProviderError::Network("connection refused".into())),
            Route::Decide => self
                .decisions
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(self.fallback_decision.clone())),
            Route::Evaluate => self
                .evaluation
                .clone()
                .unwrap_or_else(|| Err(ProviderError::NotConfigured("no evaluator".into()))),
            Route::Summarize => Ok("summary".into()),
        }?;

        Ok(ProviderResponse {
            message: Message::assistant(text),
            usage: None,
            model: request.model,
        })
    }
}

pub(crate) struct Fixture {
    pub provider: Arc<ScriptedProvider>,
    pub gateway: Gateway,
    pub memory: Arc<MemoryStore>,
    pub events: Arc<EventBus>,
    pub search: Arc<WebSearch>,
    pub dir: tempfile::TempDir,
}

pub(crate) fn fixture(provider: ScriptedProvider) -> Fixture {
    let provider = Arc::new(provider);
    let gateway = Gateway::new(provider.clone(), "test-model");
    let dir = tempfile::tempdir().unwrap();
    let memory = Arc::new(MemoryStore::new(
        dir.path().join("memory"),
        StoreLimits::default(),
        Summarizer::new(gateway.clone(), 100),
    ));
    let search = Arc::new(
        WebSearch::new(Arc::new(MockSearchBackend)).with_backoff(std::time::Duration::ZERO),
    );

    Fixture {
        provider,
        gateway,
        memory,
        events: Arc::new(EventBus::default()),
        search,
        dir,
    }
}
