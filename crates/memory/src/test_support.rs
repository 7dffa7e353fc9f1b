//! Stub gateway for memory tests.

use async_trait::async_trait;
use miniagent_core::error::ProviderError;
use miniagent_core::message::Message;
use miniagent_core::provider::{Provider, ProviderRequest, ProviderResponse};
use miniagent_providers::Gateway;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Answers every request with a fixed text, or fails every request.
pub(crate) struct StubProvider {
    reply: Option<String>,
    calls: AtomicUsize,
}

impl StubProvider {
    pub(crate) fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Some(reply) => Ok(ProviderResponse {
                message: Message::assistant(reply.clone()),
                usage: None,
                model: request.model,
            }),
            None => Err(ProviderError::Network("connection refused".into())),
        }
    }
}

pub(crate) fn gateway(provider: &Arc<StubProvider>) -> Gateway {
    Gateway::new(provider.clone(), "stub-model")
}
