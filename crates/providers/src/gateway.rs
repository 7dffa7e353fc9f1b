//! Gateway — a provider bound to one model and its sampling parameters.
//!
//! Every call the agent makes goes through here. Each attempt is wrapped in
//! a timeout so a stalled model server cannot hang the loop.

use miniagent_core::error::ProviderError;
use miniagent_core::message::Message;
use miniagent_core::provider::{Provider, ProviderRequest};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct Gateway {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    timeout: Duration,
}

impl Gateway {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            timeout: Duration::from_secs(120),
        }
    }

    /// Build a gateway from the `[llm]` config section.
    pub fn from_config(provider: Arc<dyn Provider>, llm: &miniagent_config::LlmConfig) -> Self {
        Self::new(provider, &llm.model)
            .with_temperature(llm.temperature)
            .with_max_tokens(llm.max_tokens)
            .with_timeout(Duration::from_secs(llm.timeout_secs))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The same gateway pointed at another model.
    pub fn with_model(&self, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..self.clone()
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Send the messages and return the assistant's text.
    pub async fn request(&self, messages: Vec<Message>) -> Result<String, ProviderError> {
        self.send(messages, self.max_tokens).await
    }

    /// Like [`Gateway::request`] with a different completion token cap.
    pub async fn request_with_max_tokens(
        &self,
        messages: Vec<Message>,
        max_tokens: u32,
    ) -> Result<String, ProviderError> {
        self.send(messages, Some(max_tokens)).await
    }

    async fn send(
        &self,
        messages: Vec<Message>,
        max_tokens: Option<u32>,
    ) -> Result<String, ProviderError> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens,
        };

        debug!(
            provider = %self.provider.name(),
            model = %self.model,
            messages = request.messages.len(),
            "Gateway request"
        );

        match tokio::time::timeout(self.timeout, self.provider.complete(request)).await {
            Ok(Ok(response)) => Ok(response.message.content),
            Ok(Err(e)) => Err(e),
            Err(_) => {
                warn!(
                    provider = %self.provider.name(),
                    timeout_secs = self.timeout.as_secs(),
                    "Gateway request timed out"
                );
                Err(ProviderError::Timeout(format!(
                    "'{}' did not answer within {}s",
                    self.provider.name(),
                    self.timeout.as_secs()
                )))
            }
        }
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}
