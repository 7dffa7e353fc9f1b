//! Thought Generator — one free-text thought per iteration.
//!
//! A gateway failure here is fatal: retries belong to the decide step.

use std::sync::Arc;
use chrono::Utc;
use miniagent_core::event::{AgentEvent, EventBus};
use miniagent_core::message::Message;
use miniagent_memory::MemoryStore;
use miniagent_providers::Gateway;
use tracing::{debug, error};
use crate::context::ContextBuilder;
use crate::prompts::{THINK_INSTRUCTION, THINK_PROMPT};

pub struct ThoughtGenerator {
    gateway: Gateway,
    memory: Arc<MemoryStore>,
    events: Arc<EventBus>,
    /// Response entries shown verbatim under `Messages:`
    recent_responses: usize,
}

impl ThoughtGenerator {
    pub fn new(gateway: Gateway, memory: Arc<MemoryStore>, events: Arc<EventBus>) -> Self {
        Self {
            gateway,
            memory,
            events,
            recent_responses: 2,
        }
    }

    /// Build the think request, call the gateway and store the thought.
    pub async fn think(&self) -> miniagent_core::Result<String> {
        let messages = self.build_messages().await?;

        debug!(model = %self.gateway.model(), "Thinking");
        let thought = self
            .gateway
            .request(messages.clone())
            .await
            .inspect_err(|e| error!(error = %e, "Thought request failed"))?;

        self.memory.add_thought(&thought, messages).await?;

        self.events.publish(AgentEvent::ThoughtGenerated {
            chars: thought.chars().count(),
            timestamp: Utc::now(),
        });
        debug!(chars = thought.len(), "Thought stored");
        Ok(thought)
    }

    async fn build_messages(&self) -> miniagent_core::Result<Vec<Message>> {
        let summaries = self
            .memory
            .thought_summaries(self.memory.limits().thought_cap)
            .await?;
        let recent = self.memory.recent_responses(self.recent_responses).await?;
        let notes = self.memory.memory_contents().await?;

        let mut messages = ContextBuilder::new(THINK_PROMPT)
            .long_term(summaries)
            .recent(&recent)
            .memories(notes)
            .build();
        messages.push(Message::user(THINK_INSTRUCTION));
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{Route, ScriptedProvider, fixture};
    use miniagent_core::Error;
    use miniagent_core::message::Role;

    #[tokio::test]
    async fn thought_is_returned_and_stored() {
        let fx = fixture(ScriptedProvider::new().thinking("Maybe ask how their day went."));
        let mut rx = fx.events.subscribe();
        let thinker = ThoughtGenerator::new(fx.gateway.clone(), fx.memory.clone(), fx.events.clone());

        let thought = thinker.think().await.unwrap();
        assert_eq!(thought, "Maybe ask how their day went.");

        let stored = fx.memory.load_thoughts().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].thought, thought);
        assert_eq!(stored[0].summary, "summary");
        assert_eq!(stored[0].context.last().unwrap().content, THINK_INSTRUCTION);

        assert!(matches!(rx.try_recv().unwrap().as_ref(), AgentEvent::ThoughtGenerated { .. }));
    }

    #[tokio::test]
    async fn first_thought_has_no_context_block() {
        let fx = fixture(ScriptedProvider::new());
        let thinker = ThoughtGenerator::new(fx.gateway.clone(), fx.memory.clone(), fx.events.clone());
        thinker.think().await.unwrap();

        let request = fx.provider.last_request(Route::Think).unwrap();
        assert_eq!(request.len(), 2);
        assert_eq!(request[0].role, Role::System);
        assert_eq!(request[1].content, THINK_INSTRUCTION);
    }

    #[tokio::test]
    async fn context_uses_summaries_and_last_two_responses() {
        let fx = fixture(ScriptedProvider::new());
        for i in 0..3 {
            fx.memory.add_response_entry(format!("q{i}"), format!("r{i}")).await.unwrap();
        }
        let thinker = ThoughtGenerator::new(fx.gateway.clone(), fx.memory.clone(), fx.events.clone());
        thinker.think().await.unwrap();
        thinker.think().await.unwrap();

        let request = fx.provider.last_request(Route::Think).unwrap();
        let context = &request[1].content;
        assert!(context.starts_with("Context:\nsummary\nMessages:\n"));
        assert!(!context.contains("\"q0\""));
        assert!(context.contains("\"q1\"") && context.contains("\"q2\""));
    }

    #[tokio::test]
    async fn gateway_failure_is_fatal_and_stores_nothing() {
        let fx = fixture(ScriptedProvider::new().failing_thoughts());
        let thinker = ThoughtGenerator::new(fx.gateway.clone(), fx.memory.clone(), fx.events.clone());

        let err = thinker.think().await.unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
        assert!(err.is_fatal());
        assert!(fx.memory.load_thoughts().await.unwrap().is_empty());
    }
}
