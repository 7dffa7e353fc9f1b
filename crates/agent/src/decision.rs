//! Decision Engine — turns a thought into exactly one validated command.
//!
//! Each attempt sends the same request and validates the reply, repairing
//! JSON wrapped in prose. Invalid replies bump a failure counter owned by
//! the engine; the counter survives across `decide` calls and resets on the
//! first valid reply. Reaching `max_failures` gives up with
//! [`DecisionError::GaveUp`]. A gateway failure is not counted: the attempt
//! ends with no decision and the caller thinks again.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use chrono::Utc;
use miniagent_config::DecisionConfig;
use miniagent_core::command::{CommandEnvelope, validate_reply};
use miniagent_core::error::DecisionError;
use miniagent_core::event::{AgentEvent, EventBus};
use miniagent_core::message::Message;
use miniagent_memory::MemoryStore;
use miniagent_providers::Gateway;
use tracing::{debug, error, info, warn};
use crate::context::ContextBuilder;
use crate::debug::DebugRecorder;
use crate::prompts::{DECIDE_INSTRUCTION, decide_prompt, evaluate_prompt};

/// Retry and context knobs for the decide step.
#[derive(Debug, Clone)]
pub struct DecisionSettings {
    /// Invalid replies tolerated before giving up
    pub max_failures: u32,
    /// Pause between attempts after an invalid reply
    pub retry_backoff: Duration,
    /// Response entries shown verbatim and scanned for recent questions
    pub recent_entries: usize,
    /// Run the evaluator pass after a valid decision
    pub evaluate: bool,
}

impl Default for DecisionSettings {
    fn default() -> Self {
        Self::from(&DecisionConfig::default())
    }
}

impl From<&DecisionConfig> for DecisionSettings {
    fn from(config: &DecisionConfig) -> Self {
        Self {
            max_failures: config.max_failures.max(1),
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
            recent_entries: config.recent_entries,
            evaluate: config.evaluate,
        }
    }
}

/// A validated decision ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub envelope: CommandEnvelope,
    /// The JSON had to be cut out of surrounding prose
    pub repaired: bool,
    /// Gateway calls this decision took
    pub attempts: u32,
    /// The evaluator replaced the original choice
    pub revised: bool,
}

pub struct DecisionEngine {
    gateway: Gateway,
    memory: Arc<MemoryStore>,
    events: Arc<EventBus>,
    settings: DecisionSettings,
    recorder: Option<DebugRecorder>,
    failures: AtomicU32,
}

impl DecisionEngine {
    pub fn new(gateway: Gateway, memory: Arc<MemoryStore>, events: Arc<EventBus>) -> Self {
        Self {
            gateway,
            memory,
            events,
            settings: DecisionSettings::default(),
            recorder: None,
            failures: AtomicU32::new(0),
        }
    }

    pub fn with_settings(mut self, settings: DecisionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_recorder(mut self, recorder: DebugRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn settings(&self) -> &DecisionSettings {
        &self.settings
    }

    /// Invalid replies since the last valid one.
    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::SeqCst)
    }

    /// Decide on one command for `thought`.
    ///
    /// `Ok(None)` means the gateway failed and there is no decision this
    /// iteration. Memory errors and give-up are returned as errors.
    pub async fn decide(&self, thought: &str) -> miniagent_core::Result<Option<Decision>> {
        let messages = self.build_messages(thought).await?;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            debug!(attempt = attempts, "Deciding");

            let raw = match self.gateway.request(messages.clone()).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(error = %e, "Decision request failed, skipping this iteration");
                    self.events.publish(AgentEvent::DecisionSkipped {
                        reason: e.to_string(),
                        timestamp: Utc::now(),
                    });
                    return Ok(None);
                }
            };

            let rejection = match validate_reply(&raw) {
                Ok(validated) => {
                    self.failures.store(0, Ordering::SeqCst);
                    let decision = Decision {
                        envelope: validated.envelope,
                        repaired: validated.repaired,
                        attempts,
                        revised: false,
                    };
                    info!(
                        command = %decision.envelope.name,
                        repaired = decision.repaired,
                        attempts,
                        "Decision made"
                    );
                    self.events.publish(AgentEvent::DecisionMade {
                        command: decision.envelope.name.clone(),
                        repaired: decision.repaired,
                        attempts,
                        timestamp: Utc::now(),
                    });

                    if self.settings.evaluate {
                        return Ok(Some(self.evaluate(thought, decision).await));
                    }
                    return Ok(Some(decision));
                }
                Err(e) => e,
            };

            let failures = self.failures.fetch_add(1, Ordering::SeqCst) + 1;
            debug!(failures, reason = %rejection, reply = %raw, "Decision reply rejected");
            if let Some(recorder) = &self.recorder {
                recorder
                    .record_decision(&messages, &raw, &rejection.to_string())
                    .await;
            }

            if failures >= self.settings.max_failures {
                error!(failures, "Too many invalid decisions, giving up");
                self.events.publish(AgentEvent::DecisionGaveUp {
                    failures,
                    timestamp: Utc::now(),
                });
                return Err(DecisionError::GaveUp { failures }.into());
            }

            self.events.publish(AgentEvent::DecisionRejected {
                failures,
                reason: rejection.to_string(),
                timestamp: Utc::now(),
            });
            tokio::time::sleep(self.settings.retry_backoff).await;
        }
    }

    /// Ask the evaluator to review a decision.
    ///
    /// The evaluator's command replaces the decision only if it validates.
    /// The failure counter is never touched.
    pub async fn evaluate(&self, thought: &str, decision: Decision) -> Decision {
        let messages = vec![
            Message::system(evaluate_prompt()),
            Message::user(format!(
                "Thoughts: {thought}\nDecision: {}",
                decision.envelope
            )),
        ];

        let raw = match self.gateway.request(messages).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Evaluation request failed, keeping decision");
                return decision;
            }
        };

        match validate_reply(&raw) {
            Ok(validated) if validated.envelope != decision.envelope => {
                info!(
                    from = %decision.envelope.name,
                    to = %validated.envelope.name,
                    "Evaluator revised decision"
                );
                Decision {
                    envelope: validated.envelope,
                    revised: true,
                    ..decision
                }
            }
            Ok(_) => decision,
            Err(e) => {
                debug!(reason = %e, "Evaluator reply invalid, keeping decision");
                decision
            }
        }
    }

    async fn build_messages(&self, thought: &str) -> miniagent_core::Result<Vec<Message>> {
        let recent = self
            .memory
            .recent_responses(self.settings.recent_entries)
            .await?;
        let history = if recent.is_empty() {
            Vec::new()
        } else {
            vec![self.memory.response_history_text().await?]
        };
        let notes = self.memory.memory_contents().await?;

        let mut messages = ContextBuilder::new(decide_prompt())
            .long_term(history)
            .recent(&recent)
            .memories(notes)
            .build();

        if !recent.is_empty() {
            let questions: Vec<String> = recent.iter().map(|e| format!("{:?}", e.question)).collect();
            messages.push(Message::user(format!(
                "Note: These questions were recently asked: [{}]",
                questions.join(", ")
            )));
        }

        messages.push(Message::user(format!("Thoughts: \n{thought}")));
        messages.push(Message::user(DECIDE_INSTRUCTION));
        Ok(messages)
    }
}
