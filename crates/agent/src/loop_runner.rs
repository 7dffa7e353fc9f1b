//! The agent loop: think → decide → dispatch, one iteration at a time.

use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use miniagent_config::AppConfig;
use miniagent_core::channel::Channel;
use miniagent_core::event::{AgentEvent, EventBus};
use miniagent_memory::MemoryStore;
use miniagent_providers::Gateway;
use miniagent_tools::WebSearch;
use tracing::{debug, info};
use crate::debug::DebugRecorder;
use crate::decision::{DecisionEngine, DecisionSettings};
use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::thought::ThoughtGenerator;

/// What one iteration ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterationOutcome {
    /// A known command ran and its outcome was recorded
    Dispatched { command: String, success: bool },
    /// The decide step got no reply from the gateway
    NoDecision,
    /// The model picked a command nobody implements
    Unknown { name: String },
}

/// Drives the three steps strictly in sequence.
pub struct AgentLoop {
    thinker: ThoughtGenerator,
    decider: DecisionEngine,
    dispatcher: Dispatcher,
    memory: Arc<MemoryStore>,
    events: Arc<EventBus>,
}

impl AgentLoop {
    pub fn new(
        gateway: Gateway,
        memory: Arc<MemoryStore>,
        channel: Arc<dyn Channel>,
        search: Arc<WebSearch>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            thinker: ThoughtGenerator::new(gateway.clone(), memory.clone(), events.clone()),
            decider: DecisionEngine::new(gateway, memory.clone(), events.clone()),
            dispatcher: Dispatcher::new(channel, search, memory.clone(), events.clone()),
            memory,
            events,
        }
    }

    /// Apply the `[decision]` and `[agent]` sections.
    pub fn with_config(self, config: &AppConfig) -> Self {
        let agent = self.with_decision_settings(DecisionSettings::from(&config.decision));
        match &config.agent.debug_dir {
            Some(dir) => agent.with_debug_recorder(DebugRecorder::new(dir)),
            None => agent,
        }
    }

    pub fn with_decision_settings(mut self, settings: DecisionSettings) -> Self {
        self.decider = self.decider.with_settings(settings);
        self
    }

    pub fn with_debug_recorder(mut self, recorder: DebugRecorder) -> Self {
        self.decider = self.decider.with_recorder(recorder);
        self
    }

    pub fn memory(&self) -> &Arc<MemoryStore> {
        &self.memory
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn decider(&self) -> &DecisionEngine {
        &self.decider
    }

    /// Wipe all three logs so the next run starts clean.
    pub async fn reset(&self) -> miniagent_core::Result<()> {
        self.memory.forget_everything().await?;
        self.events.publish(AgentEvent::MemoryReset {
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Run one think → decide → dispatch iteration.
    ///
    /// Errors are fatal: a failed thought request, a memory I/O error, or
    /// the decision engine giving up.
    pub async fn step(&self) -> miniagent_core::Result<IterationOutcome> {
        let thought = self.thinker.think().await?;

        let Some(decision) = self.decider.decide(&thought).await? else {
            return Ok(IterationOutcome::NoDecision);
        };

        let outcome = match self.dispatcher.dispatch(&decision.envelope).await? {
            DispatchOutcome::Recorded { command, success } => {
                IterationOutcome::Dispatched { command, success }
            }
            DispatchOutcome::Unknown { name } => IterationOutcome::Unknown { name },
        };
        debug!(?outcome, "Iteration finished");
        Ok(outcome)
    }

    /// Run `iterations` steps with `pause` between them, stopping at the
    /// first fatal error.
    pub async fn run_iterations(
        &self,
        iterations: u32,
        pause: Duration,
    ) -> miniagent_core::Result<Vec<IterationOutcome>> {
        let mut outcomes = Vec::with_capacity(iterations as usize);
        for i in 0..iterations {
            info!(iteration = i + 1, of = iterations, "Iteration");
            outcomes.push(self.step().await?);
            if i + 1 < iterations && !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }
        Ok(outcomes)
    }
}
