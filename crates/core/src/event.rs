//! Agent event system — decoupled observation of the agent loop.
//!
//! The loop publishes an event at every state transition. The CLI ignores
//! them; the benchmark subscribes and derives its metrics from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All events the agent loop emits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgentEvent {
    /// The thought step produced text
    ThoughtGenerated {
        chars: usize,
        timestamp: DateTime<Utc>,
    },

    /// A valid command envelope was produced
    DecisionMade {
        command: String,
        repaired: bool,
        attempts: u32,
        timestamp: DateTime<Utc>,
    },

    /// The gateway failed during the decide step; no decision this iteration
    DecisionSkipped {
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// A reply failed validation and will be retried
    DecisionRejected {
        failures: u32,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// The failure budget ran out
    DecisionGaveUp {
        failures: u32,
        timestamp: DateTime<Utc>,
    },

    /// A known command ran (successfully or not)
    ActionExecuted {
        command: String,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// The model chose a command nobody implements
    ActionUnknown {
        command: String,
        timestamp: DateTime<Utc>,
    },

    /// All logs were wiped
    MemoryReset { timestamp: DateTime<Utc> },
}

/// A broadcast-based event bus for agent events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<AgentEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: AgentEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<AgentEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(AgentEvent::ActionExecuted {
            command: "web_search".into(),
            success: true,
            duration_ms: 42,
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            AgentEvent::ActionExecuted { command, success, .. } => {
                assert_eq!(command, "web_search");
                assert!(success);
            }
            _ => panic!("Expected ActionExecuted event"),
        }
    }

    #[test]
    fn event_bus_no_subscribers_doesnt_panic() {
        let bus = EventBus::new(16);
        bus.publish(AgentEvent::MemoryReset {
            timestamp: Utc::now(),
        });
    }
}
