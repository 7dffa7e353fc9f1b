//! Command Dispatcher — runs one validated command and records its outcome.
//!
//! Every known command writes exactly one response entry, whether it
//! succeeded or failed. Unknown commands are logged and write nothing.

use std::sync::Arc;
use std::time::Instant;
use chrono::Utc;
use miniagent_core::channel::Channel;
use miniagent_core::command::{Command, CommandEnvelope};
use miniagent_core::event::{AgentEvent, EventBus};
use miniagent_memory::MemoryStore;
use miniagent_tools::WebSearch;
use tracing::{info, warn};

/// A reply to `ask_user` that makes the agent echo its raw decision back.
pub const DEBUG_SENTINEL: &str = "/debug";

/// Fixed response stored for commands that expect no reply.
pub const NO_RESPONSE: &str = "No response.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The command ran and one response entry was written.
    Recorded { command: String, success: bool },
    /// Nobody implements this command; nothing was written.
    Unknown { name: String },
}

pub struct Dispatcher {
    channel: Arc<dyn Channel>,
    search: Arc<WebSearch>,
    memory: Arc<MemoryStore>,
    events: Arc<EventBus>,
}

impl Dispatcher {
    pub fn new(
        channel: Arc<dyn Channel>,
        search: Arc<WebSearch>,
        memory: Arc<MemoryStore>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            channel,
            search,
            memory,
            events,
        }
    }

    /// Run the command. Only memory errors are returned.
    pub async fn dispatch(
        &self,
        envelope: &CommandEnvelope,
    ) -> miniagent_core::Result<DispatchOutcome> {
        let started = Instant::now();

        let command = match envelope.command() {
            Ok(command) => command,
            Err(e) => {
                warn!(command = %envelope.name, error = %e, "Command has unusable arguments");
                let question = format!("called {}", envelope.name);
                self.memory
                    .add_response_entry(question, format!("Invalid arguments: {e}"))
                    .await?;
                return Ok(self.executed(&envelope.name, false, started));
            }
        };

        let (question, response, success) = match &command {
            Command::AskUser { message } => match self.channel.ask(message).await {
                Ok(answer) => {
                    if answer.trim() == DEBUG_SENTINEL {
                        info!("Debug reply received, echoing decision");
                        if let Err(e) = self.channel.notify(&envelope.to_string()).await {
                            warn!(error = %e, "Could not echo decision");
                        }
                    }
                    (message.clone(), format!("The user's answer: '{answer}'"), true)
                }
                Err(e) => {
                    warn!(error = %e, "ask_user failed");
                    (message.clone(), format!("Could not reach the user: {e}"), false)
                }
            },

            Command::SendMessage { message } | Command::SendLog { message } => {
                match self.channel.notify(message).await {
                    Ok(()) => (message.clone(), NO_RESPONSE.to_string(), true),
                    Err(e) => {
                        warn!(command = command.name(), error = %e, "Message not delivered");
                        (message.clone(), format!("Message not delivered: {e}"), false)
                    }
                }
            }

            Command::WebSearch { query } => {
                let question = format!("called web_search: {query}");
                match self.search.run(query).await {
                    Ok(digest) => (question, digest, true),
                    Err(e) => {
                        warn!(query = %query, error = %e, "Web search failed");
                        (question, format!("Web search failed: {e}"), false)
                    }
                }
            }

            Command::ConversationHistory => {
                let history = self.memory.response_history_text().await?;
                (
                    "called conversation_history".to_string(),
                    format!("Previous conversation: {history}"),
                    true,
                )
            }

            Command::Unknown { name } => {
                warn!(command = %name, envelope = %envelope, "Command is not implemented");
                self.events.publish(AgentEvent::ActionUnknown {
                    command: name.clone(),
                    timestamp: Utc::now(),
                });
                return Ok(DispatchOutcome::Unknown { name: name.clone() });
            }
        };

        self.memory.add_response_entry(question, response).await?;
        Ok(self.executed(command.name(), success, started))
    }

    fn executed(&self, command: &str, success: bool, started: Instant) -> DispatchOutcome {
        let duration_ms = started.elapsed().as_millis() as u64;
        info!(command, success, duration_ms, "Action executed");
        self.events.publish(AgentEvent::ActionExecuted {
            command: command.to_string(),
            success,
            duration_ms,
            timestamp: Utc::now(),
        });
        DispatchOutcome::Recorded {
            command: command.to_string(),
            success,
        }
    }
}
