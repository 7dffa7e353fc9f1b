//! Messaging channel implementations for MiniAgent.
//!
//! A channel is how the agent reaches its human. Available channels:
//! - **Telegram** — Bot API over long polling, one authorized chat
//! - **Console** — stdin/stdout
//! - **Scripted** — canned answers for benchmark runs and tests

pub mod console;
pub mod scripted;
pub mod telegram;

#[cfg(test)]
mod test_server;

use miniagent_core::channel::Channel;
use miniagent_core::error::ChannelError;
use std::sync::Arc;

pub use console::ConsoleChannel;
pub use scripted::ScriptedChannel;
pub use telegram::TelegramChannel;

/// Build the channel named by `agent.channel`.
pub fn build_from_config(
    config: &miniagent_config::AppConfig,
) -> Result<Arc<dyn Channel>, ChannelError> {
    match config.agent.channel.as_str() {
        "telegram" => Ok(Arc::new(TelegramChannel::from_config(&config.telegram)?)),
        "console" => Ok(Arc::new(ConsoleChannel::new())),
        other => Err(ChannelError::NotConfigured(format!(
            "Unknown channel '{other}'"
        ))),
    }
}
