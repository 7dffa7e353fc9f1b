//! Channel trait — the abstraction over the messaging capability.
//!
//! A Channel is how the agent reaches its human: `ask` sends a prompt and
//! suspends until a reply arrives, `notify` is fire-and-forget. Long text is
//! chunked by the implementation; callers never see transport limits.

use async_trait::async_trait;
use crate::error::ChannelError;

/// Reply returned by `ask` when the human never answered in time.
pub const NO_ANSWER: &str = "User has not answered.";

/// The core Channel trait.
///
/// Implementations: Telegram, console (stdin/stdout), scripted (tests and
/// benchmark runs).
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name (e.g., "telegram", "console").
    fn name(&self) -> &str;

    /// Ask the human a question and wait for the reply text.
    ///
    /// Dropping the returned future cancels any polling in progress.
    async fn ask(&self, prompt: &str) -> std::result::Result<String, ChannelError>;

    /// Send a message without waiting for a reply.
    async fn notify(&self, text: &str) -> std::result::Result<(), ChannelError>;

    /// Health check — is the channel connected and operational?
    async fn health_check(&self) -> std::result::Result<bool, ChannelError> {
        Ok(true)
    }
}

/// Split text into chunks of at most `max_chars` characters.
///
/// Splits on char boundaries so multi-byte text is never cut mid-codepoint.
pub fn chunk_message(text: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 || text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
