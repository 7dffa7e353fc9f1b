//! Token-budgeted summarization of history logs.
//!
//! A history below its token threshold is returned as-is. Above it, the
//! serialized text is cut into whitespace-bounded chunks, each chunk is
//! summarized on its own, and the last few raw entries are appended so the
//! model always sees the most recent turns verbatim.

use miniagent_core::error::ProviderError;
use miniagent_core::message::Message;
use miniagent_providers::Gateway;
use serde::Serialize;
use tracing::{debug, warn};
use crate::token::estimate_tokens;

const SUMMARY_PROMPT: &str = "You condense logs for an autonomous assistant. \
Summarize the text you are given in a few short sentences. Keep names, numbers, \
questions asked and answers received. Reply with the summary only.";

/// When and how a history gets summarized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryPolicy {
    /// Approximate token count above which summarization kicks in
    pub token_threshold: usize,
    /// Token budget of each chunk sent to the model
    pub chunk_tokens: usize,
    /// Raw entries appended after the summary
    pub tail_entries: usize,
}

/// Summarizes text through the gateway with a small completion budget.
#[derive(Debug, Clone)]
pub struct Summarizer {
    gateway: Gateway,
    max_tokens: u32,
}

impl Summarizer {
    pub fn new(gateway: Gateway, max_tokens: u32) -> Self {
        Self { gateway, max_tokens }
    }

    /// The same summarizer pointed at another model.
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            gateway: self.gateway.with_model(model),
            max_tokens: self.max_tokens,
        }
    }

    /// Summarize one piece of text.
    pub async fn summarize(&self, text: &str) -> Result<String, ProviderError> {
        let messages = vec![Message::system(SUMMARY_PROMPT), Message::user(text)];
        let summary = self
            .gateway
            .request_with_max_tokens(messages, self.max_tokens)
            .await?;
        Ok(summary.trim().to_string())
    }

    /// Render a history for a prompt, summarizing it if it is too long.
    ///
    /// Never fails: a chunk whose summary cannot be produced is kept raw.
    pub async fn summarized_history<T: Serialize>(
        &self,
        entries: &[T],
        policy: SummaryPolicy,
    ) -> String {
        let serialized = to_json(entries);
        if estimate_tokens(&serialized) <= policy.token_threshold {
            return serialized;
        }

        let chunks = chunk_text(&serialized, policy.chunk_tokens);
        debug!(
            tokens = estimate_tokens(&serialized),
            chunks = chunks.len(),
            "Summarizing history"
        );

        let mut parts = Vec::with_capacity(chunks.len() + 1);
        for chunk in chunks {
            match self.summarize(chunk).await {
                Ok(summary) if !summary.is_empty() => parts.push(summary),
                Ok(_) => {
                    warn!("Empty summary, keeping raw chunk");
                    parts.push(chunk.to_string());
                }
                Err(e) => {
                    warn!(error = %e, "Summarization failed, keeping raw chunk");
                    parts.push(chunk.to_string());
                }
            }
        }

        let tail_start = entries.len().saturating_sub(policy.tail_entries);
        if tail_start < entries.len() {
            parts.push(to_json(&entries[tail_start..]));
        }

        parts.join("\n")
    }
}

fn to_json<T: Serialize>(entries: &[T]) -> String {
    serde_json::to_string(entries).unwrap_or_else(|_| "[]".into())
}

/// Split text at whitespace into chunks of at most `chunk_tokens` tokens.
///
/// Each chunk is a slice of `text` running from its first word to its last,
/// so whitespace inside a chunk is kept byte for byte. A single word longer
/// than the budget becomes a chunk of its own.
pub fn chunk_text(text: &str, chunk_tokens: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start: Option<usize> = None;
    let mut end = 0;

    for (word_start, word_end) in word_spans(text) {
        match start {
            None => start = Some(word_start),
            Some(s) if estimate_tokens(&text[s..word_end]) > chunk_tokens => {
                chunks.push(&text[s..end]);
                start = Some(word_start);
            }
            Some(_) => {}
        }
        end = word_end;
    }

    if let Some(s) = start {
        chunks.push(&text[s..end]);
    }
    chunks
}

/// Byte ranges of the whitespace-separated words in `text`.
fn word_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                spans.push((s, i));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((s, text.len()));
    }
    spans
}
