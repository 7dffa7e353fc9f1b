//! Memory system for MiniAgent.
//!
//! The [`MemoryStore`] keeps the agent's three logs on disk and hands the
//! prompt builders bounded views of them. Long histories are condensed by
//! the [`Summarizer`] before they reach a prompt.

pub mod store;
pub mod summarize;
pub mod token;

#[cfg(test)]
mod test_support;

pub use store::{MemoryStore, StoreLimits};
pub use summarize::{Summarizer, SummaryPolicy, chunk_text};
pub use token::estimate_tokens;
