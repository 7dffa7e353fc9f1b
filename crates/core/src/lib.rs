//! # MiniAgent Core
//!
//! Domain types, traits, and error definitions for the MiniAgent loop.
//! This crate has no transport or storage dependencies; it defines the
//! model that every other crate implements against.
//!
//! ## Layout
//!
//! - The three collaborator seams are traits: [`Provider`] (LLM gateway),
//!   [`Channel`] (human messaging) and [`SearchBackend`] (web search)
//! - [`CommandEnvelope`] is the only shape a decision may take, and its
//!   validator is the only way to build one from model output
//! - Memory records and the [`AgentEvent`] bus are shared by the agent and
//!   the benchmark

pub mod error;
pub mod message;
pub mod provider;
pub mod channel;
pub mod search;
pub mod command;
pub mod memory;
pub mod event;

// Re-export key types at crate root for ergonomics
pub use error::{
    ChannelError, DecisionError, Error, MemoryError, ProviderError, Result, ToolError,
};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use channel::{Channel, NO_ANSWER};
pub use search::{SearchBackend, SearchHit};
pub use command::{Command, CommandEnvelope, Validated, ValidationError};
pub use memory::{MemoryNote, ResponseHistoryEntry, ThoughtRecord};
pub use event::{AgentEvent, EventBus};
