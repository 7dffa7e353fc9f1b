//! LLM Provider implementations for MiniAgent.
//!
//! All providers implement the `miniagent_core::Provider` trait. The agent
//! talks to them through a [`Gateway`], which binds a model, sampling
//! parameters and a per-attempt timeout.

pub mod gateway;
pub mod ollama;
pub mod openai_compat;
pub mod router;

#[cfg(test)]
mod test_server;

pub use gateway::Gateway;
pub use ollama::OllamaProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::{build_from_config, build_gateway};
