pub mod bench;
pub mod doctor;
pub mod forget;
pub mod history;
pub mod onboard;
pub mod run;

use std::path::Path;
use std::sync::Arc;
use miniagent_config::{AppConfig, ConfigError};
use miniagent_memory::{MemoryStore, StoreLimits, Summarizer};
use miniagent_providers::Gateway;

/// Load the config from `path` or the default location, with env overrides.
pub(crate) fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => AppConfig::load_with(path, |key| std::env::var(key).ok()),
        None => AppConfig::load(),
    }
}

/// The memory store under `memory.dir`, summarizing through `gateway`.
pub(crate) fn open_memory(config: &AppConfig, gateway: &Gateway) -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new(
        config.memory.dir.clone(),
        StoreLimits::from_config(&config.memory),
        Summarizer::new(gateway.clone(), config.llm.summary_max_tokens),
    ))
}
