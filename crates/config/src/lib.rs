//! Configuration loading, validation, and management for MiniAgent.
//!
//! Loads configuration from `~/.miniagent/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Server types the LLM gateway knows how to talk to.
pub const SERVER_TYPES: &[&str] = &["lmstudio", "oobabooga", "openai", "ollama"];

/// Search engines the web search tool can use.
pub const SEARCH_ENGINES: &[&str] = &["duckduckgo", "searxng", "mock"];

/// Channels the agent can reach its human through.
pub const AGENT_CHANNELS: &[&str] = &["telegram", "console"];

/// The root configuration structure.
///
/// Maps directly to `~/.miniagent/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// LLM gateway settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Telegram bot settings
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Memory store settings
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Decision retry settings
    #[serde(default)]
    pub decision: DecisionConfig,

    /// Web search settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Agent loop settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// Benchmark runner settings
    #[serde(default)]
    pub benchmark: BenchmarkConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_server_type")]
    pub server_type: String,

    /// Base URL of the model server
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Per-attempt timeout for a gateway call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Token cap for summarization calls
    #[serde(default = "default_summary_max_tokens")]
    pub summary_max_tokens: u32,
}

fn default_server_type() -> String {
    "lmstudio".into()
}
fn default_api_url() -> String {
    "http://localhost:1234/v1".into()
}
fn default_model() -> String {
    "local-model".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_summary_max_tokens() -> u32 {
    100
}

impl LlmConfig {
    /// The API base URL with any endpoint suffix removed.
    ///
    /// Users often paste the full completion endpoint; providers append their
    /// own paths.
    pub fn base_url(&self) -> String {
        let mut url = self.api_url.trim().trim_end_matches('/');
        for suffix in ["/chat/completions", "/generate"] {
            if let Some(stripped) = url.strip_suffix(suffix) {
                url = stripped;
            }
        }
        url.trim_end_matches('/').to_string()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            server_type: default_server_type(),
            api_url: default_api_url(),
            model: default_model(),
            api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            summary_max_tokens: default_summary_max_tokens(),
        }
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("server_type", &self.server_type)
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("api_key", &redact(&self.api_key))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("summary_max_tokens", &self.summary_max_tokens)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// The one chat the bot talks to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,

    /// Long-poll timeout for getUpdates
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,

    /// How long `ask` waits for a reply (0 = forever)
    #[serde(default)]
    pub ask_timeout_secs: u64,
}

fn default_poll_timeout_secs() -> u64 {
    30
}

impl TelegramConfig {
    /// The configured chat id as a number, if present and numeric.
    pub fn chat_id_value(&self) -> Option<i64> {
        self.chat_id.as_deref().and_then(|id| id.trim().parse().ok())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.chat_id_value().is_some()
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            chat_id: None,
            poll_timeout_secs: default_poll_timeout_secs(),
            ask_timeout_secs: 0,
        }
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("api_key", &redact(&self.api_key))
            .field("chat_id", &self.chat_id)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("ask_timeout_secs", &self.ask_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Directory holding the three history files
    #[serde(default = "default_memory_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_thought_cap")]
    pub thought_cap: usize,

    #[serde(default = "default_response_cap")]
    pub response_cap: usize,

    /// Approximate token count above which thought history is summarized
    #[serde(default = "default_thought_token_threshold")]
    pub thought_token_threshold: usize,

    /// Approximate token count above which response history is summarized
    #[serde(default = "default_response_token_threshold")]
    pub response_token_threshold: usize,

    /// Token budget of one summarization chunk
    #[serde(default = "default_chunk_tokens")]
    pub chunk_tokens: usize,

    /// Raw thought entries appended after a summary
    #[serde(default = "default_thought_tail")]
    pub thought_tail: usize,

    /// Raw response entries appended after a summary
    #[serde(default = "default_response_tail")]
    pub response_tail: usize,
}

fn default_memory_dir() -> PathBuf {
    AppConfig::config_dir().join("memory")
}
fn default_thought_cap() -> usize {
    10
}
fn default_response_cap() -> usize {
    20
}
fn default_thought_token_threshold() -> usize {
    200
}
fn default_response_token_threshold() -> usize {
    500
}
fn default_chunk_tokens() -> usize {
    3000
}
fn default_thought_tail() -> usize {
    3
}
fn default_response_tail() -> usize {
    2
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            dir: default_memory_dir(),
            thought_cap: default_thought_cap(),
            response_cap: default_response_cap(),
            thought_token_threshold: default_thought_token_threshold(),
            response_token_threshold: default_response_token_threshold(),
            chunk_tokens: default_chunk_tokens(),
            thought_tail: default_thought_tail(),
            response_tail: default_response_tail(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionConfig {
    /// Consecutive validation failures before giving up
    #[serde(default = "default_max_failures")]
    pub max_failures: u32,

    /// Pause between retries of the same thought
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Response entries shown as recent context
    #[serde(default = "default_recent_entries")]
    pub recent_entries: usize,

    /// Run the evaluation pass after each decision
    #[serde(default)]
    pub evaluate: bool,
}

fn default_max_failures() -> u32 {
    100
}
fn default_retry_backoff_ms() -> u64 {
    250
}
fn default_recent_entries() -> usize {
    4
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            max_failures: default_max_failures(),
            retry_backoff_ms: default_retry_backoff_ms(),
            recent_entries: default_recent_entries(),
            evaluate: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_engine")]
    pub engine: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub searxng_url: Option<String>,

    #[serde(default = "default_max_results")]
    pub max_results: usize,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_search_backoff_ms")]
    pub backoff_ms: u64,
}

fn default_search_engine() -> String {
    "duckduckgo".into()
}
fn default_max_results() -> usize {
    3
}
fn default_max_attempts() -> u32 {
    3
}
fn default_search_backoff_ms() -> u64 {
    1000
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            engine: default_search_engine(),
            searxng_url: None,
            max_results: default_max_results(),
            max_attempts: default_max_attempts(),
            backoff_ms: default_search_backoff_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_channel")]
    pub channel: String,

    /// Pause after a recoverable iteration error
    #[serde(default = "default_error_backoff_secs")]
    pub error_backoff_secs: u64,

    /// Where failed decisions are dumped (unset = disabled)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_dir: Option<PathBuf>,
}

fn default_channel() -> String {
    "telegram".into()
}
fn default_error_backoff_secs() -> u64 {
    5
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            error_backoff_secs: default_error_backoff_secs(),
            debug_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    /// Root of the per-run storage namespaces
    #[serde(default = "default_runs_dir")]
    pub runs_dir: PathBuf,

    /// Runs executed in parallel
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Models to benchmark (empty = ask the provider)
    #[serde(default)]
    pub models: Vec<String>,

    #[serde(default = "default_iteration_delay_ms")]
    pub iteration_delay_ms: u64,
}

fn default_results_dir() -> PathBuf {
    AppConfig::config_dir().join("benchmark").join("results")
}
fn default_runs_dir() -> PathBuf {
    AppConfig::config_dir().join("benchmark").join("runs")
}
fn default_concurrency() -> usize {
    2
}
fn default_iteration_delay_ms() -> u64 {
    1000
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            runs_dir: default_runs_dir(),
            concurrency: default_concurrency(),
            models: vec![],
            iteration_delay_ms: default_iteration_delay_ms(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.miniagent/config.toml)
    /// and apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(&Self::config_path(), |key| std::env::var(key).ok())
    }

    /// Load configuration from a specific file path, without environment
    /// overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, then apply overrides resolved through `lookup`.
    pub fn load_with<F>(path: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::read_file(path)?;
        config.apply_env_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Apply environment overrides (highest priority).
    ///
    /// `lookup` resolves a variable name; pass `std::env::var` in production
    /// and a map in tests.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| keys.iter().find_map(|k| lookup(k).filter(|v| !v.is_empty()));

        if let Some(url) = first(&["MINIAGENT_API_URL", "API_URL"]) {
            self.llm.api_url = url;
        }
        if let Some(kind) = first(&["MINIAGENT_SERVER_TYPE", "LLM_SERVER_TYPE"]) {
            self.llm.server_type = kind.to_lowercase();
        }

        let model_keys: &[&str] = if self.llm.server_type == "ollama" {
            &["MINIAGENT_MODEL", "OLLAMA_MODEL"]
        } else {
            &["MINIAGENT_MODEL", "LMSTUDIO_MODEL"]
        };
        if let Some(model) = first(model_keys) {
            self.llm.model = model;
        }

        if let Some(key) = first(&["MINIAGENT_API_KEY"]) {
            self.llm.api_key = Some(key);
        }
        if let Some(raw) = first(&["TEMPERATURE"]) {
            self.llm.temperature = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: "TEMPERATURE".into(),
                reason: format!("'{raw}' is not a number"),
            })?;
        }
        if let Some(raw) = first(&["MAX_TOKENS"]) {
            self.llm.max_tokens = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: "MAX_TOKENS".into(),
                reason: format!("'{raw}' is not a positive integer"),
            })?;
        }
        if let Some(key) = first(&["TELEGRAM_API_KEY"]) {
            self.telegram.api_key = Some(key);
        }
        if let Some(chat) = first(&["TELEGRAM_CHAT_ID"]) {
            self.telegram.chat_id = Some(chat);
        }
        if let Some(dir) = first(&["MINIAGENT_MEMORY_DIR"]) {
            self.memory.dir = PathBuf::from(dir);
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".miniagent")
    }

    /// Get the default configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SERVER_TYPES.contains(&self.llm.server_type.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "llm.server_type must be one of {}, got '{}'",
                SERVER_TYPES.join(", "),
                self.llm.server_type
            )));
        }

        if self.llm.temperature < 0.0 || self.llm.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "llm.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "llm.timeout_secs must be > 0".into(),
            ));
        }

        if self.memory.thought_cap == 0 || self.memory.response_cap == 0 {
            return Err(ConfigError::ValidationError(
                "memory caps must be > 0".into(),
            ));
        }

        if self.memory.chunk_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "memory.chunk_tokens must be > 0".into(),
            ));
        }

        if self.decision.max_failures == 0 {
            return Err(ConfigError::ValidationError(
                "decision.max_failures must be > 0".into(),
            ));
        }

        if !SEARCH_ENGINES.contains(&self.search.engine.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "search.engine must be one of {}, got '{}'",
                SEARCH_ENGINES.join(", "),
                self.search.engine
            )));
        }

        if self.search.engine == "searxng" && self.search.searxng_url.is_none() {
            return Err(ConfigError::ValidationError(
                "search.searxng_url is required when engine = \"searxng\"".into(),
            ));
        }

        if !AGENT_CHANNELS.contains(&self.agent.channel.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "agent.channel must be one of {}, got '{}'",
                AGENT_CHANNELS.join(", "),
                self.agent.channel
            )));
        }

        if let Some(chat) = &self.telegram.chat_id
            && self.telegram.chat_id_value().is_none()
        {
            return Err(ConfigError::ValidationError(format!(
                "telegram.chat_id '{chat}' is not a numeric chat id"
            )));
        }

        if self.benchmark.concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "benchmark.concurrency must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Invalid value in environment variable {var}: {reason}")]
    InvalidEnv { var: String, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.llm.server_type, "lmstudio");
        assert_eq!(config.memory.thought_cap, 10);
        assert_eq!(config.memory.response_cap, 20);
        assert_eq!(config.decision.max_failures, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.llm.model, config.llm.model);
        assert_eq!(parsed.memory.chunk_tokens, config.memory.chunk_tokens);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut config = AppConfig::default();
        config.llm.temperature = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_server_type_rejected() {
        let mut config = AppConfig::default();
        config.llm.server_type = "koboldcpp".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server_type"));
    }

    #[test]
    fn zero_max_failures_rejected() {
        let mut config = AppConfig::default();
        config.decision.max_failures = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_numeric_chat_id_rejected() {
        let mut config = AppConfig::default();
        config.telegram.chat_id = Some("@someone".into());
        assert!(config.validate().is_err());

        config.telegram.chat_id = Some("-100123".into());
        assert!(config.validate().is_ok());
        assert_eq!(config.telegram.chat_id_value(), Some(-100123));
    }

    #[test]
    fn searxng_needs_url() {
        let mut config = AppConfig::default();
        config.search.engine = "searxng".into();
        assert!(config.validate().is_err());
        config.search.searxng_url = Some("http://localhost:8888".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        let config = result.unwrap();
        assert_eq!(config.llm.api_url, "http://localhost:1234/v1");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[llm]\nserver_type = \"ollama\"\napi_url = \"http://localhost:11434/api\"\n\n[decision]\nmax_failures = 5\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.llm.server_type, "ollama");
        assert_eq!(config.decision.max_failures, 5);
        assert_eq!(config.decision.recent_entries, 4);
        assert_eq!(config.search.max_results, 3);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[llm\nmodel = ").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_overrides_take_priority() {
        let vars = env(&[
            ("API_URL", "http://gpu-box:5000/v1/chat/completions"),
            ("MINIAGENT_MODEL", "mistral-7b"),
            ("LMSTUDIO_MODEL", "ignored"),
            ("TEMPERATURE", "0.2"),
            ("TELEGRAM_CHAT_ID", "42"),
        ]);
        let config = AppConfig::load_with(Path::new("/nonexistent/config.toml"), |k| {
            vars.get(k).cloned()
        })
        .unwrap();

        assert_eq!(config.llm.model, "mistral-7b");
        assert!((config.llm.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.llm.base_url(), "http://gpu-box:5000/v1");
        assert_eq!(config.telegram.chat_id_value(), Some(42));
    }

    #[test]
    fn ollama_model_variable_follows_server_type() {
        let vars = env(&[
            ("LLM_SERVER_TYPE", "Ollama"),
            ("OLLAMA_MODEL", "llama3"),
            ("LMSTUDIO_MODEL", "not-this"),
        ]);
        let mut config = AppConfig::default();
        config.apply_env_overrides(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.llm.server_type, "ollama");
        assert_eq!(config.llm.model, "llama3");
    }

    #[test]
    fn bad_env_number_is_reported() {
        let vars = env(&[("MAX_TOKENS", "lots")]);
        let mut config = AppConfig::default();
        let err = config
            .apply_env_overrides(|k| vars.get(k).cloned())
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { ref var, .. } if var == "MAX_TOKENS"));
    }

    #[test]
    fn base_url_strips_endpoint_suffixes() {
        let mut llm = LlmConfig::default();
        llm.api_url = "http://localhost:11434/api/generate".into();
        assert_eq!(llm.base_url(), "http://localhost:11434/api");
        llm.api_url = "http://localhost:1234/v1/".into();
        assert_eq!(llm.base_url(), "http://localhost:1234/v1");
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("sk-secret".into());
        config.telegram.api_key = Some("123:abc".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(!debug.contains("123:abc"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("lmstudio"));
        assert!(toml_str.contains("max_failures = 100"));
    }
}
