//! Provider selection — builds the configured LLM backend.

use std::sync::Arc;
use miniagent_core::error::ProviderError;
use miniagent_core::provider::Provider;
use crate::gateway::Gateway;
use crate::ollama::OllamaProvider;
use crate::openai_compat::OpenAiCompatProvider;

/// Build the provider named by `llm.server_type`.
pub fn build_from_config(
    config: &miniagent_config::AppConfig,
) -> Result<Arc<dyn Provider>, ProviderError> {
    let llm = &config.llm;
    let base_url = llm.base_url();

    let provider: Arc<dyn Provider> = match llm.server_type.as_str() {
        "lmstudio" | "oobabooga" => Arc::new(OpenAiCompatProvider::new(
            &llm.server_type,
            &base_url,
            llm.api_key.clone(),
        )),
        "openai" => {
            if llm.api_key.is_none() {
                return Err(ProviderError::NotConfigured(
                    "server_type \"openai\" needs llm.api_key or MINIAGENT_API_KEY".into(),
                ));
            }
            Arc::new(OpenAiCompatProvider::new("openai", &base_url, llm.api_key.clone()))
        }
        "ollama" => Arc::new(OllamaProvider::new(&base_url)),
        other => {
            return Err(ProviderError::NotConfigured(format!(
                "Unknown server type '{other}'"
            )));
        }
    };

    Ok(provider)
}

/// Build the provider and bind it to the configured model.
pub fn build_gateway(config: &miniagent_config::AppConfig) -> Result<Gateway, ProviderError> {
    let provider = build_from_config(config)?;
    Ok(Gateway::from_config(provider, &config.llm))
}

/// The conventional API root for a server type.
pub fn default_base_url(server_type: &str) -> &'static str {
    match server_type {
        "ollama" => "http://localhost:11434/api",
        "oobabooga" => "http://localhost:5000/v1",
        "openai" => "https://api.openai.com/v1",
        _ => "http://localhost:1234/v1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_from_default_config() {
        let config = miniagent_config::AppConfig::default();
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "lmstudio");
    }

    #[test]
    fn ollama_server_type_selects_native_api() {
        let mut config = miniagent_config::AppConfig::default();
        config.llm.server_type = "ollama".into();
        config.llm.api_url = default_base_url("ollama").into();
        assert_eq!(build_from_config(&config).unwrap().name(), "ollama");
    }

    #[test]
    fn openai_without_key_is_not_configured() {
        let mut config = miniagent_config::AppConfig::default();
        config.llm.server_type = "openai".into();
        assert!(matches!(
            build_from_config(&config),
            Err(ProviderError::NotConfigured(_))
        ));
    }

    #[test]
    fn gateway_takes_model_from_config() {
        let mut config = miniagent_config::AppConfig::default();
        config.llm.model = "qwen2.5-7b".into();
        let gateway = build_gateway(&config).unwrap();
        assert_eq!(gateway.model(), "qwen2.5-7b");
    }

    #[test]
    fn default_base_urls() {
        assert!(default_base_url("ollama").contains("11434"));
        assert!(default_base_url("lmstudio").contains("1234"));
    }
}
