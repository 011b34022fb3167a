//! Factory for creating LLM providers.

use std::sync::Arc;

use strata_core::config::LlmProviderConfig;
use strata_core::error::StrataResult;
use strata_core::traits::{Llm, LlmConfig, LlmProvider};

use crate::ollama::OllamaLlm;
use crate::openai::OpenAIProvider;

/// Factory for creating LLM providers.
pub struct LlmFactory;

impl LlmFactory {
    /// Create an LLM provider from the given configuration.
    pub fn create(provider: LlmProvider, config: LlmConfig) -> StrataResult<Arc<dyn Llm>> {
        match provider {
            LlmProvider::OpenAI => Ok(Arc::new(OpenAIProvider::new(config)?)),
            LlmProvider::Ollama => Ok(Arc::new(OllamaLlm::new(config)?)),
        }
    }

    /// Create an LLM provider from a provider configuration block.
    pub fn from_config(config: &LlmProviderConfig) -> StrataResult<Arc<dyn Llm>> {
        Self::create(config.provider, config.config.clone())
    }

    /// Create an OpenAI LLM provider with default configuration.
    pub fn openai() -> StrataResult<Arc<dyn Llm>> {
        Self::create(LlmProvider::OpenAI, LlmConfig::default())
    }

    /// Create an OpenAI LLM provider with a specific model.
    pub fn openai_with_model(model: impl Into<String>) -> StrataResult<Arc<dyn Llm>> {
        let config = LlmConfig {
            model: model.into(),
            ..Default::default()
        };
        Self::create(LlmProvider::OpenAI, config)
    }

    /// Create an Ollama LLM provider with a specific model.
    pub fn ollama_with_model(model: impl Into<String>) -> StrataResult<Arc<dyn Llm>> {
        let config = LlmConfig {
            model: model.into(),
            ..Default::default()
        };
        Self::create(LlmProvider::Ollama, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let config = LlmProviderConfig {
            provider: LlmProvider::Ollama,
            config: LlmConfig {
                model: "qwen2.5".to_string(),
                ..Default::default()
            },
        };
        let llm = LlmFactory::from_config(&config).unwrap();
        assert_eq!(llm.model_name(), "qwen2.5");
    }
}
