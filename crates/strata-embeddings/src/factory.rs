//! Factory for creating embedding providers.

use std::sync::Arc;

use strata_core::config::EmbedderProviderConfig;
use strata_core::error::StrataResult;
use strata_core::traits::{Embedder, EmbedderConfig, EmbedderProvider};

use crate::ollama::OllamaEmbedder;
use crate::openai::OpenAIEmbedder;

/// Factory for creating embedding providers.
pub struct EmbedderFactory;

impl EmbedderFactory {
    /// Create an embedder from the given configuration.
    pub fn create(
        provider: EmbedderProvider,
        config: EmbedderConfig,
    ) -> StrataResult<Arc<dyn Embedder>> {
        tracing::debug!(?provider, model = %config.model, dims = config.embedding_dims, "Creating embedder");
        match provider {
            EmbedderProvider::OpenAI => Ok(Arc::new(OpenAIEmbedder::new(config)?)),
            EmbedderProvider::Ollama => Ok(Arc::new(OllamaEmbedder::new(config)?)),
        }
    }

    /// Create an embedder from a provider configuration block.
    pub fn from_config(config: &EmbedderProviderConfig) -> StrataResult<Arc<dyn Embedder>> {
        Self::create(config.provider, config.config.clone())
    }

    /// Create an OpenAI embedder with default configuration.
    pub fn openai() -> StrataResult<Arc<dyn Embedder>> {
        Self::create(EmbedderProvider::OpenAI, EmbedderConfig::default())
    }

    /// Create an Ollama embedder with default configuration.
    ///
    /// 768 dimensions matches `nomic-embed-text`.
    pub fn ollama() -> StrataResult<Arc<dyn Embedder>> {
        Self::ollama_with_model("nomic-embed-text", 768)
    }

    /// Create an Ollama embedder with a specific model.
    pub fn ollama_with_model(
        model: impl Into<String>,
        dims: usize,
    ) -> StrataResult<Arc<dyn Embedder>> {
        let config = EmbedderConfig {
            model: model.into(),
            embedding_dims: dims,
            ..Default::default()
        };
        Self::create(EmbedderProvider::Ollama, config)
    }
}
