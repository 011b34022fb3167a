//! Ollama embedding provider implementation.

use async_trait::async_trait;

use strata_core::error::{StrataError, StrataResult};
use strata_core::traits::{Embedder, EmbedderConfig, EmbeddingAction};

#[cfg(feature = "ollama")]
use ollama_rs::{generation::embeddings::request::GenerateEmbeddingsRequest, Ollama};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Ollama embedding provider.
pub struct OllamaEmbedder {
    #[cfg(feature = "ollama")]
    client: Ollama,
    config: EmbedderConfig,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder.
    pub fn new(config: EmbedderConfig) -> StrataResult<Self> {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let url = url::Url::parse(&base_url)
            .map_err(|e| StrataError::Configuration(format!("Invalid Ollama URL: {}", e)))?;

        #[cfg(feature = "ollama")]
        let client = Ollama::new(
            format!(
                "{}://{}",
                url.scheme(),
                url.host_str().unwrap_or("localhost")
            ),
            url.port().unwrap_or(11434),
        );
        #[cfg(not(feature = "ollama"))]
        let _ = url;

        Ok(Self {
            #[cfg(feature = "ollama")]
            client,
            config,
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    #[cfg(feature = "ollama")]
    async fn embed(&self, text: &str, _action: Option<EmbeddingAction>) -> StrataResult<Vec<f32>> {
        let request = GenerateEmbeddingsRequest::new(self.config.model.clone(), text.into());

        let response = self
            .client
            .generate_embeddings(request)
            .await
            .map_err(|e| StrataError::embedding(format!("Ollama embedding error: {}", e)))?;

        let embedding = response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| StrataError::embedding("No embedding returned"))?;

        crate::openai::check_dimension(&embedding, self.config.embedding_dims)?;
        Ok(embedding)
    }

    #[cfg(not(feature = "ollama"))]
    async fn embed(&self, _text: &str, _action: Option<EmbeddingAction>) -> StrataResult<Vec<f32>> {
        Err(StrataError::Configuration(
            "Ollama feature not enabled. Enable the 'ollama' feature.".to_string(),
        ))
    }

    fn dimension(&self) -> usize {
        self.config.embedding_dims
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
