//! OpenAI embedding provider implementation.

use async_trait::async_trait;

use strata_core::error::{StrataError, StrataResult};
use strata_core::traits::{Embedder, EmbedderConfig, EmbeddingAction};

#[cfg(feature = "openai")]
use async_openai::{
    config::OpenAIConfig,
    types::{CreateEmbeddingRequest, EmbeddingInput},
    Client,
};

/// OpenAI embedding provider.
pub struct OpenAIEmbedder {
    #[cfg(feature = "openai")]
    client: Client<OpenAIConfig>,
    config: EmbedderConfig,
}

impl OpenAIEmbedder {
    /// Create a new OpenAI embedder.
    pub fn new(config: EmbedderConfig) -> StrataResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                StrataError::Configuration("OpenAI API key not found. Set OPENAI_API_KEY environment variable or provide api_key in config.".to_string())
            })?;

        #[cfg(feature = "openai")]
        let client = {
            let openai_config = match config.base_url {
                Some(ref base_url) => OpenAIConfig::new()
                    .with_api_key(api_key)
                    .with_api_base(base_url),
                None => OpenAIConfig::new().with_api_key(api_key),
            };
            Client::with_config(openai_config)
        };
        #[cfg(not(feature = "openai"))]
        let _ = api_key;

        Ok(Self {
            #[cfg(feature = "openai")]
            client,
            config,
        })
    }

    /// The v3 models can shorten their output to the configured width.
    #[cfg(feature = "openai")]
    fn requested_dimensions(&self) -> Option<u32> {
        self.config
            .model
            .starts_with("text-embedding-3")
            .then_some(self.config.embedding_dims as u32)
    }

    #[cfg(feature = "openai")]
    async fn request(&self, input: EmbeddingInput) -> StrataResult<Vec<Vec<f32>>> {
        let request = CreateEmbeddingRequest {
            model: self.config.model.clone(),
            input,
            dimensions: self.requested_dimensions(),
            ..Default::default()
        };

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| StrataError::embedding(format!("OpenAI embedding error: {}", e)))?;

        let embeddings: Vec<Vec<f32>> = response.data.into_iter().map(|e| e.embedding).collect();
        for embedding in &embeddings {
            check_dimension(embedding, self.config.embedding_dims)?;
        }
        Ok(embeddings)
    }
}

pub(crate) fn check_dimension(embedding: &[f32], expected: usize) -> StrataResult<()> {
    if embedding.len() != expected {
        return Err(StrataError::embedding(format!(
            "Embedding has {} dimensions, expected {}",
            embedding.len(),
            expected
        )));
    }
    Ok(())
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[cfg(feature = "openai")]
    async fn embed(&self, text: &str, _action: Option<EmbeddingAction>) -> StrataResult<Vec<f32>> {
        self.request(EmbeddingInput::String(text.to_string()))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StrataError::embedding("No embedding returned"))
    }

    #[cfg(not(feature = "openai"))]
    async fn embed(&self, _text: &str, _action: Option<EmbeddingAction>) -> StrataResult<Vec<f32>> {
        Err(StrataError::Configuration(
            "OpenAI feature not enabled. Enable the 'openai' feature.".to_string(),
        ))
    }

    fn dimension(&self) -> usize {
        self.config.embedding_dims
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_dimension() {
        tokio_test::assert_ok!(check_dimension(&[0.0; 4], 4));
        let err = check_dimension(&[0.0; 3], 4).unwrap_err();
        assert!(err.to_string().contains("expected 4"));
    }

    #[test]
    fn test_explicit_key() {
        let embedder = OpenAIEmbedder::new(EmbedderConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(embedder.model_name(), "text-embedding-3-small");
        assert_eq!(embedder.dimension(), 1536);
    }
}
