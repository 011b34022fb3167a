//! Text embedding for the long-term tier.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StrataResult;

/// Why a text is being embedded. Asymmetric models embed the two differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddingAction {
    /// A document about to be written to long-term memory.
    #[default]
    Document,
    /// A query resolved against long-term memory.
    Query,
}

/// Turns text into fixed-size vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str, action: Option<EmbeddingAction>) -> StrataResult<Vec<f32>>;

    /// Length of every vector this embedder returns.
    fn dimension(&self) -> usize;

    fn model_name(&self) -> &str;
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedderConfig {
    pub model: String,
    /// Must match the long-term vector collection.
    #[serde(default = "default_embedding_dims")]
    pub embedding_dims: usize,
    /// API key (if not using environment variable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL for API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

pub(crate) fn default_embedding_dims() -> usize {
    1536
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            embedding_dims: default_embedding_dims(),
            api_key: None,
            base_url: None,
        }
    }
}

/// Embedder provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderProvider {
    #[default]
    OpenAI,
    Ollama,
}
