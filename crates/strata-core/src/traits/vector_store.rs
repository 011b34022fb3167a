//! Vector index abstraction under the long-term tier.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StrataResult;
use crate::types::{Metadata, MetadataFilter};

/// How a collection compares vectors. Backends report scores as "higher is
/// more similar" whatever the metric.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Cosine,
    Euclidean,
    DotProduct,
}

/// A stored vector and its payload. The long-term tier keeps the document
/// text and metadata in the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: Metadata,
}

impl VectorRecord {
    pub fn new(id: impl Into<String>, vector: Vec<f32>, payload: Metadata) -> Self {
        Self {
            id: id.into(),
            vector,
            payload,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorSearchResult {
    pub id: String,
    pub score: f32,
    pub payload: Metadata,
}

/// Nearest-neighbour index backing [`SemanticStore`](crate::stores::SemanticStore).
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the collection if it does not exist yet.
    async fn create_collection(&self, dimension: usize, distance: DistanceMetric)
        -> StrataResult<()>;

    async fn insert(&self, records: Vec<VectorRecord>) -> StrataResult<()>;

    /// Best match first.
    async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
        filter: Option<&MetadataFilter>,
    ) -> StrataResult<Vec<VectorSearchResult>>;

    /// Up to `limit` matching records in a stable order, skipping the first
    /// `offset` matches.
    async fn list(
        &self,
        filter: Option<&MetadataFilter>,
        offset: usize,
        limit: Option<usize>,
    ) -> StrataResult<Vec<VectorRecord>>;

    async fn delete(&self, id: &str) -> StrataResult<()>;

    fn collection_name(&self) -> &str;
}

/// Returns true when every filter entry equals the payload value under the same key.
pub fn matches_filter(payload: &Metadata, filter: Option<&MetadataFilter>) -> bool {
    match filter {
        None => true,
        Some(filter) => filter
            .iter()
            .all(|(key, expected)| payload.get(key) == Some(expected)),
    }
}

/// Long-term index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    #[serde(default)]
    pub provider: VectorStoreProvider,
    #[serde(default = "default_collection_name")]
    pub collection_name: String,
    #[serde(default = "super::embedder::default_embedding_dims")]
    pub embedding_model_dims: usize,
    /// Server URL for networked providers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Database file path for embedded providers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

fn default_collection_name() -> String {
    "strata_memories".to_string()
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            provider: VectorStoreProvider::Milvus,
            collection_name: default_collection_name(),
            embedding_model_dims: super::embedder::default_embedding_dims(),
            url: None,
            path: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VectorStoreProvider {
    #[default]
    Milvus,
    /// SQLite with sqlite-vec extension for embedded vector search.
    SqliteVec,
    /// Process-local brute-force index.
    Memory,
}
