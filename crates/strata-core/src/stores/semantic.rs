//! Long-term store built from an embedder and a vector store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use crate::error::{StoreKind, StrataResult};
use crate::traits::{
    DistanceMetric, Embedder, EmbeddingAction, LongTermStore, VectorRecord, VectorStore,
};
use crate::types::{LongTermDocument, Metadata, MetadataFilter, SearchMatch};

use super::id::TimestampIdGenerator;

/// Payload key holding the document text.
pub const TEXT_FIELD: &str = "text";
/// Payload key holding the insertion timestamp.
pub const CREATED_AT_FIELD: &str = "created_at";

/// [`LongTermStore`] that embeds text and keeps it in a [`VectorStore`].
///
/// Each record payload carries the text, an RFC 3339 `created_at`, and the
/// caller's metadata flattened alongside.
pub struct SemanticStore {
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    ids: TimestampIdGenerator,
}

impl SemanticStore {
    pub fn new(embedder: Arc<dyn Embedder>, vector_store: Arc<dyn VectorStore>) -> Self {
        Self::with_ids(embedder, vector_store, TimestampIdGenerator::new())
    }

    pub fn with_ids(
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
        ids: TimestampIdGenerator,
    ) -> Self {
        Self {
            embedder,
            vector_store,
            ids,
        }
    }

    /// Create the backing collection sized for the embedder.
    pub async fn initialize(&self) -> StrataResult<()> {
        self.vector_store
            .create_collection(self.embedder.dimension(), DistanceMetric::Cosine)
            .await
            .map_err(|e| e.into_store(StoreKind::LongTerm))
    }

    pub fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.vector_store
    }
}

/// Split a stored payload back into text and caller metadata.
fn split_payload(mut payload: HashMap<String, Value>) -> (String, Metadata) {
    let text = match payload.remove(TEXT_FIELD) {
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
        None => String::new(),
    };
    (text, payload)
}

#[async_trait]
impl LongTermStore for SemanticStore {
    async fn insert(&self, text: &str, metadata: Metadata) -> StrataResult<String> {
        let vector = self
            .embedder
            .embed(text, Some(EmbeddingAction::Document))
            .await
            .map_err(|e| e.into_store(StoreKind::LongTerm))?;

        let id = self.ids.next();
        let mut payload = metadata;
        payload.insert(TEXT_FIELD.to_string(), Value::String(text.to_string()));
        payload
            .entry(CREATED_AT_FIELD.to_string())
            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));

        self.vector_store
            .insert(vec![VectorRecord::new(id.clone(), vector, payload)])
            .await
            .map_err(|e| e.into_store(StoreKind::LongTerm))?;

        tracing::debug!(id = %id, collection = self.vector_store.collection_name(), "Inserted long-term document");
        Ok(id)
    }

    async fn search(
        &self,
        query: &str,
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> StrataResult<Vec<SearchMatch>> {
        let vector = self
            .embedder
            .embed(query, Some(EmbeddingAction::Query))
            .await?;

        let results = self.vector_store.search(&vector, top_k, filter).await?;

        Ok(results
            .into_iter()
            .map(|result| {
                let (text, metadata) = split_payload(result.payload);
                SearchMatch {
                    id: result.id,
                    score: result.score,
                    text,
                    metadata,
                }
            })
            .collect())
    }

    async fn enumerate(&self, offset: usize, limit: usize) -> StrataResult<Vec<LongTermDocument>> {
        let records = self
            .vector_store
            .list(None, offset, Some(limit))
            .await
            .map_err(|e| e.into_store(StoreKind::LongTerm))?;

        Ok(records
            .into_iter()
            .map(|record| {
                let (text, metadata) = split_payload(record.payload);
                LongTermDocument {
                    id: record.id,
                    text,
                    metadata,
                }
            })
            .collect())
    }

    async fn delete_by_id(&self, id: &str) -> StrataResult<()> {
        self.vector_store
            .delete(id)
            .await
            .map_err(|e| e.into_store(StoreKind::LongTerm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::InMemoryVectorStore;
    use crate::traits::Embedder;
    use serde_json::json;

    /// Embeds by counting a few marker words.
    struct MarkerEmbedder;

    #[async_trait]
    impl Embedder for MarkerEmbedder {
        async fn embed(&self, text: &str, _: Option<EmbeddingAction>) -> StrataResult<Vec<f32>> {
            let text = text.to_lowercase();
            Ok(["turing", "pizza", "budget"]
                .iter()
                .map(|w| text.matches(w).count() as f32)
                .collect())
        }

        fn dimension(&self) -> usize {
            3
        }

        fn model_name(&self) -> &str {
            "marker"
        }
    }

    async fn store() -> SemanticStore {
        let store = SemanticStore::new(
            Arc::new(MarkerEmbedder),
            Arc::new(InMemoryVectorStore::new("semantic_test")),
        );
        store.initialize().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_insert_then_search_returns_text_and_metadata() {
        let store = store().await;
        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), json!("promotion"));

        let turing = store
            .insert("Alan Turing pioneered AI research.", metadata)
            .await
            .unwrap();
        store
            .insert("Pizza night is on Friday.", Metadata::new())
            .await
            .unwrap();

        let matches = store.search("Who was Turing?", 3, None).await.unwrap();
        assert_eq!(matches[0].id, turing);
        assert_eq!(matches[0].text, "Alan Turing pioneered AI research.");
        assert_eq!(matches[0].metadata.get("source"), Some(&json!("promotion")));
        assert!(matches[0].metadata.contains_key(CREATED_AT_FIELD));
        assert!(!matches[0].metadata.contains_key(TEXT_FIELD));
    }

    #[tokio::test]
    async fn test_ids_are_unique_for_identical_text() {
        let store = store().await;
        let a = store.insert("budget review", Metadata::new()).await.unwrap();
        let b = store.insert("budget review", Metadata::new()).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.enumerate(0, 10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_removes_from_enumerate_and_search() {
        let store = store().await;
        let id = store.insert("budget review", Metadata::new()).await.unwrap();
        store.delete_by_id(&id).await.unwrap();

        assert!(store.enumerate(0, 10).await.unwrap().is_empty());
        assert!(store.search("budget", 3, None).await.unwrap().is_empty());
    }
}
