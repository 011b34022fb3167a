//! Long-term store trait.

use async_trait::async_trait;

use crate::error::StrataResult;
use crate::types::{LongTermDocument, Metadata, MetadataFilter, SearchMatch};

/// Durable, semantically searchable document store.
#[async_trait]
pub trait LongTermStore: Send + Sync {
    /// Store `text` and return its newly assigned unique id.
    async fn insert(&self, text: &str, metadata: Metadata) -> StrataResult<String>;

    /// Nearest-neighbor search, best match first.
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> StrataResult<Vec<SearchMatch>>;

    /// Up to `limit` stored documents, skipping the first `offset`.
    ///
    /// Order is stable between calls, so consecutive pages cover the store.
    async fn enumerate(&self, offset: usize, limit: usize) -> StrataResult<Vec<LongTermDocument>>;

    /// Remove a document by id. Removing an unknown id is not an error.
    async fn delete_by_id(&self, id: &str) -> StrataResult<()>;
}
