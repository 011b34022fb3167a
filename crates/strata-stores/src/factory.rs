//! Factory for creating store backends from configuration.

use std::sync::Arc;

use strata_core::config::StrataConfig;
use strata_core::error::{StrataError, StrataResult};
use strata_core::stores::{InMemoryShortTermStore, InMemoryVectorStore, SemanticStore};
use strata_core::traits::{
    ShortTermProvider, ShortTermStore, ShortTermStoreConfig, VectorStore, VectorStoreConfig,
    VectorStoreProvider,
};
use strata_embeddings::EmbedderFactory;

/// Factory for creating short-term and long-term stores.
pub struct StoreFactory;

impl StoreFactory {
    /// Create a short-term store from the given configuration.
    pub async fn short_term(config: &ShortTermStoreConfig) -> StrataResult<Arc<dyn ShortTermStore>> {
        match config.provider {
            #[cfg(feature = "redis")]
            ShortTermProvider::Redis => {
                let store = crate::redis_short_term::RedisShortTermStore::new(config).await?;
                Ok(Arc::new(store))
            }

            ShortTermProvider::Memory => {
                tracing::warn!("Using in-memory short-term store; entries will not survive a restart");
                Ok(Arc::new(InMemoryShortTermStore::new()))
            }

            #[allow(unreachable_patterns)]
            provider => Err(StrataError::UnsupportedProvider {
                provider: format!("{:?}", provider),
            }),
        }
    }

    /// Create a vector store from the given configuration.
    pub fn vector_store(config: &VectorStoreConfig) -> StrataResult<Arc<dyn VectorStore>> {
        match config.provider {
            #[cfg(feature = "milvus")]
            VectorStoreProvider::Milvus => {
                let store = crate::milvus::MilvusVectorStore::new(config)?;
                Ok(Arc::new(store))
            }

            #[cfg(feature = "sqlite-vec")]
            VectorStoreProvider::SqliteVec => {
                let db_path = config.path.as_deref().unwrap_or(":memory:");
                let store = crate::sqlite_vec::SqliteVecStore::new(db_path, &config.collection_name)?;
                Ok(Arc::new(store))
            }

            VectorStoreProvider::Memory => {
                Ok(Arc::new(InMemoryVectorStore::new(config.collection_name.clone())))
            }

            #[allow(unreachable_patterns)]
            provider => Err(StrataError::UnsupportedProvider {
                provider: format!("{:?}", provider),
            }),
        }
    }

    /// Create the long-term store: the configured embedder over the
    /// configured vector store, with its collection initialized.
    pub async fn long_term(config: &StrataConfig) -> StrataResult<Arc<SemanticStore>> {
        let embedder = EmbedderFactory::from_config(&config.embedder)?;
        let vector_store = Self::vector_store(&config.vector_store)?;

        let store = SemanticStore::new(embedder, vector_store);
        store.initialize().await?;

        tracing::info!(
            provider = ?config.vector_store.provider,
            collection = %config.vector_store.collection_name,
            "Long-term store ready"
        );
        Ok(Arc::new(store))
    }
}
