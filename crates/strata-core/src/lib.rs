//! strata-core - Core library for strata.
//!
//! This crate provides the core types, traits, and the [`TieredMemory`]
//! controller that places items in a short-term tier with importance-scaled
//! expiry or a durable long-term tier, resolves queries across both, and
//! periodically consolidates them.
//!
//! # Example
//!
//! ```ignore
//! use strata_core::{TierConfig, TieredMemory};
//!
//! let memory = TieredMemory::new(TierConfig::default(), oracle, short_term, long_term)?;
//!
//! let placed = memory.ingest("Standup moved to 10am").await?;
//! let found = memory.query("Standup moved to 10am").await?;
//! let report = memory.consolidate().await;
//! ```

pub mod config;
pub mod consolidation;
pub mod controller;
pub mod error;
pub mod oracle;
pub mod stores;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{StrataConfig, TierConfig};
pub use consolidation::{SweepHandle, SweepReport, SweepScheduler, SweepState, SweepTrigger};
pub use controller::{KeyStrategy, TieredMemory, TtlPolicy};
pub use error::{StoreKind, StrataError, StrataResult};
pub use oracle::LlmOracle;
pub use traits::{
    Embedder, EmbedderConfig, EmbeddingAction, ImportanceOracle, Llm, LlmConfig, LongTermStore,
    ShortTermStore, VectorStore, VectorStoreConfig,
};
pub use types::{
    LongTermDocument, Message, MessageRole, Metadata, MetadataFilter, PlacementResult,
    QueryResult, SearchMatch, ShortTermEntry, Tier,
};
