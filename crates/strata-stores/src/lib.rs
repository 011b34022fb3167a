//! strata-stores - Store backends for strata.
//!
//! # Short-term
//! - **Redis** (feature: `redis`) - native per-key expiry, Lua-scripted access counters
//!
//! # Long-term vector stores
//! - **Milvus** (feature: `milvus`) - Milvus REST API
//! - **sqlite-vec** (feature: `sqlite-vec`) - embedded SQLite with the vec0 extension
//!
//! Process-local stores for development live in `strata_core::stores` and are
//! reachable through [`StoreFactory`] with the `memory` provider.

mod factory;

#[cfg(feature = "milvus")]
mod milvus;

#[cfg(feature = "redis")]
mod redis_short_term;

#[cfg(feature = "sqlite-vec")]
mod sqlite_vec;

pub use factory::StoreFactory;

#[cfg(feature = "milvus")]
pub use milvus::MilvusVectorStore;

#[cfg(feature = "redis")]
pub use redis_short_term::RedisShortTermStore;

#[cfg(feature = "sqlite-vec")]
pub use sqlite_vec::SqliteVecStore;
