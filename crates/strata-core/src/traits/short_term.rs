//! Short-term store trait and related types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::StrataResult;

/// Key/value store with native per-key expiry and a per-key access counter.
///
/// The access counter shares the lifetime of its key: it is reset by `set`,
/// and disappears when the key is deleted or expires.
#[async_trait]
pub trait ShortTermStore: Send + Sync {
    /// Write `value` under `key` with the given lifetime and reset the
    /// key's access counter to zero. Overwrites any existing entry.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StrataResult<()>;

    /// Read the value stored under `key`, if it is still live.
    async fn get(&self, key: &str) -> StrataResult<Option<String>>;

    /// Remaining lifetime of `key`, or `None` if the key is absent.
    async fn ttl(&self, key: &str) -> StrataResult<Option<Duration>>;

    /// All live keys, in store enumeration order.
    async fn keys(&self) -> StrataResult<Vec<String>>;

    /// Remove `key` together with its access counter.
    async fn delete(&self, key: &str) -> StrataResult<()>;

    /// Add `delta` to the access counter of a live key and return the new
    /// count. Returns 0 without creating a counter when the key is absent.
    async fn incr_access_count(&self, key: &str, delta: u64) -> StrataResult<u64>;

    /// Current access count for `key` (0 when absent).
    async fn get_access_count(&self, key: &str) -> StrataResult<u64>;
}

/// Short-term store provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShortTermProvider {
    #[default]
    Redis,
    /// Process-local store, for development and tests.
    Memory,
}

/// Short-term store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortTermStoreConfig {
    /// Provider type.
    #[serde(default)]
    pub provider: ShortTermProvider,
    /// Connection URL.
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Prefix applied to every key written by strata.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_namespace() -> String {
    "strata".to_string()
}

impl Default for ShortTermStoreConfig {
    fn default() -> Self {
        Self {
            provider: ShortTermProvider::default(),
            url: default_redis_url(),
            namespace: default_namespace(),
        }
    }
}
