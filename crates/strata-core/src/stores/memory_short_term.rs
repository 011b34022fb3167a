//! Process-local short-term store.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::error::StrataResult;
use crate::traits::ShortTermStore;

struct Entry {
    value: String,
    expires_at: Instant,
    access_count: u64,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// In-memory [`ShortTermStore`] with lazy expiry.
///
/// Uses `tokio::time::Instant`, so tests can drive expiry with a paused clock.
/// Keys are returned in insertion order.
#[derive(Default)]
pub struct InMemoryShortTermStore {
    entries: RwLock<HashMap<String, Entry>>,
    order: RwLock<Vec<String>>,
}

impl InMemoryShortTermStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop expired entries.
    async fn purge_expired(&self) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        if entries.len() != before {
            let mut order = self.order.write().await;
            order.retain(|key| entries.contains_key(key));
        }
    }
}

#[async_trait]
impl ShortTermStore for InMemoryShortTermStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StrataResult<()> {
        let mut entries = self.entries.write().await;
        let replaced = entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
                access_count: 0,
            },
        );
        if replaced.is_none() {
            self.order.write().await.push(key.to_string());
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> StrataResult<Option<String>> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn ttl(&self, key: &str) -> StrataResult<Option<Duration>> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.expires_at - now))
    }

    async fn keys(&self) -> StrataResult<Vec<String>> {
        self.purge_expired().await;
        Ok(self.order.read().await.clone())
    }

    async fn delete(&self, key: &str) -> StrataResult<()> {
        let mut entries = self.entries.write().await;
        if entries.remove(key).is_some() {
            self.order.write().await.retain(|k| k != key);
        }
        Ok(())
    }

    async fn incr_access_count(&self, key: &str, delta: u64) -> StrataResult<u64> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        match entries.get_mut(key).filter(|entry| entry.is_live(now)) {
            Some(entry) => {
                entry.access_count += delta;
                Ok(entry.access_count)
            }
            None => Ok(0),
        }
    }

    async fn get_access_count(&self, key: &str) -> StrataResult<u64> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.access_count)
            .unwrap_or(0))
    }
}
