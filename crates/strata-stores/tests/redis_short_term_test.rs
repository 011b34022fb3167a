//! Integration tests for RedisShortTermStore.
//!
//! These tests require a running Redis instance.
//!
//! ```bash
//! STRATA_TEST_REDIS_URL="redis://127.0.0.1:6379" \
//!     cargo test -p strata-stores -- --ignored
//! ```

#![cfg(feature = "redis")]

use std::time::Duration;

use strata_core::traits::{ShortTermProvider, ShortTermStore, ShortTermStoreConfig};
use strata_stores::RedisShortTermStore;

async fn connect(namespace: &str) -> Option<RedisShortTermStore> {
    let url = std::env::var("STRATA_TEST_REDIS_URL").ok()?;
    let config = ShortTermStoreConfig {
        provider: ShortTermProvider::Redis,
        url,
        namespace: format!("strata_test_{}", namespace),
    };
    Some(RedisShortTermStore::new(&config).await.unwrap())
}

#[tokio::test]
#[ignore] // Requires Redis
async fn test_set_resets_counter_and_keys_are_namespaced() {
    let Some(store) = connect("reset").await else {
        return;
    };

    store.set("a", "stored", Duration::from_secs(30)).await.unwrap();
    assert_eq!(store.incr_access_count("a", 1).await.unwrap(), 1);
    assert_eq!(store.incr_access_count("a", 1).await.unwrap(), 2);

    store.set("a", "stored", Duration::from_secs(30)).await.unwrap();
    assert_eq!(store.get_access_count("a").await.unwrap(), 0);
    assert_eq!(store.keys().await.unwrap(), vec!["a".to_string()]);

    let ttl = store.ttl("a").await.unwrap().unwrap();
    assert!(ttl <= Duration::from_secs(30) && ttl > Duration::from_secs(25));

    store.delete("a").await.unwrap();
    assert!(store.keys().await.unwrap().is_empty());
}

#[tokio::test]
#[ignore] // Requires Redis
async fn test_increment_on_missing_key_creates_nothing() {
    let Some(store) = connect("missing").await else {
        return;
    };

    assert_eq!(store.incr_access_count("ghost", 1).await.unwrap(), 0);
    assert_eq!(store.get_access_count("ghost").await.unwrap(), 0);
    assert!(store.get("ghost").await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // Requires Redis
async fn test_counter_expires_with_item() {
    let Some(store) = connect("expiry").await else {
        return;
    };

    store.set("brief", "stored", Duration::from_millis(300)).await.unwrap();
    store.incr_access_count("brief", 1).await.unwrap();

    tokio::time::sleep(Duration::from_millis(500)).await;

    assert!(store.get("brief").await.unwrap().is_none());
    assert_eq!(store.get_access_count("brief").await.unwrap(), 0);
    assert!(store.ttl("brief").await.unwrap().is_none());
}
