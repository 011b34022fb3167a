//! Redis short-term store.
//!
//! Each item lives under two keys sharing one expiry:
//!
//! - `{namespace}:stm:item:{key}` holds the value
//! - `{namespace}:stm:count:{key}` holds the access counter
//!
//! Writes go through `MULTI`/`EXEC` so a value never exists without a fresh
//! counter, and the counter increment runs as a Lua script so it can never
//! outlive (or resurrect) its item.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, Script};

use strata_core::error::{StrataError, StrataResult};
use strata_core::traits::{ShortTermStore, ShortTermStoreConfig};

/// Increment the counter only while the item is live, then pin the counter's
/// expiry to the item's.
static INCR_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
    return 0
end
local count = redis.call('INCRBY', KEYS[2], ARGV[1])
local ttl = redis.call('PTTL', KEYS[1])
if ttl > 0 then
    redis.call('PEXPIRE', KEYS[2], ttl)
end
return count
"#,
    )
});

const SCAN_COUNT: usize = 100;

/// Redis-backed [`ShortTermStore`].
pub struct RedisShortTermStore {
    connection: MultiplexedConnection,
    namespace: String,
}

impl RedisShortTermStore {
    /// Connect to Redis.
    pub async fn new(config: &ShortTermStoreConfig) -> StrataResult<Self> {
        let client = Client::open(config.url.as_str()).map_err(|e| {
            StrataError::short_term(format!("Failed to create Redis client: {}", e))
        })?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StrataError::short_term(format!("Failed to connect to Redis: {}", e)))?;

        tracing::info!(namespace = %config.namespace, "Connected to Redis short-term store");

        Ok(Self {
            connection,
            namespace: config.namespace.clone(),
        })
    }

    fn item_prefix(&self) -> String {
        format!("{}:stm:item:", self.namespace)
    }

    fn item_key(&self, key: &str) -> String {
        format!("{}{}", self.item_prefix(), key)
    }

    fn count_key(&self, key: &str) -> String {
        format!("{}:stm:count:{}", self.namespace, key)
    }
}

fn op_error(op: &str, err: redis::RedisError) -> StrataError {
    StrataError::short_term(format!("Redis {} failed: {}", op, err))
}

/// Clamp to at least one millisecond; Redis rejects a zero expiry.
fn ttl_millis(ttl: Duration) -> u64 {
    (ttl.as_millis() as u64).max(1)
}

/// Interpret a `PTTL` reply. Negative values mean missing or persistent.
fn parse_pttl(millis: i64) -> Option<Duration> {
    (millis >= 0).then(|| Duration::from_millis(millis as u64))
}

#[async_trait]
impl ShortTermStore for RedisShortTermStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StrataResult<()> {
        let mut conn = self.connection.clone();
        let millis = ttl_millis(ttl);

        redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(self.item_key(key))
            .arg(value)
            .arg("PX")
            .arg(millis)
            .ignore()
            .cmd("SET")
            .arg(self.count_key(key))
            .arg(0)
            .arg("PX")
            .arg(millis)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| op_error("SET", e))
    }

    async fn get(&self, key: &str) -> StrataResult<Option<String>> {
        let mut conn = self.connection.clone();
        conn.get(self.item_key(key))
            .await
            .map_err(|e| op_error("GET", e))
    }

    async fn ttl(&self, key: &str) -> StrataResult<Option<Duration>> {
        let mut conn = self.connection.clone();
        let millis: i64 = redis::cmd("PTTL")
            .arg(self.item_key(key))
            .query_async(&mut conn)
            .await
            .map_err(|e| op_error("PTTL", e))?;
        Ok(parse_pttl(millis))
    }

    async fn keys(&self) -> StrataResult<Vec<String>> {
        let mut conn = self.connection.clone();
        let prefix = self.item_prefix();
        let pattern = format!("{}*", prefix);

        let mut cursor: u64 = 0;
        let mut keys = Vec::new();
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await
                .map_err(|e| op_error("SCAN", e))?;

            keys.extend(
                batch
                    .into_iter()
                    .filter_map(|k| k.strip_prefix(&prefix).map(str::to_string)),
            );

            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may report a key more than once.
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    async fn delete(&self, key: &str) -> StrataResult<()> {
        let mut conn = self.connection.clone();
        conn.del::<_, ()>(vec![self.item_key(key), self.count_key(key)])
            .await
            .map_err(|e| op_error("DEL", e))
    }

    async fn incr_access_count(&self, key: &str, delta: u64) -> StrataResult<u64> {
        let mut conn = self.connection.clone();
        INCR_SCRIPT
            .key(self.item_key(key))
            .key(self.count_key(key))
            .arg(delta)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| op_error("access count increment", e))
    }

    async fn get_access_count(&self, key: &str) -> StrataResult<u64> {
        let mut conn = self.connection.clone();
        let count: Option<u64> = conn
            .get(self.count_key(key))
            .await
            .map_err(|e| op_error("GET", e))?;
        Ok(count.unwrap_or(0))
    }
}
