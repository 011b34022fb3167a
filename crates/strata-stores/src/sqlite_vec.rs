//! SQLite vector store implementation using the sqlite-vec extension.
//!
//! Documents live in a `vec0` virtual table keyed by rowid, with the payload
//! kept as JSON in an auxiliary column. Because rowids are assigned from the
//! timestamp id generator, enumeration order is insertion order.
//!
//! # Example
//!
//! ```ignore
//! use strata_stores::SqliteVecStore;
//!
//! let store = SqliteVecStore::new(":memory:", "strata_memories")?;
//! store.create_collection(768, DistanceMetric::Cosine).await?;
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, Once, OnceLock};

use async_trait::async_trait;
use rusqlite::Connection;
use serde_json::Value;
use zerocopy::IntoBytes;

use strata_core::error::{StrataError, StrataResult};
use strata_core::traits::{
    matches_filter, DistanceMetric, VectorRecord, VectorSearchResult, VectorStore,
};
use strata_core::types::MetadataFilter;

static REGISTER_EXTENSION: Once = Once::new();

/// Oversampling factor when a post-filter will discard rows.
const FILTER_OVERSAMPLE: usize = 10;

/// SQLite vector store using sqlite-vec extension.
pub struct SqliteVecStore {
    conn: Mutex<Connection>,
    collection_name: String,
    metric: OnceLock<DistanceMetric>,
}

fn sql_error(op: &str, err: rusqlite::Error) -> StrataError {
    StrataError::long_term(format!("sqlite-vec {} failed: {}", op, err))
}

impl SqliteVecStore {
    /// Open (or create) the database at `db_path`. Use `":memory:"` for a
    /// process-local database.
    pub fn new(db_path: &str, collection_name: &str) -> StrataResult<Self> {
        REGISTER_EXTENSION.call_once(|| {
            // SAFETY: sqlite3_auto_extension expects the extension's entry
            // point; sqlite_vec exports it with the matching C signature.
            unsafe {
                rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute(
                    sqlite_vec::sqlite3_vec_init as *const (),
                )));
            }
        });

        let conn = Connection::open(db_path).map_err(|e| sql_error("open", e))?;

        let version: String = conn
            .query_row("SELECT vec_version()", [], |row| row.get(0))
            .map_err(|e| sql_error("extension check", e))?;
        tracing::debug!(version = %version, path = db_path, "Opened sqlite-vec store");

        Ok(Self {
            conn: Mutex::new(conn),
            collection_name: collection_name.to_string(),
            metric: OnceLock::new(),
        })
    }

    fn lock(&self) -> StrataResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StrataError::long_term(format!("Failed to acquire lock: {}", e)))
    }

    fn distance_to_vec0(metric: DistanceMetric) -> StrataResult<&'static str> {
        match metric {
            DistanceMetric::Cosine => Ok("cosine"),
            DistanceMetric::Euclidean => Ok("l2"),
            DistanceMetric::DotProduct => Err(StrataError::Configuration(
                "sqlite-vec does not support dot-product distance".to_string(),
            )),
        }
    }

    /// Convert a vec0 distance into "higher is better".
    fn score(&self, distance: f32) -> f32 {
        match self.metric.get().copied().unwrap_or_default() {
            DistanceMetric::Euclidean => 1.0 / (1.0 + distance),
            _ => 1.0 - distance,
        }
    }

    fn parse_rowid(id: &str) -> StrataResult<i64> {
        id.parse().map_err(|_| {
            StrataError::validation(format!("sqlite-vec ids are integers, got '{}'", id))
        })
    }

    fn bytes_to_vector(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn parse_payload(raw: &str) -> HashMap<String, Value> {
        serde_json::from_str(raw).unwrap_or_default()
    }
}

#[async_trait]
impl VectorStore for SqliteVecStore {
    async fn create_collection(
        &self,
        dimension: usize,
        distance: DistanceMetric,
    ) -> StrataResult<()> {
        let metric = Self::distance_to_vec0(distance)?;
        let _ = self.metric.set(distance);

        let conn = self.lock()?;
        let sql = format!(
            r#"CREATE VIRTUAL TABLE IF NOT EXISTS "{}" USING vec0(
                embedding float[{}] distance_metric={},
                +payload TEXT
            )"#,
            self.collection_name, dimension, metric
        );
        conn.execute(&sql, [])
            .map_err(|e| sql_error("create collection", e))?;

        tracing::info!(collection = %self.collection_name, dimension, metric, "Created sqlite-vec collection");
        Ok(())
    }

    async fn insert(&self, records: Vec<VectorRecord>) -> StrataResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(|e| sql_error("begin", e))?;
        {
            // vec0 has no upsert, so replace by delete + insert.
            let mut delete = tx
                .prepare(&format!(
                    r#"DELETE FROM "{}" WHERE rowid = ?"#,
                    self.collection_name
                ))
                .map_err(|e| sql_error("prepare delete", e))?;
            let mut insert = tx
                .prepare(&format!(
                    r#"INSERT INTO "{}" (rowid, embedding, payload) VALUES (?, ?, ?)"#,
                    self.collection_name
                ))
                .map_err(|e| sql_error("prepare insert", e))?;

            for record in records {
                let rowid = Self::parse_rowid(&record.id)?;
                let payload = serde_json::to_string(&record.payload)?;
                delete
                    .execute([rowid])
                    .map_err(|e| sql_error("delete", e))?;
                insert
                    .execute(rusqlite::params![rowid, record.vector.as_bytes(), payload])
                    .map_err(|e| sql_error("insert", e))?;
            }
        }
        tx.commit().map_err(|e| sql_error("commit", e))
    }

    async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
        filter: Option<&MetadataFilter>,
    ) -> StrataResult<Vec<VectorSearchResult>> {
        let conn = self.lock()?;

        let k = match filter {
            Some(_) => limit * FILTER_OVERSAMPLE,
            None => limit,
        };

        let sql = format!(
            r#"SELECT rowid, distance, payload
               FROM "{}"
               WHERE embedding MATCH ? AND k = ?
               ORDER BY distance"#,
            self.collection_name
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| sql_error("prepare search", e))?;

        let rows = stmt
            .query_map(rusqlite::params![query_vector.as_bytes(), k as i64], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, f32>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(|e| sql_error("search", e))?;

        let mut results = Vec::new();
        for row in rows {
            let (rowid, distance, payload) = row.map_err(|e| sql_error("read row", e))?;
            let payload = Self::parse_payload(&payload);
            if !matches_filter(&payload, filter) {
                continue;
            }
            results.push(VectorSearchResult {
                id: rowid.to_string(),
                score: self.score(distance),
                payload,
            });
            if results.len() == limit {
                break;
            }
        }

        Ok(results)
    }

    async fn list(
        &self,
        filter: Option<&MetadataFilter>,
        offset: usize,
        limit: Option<usize>,
    ) -> StrataResult<Vec<VectorRecord>> {
        let conn = self.lock()?;

        let sql = format!(
            r#"SELECT rowid, embedding, payload FROM "{}" ORDER BY rowid"#,
            self.collection_name
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| sql_error("prepare list", e))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Vec<u8>>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(|e| sql_error("list", e))?;

        let mut records = Vec::new();
        let mut skipped = 0;
        for row in rows {
            let (rowid, embedding, payload) = row.map_err(|e| sql_error("read row", e))?;
            let payload = Self::parse_payload(&payload);
            if !matches_filter(&payload, filter) {
                continue;
            }
            if skipped < offset {
                skipped += 1;
                continue;
            }
            records.push(VectorRecord::new(
                rowid.to_string(),
                Self::bytes_to_vector(&embedding),
                payload,
            ));
            if limit.is_some_and(|l| records.len() >= l) {
                break;
            }
        }

        Ok(records)
    }

    async fn delete(&self, id: &str) -> StrataResult<()> {
        let rowid = Self::parse_rowid(id)?;
        let conn = self.lock()?;
        conn.execute(
            &format!(r#"DELETE FROM "{}" WHERE rowid = ?"#, self.collection_name),
            [rowid],
        )
        .map_err(|e| sql_error("delete", e))?;

        tracing::debug!(id, collection = %self.collection_name, "Deleted record");
        Ok(())
    }

    fn collection_name(&self) -> &str {
        &self.collection_name
    }
}
