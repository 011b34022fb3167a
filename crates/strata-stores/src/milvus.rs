//! Milvus vector store implementation using the REST API.
//!
//! Collections are created with Milvus' quick-setup schema: an `Int64`
//! primary key named `id`, a float vector field and dynamic fields for the
//! payload. Document ids are therefore decimal integers.

use std::collections::HashMap;
use std::sync::OnceLock;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use strata_core::error::{StrataError, StrataResult};
use strata_core::traits::{
    DistanceMetric, VectorRecord, VectorSearchResult, VectorStore, VectorStoreConfig,
};
use strata_core::types::MetadataFilter;

const DEFAULT_URL: &str = "http://localhost:19530";
const DATABASE: &str = "default";
/// Matches every row; Milvus requires a filter on query.
const MATCH_ALL: &str = "id >= 0";

/// Milvus vector store implementation using REST API.
pub struct MilvusVectorStore {
    client: Client,
    base_url: String,
    collection_name: String,
    metric: OnceLock<DistanceMetric>,
}

impl MilvusVectorStore {
    /// Create a new Milvus vector store.
    pub fn new(config: &VectorStoreConfig) -> StrataResult<Self> {
        let base_url = config
            .url
            .clone()
            .unwrap_or_else(|| DEFAULT_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let client = Client::builder()
            .build()
            .map_err(|e| StrataError::long_term(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            collection_name: config.collection_name.clone(),
            metric: OnceLock::new(),
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/v1{}", self.base_url, path)
    }

    fn distance_to_milvus(metric: DistanceMetric) -> &'static str {
        match metric {
            DistanceMetric::Cosine => "COSINE",
            DistanceMetric::Euclidean => "L2",
            DistanceMetric::DotProduct => "IP",
        }
    }

    /// POST to the v1 API and unwrap its `{code, data, message}` envelope.
    async fn post(&self, path: &str, op: &str, body: Value) -> StrataResult<Value> {
        let response = self
            .client
            .post(self.api_url(path))
            .json(&body)
            .send()
            .await
            .map_err(|e| StrataError::long_term(format!("Failed to {}: {}", op, e)))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(StrataError::long_term(format!("Failed to {}: {}", op, error)));
        }

        let result: Value = response
            .json()
            .await
            .map_err(|e| StrataError::long_term(format!("Failed to parse response: {}", e)))?;

        match result["code"].as_i64() {
            Some(0) | Some(200) | None => Ok(result),
            Some(code) => Err(StrataError::long_term(format!(
                "Failed to {}: code {}: {}",
                op,
                code,
                result["message"].as_str().unwrap_or_default()
            ))),
        }
    }

    /// Convert a distance reported by Milvus into "higher is better".
    fn score(&self, distance: f64) -> f32 {
        match self.metric.get().copied().unwrap_or_default() {
            DistanceMetric::Cosine | DistanceMetric::DotProduct => distance as f32,
            DistanceMetric::Euclidean => (1.0 / (1.0 + distance)) as f32,
        }
    }
}

fn parse_id(id: &str) -> StrataResult<i64> {
    id.parse()
        .map_err(|_| StrataError::validation(format!("Milvus ids are integers, got '{}'", id)))
}

fn row_id(item: &Value) -> String {
    match &item["id"] {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        _ => String::new(),
    }
}

fn row_vector(item: &Value) -> Vec<f32> {
    item["vector"]
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_f64().map(|f| f as f32))
                .collect()
        })
        .unwrap_or_default()
}

fn row_payload(item: &Value) -> HashMap<String, Value> {
    item.as_object()
        .map(|obj| {
            obj.iter()
                .filter(|(k, _)| !matches!(k.as_str(), "id" | "vector" | "distance"))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        })
        .unwrap_or_default()
}

/// Build a boolean expression from an equality filter.
fn build_filter(filter: &MetadataFilter) -> String {
    let mut keys: Vec<&String> = filter.keys().collect();
    keys.sort();

    let conditions: Vec<String> = keys
        .into_iter()
        .filter_map(|key| {
            let value = match &filter[key] {
                Value::String(s) => format!("\"{}\"", s.replace('"', "\\\"")),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some(format!("{} == {}", key, value))
        })
        .collect();

    if conditions.is_empty() {
        MATCH_ALL.to_string()
    } else {
        conditions.join(" and ")
    }
}

#[async_trait]
impl VectorStore for MilvusVectorStore {
    async fn create_collection(
        &self,
        dimension: usize,
        distance: DistanceMetric,
    ) -> StrataResult<()> {
        let _ = self.metric.set(distance);

        let body = json!({
            "dbName": DATABASE,
            "collectionName": self.collection_name,
            "dimension": dimension,
            "metricType": Self::distance_to_milvus(distance),
            "primaryField": "id",
            "vectorField": "vector"
        });

        match self.post("/vector/collections/create", "create collection", body).await {
            Ok(_) => {
                tracing::info!(collection = %self.collection_name, dimension, "Created Milvus collection");
                Ok(())
            }
            Err(e) if e.to_string().contains("already exist") => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn insert(&self, records: Vec<VectorRecord>) -> StrataResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let data = records
            .into_iter()
            .map(|r| {
                let mut obj = json!({
                    "id": parse_id(&r.id)?,
                    "vector": r.vector
                });
                for (k, v) in r.payload {
                    obj[k] = v;
                }
                Ok(obj)
            })
            .collect::<StrataResult<Vec<Value>>>()?;

        let body = json!({
            "dbName": DATABASE,
            "collectionName": self.collection_name,
            "data": data
        });

        self.post("/vector/insert", "insert", body).await?;
        Ok(())
    }

    async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
        filter: Option<&MetadataFilter>,
    ) -> StrataResult<Vec<VectorSearchResult>> {
        let mut body = json!({
            "dbName": DATABASE,
            "collectionName": self.collection_name,
            "vector": query_vector,
            "limit": limit,
            "outputFields": ["*"]
        });

        if let Some(f) = filter {
            body["filter"] = Value::String(build_filter(f));
        }

        let result = self.post("/vector/search", "search", body).await?;
        let data = result["data"].as_array().cloned().unwrap_or_default();

        Ok(data
            .iter()
            .map(|item| VectorSearchResult {
                id: row_id(item),
                score: self.score(item["distance"].as_f64().unwrap_or_default()),
                payload: row_payload(item),
            })
            .collect())
    }

    async fn list(
        &self,
        filter: Option<&MetadataFilter>,
        offset: usize,
        limit: Option<usize>,
    ) -> StrataResult<Vec<VectorRecord>> {
        let body = json!({
            "dbName": DATABASE,
            "collectionName": self.collection_name,
            "filter": filter.map(build_filter).unwrap_or_else(|| MATCH_ALL.to_string()),
            "offset": offset,
            "limit": limit.unwrap_or(100),
            "outputFields": ["*"]
        });

        let result = self.post("/vector/query", "query", body).await?;
        let data = result["data"].as_array().cloned().unwrap_or_default();

        Ok(data
            .iter()
            .map(|item| VectorRecord::new(row_id(item), row_vector(item), row_payload(item)))
            .collect())
    }

    async fn delete(&self, id: &str) -> StrataResult<()> {
        let body = json!({
            "dbName": DATABASE,
            "collectionName": self.collection_name,
            "id": [parse_id(id)?]
        });

        self.post("/vector/delete", "delete", body).await?;
        Ok(())
    }

    fn collection_name(&self) -> &str {
        &self.collection_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter() {
        let mut filter = MetadataFilter::new();
        assert_eq!(build_filter(&filter), MATCH_ALL);

        filter.insert("source".to_string(), json!("promotion"));
        filter.insert("access_count".to_string(), json!(3));
        assert_eq!(
            build_filter(&filter),
            "access_count == 3 and source == \"promotion\""
        );
    }

    #[test]
    fn test_row_parsing() {
        let item = json!({
            "id": 1717171717000000001i64,
            "distance": 0.92,
            "vector": [0.5, 0.25],
            "text": "Standup moved to 10am",
            "source": "promotion"
        });

        assert_eq!(row_id(&item), "1717171717000000001");
        assert_eq!(row_vector(&item), vec![0.5, 0.25]);

        let payload = row_payload(&item);
        assert_eq!(payload.len(), 2);
        assert_eq!(payload["text"], json!("Standup moved to 10am"));
    }

    #[test]
    fn test_non_numeric_id_rejected() {
        tokio_test::assert_ok!(parse_id("42"));
        assert!(matches!(
            parse_id("abc"),
            Err(StrataError::Validation { .. })
        ));
    }

    #[test]
    fn test_cosine_distance_is_similarity() {
        let store = MilvusVectorStore::new(&VectorStoreConfig::default()).unwrap();
        assert!((store.score(0.9) - 0.9).abs() < f32::EPSILON);

        let _ = store.metric.set(DistanceMetric::Euclidean);
        assert!((store.score(1.0) - 0.5).abs() < f32::EPSILON);
    }
}
