//! Process-local brute-force vector store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{StrataError, StrataResult};
use crate::traits::{
    matches_filter, DistanceMetric, VectorRecord, VectorSearchResult, VectorStore,
};
use crate::types::MetadataFilter;

/// Exhaustive-scan [`VectorStore`] kept in memory. Records list in
/// insertion order.
pub struct InMemoryVectorStore {
    collection_name: String,
    distance: RwLock<DistanceMetric>,
    dimension: RwLock<Option<usize>>,
    records: RwLock<Vec<VectorRecord>>,
}

impl InMemoryVectorStore {
    pub fn new(collection_name: impl Into<String>) -> Self {
        Self {
            collection_name: collection_name.into(),
            distance: RwLock::new(DistanceMetric::Cosine),
            dimension: RwLock::new(None),
            records: RwLock::new(Vec::new()),
        }
    }
}

fn similarity(metric: DistanceMetric, a: &[f32], b: &[f32]) -> f32 {
    match metric {
        DistanceMetric::Cosine => cosine_similarity(a, b),
        DistanceMetric::DotProduct => a.iter().zip(b).map(|(x, y)| x * y).sum(),
        DistanceMetric::Euclidean => {
            let dist: f32 = a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum::<f32>().sqrt();
            1.0 / (1.0 + dist)
        }
    }
}

/// Cosine similarity, 0 when either vector is all zeros.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(
        &self,
        dimension: usize,
        distance: DistanceMetric,
    ) -> StrataResult<()> {
        *self.dimension.write().await = Some(dimension);
        *self.distance.write().await = distance;
        Ok(())
    }

    async fn insert(&self, records: Vec<VectorRecord>) -> StrataResult<()> {
        if let Some(dimension) = *self.dimension.read().await {
            if let Some(bad) = records.iter().find(|r| r.vector.len() != dimension) {
                return Err(StrataError::validation(format!(
                    "vector for '{}' has {} dimensions, expected {}",
                    bad.id,
                    bad.vector.len(),
                    dimension
                )));
            }
        }

        let mut stored = self.records.write().await;
        for record in records {
            match stored.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => *existing = record,
                None => stored.push(record),
            }
        }
        Ok(())
    }

    async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
        filter: Option<&MetadataFilter>,
    ) -> StrataResult<Vec<VectorSearchResult>> {
        let metric = *self.distance.read().await;
        let records = self.records.read().await;

        let mut results: Vec<VectorSearchResult> = records
            .iter()
            .filter(|r| matches_filter(&r.payload, filter))
            .map(|r| VectorSearchResult {
                id: r.id.clone(),
                score: similarity(metric, query_vector, &r.vector),
                payload: r.payload.clone(),
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(limit);
        Ok(results)
    }

    async fn list(
        &self,
        filter: Option<&MetadataFilter>,
        offset: usize,
        limit: Option<usize>,
    ) -> StrataResult<Vec<VectorRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| matches_filter(&r.payload, filter))
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: &str) -> StrataResult<()> {
        self.records.write().await.retain(|r| r.id != id);
        Ok(())
    }

    fn collection_name(&self) -> &str {
        &self.collection_name
    }
}
