//! Shared fakes for strata-core integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use strata_core::stores::{InMemoryShortTermStore, InMemoryVectorStore, SemanticStore};
use strata_core::traits::{Embedder, EmbeddingAction, ImportanceOracle, LongTermStore, ShortTermStore};
use strata_core::{
    LongTermDocument, Metadata, MetadataFilter, SearchMatch, StrataError, StrataResult,
    TierConfig, TieredMemory,
};

/// Oracle whose scores are set per text by the test.
pub struct ScriptedOracle {
    scores: Mutex<HashMap<String, Result<f64, String>>>,
    default_score: f64,
    delay: Option<Duration>,
    pub score_calls: AtomicUsize,
    pub summarize_calls: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new(default_score: f64) -> Self {
        Self {
            scores: Mutex::new(HashMap::new()),
            default_score,
            delay: None,
            score_calls: AtomicUsize::new(0),
            summarize_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set(&self, text: &str, score: f64) {
        self.scores
            .lock()
            .unwrap()
            .insert(text.to_string(), Ok(score));
    }

    pub fn fail(&self, text: &str, message: &str) {
        self.scores
            .lock()
            .unwrap()
            .insert(text.to_string(), Err(message.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.score_calls.load(Ordering::SeqCst)
    }
}

/// Prefix the scripted oracle puts on every summary.
pub const SUMMARY_PREFIX: &str = "Summary: ";

#[async_trait]
impl ImportanceOracle for ScriptedOracle {
    async fn score(&self, text: &str) -> StrataResult<f64> {
        self.score_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self.scores.lock().unwrap().get(text).cloned();
        match scripted {
            Some(Ok(score)) => Ok(score),
            Some(Err(message)) => Err(StrataError::scoring(message)),
            None => Ok(self.default_score),
        }
    }

    async fn summarize(&self, text: &str) -> StrataResult<String> {
        self.summarize_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{SUMMARY_PREFIX}{text}"))
    }
}

/// Hashes lowercase words into a fixed number of buckets.
pub struct BagOfWordsEmbedder {
    dims: usize,
}

impl BagOfWordsEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }
}

#[async_trait]
impl Embedder for BagOfWordsEmbedder {
    async fn embed(&self, text: &str, _action: Option<EmbeddingAction>) -> StrataResult<Vec<f32>> {
        let mut vector = vec![0.0; self.dims];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let hash = word
                .to_lowercase()
                .bytes()
                .fold(2166136261u32, |h, b| (h ^ b as u32).wrapping_mul(16777619));
            vector[hash as usize % self.dims] += 1.0;
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dims
    }

    fn model_name(&self) -> &str {
        "bag-of-words"
    }
}

/// Short-term store that can be told to fail individual operations.
#[derive(Default)]
pub struct FlakyShortTerm {
    pub inner: InMemoryShortTermStore,
    pub fail_get: AtomicBool,
    pub fail_keys: AtomicBool,
    pub fail_incr: AtomicBool,
    pub fail_delete: AtomicBool,
}

fn unavailable() -> StrataError {
    StrataError::short_term("connection reset by peer")
}

#[async_trait]
impl ShortTermStore for FlakyShortTerm {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StrataResult<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> StrataResult<Option<String>> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.get(key).await
    }

    async fn ttl(&self, key: &str) -> StrataResult<Option<Duration>> {
        self.inner.ttl(key).await
    }

    async fn keys(&self) -> StrataResult<Vec<String>> {
        if self.fail_keys.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.keys().await
    }

    async fn delete(&self, key: &str) -> StrataResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.delete(key).await
    }

    async fn incr_access_count(&self, key: &str, delta: u64) -> StrataResult<u64> {
        if self.fail_incr.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.incr_access_count(key, delta).await
    }

    async fn get_access_count(&self, key: &str) -> StrataResult<u64> {
        self.inner.get_access_count(key).await
    }
}

/// Long-term store wrapper that can fail search or enumeration.
pub struct FlakyLongTerm {
    pub inner: SemanticStore,
    pub fail_search: AtomicBool,
    pub fail_enumerate: AtomicBool,
}

#[async_trait]
impl LongTermStore for FlakyLongTerm {
    async fn insert(&self, text: &str, metadata: Metadata) -> StrataResult<String> {
        self.inner.insert(text, metadata).await
    }

    async fn search(
        &self,
        query: &str,
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> StrataResult<Vec<SearchMatch>> {
        if self.fail_search.load(Ordering::SeqCst) {
            return Err(StrataError::long_term("vector index offline"));
        }
        self.inner.search(query, top_k, filter).await
    }

    async fn enumerate(&self, offset: usize, limit: usize) -> StrataResult<Vec<LongTermDocument>> {
        if self.fail_enumerate.load(Ordering::SeqCst) {
            return Err(StrataError::long_term("vector index offline"));
        }
        self.inner.enumerate(offset, limit).await
    }

    async fn delete_by_id(&self, id: &str) -> StrataResult<()> {
        self.inner.delete_by_id(id).await
    }
}

/// A controller wired to in-memory stores, with handles on each part.
pub struct Harness {
    pub memory: Arc<TieredMemory>,
    pub oracle: Arc<ScriptedOracle>,
    pub short_term: Arc<FlakyShortTerm>,
    pub long_term: Arc<FlakyLongTerm>,
}

impl Harness {
    pub async fn new(config: TierConfig, oracle: ScriptedOracle) -> Self {
        let oracle = Arc::new(oracle);
        let short_term = Arc::new(FlakyShortTerm::default());

        let semantic = SemanticStore::new(
            Arc::new(BagOfWordsEmbedder::new(256)),
            Arc::new(InMemoryVectorStore::new("strata_test")),
        );
        semantic.initialize().await.unwrap();
        let long_term = Arc::new(FlakyLongTerm {
            inner: semantic,
            fail_search: AtomicBool::new(false),
            fail_enumerate: AtomicBool::new(false),
        });

        let memory = Arc::new(
            TieredMemory::new(config, oracle.clone(), short_term.clone(), long_term.clone())
                .unwrap(),
        );

        Self {
            memory,
            oracle,
            short_term,
            long_term,
        }
    }

    pub async fn short_term_keys(&self) -> Vec<String> {
        self.short_term.inner.keys().await.unwrap()
    }

    pub async fn long_term_docs(&self) -> Vec<LongTermDocument> {
        self.long_term.inner.enumerate(0, 1000).await.unwrap()
    }
}
