//! HTTP-level tests against in-memory stores.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use secrecy::SecretString;
use serde_json::{json, Value};
use tower::ServiceExt;

use strata_core::config::StrataConfig;
use strata_core::stores::{InMemoryShortTermStore, InMemoryVectorStore, SemanticStore};
use strata_core::traits::{
    Embedder, EmbeddingAction, GenerationOptions, ImportanceOracle, Llm, LlmResponse,
};
use strata_core::types::Message;
use strata_core::{StrataError, StrataResult, SweepScheduler, TierConfig, TieredMemory};
use strata_server::{create_server, AppState};

struct FixedOracle {
    scores: HashMap<String, f64>,
}

#[async_trait]
impl ImportanceOracle for FixedOracle {
    async fn score(&self, text: &str) -> StrataResult<f64> {
        if text == "break the oracle" {
            return Err(StrataError::scoring("oracle offline"));
        }
        Ok(self.scores.get(text).copied().unwrap_or(20.0))
    }

    async fn summarize(&self, text: &str) -> StrataResult<String> {
        Ok(format!("Summary: {}", text))
    }
}

/// Letter-frequency vectors, enough to separate the test texts.
struct LetterEmbedder;

#[async_trait]
impl Embedder for LetterEmbedder {
    async fn embed(&self, text: &str, _action: Option<EmbeddingAction>) -> StrataResult<Vec<f32>> {
        let mut vector = vec![0.0; 26];
        for c in text.chars().filter(|c| c.is_ascii_alphabetic()) {
            vector[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        26
    }

    fn model_name(&self) -> &str {
        "letters"
    }
}

struct EchoLlm;

#[async_trait]
impl Llm for EchoLlm {
    async fn generate(
        &self,
        messages: &[Message],
        _options: Option<GenerationOptions>,
    ) -> StrataResult<LlmResponse> {
        let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        Ok(LlmResponse::text(format!("echo: {}", last)))
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}

async fn test_app(api_key: Option<&str>) -> Router {
    let mut scores = HashMap::new();
    scores.insert("Alan Turing founded computer science".to_string(), 95.0);

    let long_term = SemanticStore::new(
        Arc::new(LetterEmbedder),
        Arc::new(InMemoryVectorStore::new("api_test")),
    );
    long_term.initialize().await.unwrap();

    let memory = Arc::new(
        TieredMemory::new(
            TierConfig::default(),
            Arc::new(FixedOracle { scores }),
            Arc::new(InMemoryShortTermStore::new()),
            Arc::new(long_term),
        )
        .unwrap(),
    );
    let scheduler = SweepScheduler::new(memory.clone()).await.unwrap();

    let mut config = StrataConfig::default();
    config.llm.config.api_key = Some("sk-secret".to_string());

    let state = AppState::new(memory, Arc::new(EchoLlm), scheduler.handle(), config);
    create_server(state, api_key.map(|k| SecretString::new(k.to_string())))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_welcome_and_health() {
    let app = test_app(None).await;

    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("Welcome"));

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sweep_state"], "idle");
}

#[tokio::test]
async fn test_process_then_query_short_term() {
    let app = test_app(None).await;

    let (status, body) = send(&app, "POST", "/process", Some(json!({"input": "I just had a coffee"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"tier": "short_term", "ttl_seconds": 20, "importance_score": 20.0}));

    let (status, body) = send(&app, "POST", "/query", Some(json!({"query": "I just had a coffee"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"source": "short_term", "result": "stored"}));

    let (status, body) = send(&app, "GET", "/inspect?text=I%20just%20had%20a%20coffee", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["access_count"], 1);
}

#[tokio::test]
async fn test_important_item_goes_long_term() {
    let app = test_app(None).await;

    let (status, body) = send(
        &app,
        "POST",
        "/process",
        Some(json!({"input": "Alan Turing founded computer science"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tier"], "long_term");

    let (status, body) = send(&app, "POST", "/query", Some(json!({"query": "Who was Alan Turing?", "top_k": 1}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "long_term");
    assert_eq!(body["used_data"], "Alan Turing founded computer science");
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_empty_answer_is_ok() {
    let app = test_app(None).await;

    let (status, body) = send(&app, "POST", "/query", Some(json!({"query": "nothing stored yet"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"source": "none"}));

    let (status, _) = send(&app, "GET", "/inspect?text=unknown", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_fields_are_bad_requests() {
    let app = test_app(None).await;

    let (status, body) = send(&app, "POST", "/process", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "No input provided");

    let (status, _) = send(&app, "POST", "/generate", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_scoring_failure_maps_to_bad_gateway() {
    let app = test_app(None).await;

    let (status, body) = send(&app, "POST", "/process", Some(json!({"input": "break the oracle"}))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "SCORING_ERROR");
}

#[tokio::test]
async fn test_sweep_returns_report() {
    let app = test_app(None).await;

    let (status, body) = send(&app, "POST", "/sweep", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["promoted"], 0);
    assert_eq!(body["pruned"], 0);
}

#[tokio::test]
async fn test_generate_and_redacted_config() {
    let app = test_app(None).await;

    let (status, body) = send(&app, "POST", "/generate", Some(json!({"prompt": "hello"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "echo: hello");

    let (status, body) = send(&app, "GET", "/config", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tiers"]["importance_threshold"], 70.0);
    assert!(body["llm"]["api_key"].is_null());
}

#[tokio::test]
async fn test_api_key_required_when_configured() {
    let app = test_app(Some("letmein")).await;

    let (status, _) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/health")
        .header(header::AUTHORIZATION, "Bearer letmein")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
