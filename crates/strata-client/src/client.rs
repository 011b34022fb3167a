//! HTTP client for a running strata server.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use strata_core::error::{StoreKind, StrataError, StrataResult};
use strata_core::types::{PlacementResult, QueryResult, ShortTermEntry};
use strata_core::{SweepReport, SweepState};

const DEFAULT_BASE_URL: &str = "http://localhost:5001";

/// Client for the strata HTTP API.
#[derive(Debug, Clone)]
pub struct StrataClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

/// Server status reported by `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub sweep_state: SweepState,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(default)]
    details: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl StrataClient {
    /// Create a client for the server at `base_url`.
    pub fn new(base_url: &str) -> StrataResult<Self> {
        let base_url = base_url.trim_end_matches('/');
        if base_url.is_empty() {
            return Err(StrataError::Configuration(
                "strata base URL must not be empty".to_string(),
            ));
        }

        Ok(Self {
            client: Client::new(),
            base_url: base_url.to_string(),
            api_key: None,
        })
    }

    /// Create a client from `STRATA_URL` and `STRATA_API_KEY`.
    pub fn from_env() -> StrataResult<Self> {
        let base_url =
            std::env::var("STRATA_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let client = Self::new(&base_url)?;

        Ok(match std::env::var("STRATA_API_KEY") {
            Ok(key) if !key.is_empty() => client.with_api_key(key),
            _ => client,
        })
    }

    /// Send `key` as a bearer token on every request.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute(&self, request: RequestBuilder, op: &str) -> StrataResult<Response> {
        let request = match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        };

        tracing::debug!(op, "Sending strata request");

        request
            .send()
            .await
            .map_err(|e| StrataError::internal(format!("Failed to {}: {}", op, e)))
    }

    /// Score an item and store it in the tier its importance earns.
    pub async fn process(&self, text: &str) -> StrataResult<PlacementResult> {
        let request = self.client.post(self.url("/process")).json(&json!({ "input": text }));
        let response = self.execute(request, "process item").await?;
        read_json(response, "process item").await
    }

    /// Look up an item, short-term first then long-term.
    ///
    /// `top_k` overrides the server's configured number of long-term matches.
    pub async fn query(&self, text: &str, top_k: Option<usize>) -> StrataResult<QueryResult> {
        let mut body = json!({ "query": text });
        if let Some(k) = top_k {
            body["top_k"] = json!(k);
        }

        let request = self.client.post(self.url("/query")).json(&body);
        let response = self.execute(request, "query").await?;
        read_json(response, "query").await
    }

    /// Remaining lifetime and access count of a short-term item.
    ///
    /// Returns `None` when the item is not in the short-term tier.
    pub async fn inspect(&self, text: &str) -> StrataResult<Option<ShortTermEntry>> {
        let request = self
            .client
            .get(self.url("/inspect"))
            .query(&[("text", text)]);
        let response = self.execute(request, "inspect item").await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_json(response, "inspect item").await.map(Some)
    }

    /// Run a consolidation sweep now.
    ///
    /// Returns `None` when the server skipped it because a sweep was already
    /// running.
    pub async fn sweep(&self) -> StrataResult<Option<SweepReport>> {
        let request = self.client.post(self.url("/sweep"));
        let response = self.execute(request, "run sweep").await?;

        if response.status() == StatusCode::CONFLICT {
            tracing::info!("Sweep skipped by server");
            return Ok(None);
        }
        read_json(response, "run sweep").await.map(Some)
    }

    pub async fn health(&self) -> StrataResult<HealthStatus> {
        let request = self.client.get(self.url("/health"));
        let response = self.execute(request, "check health").await?;
        read_json(response, "check health").await
    }

    /// Forward a prompt to the server's model.
    pub async fn generate(&self, prompt: &str) -> StrataResult<String> {
        let request = self
            .client
            .post(self.url("/generate"))
            .json(&json!({ "prompt": prompt }));
        let response = self.execute(request, "generate").await?;
        let result: GenerateResponse = read_json(response, "generate").await?;
        Ok(result.response)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response, op: &str) -> StrataResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(api_error(status, &body, op));
    }

    response
        .json()
        .await
        .map_err(|e| StrataError::parse(format!("Failed to parse {} response: {}", op, e)))
}

/// Rebuild a [`StrataError`] from the server's error envelope.
fn api_error(status: StatusCode, body: &str, op: &str) -> StrataError {
    if status == StatusCode::UNAUTHORIZED {
        return StrataError::Configuration(format!("Failed to {}: invalid or missing API key", op));
    }

    let Ok(ErrorEnvelope { error }) = serde_json::from_str::<ErrorEnvelope>(body) else {
        return StrataError::internal(format!("Failed to {}: HTTP {}: {}", op, status, body));
    };

    let message = error.message;
    match error.code.as_str() {
        "SCORING_ERROR" => StrataError::scoring(message),
        "RETRIEVAL_ERROR" => StrataError::retrieval(message),
        "LLM_ERROR" => StrataError::llm(message),
        "EMBEDDING_ERROR" => StrataError::embedding(message),
        "BAD_REQUEST" | "VALIDATION_ERROR" => StrataError::validation(message),
        "STORE_UNAVAILABLE" => {
            let store = error
                .details
                .as_ref()
                .and_then(|d| d["store"].as_str())
                .and_then(|s| s.parse::<StoreKind>().ok());
            match store {
                Some(store) => StrataError::store(store, message),
                None => StrataError::internal(message),
            }
        }
        code => StrataError::internal(format!("Failed to {}: {} ({})", op, message, code)),
    }
}
