//! Direct LLM generation endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use strata_core::types::Message;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub response: String,
}

/// Forward a prompt to the configured model.
/// POST /generate
pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> ApiResult<Json<GenerateResponse>> {
    let prompt = request
        .prompt
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("No prompt provided"))?;

    let response = state
        .llm
        .generate(&[Message::user(prompt)], None)
        .await?;

    Ok(Json(GenerateResponse {
        response: response.content_or_empty().to_string(),
    }))
}
