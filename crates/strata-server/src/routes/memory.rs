//! Ingest, query and inspection endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use strata_core::types::{PlacementResult, QueryResult, ShortTermEntry};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Request body for ingesting an item.
#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    pub input: Option<String>,
}

/// Score an item and store it in the tier its importance earns.
/// POST /process
pub async fn process(
    State(state): State<AppState>,
    Json(request): Json<ProcessRequest>,
) -> ApiResult<Json<PlacementResult>> {
    let input = request
        .input
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("No input provided"))?;

    let placed = state.memory.ingest(&input).await?;
    Ok(Json(placed))
}

/// Request body for querying.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: Option<String>,
    /// Overrides the configured number of long-term matches.
    pub top_k: Option<usize>,
}

/// Look up an item, short-term first then long-term.
/// POST /query
///
/// An empty answer is `{"source": "none"}` with status 200.
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> ApiResult<Json<QueryResult>> {
    let text = request
        .query
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("No query provided"))?;

    let result = match request.top_k {
        Some(0) => return Err(ApiError::validation("top_k must be at least 1")),
        Some(top_k) => state.memory.query_with_top_k(&text, top_k).await?,
        None => state.memory.query(&text).await?,
    };
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct InspectParams {
    pub text: String,
}

/// Remaining lifetime and access count of a short-term item.
/// GET /inspect?text=
pub async fn inspect(
    State(state): State<AppState>,
    Query(params): Query<InspectParams>,
) -> ApiResult<Json<ShortTermEntry>> {
    state
        .memory
        .inspect(&params.text)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("No short-term entry for this text"))
}
