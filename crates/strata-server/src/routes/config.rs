//! Configuration endpoint.

use axum::{extract::State, Json};

use strata_core::config::StrataConfig;

use crate::state::AppState;

/// Active configuration, without credentials.
/// GET /config
pub async fn get_config(State(state): State<AppState>) -> Json<StrataConfig> {
    Json(state.redacted_config())
}
