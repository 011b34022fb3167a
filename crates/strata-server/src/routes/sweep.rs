//! Consolidation endpoint.

use axum::{extract::State, Json};

use strata_core::{SweepReport, SweepTrigger};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Run a consolidation sweep now.
/// POST /sweep
///
/// Returns 409 if a sweep is already running or the scheduler has stopped.
pub async fn run_sweep(State(state): State<AppState>) -> ApiResult<Json<SweepReport>> {
    match state.sweeps.run_now().await? {
        SweepTrigger::Completed(report) => Ok(Json(report)),
        SweepTrigger::Skipped => Err(ApiError::conflict(format!(
            "Sweep not started: scheduler is {}",
            state.sweeps.state()
        ))),
    }
}
