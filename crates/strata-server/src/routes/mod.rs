//! Route definitions for the REST API.

mod config;
mod generate;
mod health;
mod memory;
mod sweep;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/", get(health::welcome))
        .route("/health", get(health::health_check))
        // Tiered memory
        .route("/process", post(memory::process))
        .route("/query", post(memory::query))
        .route("/inspect", get(memory::inspect))
        // Consolidation
        .route("/sweep", post(sweep::run_sweep))
        // Configuration
        .route("/config", get(config::get_config))
        // Pass-through generation
        .route("/generate", post(generate::generate))
        // Attach state
        .with_state(state)
}

pub use config::*;
pub use generate::*;
pub use health::*;
pub use memory::*;
pub use sweep::*;
