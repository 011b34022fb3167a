//! strata-server - REST API server for strata.
//!
//! # Example
//!
//! ```ignore
//! use strata_server::{create_runtime, create_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let runtime = create_runtime(StrataConfig::from_env()).await.unwrap();
//!     runtime.scheduler.start().await.unwrap();
//!
//!     let app = create_server(runtime.state, None);
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:5001").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod error;
pub mod factory;
pub mod middleware;
pub mod routes;
pub mod state;

use std::sync::Arc;

pub use error::{ApiError, ApiResult};
pub use factory::{create_runtime, Runtime};
pub use state::AppState;

use axum::{middleware as axum_middleware, Router};
use secrecy::SecretString;
use tower_http::trace::TraceLayer;

/// Create the server with all routes and middleware.
///
/// When `api_key` is set every request must carry it as a bearer token.
pub fn create_server(state: AppState, api_key: Option<SecretString>) -> Router {
    let router = routes::create_router(state);

    let router = match api_key {
        Some(key) => router.layer(axum_middleware::from_fn_with_state(
            Arc::new(key),
            middleware::auth_middleware,
        )),
        None => router,
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors_layer())
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
}
