//! Error handling for the REST API server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

use strata_core::error::StrataError;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    // Common error constructors
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "CONFLICT", message)
    }

    pub fn bad_gateway(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, code, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() || self.status == StatusCode::BAD_GATEWAY {
            tracing::warn!(status = %self.status, code = %self.code, "{}", self.message);
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<StrataError> for ApiError {
    fn from(err: StrataError) -> Self {
        let details = serde_json::json!({ "error_code": err.code().as_str() });
        let message = err.to_string();

        let api = match err {
            StrataError::Scoring { .. } => ApiError::bad_gateway("SCORING_ERROR", message),
            StrataError::StoreUnavailable { store, .. } => {
                ApiError::unavailable(message).with_details(serde_json::json!({
                    "error_code": details["error_code"],
                    "store": store.to_string(),
                }))
            }
            StrataError::Retrieval { .. } => ApiError::bad_gateway("RETRIEVAL_ERROR", message),
            StrataError::Llm { .. } => ApiError::bad_gateway("LLM_ERROR", message),
            StrataError::Embedding { .. } => ApiError::bad_gateway("EMBEDDING_ERROR", message),
            StrataError::Validation { .. } => ApiError::validation(message),
            StrataError::Configuration(msg) => ApiError::bad_request(msg),
            StrataError::UnsupportedProvider { provider } => {
                ApiError::bad_request(format!("Unsupported provider: {}", provider))
            }
            StrataError::Parse { .. }
            | StrataError::Io(_)
            | StrataError::Serialization(_)
            | StrataError::Internal(_) => ApiError::internal(message),
        };

        if api.details.is_some() {
            api
        } else {
            api.with_details(details)
        }
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
