//! Error types for strata operations.
//!
//! The controller surfaces a small taxonomy to callers: scoring failures,
//! unavailable stores and failed long-term retrieval. Provider-level errors
//! (LLM, embedding) are folded into that taxonomy at the controller boundary.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Result type alias for strata operations.
pub type StrataResult<T> = Result<T, StrataError>;

/// Which storage tier an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StoreKind {
    ShortTerm,
    LongTerm,
}

/// Main error type for all strata operations.
#[derive(Error, Debug)]
pub enum StrataError {
    /// The importance oracle failed or produced unusable output.
    #[error("Scoring error: {message}")]
    Scoring {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A backing store could not be reached or rejected the operation.
    #[error("{store} store unavailable: {message}")]
    StoreUnavailable {
        store: StoreKind,
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Long-term semantic search failed.
    #[error("Retrieval error: {message}")]
    Retrieval {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// LLM operation failed.
    #[error("LLM error: {message}")]
    Llm {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Embedding generation failed.
    #[error("Embedding error: {message}")]
    Embedding {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation { message: String, code: ErrorCode },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Provider not supported.
    #[error("Provider not supported: {provider}")]
    UnsupportedProvider { provider: String },

    /// Parse error.
    #[error("Parse error: {message}")]
    Parse { message: String, code: ErrorCode },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Scoring (SCORE_xxx)
    ScoreOracleFailed,
    ScoreInvalidOutput,
    ScoreOutOfRange,
    ScoreSummarizeFailed,

    // Stores (STORE_xxx)
    StoreConnectionFailed,
    StoreOperationFailed,
    StoreTimeout,

    // Retrieval (RET_xxx)
    RetSearchFailed,
    RetTimeout,

    // LLM (LLM_xxx)
    LlmConnectionFailed,
    LlmGenerationFailed,
    LlmInvalidResponse,

    // Embedding (EMB_xxx)
    EmbConnectionFailed,
    EmbGenerationFailed,

    // Validation (VAL_xxx)
    ValInvalidInput,
    ValMissingField,

    // Parse (PARSE_xxx)
    ParseInvalidJson,
    ParseInvalidNumber,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ScoreOracleFailed => "SCORE_001",
            ErrorCode::ScoreInvalidOutput => "SCORE_002",
            ErrorCode::ScoreOutOfRange => "SCORE_003",
            ErrorCode::ScoreSummarizeFailed => "SCORE_004",
            ErrorCode::StoreConnectionFailed => "STORE_001",
            ErrorCode::StoreOperationFailed => "STORE_002",
            ErrorCode::StoreTimeout => "STORE_003",
            ErrorCode::RetSearchFailed => "RET_001",
            ErrorCode::RetTimeout => "RET_002",
            ErrorCode::LlmConnectionFailed => "LLM_001",
            ErrorCode::LlmGenerationFailed => "LLM_002",
            ErrorCode::LlmInvalidResponse => "LLM_003",
            ErrorCode::EmbConnectionFailed => "EMB_001",
            ErrorCode::EmbGenerationFailed => "EMB_002",
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValMissingField => "VAL_002",
            ErrorCode::ParseInvalidJson => "PARSE_001",
            ErrorCode::ParseInvalidNumber => "PARSE_002",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl StrataError {
    /// Create a scoring error.
    pub fn scoring(message: impl Into<String>) -> Self {
        Self::Scoring {
            message: message.into(),
            code: ErrorCode::ScoreOracleFailed,
            source: None,
        }
    }

    /// Create a scoring error with a specific code.
    pub fn scoring_with_code(message: impl Into<String>, code: ErrorCode) -> Self {
        Self::Scoring {
            message: message.into(),
            code,
            source: None,
        }
    }

    /// Create a store-unavailable error for the given tier.
    pub fn store(store: StoreKind, message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            store,
            message: message.into(),
            code: ErrorCode::StoreOperationFailed,
            source: None,
        }
    }

    /// Shorthand for a short-term store error.
    pub fn short_term(message: impl Into<String>) -> Self {
        Self::store(StoreKind::ShortTerm, message)
    }

    /// Shorthand for a long-term store error.
    pub fn long_term(message: impl Into<String>) -> Self {
        Self::store(StoreKind::LongTerm, message)
    }

    /// Create a retrieval error.
    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::Retrieval {
            message: message.into(),
            code: ErrorCode::RetSearchFailed,
            source: None,
        }
    }

    /// Create an LLM error.
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm {
            message: message.into(),
            code: ErrorCode::LlmGenerationFailed,
            source: None,
        }
    }

    /// Create an embedding error.
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding {
            message: message.into(),
            code: ErrorCode::EmbGenerationFailed,
            source: None,
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            code: ErrorCode::ParseInvalidJson,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Fold any error raised while scoring or summarizing into `Scoring`.
    pub fn into_scoring(self, code: ErrorCode) -> Self {
        match self {
            err @ Self::Scoring { .. } => err,
            other => Self::Scoring {
                message: other.to_string(),
                code,
                source: Some(Box::new(other)),
            },
        }
    }

    /// Fold any error raised by a long-term search into `Retrieval`.
    pub fn into_retrieval(self) -> Self {
        match self {
            err @ Self::Retrieval { .. } => err,
            other => Self::Retrieval {
                message: other.to_string(),
                code: ErrorCode::RetSearchFailed,
                source: Some(Box::new(other)),
            },
        }
    }

    /// Fold any error raised by a store call into `StoreUnavailable`.
    pub fn into_store(self, store: StoreKind) -> Self {
        match self {
            err @ Self::StoreUnavailable { .. } => err,
            other => Self::StoreUnavailable {
                store,
                message: other.to_string(),
                code: ErrorCode::StoreOperationFailed,
                source: Some(Box::new(other)),
            },
        }
    }

    /// The error produced when an external call exceeds its deadline.
    pub fn timeout(kind: TimeoutKind, after: std::time::Duration) -> Self {
        let message = format!("timed out after {}ms", after.as_millis());
        match kind {
            TimeoutKind::Oracle => Self::Scoring {
                message,
                code: ErrorCode::ScoreOracleFailed,
                source: None,
            },
            TimeoutKind::Store(store) => Self::StoreUnavailable {
                store,
                message,
                code: ErrorCode::StoreTimeout,
                source: None,
            },
            TimeoutKind::Search => Self::Retrieval {
                message,
                code: ErrorCode::RetTimeout,
                source: None,
            },
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Scoring { code, .. } => *code,
            Self::StoreUnavailable { code, .. } => *code,
            Self::Retrieval { code, .. } => *code,
            Self::Llm { code, .. } => *code,
            Self::Embedding { code, .. } => *code,
            Self::Validation { code, .. } => *code,
            Self::Parse { code, .. } => *code,
            _ => ErrorCode::Internal,
        }
    }

    /// Whether this error came from the importance oracle.
    pub fn is_scoring(&self) -> bool {
        matches!(self, Self::Scoring { .. })
    }
}

/// The kind of external call that timed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutKind {
    Oracle,
    Store(StoreKind),
    Search,
}
