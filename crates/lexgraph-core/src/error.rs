//! Error types for lexgraph operations.
//!
//! Most graph-facing operations are best-effort and never surface these
//! errors (extraction failures degrade to empty results, lookups of unknown
//! ids return not-found values). The errors below are reserved for the
//! places where a caller has to know something went wrong: snapshot writes,
//! configuration, explicit ingestion inputs and provider calls.

use thiserror::Error;

/// Result type alias for lexgraph operations.
pub type LexGraphResult<T> = Result<T, LexGraphError>;

/// Main error type for all lexgraph operations.
#[derive(Error, Debug)]
pub enum LexGraphError {
    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        suggestion: Option<String>,
    },

    /// LLM operation failed.
    #[error("LLM error: {message}")]
    Llm {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Graph store operation failed.
    #[error("Graph store error: {message}")]
    GraphStore {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Snapshot database operation failed.
    #[error("Database error: {message}")]
    Database {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Decision-maker failed or is unavailable.
    #[error("Decision error: {message}")]
    Decision { message: String, code: ErrorCode },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network error.
    #[error("Network error: {message}")]
    Network {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Document could not be loaded.
    #[error("Document error: {message}")]
    Document { message: String, code: ErrorCode },

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
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation (VAL_xxx)
    ValInvalidInput,

    // LLM (LLM_xxx)
    LlmConnectionFailed,
    LlmGenerationFailed,
    LlmInvalidResponse,

    // Graph (GRP_xxx)
    GrpSnapshotCorrupted,

    // Database (DB_xxx)
    DbOperationFailed,

    // Decision (DEC_xxx)
    DecFailed,

    // Network (NET_xxx)
    NetTimeout,
    NetConnectionFailed,

    // Document (DOC_xxx)
    DocNotFound,
    DocUnsupported,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::LlmConnectionFailed => "LLM_001",
            ErrorCode::LlmGenerationFailed => "LLM_002",
            ErrorCode::LlmInvalidResponse => "LLM_003",
            ErrorCode::GrpSnapshotCorrupted => "GRP_002",
            ErrorCode::DbOperationFailed => "DB_002",
            ErrorCode::DecFailed => "DEC_002",
            ErrorCode::NetTimeout => "NET_001",
            ErrorCode::NetConnectionFailed => "NET_002",
            ErrorCode::DocNotFound => "DOC_001",
            ErrorCode::DocUnsupported => "DOC_002",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl LexGraphError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            suggestion: None,
        }
    }

    /// Create a validation error with suggestion.
    pub fn validation_with_suggestion(
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            suggestion: Some(suggestion.into()),
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

    /// Create an error for an inference request that never got a response.
    pub fn llm_connection(message: impl Into<String>) -> Self {
        Self::Llm {
            message: message.into(),
            code: ErrorCode::LlmConnectionFailed,
            source: None,
        }
    }

    /// Create an error for an inference response that could not be decoded.
    pub fn llm_invalid_response(message: impl Into<String>) -> Self {
        Self::Llm {
            message: message.into(),
            code: ErrorCode::LlmInvalidResponse,
            source: None,
        }
    }

    /// Create a corrupted-snapshot error.
    pub fn snapshot_corrupted(message: impl Into<String>) -> Self {
        Self::GraphStore {
            message: message.into(),
            code: ErrorCode::GrpSnapshotCorrupted,
            source: None,
        }
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            code: ErrorCode::DbOperationFailed,
            source: None,
        }
    }

    /// Create a decision error.
    pub fn decision(message: impl Into<String>) -> Self {
        Self::Decision {
            message: message.into(),
            code: ErrorCode::DecFailed,
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            code: ErrorCode::NetConnectionFailed,
            source: None,
        }
    }

    /// Create a network timeout error.
    pub fn network_timeout(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            code: ErrorCode::NetTimeout,
            source: None,
        }
    }

    /// Create a document-not-found error.
    pub fn document_not_found(path: impl Into<String>) -> Self {
        Self::Document {
            message: format!("Document '{}' not found", path.into()),
            code: ErrorCode::DocNotFound,
        }
    }

    /// Create a document error for unreadable or unsupported content.
    pub fn document(message: impl Into<String>) -> Self {
        Self::Document {
            message: message.into(),
            code: ErrorCode::DocUnsupported,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { code, .. } => *code,
            Self::Llm { code, .. } => *code,
            Self::GraphStore { code, .. } => *code,
            Self::Database { code, .. } => *code,
            Self::Decision { code, .. } => *code,
            Self::Network { code, .. } => *code,
            Self::Document { code, .. } => *code,
            _ => ErrorCode::Internal,
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Validation { suggestion, .. } => suggestion.as_deref(),
            Self::Llm { .. } => Some("Please check your inference provider configuration and API key"),
            Self::Database { .. } => Some("Please check that the graph directory is writable"),
            Self::Document { code: ErrorCode::DocNotFound, .. } => {
                Some("Please check the path and ensure the document exists")
            }
            Self::Network { .. } => Some("Please check the URL and your network connection"),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for LexGraphError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database {
            message: err.to_string(),
            code: ErrorCode::DbOperationFailed,
            source: Some(Box::new(err)),
        }
    }
}
