use thiserror::Error;

use crate::llm::LlmError;

/// Errors from repository operations (used by trait definitions in memoria-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors surfaced by the memory subsystem's public operations.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// No usable extraction model is configured.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The chat-completion call itself failed.
    #[error("upstream AI error: {0}")]
    Llm(#[from] LlmError),

    /// The model answered, but not with the JSON contract we asked for.
    #[error("malformed AI output: {0}")]
    MalformedOutput(String),

    #[error("memory not found")]
    NotFound,

    /// The memory exists but belongs to someone else.
    #[error("not authorized to access this memory")]
    Unauthorized,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("operation timed out")]
    Timeout,

    #[error("operation cancelled")]
    Cancelled,
}

impl From<RepositoryError> for MemoryError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => MemoryError::NotFound,
            other => MemoryError::Storage(other.to_string()),
        }
    }
}
