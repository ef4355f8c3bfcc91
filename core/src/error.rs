//! Error types for the storage layer.
//!
//! # Design
//! Storage failures and payload validation failures are separate types.
//! Validation runs before any repository call, so a `ValidationError` means
//! the store was never reached. "Not found" is not an error here: lookups
//! return `Option` and mutations return `bool`.

/// Errors returned by `TodoRepository` implementations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The identifier is not a 24-character hex ObjectId.
    #[error("invalid todo id: {0}")]
    InvalidId(String),

    /// The store did not acknowledge a write.
    #[error("{0}")]
    NotAcknowledged(String),

    /// The backing store or its driver failed.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn not_acknowledged(msg: impl Into<String>) -> Self {
        Self::NotAcknowledged(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

impl From<mongodb::error::Error> for StorageError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

/// A request payload that cannot become a `NewTodo` or `TodoChanges`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),
}
