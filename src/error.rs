//! Error types for the cache tiers
//!
//! Provides unified error handling using thiserror. These errors never cross
//! the public cache boundary: the disk tier folds them into misses and logs them.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified internal error type for cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The persistent box has not been opened yet (or was closed)
    #[error("Cache box '{0}' is not open")]
    NotOpen(String),

    /// Underlying SQLite failure
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Envelope could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Caller-supplied codec rejected a value
    #[error("Codec error: {0}")]
    Codec(String),

    /// Filesystem failure while preparing the cache directory
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking storage task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(String),

    /// Internal invariant failure (e.g. a poisoned lock)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<tokio::task::JoinError> for CacheError {
    fn from(err: tokio::task::JoinError) -> Self {
        CacheError::Task(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache internals.
pub type Result<T> = std::result::Result<T, CacheError>;
