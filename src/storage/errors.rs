//! Storage collaborator errors
//!
//! Storage failures are opaque to clients: the gateway logs them and answers
//! with a plain 500. Nothing here is retried.

use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Failure of an underlying storage call
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// The backend reported a failure
    #[error("storage backend failure: {0}")]
    Backend(String),

    /// In-process store lock was poisoned by a panicking writer
    #[error("storage lock poisoned")]
    LockPoisoned,
}
