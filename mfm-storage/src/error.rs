//! Error types for the storage layer.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Version not present in the store.
    #[error("version not found: {0}")]
    NotFound(String),

    /// A stored row could not be turned back into a record.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The backend refused the write (used by custom stores).
    #[error("write rejected: {0}")]
    Rejected(String),
}
