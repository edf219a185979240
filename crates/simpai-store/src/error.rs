//! Store error types.

use thiserror::Error;

/// Errors from key-value store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be opened or created.
    #[error("Failed to open store: {0}")]
    Open(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// A stored document is not valid JSON or does not match the expected shape.
    #[error("Corrupt record {store}/{id}: {reason}")]
    Corrupt {
        store: String,
        id: String,
        reason: String,
    },

    /// A value could not be serialized for storage.
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),
}
