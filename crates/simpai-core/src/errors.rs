//! Cross-cutting error types for the SimpAI client.
//!
//! Domain-specific errors (`StoreError`, `ClientError`, `SessionError`) live
//! in their respective crates and converge in `simpai-cli` through `anyhow`.

use thiserror::Error;

/// Errors that can be raised by the core types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition for {action}: {from} -> {to}")]
    InvalidTransition {
        action: String,
        from: String,
        to: String,
    },

    /// A chat message was mutated after being marked complete.
    #[error("Message {id} is already complete")]
    MessageComplete { id: String },

    /// A persisted record violates its invariants.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// The file is not one of the accepted types for this artifact.
    #[error("Unsupported file type '{mime_type}' for {artifact}")]
    UnsupportedFileType { artifact: String, mime_type: String },

    /// Data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),
}
