//! Session error types.

use simpai_client::{ClientError, StreamError};
use simpai_core::{ActionKind, CoreError};
use thiserror::Error;

/// Errors returned by session controller actions.
///
/// Every error is also reported to the session's
/// [`Notifier`](crate::Notifier) before it is returned.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Rejected before any network call: wrong file type, empty prompt,
    /// or no uploaded file.
    #[error("{0}")]
    Validation(String),

    /// The same action is already running for this session.
    #[error("{action} is already in progress")]
    ActionInFlight { action: ActionKind },

    /// The backend call failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A streamed answer failed.
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// Reading an upload or writing a generated document failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}
