//! Client error types.

use thiserror::Error;

/// Errors that can occur when talking to the SimpAI backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the backend.
        status: u16,
        /// Error message extracted from the body, or the raw body.
        message: String,
    },

    /// The backend returned a 429 Too Many Requests response.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// A response body did not have the expected shape.
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse {
        endpoint: String,
        reason: String,
    },

    /// Caller-side validation failed before any request was made.
    #[error("validation error: {0}")]
    Validation(String),

    /// Credential lookup failed.
    #[error(transparent)]
    Auth(#[from] simpai_auth::AuthError),

    /// Backend configuration is unusable.
    #[error(transparent)]
    Config(#[from] simpai_config::ConfigError),
}

impl ClientError {
    pub(crate) fn malformed(endpoint: &str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            endpoint: endpoint.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the backend rejected the request for missing or bad credentials.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Api {
                status: 401 | 403,
                ..
            } | Self::Auth(simpai_auth::AuthError::NotAuthenticated)
        )
    }
}
