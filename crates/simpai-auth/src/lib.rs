//! # simpai-auth
//!
//! Credential handling for the SimpAI client.
//!
//! The backend issues an opaque API token on login. It is kept in the OS
//! keychain (`keyring`) with a file fallback, and attached to authenticated
//! requests as `Authorization: Token <value>`.

pub mod error;
pub mod token_store;

pub use error::AuthError;

/// Scheme used by the backend's token authentication.
pub const AUTH_SCHEME: &str = "Token";

/// Resolve the stored auth token, if any.
///
/// Priority: keyring → env var → file.
#[must_use]
pub fn resolve_token() -> Option<String> {
    token_store::load()
}

/// Resolve the stored auth token or fail with [`AuthError::NotAuthenticated`].
///
/// # Errors
///
/// Returns `AuthError::NotAuthenticated` when no tier holds a token.
pub fn require_token() -> Result<String, AuthError> {
    resolve_token().ok_or(AuthError::NotAuthenticated)
}

/// Value of the `Authorization` header for `token`.
#[must_use]
pub fn authorization_header(token: &str) -> String {
    format!("{AUTH_SCHEME} {}", token.trim())
}

/// Clear stored credentials.
///
/// # Errors
///
/// Returns `AuthError::TokenStoreError` if the credentials file cannot be removed.
pub fn logout() -> Result<(), AuthError> {
    token_store::delete()
}
