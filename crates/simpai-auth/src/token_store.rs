//! Where the API token lives between runs.
//!
//! Three tiers are checked in order: the OS keychain, the
//! `SIMPAI_AUTH__TOKEN` environment variable, and `~/.simpai/credentials`.
//! Writes go to the keychain and fall back to the file when no keychain is
//! available (headless Linux, containers).

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AuthError;

const KEYRING_USER: &str = "api-token";
const TOKEN_ENV: &str = "SIMPAI_AUTH__TOKEN";

/// Tier a token was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Keyring,
    Env,
    File,
}

impl TokenSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keyring => "keyring",
            Self::Env => "env",
            Self::File => "file",
        }
    }
}

/// Keyring service name; `SIMPAI_KEYRING_SERVICE` overrides it so tests never
/// touch real credentials.
fn keyring_entry() -> Option<keyring::Entry> {
    let service =
        std::env::var("SIMPAI_KEYRING_SERVICE").unwrap_or_else(|_| "simpai-cli".to_string());
    match keyring::Entry::new(&service, KEYRING_USER) {
        Ok(entry) => Some(entry),
        Err(error) => {
            tracing::debug!(%error, "keyring unavailable");
            None
        }
    }
}

/// Store a token, preferring the keychain.
///
/// # Errors
///
/// Returns `AuthError::TokenStoreError` if neither the keychain nor the
/// credentials file accepts it.
pub fn store(token: &str) -> Result<(), AuthError> {
    let token = token.trim();
    if let Some(entry) = keyring_entry() {
        match entry.set_password(token) {
            Ok(()) => return Ok(()),
            Err(error) => tracing::warn!(%error, "keyring store failed; using credentials file"),
        }
    }
    write_credentials(&credentials_path()?, token)
}

/// Load the token from the first tier that has one.
#[must_use]
pub fn load() -> Option<String> {
    load_with_source().map(|(token, _)| token)
}

/// Load the token together with the tier that supplied it.
#[must_use]
pub fn load_with_source() -> Option<(String, TokenSource)> {
    let from_keyring = keyring_entry()
        .and_then(|entry| entry.get_password().ok())
        .and_then(non_blank);
    if let Some(token) = from_keyring {
        return Some((token, TokenSource::Keyring));
    }

    if let Some(token) = std::env::var(TOKEN_ENV).ok().and_then(non_blank) {
        return Some((token, TokenSource::Env));
    }

    credentials_path()
        .ok()
        .and_then(|path| read_credentials(&path))
        .map(|token| (token, TokenSource::File))
}

/// Name of the tier holding the current token, for `auth status`.
#[must_use]
pub fn detect_token_source() -> Option<String> {
    load_with_source().map(|(_, source)| source.as_str().to_string())
}

/// Remove the token from the keychain and the credentials file. The
/// environment variable is left alone.
///
/// # Errors
///
/// Returns `AuthError::TokenStoreError` if the credentials file cannot be removed.
pub fn delete() -> Result<(), AuthError> {
    if let Some(entry) = keyring_entry()
        && let Err(error) = entry.delete_credential()
    {
        tracing::debug!(%error, "no keyring credential to delete");
    }
    remove_credentials(&credentials_path()?)
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn credentials_path() -> Result<PathBuf, AuthError> {
    dirs::home_dir()
        .map(|home| home.join(".simpai").join("credentials"))
        .ok_or_else(|| AuthError::TokenStoreError("cannot locate home directory".into()))
}

fn write_credentials(path: &Path, token: &str) -> Result<(), AuthError> {
    let fail = |what: &str, at: &Path, e: std::io::Error| {
        AuthError::TokenStoreError(format!("{what} {}: {e}", at.display()))
    };

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| fail("create", dir, e))?;
        restrict(dir, 0o700);
    }
    fs::write(path, token).map_err(|e| fail("write", path, e))?;
    restrict(path, 0o600);
    Ok(())
}

#[cfg(unix)]
fn restrict(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(error) = fs::set_permissions(path, fs::Permissions::from_mode(mode)) {
        tracing::warn!(%error, path = %path.display(), "failed to restrict permissions");
    }
}

#[cfg(not(unix))]
const fn restrict(_path: &Path, _mode: u32) {}

fn read_credentials(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().and_then(non_blank)
}

fn remove_credentials(path: &Path) -> Result<(), AuthError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AuthError::TokenStoreError(format!(
            "remove {}: {e}",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn credentials_live_under_dot_simpai() {
        let path = credentials_path().expect("home dir");
        assert!(path.ends_with(".simpai/credentials"));
    }

    #[test]
    fn credentials_file_round_trip() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let path = tmp.path().join("nested").join("credentials");

        write_credentials(&path, "tok_abc123").expect("write");
        assert_eq!(read_credentials(&path).as_deref(), Some("tok_abc123"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).expect("metadata").permissions().mode() & 0o777;
            assert_eq!(mode, 0o600);
        }

        remove_credentials(&path).expect("remove");
        assert!(!path.exists());
        assert!(read_credentials(&path).is_none());
    }

    #[test]
    fn blank_credentials_read_as_none() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let path = tmp.path().join("credentials");
        fs::write(&path, "   \n  ").expect("write");
        assert!(read_credentials(&path).is_none());
    }

    #[test]
    fn stored_token_is_trimmed_on_read() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let path = tmp.path().join("credentials");
        fs::write(&path, "tok_abc123\n").expect("write");
        assert_eq!(read_credentials(&path).as_deref(), Some("tok_abc123"));
    }

    #[test]
    fn removing_missing_credentials_is_ok() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        remove_credentials(&tmp.path().join("credentials")).expect("no-op");
    }

    #[test]
    fn source_names_are_stable() {
        assert_eq!(TokenSource::Keyring.as_str(), "keyring");
        assert_eq!(TokenSource::Env.as_str(), "env");
        assert_eq!(TokenSource::File.as_str(), "file");
    }
}
