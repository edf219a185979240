//! Backend connection configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_base_url() -> String {
    "http://127.0.0.1:8000/".to_string()
}

const fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    "simpai-cli/0.1".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Base URL every endpoint path is joined onto.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// TCP connect timeout. Requests themselves are not time-limited since
    /// analysis and summarisation can run for minutes.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl BackendConfig {
    /// Base URL guaranteed to end with `/`, so relative paths join under it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the URL is empty or not http(s).
    pub fn normalized_base_url(&self) -> Result<String, ConfigError> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "backend.base_url".into(),
                reason: format!("expected an http(s) URL, got '{url}'"),
            });
        }
        if url.ends_with('/') {
            Ok(url.to_string())
        } else {
            Ok(format!("{url}/"))
        }
    }
}
