//! # simpai-config
//!
//! Layered configuration loading for the SimpAI client using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`SIMPAI_*` prefix, `__` as separator)
//! 2. Project-level `.simpai/config.toml`
//! 3. User-level `~/.config/simpai/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `SIMPAI_BACKEND__BASE_URL` -> `backend.base_url`,
//! `SIMPAI_GENERAL__DEFAULT_SAMPLE_SIZE` -> `general.default_sample_size`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use simpai_config::SimpaiConfig;
//!
//! let config = SimpaiConfig::load_with_dotenv().expect("config");
//! println!("backend: {}", config.backend.base_url);
//! ```

mod backend;
mod error;
mod general;
mod storage;

pub use backend::BackendConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use storage::StorageConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SimpaiConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl SimpaiConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] for `.env` loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source cannot be parsed or a value
    /// has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration after reading `.env` from the current directory.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or layer more providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".simpai/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("SIMPAI_").split("__"))
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("simpai").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = SimpaiConfig::default();
        assert_eq!(config.backend.base_url, "http://127.0.0.1:8000/");
        assert_eq!(config.general.default_sample_size, 100);
    }

    #[test]
    fn figment_builds_without_files() {
        figment::Jail::expect_with(|_jail| {
            let config: SimpaiConfig = SimpaiConfig::figment().extract()?;
            assert_eq!(config.general.profile_cache_days, 14);
            Ok(())
        });
    }
}
