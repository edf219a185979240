//! Local storage locations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root directory for local state. Empty means the platform data dir.
    #[serde(default)]
    pub data_dir: String,
}

impl StorageConfig {
    /// Resolved data directory (`<data_dir>/simpai` when unset).
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        if self.data_dir.is_empty() {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("simpai")
        } else {
            PathBuf::from(&self.data_dir)
        }
    }

    /// Path of the libSQL file backing the key-value store.
    #[must_use]
    pub fn state_db_path(&self) -> PathBuf {
        self.data_dir().join("state.db")
    }

    /// Directory holding generated documents returned by the backend.
    #[must_use]
    pub fn documents_dir(&self) -> PathBuf {
        self.data_dir().join("documents")
    }
}
