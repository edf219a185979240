use std::path::{Path, PathBuf};

use async_trait::async_trait;
use libsql::Builder;
use serde_json::Value;
use simpai_core::StoreName;
use tokio::sync::OnceCell;

use crate::{KvStore, StoreError, migrations};

/// On-disk store backed by a local libSQL database.
///
/// The database is opened on first use, not at construction, and concurrent
/// first callers share one open.
pub struct LibsqlStore {
    path: PathBuf,
    handle: OnceCell<Handle>,
}

struct Handle {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl LibsqlStore {
    /// Create a store for the database at `path`. Pass `":memory:"` for a
    /// throwaway in-process database.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            handle: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the database (if not already open) and return its connection.
    async fn conn(&self) -> Result<&libsql::Connection, StoreError> {
        let handle = self
            .handle
            .get_or_try_init(|| async {
                let path = self.path.to_string_lossy().into_owned();
                if path != ":memory:"
                    && let Some(parent) = self.path.parent()
                    && !parent.as_os_str().is_empty()
                {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        StoreError::Open(format!("create {}: {e}", parent.display()))
                    })?;
                }

                let db = Builder::new_local(&path)
                    .build()
                    .await
                    .map_err(|e| StoreError::Open(format!("{path}: {e}")))?;
                let conn = db.connect()?;
                migrations::run(&conn).await?;
                tracing::debug!(path = %path, "state store opened");
                Ok::<_, StoreError>(Handle { db, conn })
            })
            .await?;
        Ok(&handle.conn)
    }
}

#[async_trait]
impl KvStore for LibsqlStore {
    async fn get(&self, store: StoreName, id: &str) -> Result<Option<Value>, StoreError> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                "SELECT data FROM kv_records WHERE store = ?1 AND id = ?2",
                libsql::params![store.as_str(), id],
            )
            .await?;
        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        let data: String = row.get(0)?;
        let value = serde_json::from_str(&data).map_err(|e| StoreError::Corrupt {
            store: store.to_string(),
            id: id.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(value))
    }

    async fn set(&self, store: StoreName, id: &str, value: &Value) -> Result<(), StoreError> {
        let data = serde_json::to_string(value)?;
        let conn = self.conn().await?;
        conn.execute(
            "INSERT INTO kv_records (store, id, data, updated_at) \
             VALUES (?1, ?2, ?3, datetime('now')) \
             ON CONFLICT (store, id) DO UPDATE SET \
             data = excluded.data, updated_at = excluded.updated_at",
            libsql::params![store.as_str(), id, data],
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, store: StoreName, id: &str) -> Result<(), StoreError> {
        let conn = self.conn().await?;
        conn.execute(
            "DELETE FROM kv_records WHERE store = ?1 AND id = ?2",
            libsql::params![store.as_str(), id],
        )
        .await?;
        Ok(())
    }
}
