//! Database migration runner.
//!
//! Embeds the SQL migration files at compile time. All statements use
//! `IF NOT EXISTS`, so re-running on every open is safe.

use crate::error::StoreError;

const MIGRATION_001: &str = include_str!("../migrations/001_kv.sql");

pub(crate) async fn run(conn: &libsql::Connection) -> Result<(), StoreError> {
    conn.execute_batch(MIGRATION_001)
        .await
        .map_err(|e| StoreError::Migration(format!("001_kv: {e}")))?;
    Ok(())
}
