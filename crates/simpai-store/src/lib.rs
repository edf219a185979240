//! # simpai-store
//!
//! Persistent key-value store for resumable SimpAI client state.
//!
//! Records are JSON documents addressed by `(StoreName, id)`. Session
//! controllers only see the [`KvStore`] trait, so tests inject
//! [`MemoryStore`] while the CLI uses the on-disk [`LibsqlStore`].

pub mod error;
mod libsql_store;
mod memory;
mod migrations;
pub mod typed;

use async_trait::async_trait;
use serde_json::Value;
use simpai_core::StoreName;

pub use error::StoreError;
pub use libsql_store::LibsqlStore;
pub use memory::MemoryStore;
pub use typed::{get_typed, set_typed};

/// Async key-value storage of JSON documents, partitioned into named stores.
///
/// Writes are last-write-wins. Implementations must be safe to share across
/// tasks; a single writer per store is assumed.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch a record, or `None` when absent.
    async fn get(&self, store: StoreName, id: &str) -> Result<Option<Value>, StoreError>;

    /// Insert or replace a record.
    async fn set(&self, store: StoreName, id: &str, value: &Value) -> Result<(), StoreError>;

    /// Remove a record. Deleting a missing record is not an error.
    async fn delete(&self, store: StoreName, id: &str) -> Result<(), StoreError>;
}
