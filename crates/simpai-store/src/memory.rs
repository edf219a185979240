use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use simpai_core::StoreName;

use crate::{KvStore, StoreError};

/// In-process store. Nothing survives the process; used by tests and as a
/// fallback when no data directory is available.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<(StoreName, String), Value>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records across all stores.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<(StoreName, String), Value>> {
        // A poisoned map is still structurally valid.
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, store: StoreName, id: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.lock().get(&(store, id.to_string())).cloned())
    }

    async fn set(&self, store: StoreName, id: &str, value: &Value) -> Result<(), StoreError> {
        self.lock().insert((store, id.to_string()), value.clone());
        Ok(())
    }

    async fn delete(&self, store: StoreName, id: &str) -> Result<(), StoreError> {
        self.lock().remove(&(store, id.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn behaves_like_a_map_per_store() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        store.set(StoreName::Pdf, "pdf-state", &json!({"a": 1})).await.unwrap();
        store.set(StoreName::Meta, "pdf-state", &json!(7)).await.unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.get(StoreName::Pdf, "pdf-state").await.unwrap(),
            Some(json!({"a": 1}))
        );
        store.delete(StoreName::Pdf, "pdf-state").await.unwrap();
        assert!(store.get(StoreName::Pdf, "pdf-state").await.unwrap().is_none());
        assert_eq!(store.get(StoreName::Meta, "pdf-state").await.unwrap(), Some(json!(7)));
        store.delete(StoreName::Meta, "pdf-state").await.unwrap();
        store.delete(StoreName::Meta, "pdf-state").await.unwrap();
        assert!(store.is_empty());
    }
}
