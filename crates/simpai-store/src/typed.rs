//! Typed access on top of the JSON-valued [`KvStore`].

use serde::Serialize;
use serde::de::DeserializeOwned;
use simpai_core::StoreName;

use crate::{KvStore, StoreError};

/// Fetch a record and decode it into `T`.
///
/// # Errors
///
/// Returns [`StoreError::Corrupt`] when the stored document does not match
/// `T`, or any error from the underlying store.
pub async fn get_typed<T, S>(store: &S, name: StoreName, id: &str) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
    S: KvStore + ?Sized,
{
    let Some(value) = store.get(name, id).await? else {
        return Ok(None);
    };
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| StoreError::Corrupt {
            store: name.to_string(),
            id: id.to_string(),
            reason: e.to_string(),
        })
}

/// Encode `value` and write it under `(name, id)`.
///
/// # Errors
///
/// Returns [`StoreError::Serialize`] if `value` cannot be encoded, or any
/// error from the underlying store.
pub async fn set_typed<T, S>(store: &S, name: StoreName, id: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
    S: KvStore + ?Sized,
{
    let value = serde_json::to_value(value)?;
    store.set(name, id, &value).await
}
