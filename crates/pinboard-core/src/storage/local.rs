//! Browser local storage backend for WASM.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::store::SceneSnapshot;

const KEY_PREFIX: &str = "pinboard:";

/// Stores snapshots as JSON strings in `window.localStorage`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }

    fn backend() -> StorageResult<web_sys::Storage> {
        let window = web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
        window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".to_string()))
    }

    fn item_key(key: &str) -> String {
        format!("{}{}", KEY_PREFIX, key)
    }
}

impl Storage for LocalStorage {
    fn save(&self, key: &str, snapshot: &SceneSnapshot) -> BoxFuture<'_, StorageResult<()>> {
        let key = Self::item_key(key);
        let json = snapshot.to_json();
        Box::pin(async move {
            let json = json.map_err(|e| StorageError::Serialization(e.to_string()))?;
            // Quota errors surface here.
            Self::backend()?
                .set_item(&key, &json)
                .map_err(|e| StorageError::Io(format!("Failed to write {}: {:?}", key, e)))
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<SceneSnapshot>> {
        let item_key = Self::item_key(key);
        let key = key.to_string();
        Box::pin(async move {
            let json = Self::backend()?
                .get_item(&item_key)
                .map_err(|e| StorageError::Io(format!("Failed to read {}: {:?}", item_key, e)))?
                .ok_or(StorageError::NotFound(key))?;
            SceneSnapshot::from_json(&json).map_err(|e| StorageError::Serialization(e.to_string()))
        })
    }
}
