//! `window.localStorage` backend, the secondary store on the web.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use serde_json::Value;

/// Prefix that keeps dashboard keys apart from other page data.
const KEY_PREFIX: &str = "tabboard.";

/// Synchronous `localStorage` wrapped in the async [`Storage`] interface.
#[derive(Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }

    fn backend() -> StorageResult<web_sys::Storage> {
        web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("No window object".to_string()))?
            .local_storage()
            .map_err(|e| StorageError::Unavailable(format!("localStorage error: {:?}", e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage not available".to_string()))
    }
}

impl Storage for LocalStorage {
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<Value>>> {
        let key = format!("{KEY_PREFIX}{key}");
        Box::pin(async move {
            let raw = Self::backend()?
                .get_item(&key)
                .map_err(|e| StorageError::Other(format!("getItem error: {:?}", e)))?;
            match raw {
                Some(json) => serde_json::from_str(&json)
                    .map(Some)
                    .map_err(|e| StorageError::Serialization(e.to_string())),
                None => Ok(None),
            }
        })
    }

    fn set(&self, key: &str, value: Value) -> BoxFuture<'_, StorageResult<()>> {
        let key = format!("{KEY_PREFIX}{key}");
        Box::pin(async move {
            let json = serde_json::to_string(&value)
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            // setItem throws QuotaExceededError when the origin is full.
            Self::backend()?
                .set_item(&key, &json)
                .map_err(|e| StorageError::Io(format!("setItem error: {:?}", e)))
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = format!("{KEY_PREFIX}{key}");
        Box::pin(async move {
            Self::backend()?
                .remove_item(&key)
                .map_err(|e| StorageError::Other(format!("removeItem error: {:?}", e)))
        })
    }

    fn keys(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let backend = Self::backend()?;
            let len = backend
                .length()
                .map_err(|e| StorageError::Other(format!("length error: {:?}", e)))?;
            let mut keys = Vec::new();
            for i in 0..len {
                if let Ok(Some(key)) = backend.key(i) {
                    if let Some(stripped) = key.strip_prefix(KEY_PREFIX) {
                        keys.push(stripped.to_string());
                    }
                }
            }
            Ok(keys)
        })
    }
}
