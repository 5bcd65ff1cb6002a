//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, Value>>,
    /// When set, every operation fails as if the backend were gone.
    unavailable: AtomicBool,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the backend going away (or coming back).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable("memory storage offline".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<Value>>> {
        let key = key.to_string();
        Box::pin(async move {
            self.check_available()?;
            let entries = self
                .entries
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            Ok(entries.get(&key).cloned())
        })
    }

    fn set(&self, key: &str, value: Value) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            self.check_available()?;
            let mut entries = self
                .entries
                .write()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            entries.insert(key, value);
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            self.check_available()?;
            let mut entries = self
                .entries
                .write()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            entries.remove(&key);
            Ok(())
        })
    }

    fn keys(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            self.check_available()?;
            let entries = self
                .entries
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            Ok(entries.keys().cloned().collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollster::block_on;
    use serde_json::json;

    #[test]
    fn test_set_and_get() {
        let storage = MemoryStorage::new();
        block_on(storage.set("settings:theme", json!("dark"))).unwrap();
        let loaded = block_on(storage.get("settings:theme")).unwrap();
        assert_eq!(loaded, Some(json!("dark")));
    }

    #[test]
    fn test_missing_key_is_none() {
        let storage = MemoryStorage::new();
        assert_eq!(block_on(storage.get("nope")).unwrap(), None);
    }

    #[test]
    fn test_set_replaces_whole_value() {
        let storage = MemoryStorage::new();
        block_on(storage.set("k", json!({"a": 1, "b": 2}))).unwrap();
        block_on(storage.set("k", json!({"a": 3}))).unwrap();
        assert_eq!(block_on(storage.get("k")).unwrap(), Some(json!({"a": 3})));
    }

    #[test]
    fn test_remove() {
        let storage = MemoryStorage::new();
        block_on(storage.set("k", json!(1))).unwrap();
        block_on(storage.remove("k")).unwrap();
        block_on(storage.remove("k")).unwrap();
        assert_eq!(block_on(storage.get("k")).unwrap(), None);
    }

    #[test]
    fn test_keys() {
        let storage = MemoryStorage::new();
        block_on(storage.set("a", json!(1))).unwrap();
        block_on(storage.set("b", json!(2))).unwrap();
        let mut keys = block_on(storage.keys()).unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_unavailable() {
        let storage = MemoryStorage::new();
        storage.set_unavailable(true);
        assert!(matches!(
            block_on(storage.set("k", json!(1))),
            Err(StorageError::Unavailable(_))
        ));
        storage.set_unavailable(false);
        block_on(storage.set("k", json!(1))).unwrap();
    }
}
