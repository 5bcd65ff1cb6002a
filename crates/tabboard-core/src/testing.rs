//! Test helpers.

use crate::storage::{BoxFuture, MemoryStorage, Storage, StorageResult};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Memory storage that counts writes and removals per key.
#[derive(Default)]
pub struct RecordingStorage {
    inner: MemoryStorage,
    sets: Mutex<HashMap<String, usize>>,
    removes: Mutex<HashMap<String, usize>>,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls for `key`.
    pub fn set_count(&self, key: &str) -> usize {
        self.sets.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    /// Total number of `set` calls.
    pub fn total_sets(&self) -> usize {
        self.sets.lock().unwrap().values().sum()
    }

    pub fn remove_count(&self, key: &str) -> usize {
        self.removes.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    pub fn reset_counts(&self) {
        self.sets.lock().unwrap().clear();
        self.removes.lock().unwrap().clear();
    }

    pub fn inner(&self) -> &MemoryStorage {
        &self.inner
    }
}

impl Storage for RecordingStorage {
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<Value>>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: Value) -> BoxFuture<'_, StorageResult<()>> {
        *self.sets.lock().unwrap().entry(key.to_string()).or_default() += 1;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        *self.removes.lock().unwrap().entry(key.to_string()).or_default() += 1;
        self.inner.remove(key)
    }

    fn keys(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        self.inner.keys()
    }
}
