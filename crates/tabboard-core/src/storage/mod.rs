//! Storage abstraction for persistence.
//!
//! Backends implement [`Storage`], a keyed store of JSON values. The
//! [`Store`] facade on top of it never fails on reads (it falls back to the
//! caller's default), logs failed writes, scopes per-widget state into
//! namespaces and produces/consumes versioned snapshots.

mod autosave;
mod fallback;
mod memory;
mod snapshot;
mod store;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod indexeddb;

#[cfg(target_arch = "wasm32")]
mod local;

pub use autosave::{AutosaveSession, DEFAULT_AUTOSAVE_DELAY_MS};
pub use fallback::FallbackStorage;
pub use memory::MemoryStorage;
pub use snapshot::{ImportError, ImportOutcome, ImportSummary, SNAPSHOT_VERSION, Snapshot};
pub use store::{Namespace, Store, SETTINGS_PREFIX, WIDGET_PREFIX, widget_data_key, widget_key};

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

#[cfg(target_arch = "wasm32")]
pub use indexeddb::IndexedDbStorage;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Trait for keyed storage backends.
///
/// Values are whole JSON documents: `set` replaces what was stored under
/// the key, there is no partial merge at this layer.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`, `None` if absent.
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<Value>>>;

    /// Replace the value stored under `key`.
    fn set(&self, key: &str, value: Value) -> BoxFuture<'_, StorageResult<()>>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all stored keys.
    fn keys(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;
}

/// Trait for keyed storage backends (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    /// Read the value stored under `key`, `None` if absent.
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<Value>>>;

    /// Replace the value stored under `key`.
    fn set(&self, key: &str, value: Value) -> BoxFuture<'_, StorageResult<()>>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all stored keys.
    fn keys(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;
}

/// Platform storage: files on native, kept in memory while the disk refuses
/// writes.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_storage() -> StorageResult<Arc<dyn Storage>> {
    Ok(file_storage_with_fallback(FileStorage::default_location()?))
}

/// Wrap a file store so failed writes land in memory instead of being lost.
#[cfg(not(target_arch = "wasm32"))]
pub fn file_storage_with_fallback(files: FileStorage) -> Arc<dyn Storage> {
    Arc::new(FallbackStorage::new(files, MemoryStorage::new()))
}

/// Platform storage: IndexedDB with `localStorage` as the secondary store.
#[cfg(target_arch = "wasm32")]
pub fn create_default_storage() -> StorageResult<Arc<dyn Storage>> {
    Ok(Arc::new(FallbackStorage::new(
        IndexedDbStorage::new(),
        LocalStorage::new(),
    )))
}
