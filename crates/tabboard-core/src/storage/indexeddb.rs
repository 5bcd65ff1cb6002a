//! IndexedDB storage implementation for WebAssembly.
//!
//! Uses the browser's IndexedDB as the primary dashboard store.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{IdbDatabase, IdbObjectStore, IdbRequest, IdbTransactionMode};

const DB_NAME: &str = "tabboard";
const DB_VERSION: u32 = 1;
const STORE_NAME: &str = "state";

/// IndexedDB-based storage for WebAssembly.
///
/// Values are stored as JSON strings keyed by the storage key.
pub struct IndexedDbStorage {
    /// Cached database connection.
    db: Rc<RefCell<Option<IdbDatabase>>>,
}

impl IndexedDbStorage {
    /// Create a new IndexedDB storage.
    ///
    /// The database connection is established lazily on first use.
    pub fn new() -> Self {
        Self {
            db: Rc::new(RefCell::new(None)),
        }
    }

    /// Open or create the database, returning a handle.
    async fn get_db(&self) -> StorageResult<IdbDatabase> {
        if let Some(db) = self.db.borrow().as_ref() {
            return Ok(db.clone());
        }

        let window =
            web_sys::window().ok_or_else(|| StorageError::Unavailable("No window object".to_string()))?;

        let idb_factory = window
            .indexed_db()
            .map_err(|e| StorageError::Unavailable(format!("IndexedDB error: {:?}", e)))?
            .ok_or_else(|| StorageError::Unavailable("IndexedDB not available".to_string()))?;

        let open_request = idb_factory
            .open_with_u32(DB_NAME, DB_VERSION)
            .map_err(|e| StorageError::Unavailable(format!("Failed to open DB: {:?}", e)))?;

        let onupgrade = Closure::once(Box::new(move |event: web_sys::IdbVersionChangeEvent| {
            let Some(target) = event.target() else {
                return;
            };
            let request: IdbRequest = target.unchecked_into();
            let Ok(result) = request.result() else {
                return;
            };
            let db: IdbDatabase = result.unchecked_into();
            if !db.object_store_names().contains(STORE_NAME) {
                if let Err(e) = db.create_object_store(STORE_NAME) {
                    log::error!("Failed to create object store: {:?}", e);
                }
            }
        }) as Box<dyn FnOnce(_)>);

        open_request.set_onupgradeneeded(Some(onupgrade.as_ref().unchecked_ref()));
        onupgrade.forget();

        let db = await_idb_request::<IdbDatabase>(&open_request).await?;
        *self.db.borrow_mut() = Some(db.clone());

        Ok(db)
    }

    fn get_store(&self, db: &IdbDatabase, mode: IdbTransactionMode) -> StorageResult<IdbObjectStore> {
        let transaction = db
            .transaction_with_str_and_mode(STORE_NAME, mode)
            .map_err(|e| StorageError::Other(format!("Transaction error: {:?}", e)))?;

        transaction
            .object_store(STORE_NAME)
            .map_err(|e| StorageError::Other(format!("Store error: {:?}", e)))
    }
}

impl Default for IndexedDbStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for IndexedDbStorage {
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<Value>>> {
        let key = key.to_string();

        Box::pin(async move {
            let db = self.get_db().await?;
            let store = self.get_store(&db, IdbTransactionMode::Readonly)?;

            let request = store
                .get(&JsValue::from_str(&key))
                .map_err(|e| StorageError::Other(format!("Get error: {:?}", e)))?;

            let result = await_idb_request::<JsValue>(&request).await?;
            if result.is_undefined() || result.is_null() {
                return Ok(None);
            }

            let json = result
                .as_string()
                .ok_or_else(|| StorageError::Serialization("Invalid stored data".to_string()))?;

            serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| StorageError::Serialization(e.to_string()))
        })
    }

    fn set(&self, key: &str, value: Value) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let json = match serde_json::to_string(&value) {
            Ok(j) => j,
            Err(e) => {
                return Box::pin(async move { Err(StorageError::Serialization(e.to_string())) });
            }
        };

        Box::pin(async move {
            let db = self.get_db().await?;
            let store = self.get_store(&db, IdbTransactionMode::Readwrite)?;

            let request = store
                .put_with_key(&JsValue::from_str(&json), &JsValue::from_str(&key))
                .map_err(|e| StorageError::Other(format!("Put error: {:?}", e)))?;

            await_idb_request::<JsValue>(&request).await?;
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();

        Box::pin(async move {
            let db = self.get_db().await?;
            let store = self.get_store(&db, IdbTransactionMode::Readwrite)?;

            let request = store
                .delete(&JsValue::from_str(&key))
                .map_err(|e| StorageError::Other(format!("Delete error: {:?}", e)))?;

            await_idb_request::<JsValue>(&request).await?;
            Ok(())
        })
    }

    fn keys(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let db = self.get_db().await?;
            let store = self.get_store(&db, IdbTransactionMode::Readonly)?;

            let request = store
                .get_all_keys()
                .map_err(|e| StorageError::Other(format!("GetAllKeys error: {:?}", e)))?;

            let result = await_idb_request::<js_sys::Array>(&request).await?;

            let mut keys = Vec::new();
            for i in 0..result.length() {
                if let Some(key) = result.get(i).as_string() {
                    keys.push(key);
                }
            }
            Ok(keys)
        })
    }
}

/// Await an IndexedDB request through a Promise.
async fn await_idb_request<T: JsCast>(request: &IdbRequest) -> StorageResult<T> {
    use wasm_bindgen_futures::JsFuture;

    let promise = js_sys::Promise::new(&mut |resolve, reject| {
        let onsuccess = Closure::once(Box::new(move |event: web_sys::Event| {
            let result = event
                .target()
                .map(|t| t.unchecked_into::<IdbRequest>())
                .and_then(|r| r.result().ok())
                .unwrap_or(JsValue::UNDEFINED);
            let _ = resolve.call1(&JsValue::NULL, &result);
        }) as Box<dyn FnOnce(_)>);

        let onerror = Closure::once(Box::new(move |_event: web_sys::Event| {
            let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("IndexedDB request failed"));
        }) as Box<dyn FnOnce(_)>);

        request.set_onsuccess(Some(onsuccess.as_ref().unchecked_ref()));
        request.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        onsuccess.forget();
        onerror.forget();
    });

    JsFuture::from(promise)
        .await
        .map_err(|e| StorageError::Other(format!("IndexedDB request failed: {:?}", e)))?
        .dyn_into::<T>()
        .map_err(|_| StorageError::Other("Type conversion failed".to_string()))
}
