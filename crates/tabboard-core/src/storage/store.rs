//! The storage contract used by every dashboard component.

use super::snapshot::{self, ImportError, ImportSummary, Snapshot};
use super::{MemoryStorage, Storage, StorageError, StorageResult};
use crate::widget::{WidgetId, WidgetRecord};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Key prefix of widget records and their namespaced state.
pub const WIDGET_PREFIX: &str = "widget:";
/// Key prefix of global settings.
pub const SETTINGS_PREFIX: &str = "settings:";

/// Storage key of a widget's record.
pub fn widget_key(id: &WidgetId) -> String {
    format!("{WIDGET_PREFIX}{id}")
}

/// Storage key of one field of a widget's namespaced state.
pub fn widget_data_key(id: &WidgetId, field: &str) -> String {
    format!("{WIDGET_PREFIX}{id}:{field}")
}

/// Split a storage key into `(id, Some(field))` or `(id, None)` for records.
pub(crate) fn parse_widget_key(key: &str) -> Option<(WidgetId, Option<&str>)> {
    let rest = key.strip_prefix(WIDGET_PREFIX)?;
    match rest.split_once(':') {
        Some((id, field)) if !id.is_empty() => Some((WidgetId::from(id), Some(field))),
        None if !rest.is_empty() => Some((WidgetId::from(rest), None)),
        _ => None,
    }
}

/// Keyed persistence with defaults, namespacing and snapshots.
///
/// Reads never fail: a backend error or an undecodable value is logged and
/// the caller's default is returned. Writes replace whole values and log
/// failures instead of surfacing them.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn Storage>,
}

impl Store {
    pub fn new(backend: Arc<dyn Storage>) -> Self {
        Self { backend }
    }

    /// A store backed by fresh in-memory storage.
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub fn backend(&self) -> &Arc<dyn Storage> {
        &self.backend
    }

    /// Raw value under `key`, `None` when absent or unreadable.
    pub async fn get_value(&self, key: &str) -> Option<Value> {
        match self.backend.get(key).await {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Failed to read {}: {}", key, e);
                None
            }
        }
    }

    /// Value under `key` decoded as `T`, or `default`.
    pub async fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(value) = self.get_value(key).await else {
            return default;
        };
        match serde_json::from_value(value) {
            Ok(decoded) => decoded,
            Err(e) => {
                log::warn!("Stored value for {} has the wrong shape: {}", key, e);
                default
            }
        }
    }

    /// Persist a value, reporting failures to the caller.
    pub async fn try_set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let value =
            serde_json::to_value(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.backend.set(key, value).await
    }

    /// Persist a value. Failures are logged, never returned.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_set(key, value).await {
            log::error!("Failed to write {}: {}", key, e);
        }
    }

    pub async fn remove(&self, key: &str) {
        if let Err(e) = self.backend.remove(key).await {
            log::error!("Failed to remove {}: {}", key, e);
        }
    }

    /// All keys, or none when the backend cannot list them.
    pub async fn keys(&self) -> Vec<String> {
        match self.backend.keys().await {
            Ok(keys) => keys,
            Err(e) => {
                log::warn!("Failed to list storage keys: {}", e);
                Vec::new()
            }
        }
    }

    /// Remove every key starting with `prefix`. Returns how many were removed.
    pub async fn remove_prefix(&self, prefix: &str) -> usize {
        let mut removed = 0;
        for key in self.keys().await {
            if key.starts_with(prefix) {
                self.remove(&key).await;
                removed += 1;
            }
        }
        removed
    }

    /// All persisted widget records. Undecodable records are skipped.
    pub async fn widget_records(&self) -> Vec<(WidgetId, WidgetRecord)> {
        let mut records = Vec::new();
        for key in self.keys().await {
            let Some((id, None)) = parse_widget_key(&key) else {
                continue;
            };
            let Some(value) = self.get_value(&key).await else {
                continue;
            };
            match serde_json::from_value::<WidgetRecord>(value) {
                Ok(record) => records.push((id, record)),
                Err(e) => log::warn!("Skipping unreadable widget record {}: {}", key, e),
            }
        }
        records.sort_by(|a, b| a.0.cmp(&b.0));
        records
    }

    /// Persist a widget record under its key.
    pub async fn save_widget(&self, id: &WidgetId, record: &WidgetRecord) {
        self.set(&widget_key(id), record).await;
    }

    /// Remove a widget record together with all of its namespaced state.
    pub async fn delete_widget(&self, id: &WidgetId) {
        self.remove(&widget_key(id)).await;
        let swept = self.remove_prefix(&format!("{}:", widget_key(id))).await;
        log::debug!("Removed widget {} and {} namespaced keys", id, swept);
    }

    /// Scoped view for one widget's own state.
    pub fn namespace(&self, id: &WidgetId) -> Namespace {
        Namespace {
            store: self.clone(),
            id: id.clone(),
        }
    }

    /// Dump every widget record, its namespaced state and all settings.
    pub async fn export(&self) -> StorageResult<Snapshot> {
        snapshot::export(self).await
    }

    /// Validate and apply a JSON snapshot.
    ///
    /// Nothing is written unless the whole snapshot validates.
    pub async fn import(&self, json: &str) -> Result<ImportSummary, ImportError> {
        let snapshot = Snapshot::parse(json)?;
        snapshot::apply(self, snapshot).await
    }
}

/// Per-instance view of the store.
///
/// Keys are `widget:<id>:<field>`, so two instances of the same widget kind
/// never see each other's data.
#[derive(Clone)]
pub struct Namespace {
    store: Store,
    id: WidgetId,
}

impl Namespace {
    pub fn id(&self) -> &WidgetId {
        &self.id
    }

    pub fn key(&self, field: &str) -> String {
        widget_data_key(&self.id, field)
    }

    pub async fn get_or<T: DeserializeOwned>(&self, field: &str, default: T) -> T {
        self.store.get_or(&self.key(field), default).await
    }

    pub async fn set<T: Serialize + ?Sized>(&self, field: &str, value: &T) {
        self.store.set(&self.key(field), value).await
    }

    pub async fn remove(&self, field: &str) {
        self.store.remove(&self.key(field)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::WidgetKind;
    use kurbo::{Point, Size};
    use pollster::block_on;
    use serde_json::json;

    #[test]
    fn test_get_or_returns_default_when_absent() {
        let store = Store::memory();
        assert_eq!(block_on(store.get_or("settings:gridSize", 20.0)), 20.0);
    }

    #[test]
    fn test_get_or_returns_default_on_wrong_shape() {
        let store = Store::memory();
        block_on(store.set("settings:gridSize", "big"));
        assert_eq!(block_on(store.get_or("settings:gridSize", 20.0)), 20.0);
    }

    #[test]
    fn test_get_or_returns_default_when_backend_down() {
        let backend = Arc::new(MemoryStorage::new());
        let store = Store::new(backend.clone());
        block_on(store.set("k", &5));
        backend.set_unavailable(true);
        assert_eq!(block_on(store.get_or("k", 1)), 1);
    }

    #[test]
    fn test_set_failure_is_silent() {
        let backend = Arc::new(MemoryStorage::new());
        let store = Store::new(backend.clone());
        backend.set_unavailable(true);
        block_on(store.set("k", &5));
        assert!(block_on(store.try_set("k", &5)).is_err());
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let store = Store::memory();
        let a = store.namespace(&WidgetId::from("w-a"));
        let b = store.namespace(&WidgetId::from("w-b"));
        block_on(a.set("notes", "first"));
        block_on(b.set("notes", "second"));
        assert_eq!(block_on(a.get_or("notes", String::new())), "first");
        assert_eq!(block_on(b.get_or("notes", String::new())), "second");
        assert_eq!(a.key("notes"), "widget:w-a:notes");
    }

    #[test]
    fn test_delete_widget_sweeps_namespace() {
        let store = Store::memory();
        let id = WidgetId::from("w-a");
        let other = WidgetId::from("w-ab");
        let record = WidgetRecord::new(WidgetKind::Notes, Point::ZERO, Size::new(300.0, 200.0));
        block_on(store.save_widget(&id, &record));
        block_on(store.save_widget(&other, &record));
        block_on(store.namespace(&id).set("notes", "x"));
        block_on(store.namespace(&id).set("pinned", &true));
        block_on(store.namespace(&other).set("notes", "keep"));

        block_on(store.delete_widget(&id));

        let mut keys = block_on(store.keys());
        keys.sort();
        assert_eq!(keys, vec!["widget:w-ab", "widget:w-ab:notes"]);
    }

    #[test]
    fn test_widget_records_skip_namespaced_keys() {
        let store = Store::memory();
        let id = WidgetId::from("w-1");
        let record = WidgetRecord::new(WidgetKind::Clock, Point::ZERO, Size::new(200.0, 150.0));
        block_on(store.save_widget(&id, &record));
        block_on(store.namespace(&id).set("format", "24h"));
        block_on(store.set("widget:w-2", &json!({"broken": true})));

        let records = block_on(store.widget_records());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, id);
        assert_eq!(records[0].1, record);
    }

    #[test]
    fn test_parse_widget_key() {
        assert_eq!(
            parse_widget_key("widget:w-1"),
            Some((WidgetId::from("w-1"), None))
        );
        assert_eq!(
            parse_widget_key("widget:w-1:notes"),
            Some((WidgetId::from("w-1"), Some("notes")))
        );
        assert_eq!(parse_widget_key("settings:theme"), None);
        assert_eq!(parse_widget_key("widget:"), None);
    }
}
