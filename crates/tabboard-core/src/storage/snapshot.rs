//! Versioned backup snapshots of the whole dashboard.

use super::store::{SETTINGS_PREFIX, Store, WIDGET_PREFIX, parse_widget_key, widget_data_key, widget_key};
use super::{StorageError, StorageResult};
use crate::widget::{WidgetId, WidgetRecord};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// The only snapshot format version this build reads and writes.
pub const SNAPSHOT_VERSION: u64 = 1;

/// Reasons an import is rejected. State is unchanged in every case.
#[derive(Debug, Clone, Error)]
pub enum ImportError {
    #[error("malformed file: {0}")]
    Malformed(String),
    #[error("missing version")]
    MissingVersion,
    #[error("unsupported version {0}")]
    UnsupportedVersion(u64),
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("invalid widget {id}: {reason}")]
    InvalidRecord { id: String, reason: String },
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

/// What an accepted import contained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub widgets: usize,
    pub settings: usize,
}

/// Serializable import report handed to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Result<ImportSummary, ImportError>> for ImportOutcome {
    fn from(result: &Result<ImportSummary, ImportError>) -> Self {
        match result {
            Ok(_) => Self {
                success: true,
                error: None,
            },
            Err(e) => Self {
                success: false,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Full dashboard state: widget records, their namespaced data and settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: u64,
    /// Seconds since the Unix epoch.
    #[serde(default)]
    pub exported_at: u64,
    /// Settings by name (without the storage prefix).
    pub settings: Map<String, Value>,
    pub widgets: BTreeMap<WidgetId, WidgetRecord>,
    /// Namespaced per-widget state, by widget id then field.
    #[serde(default)]
    pub widget_data: BTreeMap<WidgetId, Map<String, Value>>,
}

impl Snapshot {
    /// Parse and validate a snapshot from JSON text.
    pub fn parse(json: &str) -> Result<Self, ImportError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| ImportError::Malformed(e.to_string()))?;
        Self::from_value(value)
    }

    /// Validate a snapshot value. The version is checked before anything else.
    pub fn from_value(value: Value) -> Result<Self, ImportError> {
        let Value::Object(mut root) = value else {
            return Err(ImportError::Malformed("expected a JSON object".to_string()));
        };

        match root.get("version") {
            None | Some(Value::Null) => return Err(ImportError::MissingVersion),
            Some(version) => {
                let version = version.as_u64().ok_or_else(|| {
                    ImportError::Malformed("version must be a non-negative integer".to_string())
                })?;
                if version != SNAPSHOT_VERSION {
                    return Err(ImportError::UnsupportedVersion(version));
                }
            }
        }

        let settings = match root.remove("settings") {
            Some(Value::Object(settings)) => settings,
            Some(_) => return Err(ImportError::Malformed("settings must be an object".to_string())),
            None => return Err(ImportError::MissingField("settings")),
        };

        let raw_widgets = match root.remove("widgets") {
            Some(Value::Object(widgets)) => widgets,
            Some(_) => return Err(ImportError::Malformed("widgets must be an object".to_string())),
            None => return Err(ImportError::MissingField("widgets")),
        };

        let mut widgets = BTreeMap::new();
        for (id, raw) in raw_widgets {
            if id.is_empty() || id.contains(':') {
                return Err(ImportError::InvalidRecord {
                    id,
                    reason: "id must be non-empty and contain no ':'".to_string(),
                });
            }
            let record: WidgetRecord = serde_json::from_value(raw).map_err(|e| {
                ImportError::InvalidRecord {
                    id: id.clone(),
                    reason: e.to_string(),
                }
            })?;
            widgets.insert(WidgetId::from(id), record);
        }

        let mut widget_data = BTreeMap::new();
        match root.remove("widgetData") {
            None | Some(Value::Null) => {}
            Some(Value::Object(data)) => {
                for (id, fields) in data {
                    let id = WidgetId::from(id);
                    if !widgets.contains_key(&id) {
                        log::warn!("Dropping namespaced data of unknown widget {}", id);
                        continue;
                    }
                    let Value::Object(fields) = fields else {
                        return Err(ImportError::InvalidRecord {
                            id: id.to_string(),
                            reason: "widget data must be an object".to_string(),
                        });
                    };
                    widget_data.insert(id, fields);
                }
            }
            Some(_) => {
                return Err(ImportError::Malformed("widgetData must be an object".to_string()));
            }
        }

        let exported_at = root.get("exportedAt").and_then(Value::as_u64).unwrap_or(0);

        Ok(Self {
            version: SNAPSHOT_VERSION,
            exported_at,
            settings,
            widgets,
            widget_data,
        })
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

pub(super) async fn export(store: &Store) -> StorageResult<Snapshot> {
    let keys = store.backend().keys().await?;

    let mut snapshot = Snapshot {
        version: SNAPSHOT_VERSION,
        exported_at: unix_now(),
        settings: Map::new(),
        widgets: BTreeMap::new(),
        widget_data: BTreeMap::new(),
    };

    for key in &keys {
        let Some(value) = store.backend().get(key).await? else {
            continue;
        };
        if let Some(name) = key.strip_prefix(SETTINGS_PREFIX) {
            snapshot.settings.insert(name.to_string(), value);
            continue;
        }
        match parse_widget_key(key) {
            Some((id, None)) => match serde_json::from_value::<WidgetRecord>(value) {
                Ok(record) => {
                    snapshot.widgets.insert(id, record);
                }
                Err(e) => log::warn!("Leaving unreadable record {} out of export: {}", key, e),
            },
            Some((id, Some(field))) => {
                snapshot
                    .widget_data
                    .entry(id)
                    .or_default()
                    .insert(field.to_string(), value);
            }
            None => {}
        }
    }

    // Namespaced data only travels with its widget.
    let widgets = &snapshot.widgets;
    snapshot.widget_data.retain(|id, _| widgets.contains_key(id));

    Ok(snapshot)
}

pub(super) async fn apply(store: &Store, snapshot: Snapshot) -> Result<ImportSummary, ImportError> {
    let previous = export(store).await?;

    if let Err(e) = write_all(store, &snapshot).await {
        log::error!("Import failed while writing ({}), restoring previous state", e);
        if let Err(restore) = write_all(store, &previous).await {
            log::error!("Restoring previous state failed: {}", restore);
        }
        return Err(ImportError::Storage(e));
    }

    let summary = ImportSummary {
        widgets: snapshot.widgets.len(),
        settings: snapshot.settings.len(),
    };
    log::info!(
        "Imported {} widgets and {} settings",
        summary.widgets,
        summary.settings
    );
    Ok(summary)
}

/// Replace all dashboard keys with the snapshot's contents.
async fn write_all(store: &Store, snapshot: &Snapshot) -> StorageResult<()> {
    let backend = store.backend();
    for key in backend.keys().await? {
        if key.starts_with(WIDGET_PREFIX) || key.starts_with(SETTINGS_PREFIX) {
            backend.remove(&key).await?;
        }
    }

    for (name, value) in &snapshot.settings {
        backend
            .set(&format!("{SETTINGS_PREFIX}{name}"), value.clone())
            .await?;
    }
    for (id, record) in &snapshot.widgets {
        let value =
            serde_json::to_value(record).map_err(|e| StorageError::Serialization(e.to_string()))?;
        backend.set(&widget_key(id), value).await?;
    }
    for (id, fields) in &snapshot.widget_data {
        for (field, value) in fields {
            backend.set(&widget_data_key(id, field), value.clone()).await?;
        }
    }
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn unix_now() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(target_arch = "wasm32")]
fn unix_now() -> u64 {
    use web_time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
