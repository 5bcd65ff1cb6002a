//! Global dashboard settings persisted under `settings:<name>`.

use crate::geometry::GRID_SIZE;
use crate::storage::{SETTINGS_PREFIX, Store};
use serde::{Deserialize, Serialize};

/// Color theme of the dashboard chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
    System,
}

/// A stored setting with a documented default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setting {
    /// Grid unit in pixels, default 20.
    GridSize,
    /// Whether drag/resize snaps to the grid, default `true`.
    GridSnapEnabled,
    /// Dashboard theme, default `"dark"`.
    Theme,
}

impl Setting {
    pub fn name(self) -> &'static str {
        match self {
            Setting::GridSize => "gridSize",
            Setting::GridSnapEnabled => "gridSnapEnabled",
            Setting::Theme => "theme",
        }
    }

    /// Full storage key.
    pub fn key(self) -> String {
        format!("{SETTINGS_PREFIX}{}", self.name())
    }
}

/// Typed view of all settings.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSettings {
    pub grid_size: f64,
    pub grid_snap_enabled: bool,
    pub theme: Theme,
}

impl Default for StoredSettings {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            grid_snap_enabled: true,
            theme: Theme::default(),
        }
    }
}

impl StoredSettings {
    /// Read every setting, falling back to its default.
    pub async fn load(store: &Store) -> Self {
        let defaults = Self::default();
        let grid_size = store.get_or(&Setting::GridSize.key(), defaults.grid_size).await;
        Self {
            grid_size: if grid_size > 0.0 { grid_size } else { defaults.grid_size },
            grid_snap_enabled: store
                .get_or(&Setting::GridSnapEnabled.key(), defaults.grid_snap_enabled)
                .await,
            theme: store.get_or(&Setting::Theme.key(), defaults.theme).await,
        }
    }

    pub async fn save_grid_size(store: &Store, grid_size: f64) {
        store.set(&Setting::GridSize.key(), &grid_size).await;
    }

    pub async fn save_grid_snap(store: &Store, enabled: bool) {
        store.set(&Setting::GridSnapEnabled.key(), &enabled).await;
    }

    pub async fn save_theme(store: &Store, theme: Theme) {
        store.set(&Setting::Theme.key(), &theme).await;
    }
}
