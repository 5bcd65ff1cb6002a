//! Dashboard layout configuration.

use crate::geometry::GRID_SIZE;
use crate::storage::DEFAULT_AUTOSAVE_DELAY_MS;
use kurbo::{Rect, Size};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {message}")]
    Io { path: String, message: String },
    #[error("Failed to parse config: {0}")]
    Parse(String),
}

/// Bounds and defaults for widget geometry and autosave timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardConfig {
    /// Smallest size a widget can be resized to.
    pub min_size: Size,
    /// Largest size a widget can be resized to.
    pub max_size: Size,
    /// Size given to newly created widgets.
    pub default_size: Size,
    /// Area in which new widgets get their randomized initial position.
    pub spawn_area: Rect,
    /// Grid unit used until the stored setting overrides it.
    pub grid_size: f64,
    /// Inactivity window before a text edit is persisted.
    pub autosave_delay_ms: u64,
    /// Height of the header strip that acts as the drag handle.
    pub header_height: f64,
    /// Side of the square resize handle in the bottom-right corner.
    pub resize_handle_size: f64,
    /// Width of each control button (settings, delete) in the header.
    pub control_button_width: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            min_size: Size::new(200.0, 150.0),
            max_size: Size::new(800.0, 600.0),
            default_size: Size::new(300.0, 200.0),
            spawn_area: Rect::new(50.0, 50.0, 350.0, 250.0),
            grid_size: GRID_SIZE,
            autosave_delay_ms: DEFAULT_AUTOSAVE_DELAY_MS,
            header_height: 32.0,
            resize_handle_size: 16.0,
            control_button_width: 24.0,
        }
    }
}

impl DashboardConfig {
    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<Self>(json)
            .map(Self::validated)
            .map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a JSON config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&json)
    }

    /// Repair values that would break the geometry invariants.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if !(self.min_size.width > 0.0 && self.min_size.height > 0.0) {
            self.min_size = defaults.min_size;
        }
        if self.max_size.width < self.min_size.width {
            self.max_size.width = self.min_size.width;
        }
        if self.max_size.height < self.min_size.height {
            self.max_size.height = self.min_size.height;
        }
        self.default_size = self.clamp_size(self.default_size);
        if !(self.grid_size > 0.0 && self.grid_size.is_finite()) {
            self.grid_size = defaults.grid_size;
        }
        self.spawn_area = self.spawn_area.abs();
        self
    }

    /// Clamp a size into `[min_size, max_size]`.
    pub fn clamp_size(&self, size: Size) -> Size {
        Size::new(
            crate::geometry::clamp(size.width, self.min_size.width, self.max_size.width),
            crate::geometry::clamp(size.height, self.min_size.height, self.max_size.height),
        )
    }

    pub fn autosave_delay(&self) -> crate::time::Duration {
        crate::time::Duration::from_millis(self.autosave_delay_ms)
    }
}
