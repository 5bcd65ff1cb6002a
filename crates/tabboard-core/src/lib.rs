//! Tabboard Core Library
//!
//! Platform-agnostic model of the new-tab dashboard: widget records and their
//! persistence, the geometry rules for placing them, and the drag/resize
//! sessions that move them around.

pub mod config;
pub mod dashboard;
pub mod drag;
pub mod edit_mode;
pub mod geometry;
pub mod input;
pub mod registry;
pub mod resize;
pub mod settings;
pub mod storage;
pub mod surface;
pub mod widget;

#[cfg(test)]
mod testing;

/// Clock types for the current target.
pub mod time {
    #[cfg(not(target_arch = "wasm32"))]
    pub use std::time::{Duration, Instant};
    #[cfg(target_arch = "wasm32")]
    pub use web_time::{Duration, Instant};
}

pub use config::{ConfigError, DashboardConfig};
pub use dashboard::{Dashboard, DashboardAction};
pub use drag::{DragCommit, DragController};
pub use edit_mode::{EditMode, EditModeCoordinator};
pub use geometry::{GRID_SIZE, Rgb, Rgba, snap_point, snap_to_grid};
pub use input::{Key, Modifiers, PointerEvent, PointerId};
pub use registry::WidgetRegistry;
pub use resize::{ResizeCommit, ResizeController};
pub use settings::{Setting, StoredSettings, Theme};
pub use storage::{Storage, StorageError, StorageResult, Store};
pub use surface::{ContentBlock, NodeStyle, Surface, WidgetContent, WidgetNode};
pub use widget::{
    Appearance, AppearancePatch, ControlKind, HitTarget, RendererRegistry, VisualEffect, WidgetId,
    WidgetKind, WidgetRecord,
};
