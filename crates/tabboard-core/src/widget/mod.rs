//! Widget instances: identity, persisted records, hit regions and renderers.
//!
//! Records are pure data. What a widget shows is decided by the renderer
//! registered for its kind; where it sits and how it looks lives in the
//! record and is owned by the registry.

mod handles;
mod kind;
mod record;
mod renderer;

pub use handles::{ControlKind, HitTarget, control_rect, header_rect, hit_test_frame, resize_handle_rect};
pub use kind::WidgetKind;
pub use record::{
    Appearance, AppearancePatch, Position, VisualEffect, WidgetId, WidgetOverrides, WidgetRecord,
};
pub use renderer::{
    LabelRenderer, NOTES_FIELD, NotesRenderer, PlaceholderRenderer, RenderContext, RenderError,
    RendererRegistry, WidgetRenderer,
};
