//! egui components for the Tabboard dashboard.
//!
//! - **Canvas**: paints the widget surface and turns raw egui input into
//!   dashboard pointer and key events
//! - **Colors**: background palette and color swatches
//! - **Settings panel**: per-widget appearance controls
//! - **Confirm**: deleting a multi-selection
//! - **Picker**: the "add widget" menu
//! - **Buttons, menu, layout**: toolbar building blocks

pub mod buttons;
pub mod canvas;
pub mod colors;
pub mod confirm;
pub mod layout;
pub mod menu;
pub mod picker;
pub mod settings_panel;

pub use buttons::{TextButton, ToggleButton};
pub use canvas::{CanvasOutput, DashboardView, EditorChange, translate_events, translate_keys};
pub use colors::{
    BACKGROUND_SWATCHES, BackgroundSwatch, ColorSwatch, ColorSwatchStyle, color32_to_hex,
    hex_to_color32, rgba_to_color32, swatch_grid,
};
pub use confirm::DeleteConfirmation;
pub use layout::{section_label, separator, vertical_separator};
pub use menu::{menu_item, menu_item_enabled, menu_separator, panel_frame, toolbar_frame};
pub use picker::widget_picker;
pub use settings_panel::{SettingsAction, SettingsPanel};

/// Standard sizing constants used across widgets.
pub mod sizing {
    /// Color swatches
    pub const SMALL: f32 = 20.0;
    /// Toolbar buttons
    pub const MEDIUM: f32 = 28.0;
    /// Standard corner radius
    pub const CORNER_RADIUS: u8 = 4;
    /// Panel and widget frame corner radius
    pub const PANEL_RADIUS: u8 = 8;
}

/// Colors for the dashboard chrome. Widget bodies use their own appearance.
pub mod theme {
    use egui::Color32;
    use tabboard_core::Theme;

    pub const TEXT: Color32 = Color32::from_rgb(229, 231, 235);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(156, 163, 175);
    pub const BORDER: Color32 = Color32::from_rgb(55, 65, 81);
    /// Selection and active state (blue)
    pub const ACCENT: Color32 = Color32::from_rgb(59, 130, 246);
    pub const DANGER: Color32 = Color32::from_rgb(239, 68, 68);
    pub const HOVER_BG: Color32 = Color32::from_rgb(55, 65, 81);
    pub const IDLE_BG: Color32 = Color32::from_rgb(31, 41, 55);
    pub const PANEL_BG: Color32 = Color32::from_rgba_premultiplied(17, 24, 39, 245);
    /// Canvas backdrop behind the widgets.
    pub const BACKDROP: Color32 = Color32::from_rgb(11, 15, 25);

    /// Apply the stored theme setting to the egui context.
    pub fn apply(ctx: &egui::Context, theme: Theme) {
        let preference = match theme {
            Theme::Dark => egui::ThemePreference::Dark,
            Theme::Light => egui::ThemePreference::Light,
            Theme::System => egui::ThemePreference::System,
        };
        ctx.set_theme(preference);
    }
}
