//! The "add widget" menu.

use egui::Ui;
use tabboard_core::{RendererRegistry, WidgetKind};

use crate::{layout, menu};

fn describe(kind: &WidgetKind) -> &'static str {
    match kind {
        WidgetKind::Clock => "time and date",
        WidgetKind::Weather => "local forecast",
        WidgetKind::Notes => "quick notes",
        WidgetKind::Shortcuts => "favorite links",
        WidgetKind::Countdown => "time until an event",
        WidgetKind::Password => "random passwords",
        WidgetKind::Calendar => "month view",
        WidgetKind::Unknown(_) => "",
    }
}

/// List every widget kind. Kinds without a renderer are shown disabled.
/// Returns the kind clicked this frame.
pub fn widget_picker(ui: &mut Ui, renderers: &RendererRegistry) -> Option<WidgetKind> {
    layout::section_label(ui, "Add widget");
    let mut picked = None;
    for kind in WidgetKind::ALL {
        let enabled = renderers.is_registered(&kind);
        if menu::menu_item_enabled(ui, kind.display_name(), describe(&kind), enabled) {
            picked = Some(kind);
        }
    }
    if picked.is_some() {
        ui.close();
    }
    picked
}
