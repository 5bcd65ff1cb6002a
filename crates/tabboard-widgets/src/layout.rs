//! Layout helpers.

use egui::{Stroke, Ui};

use crate::theme;

/// Horizontal rule across the available width.
pub fn separator(ui: &mut Ui) {
    let rect = ui.available_rect_before_wrap();
    ui.painter().hline(
        rect.left()..=rect.right(),
        rect.top() + 4.0,
        Stroke::new(1.0, theme::BORDER),
    );
    ui.add_space(8.0);
}

/// Short vertical rule between toolbar groups.
pub fn vertical_separator(ui: &mut Ui) {
    let rect = ui.available_rect_before_wrap();
    let half = 7.0;
    let x = rect.left() + 1.0;
    ui.painter().vline(
        x,
        (rect.center().y - half)..=(rect.center().y + half),
        Stroke::new(1.0, theme::BORDER),
    );
    ui.add_space(3.0);
}

/// Small muted heading above a group of controls.
pub fn section_label(ui: &mut Ui, text: &str) {
    ui.label(egui::RichText::new(text).size(10.0).color(theme::TEXT_MUTED));
}
