//! Menu rows, separators and panel frames.

use egui::{Color32, CornerRadius, CursorIcon, Frame, Margin, Pos2, Sense, Stroke, Ui, vec2};

use crate::{sizing, theme};

/// A full-width menu row with a label and optional hint (shortcut or
/// description) on the right. Returns true if clicked.
pub fn menu_item(ui: &mut Ui, label: &str, hint: &str) -> bool {
    menu_item_enabled(ui, label, hint, true)
}

/// Like [`menu_item`] but greyed out and inert when `enabled` is false.
pub fn menu_item_enabled(ui: &mut Ui, label: &str, hint: &str, enabled: bool) -> bool {
    let (rect, response) = ui.allocate_exact_size(vec2(ui.available_width(), 28.0), Sense::click());

    if ui.is_rect_visible(rect) {
        if enabled && response.hovered() {
            ui.painter()
                .rect_filled(rect, CornerRadius::same(sizing::CORNER_RADIUS), theme::HOVER_BG);
        }
        let (label_color, hint_color) = if enabled {
            (theme::TEXT, theme::TEXT_MUTED)
        } else {
            (Color32::from_gray(100), Color32::from_gray(80))
        };
        ui.painter().text(
            Pos2::new(rect.left() + 12.0, rect.center().y),
            egui::Align2::LEFT_CENTER,
            label,
            egui::FontId::proportional(13.0),
            label_color,
        );
        if !hint.is_empty() {
            ui.painter().text(
                Pos2::new(rect.right() - 12.0, rect.center().y),
                egui::Align2::RIGHT_CENTER,
                hint,
                egui::FontId::proportional(12.0),
                hint_color,
            );
        }
    }

    if !enabled {
        return false;
    }
    let clicked = response.clicked();
    response.on_hover_cursor(CursorIcon::PointingHand);
    clicked
}

pub fn menu_separator(ui: &mut Ui) {
    ui.add_space(4.0);
    let rect = ui.available_rect_before_wrap();
    ui.painter().hline(
        (rect.left() + 8.0)..=(rect.right() - 8.0),
        rect.top(),
        Stroke::new(1.0, theme::BORDER),
    );
    ui.add_space(4.0);
}

fn floating_frame(blur: u8, margin: Margin) -> Frame {
    Frame::new()
        .fill(theme::PANEL_BG)
        .corner_radius(CornerRadius::same(sizing::PANEL_RADIUS))
        .stroke(Stroke::new(1.0, theme::BORDER))
        .shadow(egui::epaint::Shadow {
            spread: 0,
            blur,
            offset: [0, 2],
            color: Color32::from_black_alpha(60),
        })
        .inner_margin(margin)
}

/// Frame for floating panels such as widget settings.
pub fn panel_frame() -> Frame {
    floating_frame(8, Margin::same(10))
}

/// Frame for the top toolbar.
pub fn toolbar_frame() -> Frame {
    floating_frame(6, Margin::symmetric(12, 6))
}
