//! Background palette and color swatches.
//!
//! Widget backgrounds are stored as `#rrggbb` strings; everything here
//! converts between that form and egui colors.

use egui::{Color32, CornerRadius, CursorIcon, Rect, Sense, Stroke, StrokeKind, Ui, Vec2, vec2};
use tabboard_core::geometry::{self, Rgb, Rgba};

use crate::{sizing, theme};

/// A named preset offered in the background picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundSwatch {
    pub name: &'static str,
    pub hex: &'static str,
}

const fn swatch(name: &'static str, hex: &'static str) -> BackgroundSwatch {
    BackgroundSwatch { name, hex }
}

/// Dark-leaning presets from the Tailwind palette (800/900/600 shades).
pub const BACKGROUND_SWATCHES: [BackgroundSwatch; 12] = [
    swatch("Gray", "#1f2937"),
    swatch("Slate", "#1e293b"),
    swatch("Zinc", "#27272a"),
    swatch("Black", "#000000"),
    swatch("Red", "#991b1b"),
    swatch("Orange", "#9a3412"),
    swatch("Amber", "#92400e"),
    swatch("Emerald", "#065f46"),
    swatch("Cyan", "#155e75"),
    swatch("Blue", "#1e40af"),
    swatch("Violet", "#5b21b6"),
    swatch("Pink", "#9d174d"),
];

/// Parse `#rrggbb` into an opaque color. Malformed input gives the
/// dashboard's fallback color.
pub fn hex_to_color32(hex: &str) -> Color32 {
    let Rgb { r, g, b } = geometry::hex_to_rgb(hex);
    Color32::from_rgb(r, g, b)
}

/// Format the RGB channels of `color` as `#rrggbb`, dropping alpha.
pub fn color32_to_hex(color: Color32) -> String {
    let [r, g, b, _] = color.to_srgba_unmultiplied();
    Rgb::new(r, g, b).to_hex()
}

pub fn rgba_to_color32(color: Rgba) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

/// Style for color swatches.
#[derive(Debug, Clone)]
pub struct ColorSwatchStyle {
    pub size: Vec2,
    /// Circle when true, rounded square otherwise.
    pub circular: bool,
}

impl Default for ColorSwatchStyle {
    fn default() -> Self {
        Self {
            size: vec2(sizing::SMALL, sizing::SMALL),
            circular: false,
        }
    }
}

impl ColorSwatchStyle {
    pub fn large() -> Self {
        Self {
            size: vec2(28.0, 28.0),
            circular: false,
        }
    }
}

/// A clickable color swatch.
pub struct ColorSwatch<'a> {
    color: Color32,
    tooltip: &'a str,
    selected: bool,
    style: ColorSwatchStyle,
}

impl<'a> ColorSwatch<'a> {
    pub fn new(color: Color32, tooltip: &'a str) -> Self {
        Self {
            color,
            tooltip,
            selected: false,
            style: ColorSwatchStyle::default(),
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn style(mut self, style: ColorSwatchStyle) -> Self {
        self.style = style;
        self
    }

    /// Show the swatch and return (clicked, rect).
    pub fn show(self, ui: &mut Ui) -> (bool, Rect) {
        let (rect, response) = ui.allocate_exact_size(self.style.size, Sense::click());

        if ui.is_rect_visible(rect) {
            let ring = Stroke::new(2.0, theme::ACCENT);
            let outline = Stroke::new(1.0, theme::BORDER);
            if self.style.circular {
                let radius = rect.width().min(rect.height()) / 2.0;
                ui.painter().circle_filled(rect.center(), radius, self.color);
                ui.painter().circle_stroke(
                    rect.center(),
                    radius,
                    if self.selected { ring } else { outline },
                );
            } else {
                let corner = CornerRadius::same(sizing::CORNER_RADIUS);
                ui.painter().rect_filled(rect, corner, self.color);
                ui.painter().rect_stroke(
                    rect,
                    corner,
                    if self.selected { ring } else { outline },
                    StrokeKind::Inside,
                );
            }
        }

        let clicked = response.clicked();
        response
            .on_hover_text(self.tooltip)
            .on_hover_cursor(CursorIcon::PointingHand);
        (clicked, rect)
    }
}

/// Lay out [`BACKGROUND_SWATCHES`] in rows of `per_row`. Returns the hex of
/// the swatch clicked this frame.
pub fn swatch_grid(ui: &mut Ui, current_hex: &str, per_row: usize) -> Option<String> {
    let current = hex_to_color32(current_hex);
    let mut picked = None;
    for row in BACKGROUND_SWATCHES.chunks(per_row.max(1)) {
        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 4.0;
            for preset in row {
                let color = hex_to_color32(preset.hex);
                let (clicked, _) = ColorSwatch::new(color, preset.name)
                    .selected(color == current)
                    .show(ui);
                if clicked {
                    picked = Some(preset.hex.to_string());
                }
            }
        });
    }
    picked
}
