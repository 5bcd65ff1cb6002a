//! Geometry helpers for laying widgets out on the dashboard.
//!
//! Everything here is pure: grid snapping, clamping, pixel/percent
//! conversion and the hex color parsing used for widget backgrounds.

use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Default grid unit in pixels.
pub const GRID_SIZE: f64 = 20.0;

/// Neutral gray returned when a background color cannot be parsed.
pub const FALLBACK_RGB: Rgb = Rgb::new(128, 128, 128);

/// Snap a value to the nearest multiple of `grid_size`.
///
/// Halfway values round up (`10.0` on a grid of `20.0` becomes `20.0`).
/// A non-positive grid leaves the value untouched.
pub fn snap_to_grid(value: f64, grid_size: f64) -> f64 {
    if grid_size <= 0.0 || !grid_size.is_finite() {
        return value;
    }
    (value / grid_size + 0.5).floor() * grid_size
}

/// Snap both coordinates of a point to the grid.
pub fn snap_point(point: Point, grid_size: f64) -> Point {
    Point::new(snap_to_grid(point.x, grid_size), snap_to_grid(point.y, grid_size))
}

/// Snap both dimensions of a size to the grid.
pub fn snap_size(size: Size, grid_size: f64) -> Size {
    Size::new(
        snap_to_grid(size.width, grid_size),
        snap_to_grid(size.height, grid_size),
    )
}

/// Clamp `value` into `[min, max]`. Callers guarantee `min <= max`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Clamp a top-left origin so a box of `size` stays inside `container`.
///
/// A box larger than the container is pinned to the top-left corner.
pub fn clamp_origin(origin: Point, size: Size, container: Size) -> Point {
    let max_x = (container.width - size.width).max(0.0);
    let max_y = (container.height - size.height).max(0.0);
    Point::new(clamp(origin.x, 0.0, max_x), clamp(origin.y, 0.0, max_y))
}

/// Convert a pixel offset into a percentage of the container dimension.
pub fn pixels_to_percent(px: f64, container: f64) -> f64 {
    if container <= 0.0 {
        return 0.0;
    }
    px / container * 100.0
}

/// Convert a percentage of the container dimension back into pixels.
pub fn percent_to_pixels(percent: f64, container: f64) -> f64 {
    if container <= 0.0 {
        return 0.0;
    }
    percent / 100.0 * container
}

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Apply an opacity given in percent (clamped to 0..=100).
    pub fn with_opacity(self, percent: u8) -> Rgba {
        let percent = percent.min(100) as u32;
        let a = ((percent * 255 + 50) / 100) as u8;
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }

    /// Format as `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A color with alpha, as applied to a widget's background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Parse a 6-digit hex color (`#rrggbb` or `rrggbb`).
///
/// Malformed input returns [`FALLBACK_RGB`].
pub fn hex_to_rgb(hex: &str) -> Rgb {
    parse_hex(hex).unwrap_or(FALLBACK_RGB)
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
