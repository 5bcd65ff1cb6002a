//! Persisted widget records.

use super::kind::WidgetKind;
use crate::geometry::{self, Rgba};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Opaque, unique identifier of a widget instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(format!("w-{}", uuid.simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WidgetId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for WidgetId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visual effect class applied to a widget frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualEffect {
    #[default]
    None,
    Blur,
    Shadow,
    Glass,
}

impl VisualEffect {
    pub const ALL: [VisualEffect; 4] = [
        VisualEffect::None,
        VisualEffect::Blur,
        VisualEffect::Shadow,
        VisualEffect::Glass,
    ];

    pub fn label(self) -> &'static str {
        match self {
            VisualEffect::None => "None",
            VisualEffect::Blur => "Blur",
            VisualEffect::Shadow => "Shadow",
            VisualEffect::Glass => "Glass",
        }
    }
}

/// User-configurable look of a widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Appearance {
    /// Background as `#rrggbb`.
    #[serde(rename = "bgColor")]
    pub background_color: String,
    /// Opacity in percent, 0..=100.
    pub opacity: u8,
    pub effect: VisualEffect,
    /// Hide the header until the pointer hovers the widget.
    pub auto_hide: bool,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            background_color: "#1f2937".to_string(),
            opacity: 85,
            effect: VisualEffect::None,
            auto_hide: false,
        }
    }
}

impl Appearance {
    /// Merge a patch, clamping opacity into range.
    pub fn apply(&mut self, patch: &AppearancePatch) {
        if let Some(color) = &patch.background_color {
            self.background_color = color.clone();
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity.min(100);
        }
        if let Some(effect) = patch.effect {
            self.effect = effect;
        }
        if let Some(auto_hide) = patch.auto_hide {
            self.auto_hide = auto_hide;
        }
    }

    /// Background color with the opacity applied.
    pub fn background(&self) -> Rgba {
        geometry::hex_to_rgb(&self.background_color).with_opacity(self.opacity)
    }
}

/// A partial appearance update from the settings panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppearancePatch {
    #[serde(rename = "bgColor", skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<VisualEffect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_hide: Option<bool>,
}

impl AppearancePatch {
    pub fn is_empty(&self) -> bool {
        self.background_color.is_none()
            && self.opacity.is_none()
            && self.effect.is_none()
            && self.auto_hide.is_none()
    }
}

/// Where a widget sits on the dashboard.
///
/// New widgets are placed in pixels. Once the user drags a widget its
/// position is stored as a percentage of the container so it follows
/// viewport resizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    Pixels(Point),
    Percent(Point),
}

impl Position {
    /// Resolve against the container size at render time.
    pub fn resolve(self, container: Size) -> Point {
        match self {
            Position::Pixels(p) => p,
            Position::Percent(p) => Point::new(
                geometry::percent_to_pixels(p.x, container.width),
                geometry::percent_to_pixels(p.y, container.height),
            ),
        }
    }
}

/// Initial values supplied when creating a widget.
#[derive(Debug, Clone, Default)]
pub struct WidgetOverrides {
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub appearance: AppearancePatch,
    pub type_state: Map<String, Value>,
}

/// The persisted form of a widget instance.
///
/// Serialized as `{type, x, y, positioned, width, height, bgColor, opacity,
/// effect, autoHide, ...}` where the trailing fields belong to the widget's
/// renderer and are never interpreted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetRecord {
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub positioned: bool,
    pub width: f64,
    pub height: f64,
    #[serde(flatten)]
    pub appearance: Appearance,
    #[serde(flatten)]
    pub type_state: Map<String, Value>,
}

impl WidgetRecord {
    pub fn new(kind: WidgetKind, origin: Point, size: Size) -> Self {
        Self {
            kind,
            x: origin.x,
            y: origin.y,
            positioned: false,
            width: size.width,
            height: size.height,
            appearance: Appearance::default(),
            type_state: Map::new(),
        }
    }

    pub fn position(&self) -> Position {
        let p = Point::new(self.x, self.y);
        if self.positioned {
            Position::Percent(p)
        } else {
            Position::Pixels(p)
        }
    }

    /// Store a pixel origin as a percentage of `container`.
    pub fn set_origin(&mut self, origin: Point, container: Size) {
        self.x = geometry::pixels_to_percent(origin.x, container.width);
        self.y = geometry::pixels_to_percent(origin.y, container.height);
        self.positioned = true;
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn set_size(&mut self, size: Size) {
        self.width = size.width;
        self.height = size.height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = WidgetId::generate();
        let b = WidgetId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("w-"));
    }

    #[test]
    fn test_record_persisted_shape() {
        let mut record = WidgetRecord::new(
            WidgetKind::Notes,
            Point::new(100.0, 120.0),
            Size::new(300.0, 200.0),
        );
        record.type_state.insert("title".into(), json!("Groceries"));

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "notes");
        assert_eq!(value["x"], 100.0);
        assert_eq!(value["width"], 300.0);
        assert_eq!(value["bgColor"], "#1f2937");
        assert_eq!(value["opacity"], 85);
        assert_eq!(value["effect"], "none");
        assert_eq!(value["autoHide"], false);
        assert_eq!(value["title"], "Groceries");
    }

    #[test]
    fn test_record_keeps_type_specific_fields() {
        let value = json!({
            "type": "password",
            "x": 10.0, "y": 20.0, "positioned": true,
            "width": 250.0, "height": 180.0,
            "bgColor": "#000000", "opacity": 50, "effect": "glass", "autoHide": true,
            "length": 16, "symbols": false
        });
        let record: WidgetRecord = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(record.kind, WidgetKind::Password);
        assert_eq!(record.appearance.effect, VisualEffect::Glass);
        assert_eq!(record.type_state.get("length"), Some(&json!(16)));
        assert!(!record.type_state.contains_key("bgColor"));
        assert_eq!(serde_json::to_value(&record).unwrap(), value);
    }

    #[test]
    fn test_record_missing_appearance_uses_defaults() {
        let record: WidgetRecord = serde_json::from_value(json!({
            "type": "clock", "x": 0, "y": 0, "width": 200, "height": 150
        }))
        .unwrap();
        assert_eq!(record.appearance, Appearance::default());
        assert!(!record.positioned);
    }

    #[test]
    fn test_position_resolves_percent_against_container() {
        let mut record = WidgetRecord::new(WidgetKind::Clock, Point::ZERO, Size::new(200.0, 150.0));
        record.set_origin(Point::new(250.0, 100.0), Size::new(1000.0, 500.0));
        assert!(record.positioned);
        assert_eq!(record.x, 25.0);
        assert_eq!(
            record.position().resolve(Size::new(2000.0, 1000.0)),
            Point::new(500.0, 200.0)
        );
    }

    #[test]
    fn test_appearance_patch_clamps_opacity() {
        let mut appearance = Appearance::default();
        appearance.apply(&AppearancePatch {
            opacity: Some(140),
            effect: Some(VisualEffect::Blur),
            ..Default::default()
        });
        assert_eq!(appearance.opacity, 100);
        assert_eq!(appearance.effect, VisualEffect::Blur);
        assert_eq!(appearance.background_color, "#1f2937");
    }
}
