//! Hit regions on a mounted widget frame.

use super::WidgetId;
use crate::config::DashboardConfig;
use kurbo::{Point, Rect};

/// A header button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Settings,
    Delete,
}

/// What a pointer landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTarget {
    /// The header strip, excluding its control buttons.
    DragHandle(WidgetId),
    /// The square in the bottom-right corner.
    ResizeHandle(WidgetId),
    /// A control button in the header.
    Control(WidgetId, ControlKind),
    /// The renderer-owned content area.
    Content(WidgetId),
    /// Empty dashboard.
    Background,
}

impl HitTarget {
    pub fn widget(&self) -> Option<&WidgetId> {
        match self {
            HitTarget::DragHandle(id)
            | HitTarget::ResizeHandle(id)
            | HitTarget::Control(id, _)
            | HitTarget::Content(id) => Some(id),
            HitTarget::Background => None,
        }
    }
}

/// Region of the resize handle.
pub fn resize_handle_rect(frame: Rect, config: &DashboardConfig) -> Rect {
    let side = config.resize_handle_size;
    Rect::new(frame.x1 - side, frame.y1 - side, frame.x1, frame.y1)
}

/// Region of the header strip.
pub fn header_rect(frame: Rect, config: &DashboardConfig) -> Rect {
    Rect::new(frame.x0, frame.y0, frame.x1, (frame.y0 + config.header_height).min(frame.y1))
}

/// Region of a control button, right-aligned in the header: delete is
/// outermost, settings sits to its left.
pub fn control_rect(frame: Rect, kind: ControlKind, config: &DashboardConfig) -> Rect {
    let header = header_rect(frame, config);
    let w = config.control_button_width;
    let slot = match kind {
        ControlKind::Delete => 1.0,
        ControlKind::Settings => 2.0,
    };
    let x1 = header.x1 - w * (slot - 1.0);
    Rect::new(x1 - w, header.y0, x1, header.y1)
}

/// Classify a point inside `frame`. Returns `None` when the point is outside.
///
/// The resize handle is tested before the header so a single pointer-down
/// never starts both a resize and a drag.
pub fn hit_test_frame(
    id: &WidgetId,
    frame: Rect,
    point: Point,
    config: &DashboardConfig,
) -> Option<HitTarget> {
    if !frame.contains(point) {
        return None;
    }
    if resize_handle_rect(frame, config).contains(point) {
        return Some(HitTarget::ResizeHandle(id.clone()));
    }
    if header_rect(frame, config).contains(point) {
        for kind in [ControlKind::Delete, ControlKind::Settings] {
            if control_rect(frame, kind, config).contains(point) {
                return Some(HitTarget::Control(id.clone(), kind));
            }
        }
        return Some(HitTarget::DragHandle(id.clone()));
    }
    Some(HitTarget::Content(id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Rect {
        Rect::new(100.0, 100.0, 400.0, 300.0)
    }

    #[test]
    fn test_header_is_drag_handle() {
        let id = WidgetId::from("w-1");
        let config = DashboardConfig::default();
        assert_eq!(
            hit_test_frame(&id, frame(), Point::new(150.0, 110.0), &config),
            Some(HitTarget::DragHandle(id))
        );
    }

    #[test]
    fn test_controls_are_not_drag_handle() {
        let id = WidgetId::from("w-1");
        let config = DashboardConfig::default();
        assert_eq!(
            hit_test_frame(&id, frame(), Point::new(390.0, 110.0), &config),
            Some(HitTarget::Control(id.clone(), ControlKind::Delete))
        );
        assert_eq!(
            hit_test_frame(&id, frame(), Point::new(365.0, 110.0), &config),
            Some(HitTarget::Control(id, ControlKind::Settings))
        );
    }

    #[test]
    fn test_resize_corner_and_content() {
        let id = WidgetId::from("w-1");
        let config = DashboardConfig::default();
        assert_eq!(
            hit_test_frame(&id, frame(), Point::new(395.0, 295.0), &config),
            Some(HitTarget::ResizeHandle(id.clone()))
        );
        assert_eq!(
            hit_test_frame(&id, frame(), Point::new(200.0, 200.0), &config),
            Some(HitTarget::Content(id.clone()))
        );
        assert_eq!(hit_test_frame(&id, frame(), Point::new(10.0, 10.0), &config), None);
    }

    #[test]
    fn test_resize_wins_on_short_widget() {
        // Header and resize square overlap when the frame is barely taller
        // than the header.
        let id = WidgetId::from("w-1");
        let config = DashboardConfig::default();
        let short = Rect::new(0.0, 0.0, 200.0, 40.0);
        assert_eq!(
            hit_test_frame(&id, short, Point::new(195.0, 30.0), &config),
            Some(HitTarget::ResizeHandle(id))
        );
    }
}
