//! Pointer and keyboard events, unified across mouse and touch.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Identifies the device that produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerId {
    Mouse,
    Touch(u64),
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Pointer event type for unified mouse/touch handling.
///
/// Positions are in dashboard coordinates (origin at the container's
/// top-left corner).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        pointer: PointerId,
        position: Point,
        modifiers: Modifiers,
    },
    Move {
        pointer: PointerId,
        position: Point,
    },
    Up {
        pointer: PointerId,
        position: Point,
    },
    /// The platform took the pointer away (touch cancel, focus loss).
    Cancel { pointer: PointerId },
}

impl PointerEvent {
    pub fn pointer(&self) -> PointerId {
        match *self {
            PointerEvent::Down { pointer, .. }
            | PointerEvent::Move { pointer, .. }
            | PointerEvent::Up { pointer, .. }
            | PointerEvent::Cancel { pointer } => pointer,
        }
    }

    pub fn position(&self) -> Option<Point> {
        match *self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position, .. }
            | PointerEvent::Up { position, .. } => Some(position),
            PointerEvent::Cancel { .. } => None,
        }
    }
}

/// Keys the dashboard reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Escape,
    Delete,
    Char(char),
}

/// Tracks which pointers are down and which one is primary.
///
/// The primary pointer is the first one pressed while no other was down.
/// Events from secondary pointers (extra fingers) should be ignored by
/// gesture controllers.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    pressed: HashSet<PointerId>,
    primary: Option<PointerId>,
    /// Last known position of the primary pointer.
    pub position: Option<Point>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update from an event. Returns `true` if the event came from the
    /// primary pointer.
    pub fn handle(&mut self, event: &PointerEvent) -> bool {
        let pointer = event.pointer();
        let hovering = pointer == PointerId::Mouse
            && matches!(event, PointerEvent::Move { .. })
            && !self.pressed.contains(&pointer);
        match event {
            PointerEvent::Down { .. } => {
                if self.primary.is_none() && self.pressed.is_empty() {
                    self.primary = Some(pointer);
                }
                self.pressed.insert(pointer);
            }
            PointerEvent::Up { .. } | PointerEvent::Cancel { .. } => {
                self.pressed.remove(&pointer);
            }
            PointerEvent::Move { .. } => {}
        }

        let is_primary = self.primary == Some(pointer) || (self.primary.is_none() && hovering);
        if is_primary {
            if let Some(position) = event.position() {
                self.position = Some(position);
            }
        }
        if self.primary == Some(pointer) && !self.pressed.contains(&pointer) {
            self.primary = None;
        }
        is_primary
    }

    pub fn primary(&self) -> Option<PointerId> {
        self.primary
    }

    pub fn is_pressed(&self, pointer: PointerId) -> bool {
        self.pressed.contains(&pointer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(pointer: PointerId, x: f64) -> PointerEvent {
        PointerEvent::Down {
            pointer,
            position: Point::new(x, 0.0),
            modifiers: Modifiers::default(),
        }
    }

    fn up(pointer: PointerId, x: f64) -> PointerEvent {
        PointerEvent::Up {
            pointer,
            position: Point::new(x, 0.0),
        }
    }

    #[test]
    fn test_first_touch_is_primary() {
        let mut tracker = PointerTracker::new();
        assert!(tracker.handle(&down(PointerId::Touch(1), 10.0)));
        assert!(!tracker.handle(&down(PointerId::Touch(2), 50.0)));
        assert_eq!(tracker.primary(), Some(PointerId::Touch(1)));
        assert_eq!(tracker.position, Some(Point::new(10.0, 0.0)));
    }

    #[test]
    fn test_primary_released() {
        let mut tracker = PointerTracker::new();
        tracker.handle(&down(PointerId::Touch(1), 10.0));
        tracker.handle(&down(PointerId::Touch(2), 20.0));
        assert!(tracker.handle(&up(PointerId::Touch(1), 15.0)));
        assert_eq!(tracker.primary(), None);
        // The remaining finger does not become primary mid-gesture.
        assert!(!tracker.handle(&up(PointerId::Touch(2), 20.0)));
        assert!(tracker.handle(&down(PointerId::Touch(2), 30.0)));
    }

    #[test]
    fn test_no_primary_until_all_pointers_lift() {
        let mut tracker = PointerTracker::new();
        tracker.handle(&down(PointerId::Touch(1), 10.0));
        tracker.handle(&down(PointerId::Touch(2), 20.0));
        tracker.handle(&up(PointerId::Touch(1), 10.0));

        assert!(!tracker.handle(&down(PointerId::Touch(3), 30.0)));
        assert_eq!(tracker.primary(), None);
        assert!(!tracker.handle(&down(PointerId::Mouse, 40.0)));
        assert_eq!(tracker.primary(), None);

        tracker.handle(&up(PointerId::Touch(2), 20.0));
        tracker.handle(&up(PointerId::Touch(3), 30.0));
        tracker.handle(&up(PointerId::Mouse, 40.0));
        assert!(tracker.handle(&down(PointerId::Touch(4), 50.0)));
        assert_eq!(tracker.primary(), Some(PointerId::Touch(4)));
    }

    #[test]
    fn test_mouse_hover_is_primary() {
        let mut tracker = PointerTracker::new();
        let moved = PointerEvent::Move {
            pointer: PointerId::Mouse,
            position: Point::new(5.0, 5.0),
        };
        assert!(tracker.handle(&moved));
        assert!(!tracker.is_pressed(PointerId::Mouse));
        assert_eq!(tracker.position, Some(Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_event_accessors() {
        let cancel = PointerEvent::Cancel {
            pointer: PointerId::Touch(3),
        };
        assert_eq!(cancel.pointer(), PointerId::Touch(3));
        assert_eq!(cancel.position(), None);
    }
}
