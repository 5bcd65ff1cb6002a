//! Drag session controller.
//!
//! Turns pointer events on a widget's drag handle into live repositioning of
//! its surface node. Moves only record the latest pointer position; the node
//! is updated once per frame in [`DragController::on_frame`]. Release always
//! applies the final position and yields exactly one [`DragCommit`] for the
//! registry to persist.

use crate::geometry;
use crate::input::PointerId;
use crate::surface::Surface;
use crate::widget::WidgetId;
use kurbo::{Point, Size, Vec2};

/// A finished drag, ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct DragCommit {
    pub id: WidgetId,
    /// Final top-left corner in pixels.
    pub origin: Point,
    /// Container size the origin was computed against.
    pub container: Size,
}

/// State of an active drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub id: WidgetId,
    /// Pointer that started the gesture; all others are ignored.
    pub pointer: PointerId,
    /// Pointer position relative to the node origin at pointer-down.
    offset: Vec2,
    /// Origin at pointer-down, restored on cancel.
    start_origin: Point,
    /// Grid unit when snapping is enabled.
    snap: Option<f64>,
    /// Latest pointer position not yet applied.
    pending: Option<Point>,
}

impl DragSession {
    fn target(&self, pointer: Point, size: Size, surface: &Surface) -> Point {
        let mut origin = pointer - self.offset;
        if let Some(grid) = self.snap {
            origin = geometry::snap_point(origin, grid);
        }
        surface.clamp_origin(origin, size)
    }
}

/// Drag state machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Moves one widget at a time.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Id of the widget being dragged.
    pub fn active_widget(&self) -> Option<&WidgetId> {
        match &self.state {
            DragState::Dragging(session) => Some(&session.id),
            DragState::Idle => None,
        }
    }

    /// Pointer driving the active session.
    pub fn active_pointer(&self) -> Option<PointerId> {
        match &self.state {
            DragState::Dragging(session) => Some(session.pointer),
            DragState::Idle => None,
        }
    }

    /// Start dragging `id` from `position`. `snap` is the grid unit when
    /// snapping is enabled. Returns `false` if a drag is already running or
    /// the widget is not mounted.
    pub fn pointer_down(
        &mut self,
        surface: &mut Surface,
        id: &WidgetId,
        pointer: PointerId,
        position: Point,
        snap: Option<f64>,
    ) -> bool {
        if self.is_dragging() {
            return false;
        }
        let Some(frame) = surface.frame(id) else {
            return false;
        };
        surface.bring_to_front(id);
        self.state = DragState::Dragging(DragSession {
            id: id.clone(),
            pointer,
            offset: position - frame.origin(),
            start_origin: frame.origin(),
            snap,
            pending: None,
        });
        log::debug!("Drag started on {}", id);
        true
    }

    /// Record a move. Aborts the session if the node has disappeared.
    pub fn pointer_move(&mut self, surface: &Surface, pointer: PointerId, position: Point) {
        let DragState::Dragging(session) = &mut self.state else {
            return;
        };
        if session.pointer != pointer {
            return;
        }
        if !surface.contains(&session.id) {
            log::debug!("Widget {} vanished mid-drag, aborting", session.id);
            self.state = DragState::Idle;
            return;
        }
        session.pending = Some(position);
    }

    /// Apply the latest recorded move, at most once per frame.
    pub fn on_frame(&mut self, surface: &mut Surface) {
        let DragState::Dragging(session) = &mut self.state else {
            return;
        };
        let Some(position) = session.pending.take() else {
            return;
        };
        let Some(size) = surface.node(&session.id).map(|node| node.size) else {
            log::debug!("Widget {} vanished mid-drag, aborting", session.id);
            self.state = DragState::Idle;
            return;
        };
        let origin = session.target(position, size, surface);
        surface.set_origin(&session.id, origin);
    }

    /// Finish the drag at `position`, regardless of any pending frame.
    ///
    /// Returns `None` for foreign pointers (the session continues) or when
    /// the node is gone (the session ends without a commit).
    pub fn pointer_up(
        &mut self,
        surface: &mut Surface,
        pointer: PointerId,
        position: Point,
    ) -> Option<DragCommit> {
        let DragState::Dragging(session) = &self.state else {
            return None;
        };
        if session.pointer != pointer {
            return None;
        }
        let DragState::Dragging(session) = std::mem::take(&mut self.state) else {
            return None;
        };
        let Some(size) = surface.node(&session.id).map(|node| node.size) else {
            log::debug!("Widget {} vanished before release, dropping drag", session.id);
            return None;
        };
        let origin = session.target(position, size, surface);
        surface.set_origin(&session.id, origin);
        Some(DragCommit {
            id: session.id,
            origin,
            container: surface.viewport(),
        })
    }

    /// Abort without a commit, putting the node back where it started.
    pub fn cancel(&mut self, surface: &mut Surface) {
        if let DragState::Dragging(session) = std::mem::take(&mut self.state) {
            surface.set_origin(&session.id, session.start_origin);
            log::debug!("Drag on {} cancelled", session.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{NodeStyle, WidgetContent, WidgetNode};
    use crate::widget::{Appearance, WidgetKind};

    fn surface_with(id: &WidgetId, origin: Point) -> Surface {
        let mut surface = Surface::new(Size::new(1000.0, 800.0));
        surface.mount(
            id.clone(),
            WidgetNode {
                kind: WidgetKind::Clock,
                origin,
                size: Size::new(300.0, 200.0),
                style: NodeStyle::from(&Appearance::default()),
                content: WidgetContent::default(),
            },
        );
        surface
    }

    fn origin_of(surface: &Surface, id: &WidgetId) -> Point {
        surface.frame(id).unwrap().origin()
    }

    #[test]
    fn test_drag_snaps_to_grid() {
        let id = WidgetId::from("w-a");
        let mut surface = surface_with(&id, Point::new(100.0, 100.0));
        let mut drag = DragController::new();

        assert!(drag.pointer_down(&mut surface, &id, PointerId::Mouse, Point::new(110.0, 110.0), Some(20.0)));
        drag.pointer_move(&surface, PointerId::Mouse, Point::new(200.0, 130.0));
        drag.pointer_move(&surface, PointerId::Mouse, Point::new(267.0, 153.0));
        drag.on_frame(&mut surface);
        assert_eq!(origin_of(&surface, &id), Point::new(260.0, 140.0));

        let commit = drag.pointer_up(&mut surface, PointerId::Mouse, Point::new(267.0, 153.0)).unwrap();
        assert_eq!(commit.origin, Point::new(260.0, 140.0));
        assert_eq!(commit.container, Size::new(1000.0, 800.0));
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_moves_apply_only_on_frame() {
        let id = WidgetId::from("w-a");
        let mut surface = surface_with(&id, Point::new(100.0, 100.0));
        let mut drag = DragController::new();
        drag.pointer_down(&mut surface, &id, PointerId::Mouse, Point::new(100.0, 100.0), None);
        drag.pointer_move(&surface, PointerId::Mouse, Point::new(150.0, 100.0));
        assert_eq!(origin_of(&surface, &id), Point::new(100.0, 100.0));
        drag.on_frame(&mut surface);
        assert_eq!(origin_of(&surface, &id), Point::new(150.0, 100.0));
    }

    #[test]
    fn test_release_honored_without_frame() {
        let id = WidgetId::from("w-a");
        let mut surface = surface_with(&id, Point::new(100.0, 100.0));
        let mut drag = DragController::new();
        drag.pointer_down(&mut surface, &id, PointerId::Mouse, Point::new(100.0, 100.0), None);
        drag.pointer_move(&surface, PointerId::Mouse, Point::new(130.0, 100.0));
        let commit = drag.pointer_up(&mut surface, PointerId::Mouse, Point::new(180.0, 120.0)).unwrap();
        assert_eq!(commit.origin, Point::new(180.0, 120.0));
        assert_eq!(origin_of(&surface, &id), Point::new(180.0, 120.0));
    }

    #[test]
    fn test_clamped_to_container() {
        let id = WidgetId::from("w-a");
        let mut surface = surface_with(&id, Point::new(100.0, 100.0));
        let mut drag = DragController::new();
        drag.pointer_down(&mut surface, &id, PointerId::Mouse, Point::new(100.0, 100.0), Some(20.0));
        let commit = drag.pointer_up(&mut surface, PointerId::Mouse, Point::new(950.0, -40.0)).unwrap();
        assert_eq!(commit.origin, Point::new(700.0, 0.0));
    }

    #[test]
    fn test_second_touch_ignored() {
        let id = WidgetId::from("w-a");
        let mut surface = surface_with(&id, Point::new(0.0, 0.0));
        let mut drag = DragController::new();
        drag.pointer_down(&mut surface, &id, PointerId::Touch(1), Point::new(10.0, 10.0), None);
        drag.pointer_move(&surface, PointerId::Touch(2), Point::new(500.0, 500.0));
        drag.on_frame(&mut surface);
        assert_eq!(origin_of(&surface, &id), Point::ZERO);
        assert!(drag.pointer_up(&mut surface, PointerId::Touch(2), Point::new(500.0, 500.0)).is_none());
        assert!(drag.is_dragging());
    }

    #[test]
    fn test_removed_node_aborts_on_move() {
        let id = WidgetId::from("w-a");
        let mut surface = surface_with(&id, Point::new(0.0, 0.0));
        let mut drag = DragController::new();
        drag.pointer_down(&mut surface, &id, PointerId::Mouse, Point::ZERO, None);
        surface.unmount(&id);
        drag.pointer_move(&surface, PointerId::Mouse, Point::new(50.0, 50.0));
        assert!(!drag.is_dragging());
        assert!(drag.pointer_up(&mut surface, PointerId::Mouse, Point::new(50.0, 50.0)).is_none());
    }

    #[test]
    fn test_removed_node_gives_no_commit_on_release() {
        let id = WidgetId::from("w-a");
        let mut surface = surface_with(&id, Point::new(0.0, 0.0));
        let mut drag = DragController::new();
        drag.pointer_down(&mut surface, &id, PointerId::Mouse, Point::ZERO, None);
        surface.unmount(&id);
        assert!(drag.pointer_up(&mut surface, PointerId::Mouse, Point::new(50.0, 50.0)).is_none());
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_cancel_restores_origin() {
        let id = WidgetId::from("w-a");
        let mut surface = surface_with(&id, Point::new(40.0, 40.0));
        let mut drag = DragController::new();
        drag.pointer_down(&mut surface, &id, PointerId::Mouse, Point::new(50.0, 50.0), None);
        drag.pointer_move(&surface, PointerId::Mouse, Point::new(300.0, 300.0));
        drag.on_frame(&mut surface);
        drag.cancel(&mut surface);
        assert!(!drag.is_dragging());
        assert_eq!(origin_of(&surface, &id), Point::new(40.0, 40.0));
    }

    #[test]
    fn test_pointer_down_brings_to_front() {
        let a = WidgetId::from("w-a");
        let mut surface = surface_with(&a, Point::ZERO);
        let b = WidgetId::from("w-b");
        let node = surface.node(&a).cloned().unwrap();
        surface.mount(b.clone(), node);
        let mut drag = DragController::new();
        drag.pointer_down(&mut surface, &a, PointerId::Mouse, Point::new(5.0, 5.0), None);
        assert_eq!(surface.z_order().last(), Some(&a));
        assert!(!drag.pointer_down(&mut surface, &b, PointerId::Mouse, Point::new(5.0, 5.0), None));
    }
}
