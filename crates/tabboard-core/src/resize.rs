//! Resize session controller.
//!
//! Same shape as the drag controller but drives a node's size from the
//! bottom-right handle. Size is the starting size plus the pointer delta,
//! snapped when enabled, then clamped into the configured bounds and the
//! space left in the viewport. It never drops below the minimum size.

use crate::config::DashboardConfig;
use crate::geometry;
use crate::input::PointerId;
use crate::surface::Surface;
use crate::widget::WidgetId;
use kurbo::{Point, Size};

/// A finished resize, ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeCommit {
    pub id: WidgetId,
    pub size: Size,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    pub id: WidgetId,
    pub pointer: PointerId,
    start_pointer: Point,
    start_size: Size,
    min_size: Size,
    max_size: Size,
    snap: Option<f64>,
    pending: Option<Point>,
}

impl ResizeSession {
    fn target(&self, pointer: Point, surface: &Surface) -> Option<Size> {
        let origin = surface.frame(&self.id)?.origin();
        let delta = pointer - self.start_pointer;
        let mut size = Size::new(
            self.start_size.width + delta.x,
            self.start_size.height + delta.y,
        );
        if let Some(grid) = self.snap {
            size = geometry::snap_size(size, grid);
        }
        let mut width = geometry::clamp(size.width, self.min_size.width, self.max_size.width);
        let mut height = geometry::clamp(size.height, self.min_size.height, self.max_size.height);
        if surface.has_viewport() {
            let viewport = surface.viewport();
            width = width.min((viewport.width - origin.x).max(self.min_size.width));
            height = height.min((viewport.height - origin.y).max(self.min_size.height));
        }
        Some(Size::new(width, height))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResizeState {
    #[default]
    Idle,
    Resizing(ResizeSession),
}

/// Resizes one widget at a time.
#[derive(Debug, Clone, Default)]
pub struct ResizeController {
    state: ResizeState,
}

impl ResizeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ResizeState {
        &self.state
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self.state, ResizeState::Resizing(_))
    }

    pub fn active_widget(&self) -> Option<&WidgetId> {
        match &self.state {
            ResizeState::Resizing(session) => Some(&session.id),
            ResizeState::Idle => None,
        }
    }

    /// Pointer driving the active session.
    pub fn active_pointer(&self) -> Option<PointerId> {
        match &self.state {
            ResizeState::Resizing(session) => Some(session.pointer),
            ResizeState::Idle => None,
        }
    }

    /// Start resizing `id`. Returns `false` if a resize is already running or
    /// the widget is not mounted.
    pub fn pointer_down(
        &mut self,
        surface: &Surface,
        id: &WidgetId,
        pointer: PointerId,
        position: Point,
        config: &DashboardConfig,
        snap: Option<f64>,
    ) -> bool {
        if self.is_resizing() {
            return false;
        }
        let Some(node) = surface.node(id) else {
            return false;
        };
        self.state = ResizeState::Resizing(ResizeSession {
            id: id.clone(),
            pointer,
            start_pointer: position,
            start_size: node.size,
            min_size: config.min_size,
            max_size: config.max_size,
            snap,
            pending: None,
        });
        log::debug!("Resize started on {}", id);
        true
    }

    pub fn pointer_move(&mut self, surface: &Surface, pointer: PointerId, position: Point) {
        let ResizeState::Resizing(session) = &mut self.state else {
            return;
        };
        if session.pointer != pointer {
            return;
        }
        if !surface.contains(&session.id) {
            log::debug!("Widget {} vanished mid-resize, aborting", session.id);
            self.state = ResizeState::Idle;
            return;
        }
        session.pending = Some(position);
    }

    pub fn on_frame(&mut self, surface: &mut Surface) {
        let ResizeState::Resizing(session) = &mut self.state else {
            return;
        };
        let Some(position) = session.pending.take() else {
            return;
        };
        match session.target(position, surface) {
            Some(size) => {
                surface.set_size(&session.id, size);
            }
            None => {
                log::debug!("Widget {} vanished mid-resize, aborting", session.id);
                self.state = ResizeState::Idle;
            }
        }
    }

    /// Finish the resize at `position`, regardless of any pending frame.
    pub fn pointer_up(
        &mut self,
        surface: &mut Surface,
        pointer: PointerId,
        position: Point,
    ) -> Option<ResizeCommit> {
        let ResizeState::Resizing(session) = &self.state else {
            return None;
        };
        if session.pointer != pointer {
            return None;
        }
        let ResizeState::Resizing(session) = std::mem::take(&mut self.state) else {
            return None;
        };
        let Some(size) = session.target(position, surface) else {
            log::debug!("Widget {} vanished before release, dropping resize", session.id);
            return None;
        };
        surface.set_size(&session.id, size);
        Some(ResizeCommit {
            id: session.id,
            size,
        })
    }

    /// Abort without a commit, restoring the starting size.
    pub fn cancel(&mut self, surface: &mut Surface) {
        if let ResizeState::Resizing(session) = std::mem::take(&mut self.state) {
            surface.set_size(&session.id, session.start_size);
            log::debug!("Resize on {} cancelled", session.id);
        }
    }
}
