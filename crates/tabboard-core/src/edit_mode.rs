//! Global edit mode.
//!
//! While viewing, widgets cannot be moved or resized: the drag and resize
//! controllers do not exist. Entering edit mode creates them and attaches
//! every rendered widget; leaving cancels whatever session is running and
//! drops them again, so nothing lingers across toggles.

use crate::drag::DragController;
use crate::input::Key;
use crate::resize::ResizeController;
use crate::surface::Surface;
use crate::widget::WidgetId;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    Viewing,
    Editing,
}

#[derive(Debug, Default)]
pub struct EditModeCoordinator {
    mode: EditMode,
    drag: Option<DragController>,
    resize: Option<ResizeController>,
    /// Widgets whose handles accept pointer input.
    attached: HashSet<WidgetId>,
    /// Multi-selection used for grouped actions.
    selection: HashSet<WidgetId>,
    grid_snap: bool,
}

impl EditModeCoordinator {
    pub fn new(grid_snap: bool) -> Self {
        Self {
            grid_snap,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn is_editing(&self) -> bool {
        self.mode == EditMode::Editing
    }

    pub fn grid_snap(&self) -> bool {
        self.grid_snap
    }

    pub fn set_grid_snap(&mut self, enabled: bool) {
        self.grid_snap = enabled;
    }

    /// Switch to editing, attaching `ids` and taking the current grid-snap
    /// setting.
    pub fn enter(&mut self, grid_snap: bool, ids: impl IntoIterator<Item = WidgetId>) {
        if self.is_editing() {
            return;
        }
        self.mode = EditMode::Editing;
        self.grid_snap = grid_snap;
        self.drag = Some(DragController::new());
        self.resize = Some(ResizeController::new());
        self.attached = ids.into_iter().collect();
        log::debug!("Entered edit mode with {} widgets", self.attached.len());
    }

    /// Switch to viewing. Running sessions are cancelled without a commit.
    pub fn exit(&mut self, surface: &mut Surface) {
        if !self.is_editing() {
            return;
        }
        if let Some(mut drag) = self.drag.take() {
            drag.cancel(surface);
        }
        if let Some(mut resize) = self.resize.take() {
            resize.cancel(surface);
        }
        self.attached.clear();
        self.selection.clear();
        self.mode = EditMode::Viewing;
        log::debug!("Left edit mode");
    }

    pub fn toggle(
        &mut self,
        grid_snap: bool,
        ids: impl IntoIterator<Item = WidgetId>,
        surface: &mut Surface,
    ) -> EditMode {
        if self.is_editing() {
            self.exit(surface);
        } else {
            self.enter(grid_snap, ids);
        }
        self.mode
    }

    /// Attach a widget rendered while editing. Ignored when viewing.
    pub fn attach(&mut self, id: WidgetId) -> bool {
        self.is_editing() && self.attached.insert(id)
    }

    /// Detach a widget, cancelling any session running on it.
    pub fn detach(&mut self, id: &WidgetId, surface: &mut Surface) {
        self.attached.remove(id);
        self.selection.remove(id);
        if let Some(drag) = self.drag.as_mut().filter(|d| d.active_widget() == Some(id)) {
            drag.cancel(surface);
        }
        if let Some(resize) = self.resize.as_mut().filter(|r| r.active_widget() == Some(id)) {
            resize.cancel(surface);
        }
    }

    pub fn is_attached(&self, id: &WidgetId) -> bool {
        self.attached.contains(id)
    }

    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    /// Flip `id` in the multi-selection. Returns whether it is now selected.
    pub fn toggle_selection(&mut self, id: &WidgetId) -> bool {
        if !self.is_attached(id) {
            return false;
        }
        if self.selection.remove(id) {
            false
        } else {
            self.selection.insert(id.clone());
            true
        }
    }

    pub fn is_selected(&self, id: &WidgetId) -> bool {
        self.selection.contains(id)
    }

    /// Selected ids, sorted.
    pub fn selection(&self) -> Vec<WidgetId> {
        let mut ids: Vec<_> = self.selection.iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn drag(&self) -> Option<&DragController> {
        self.drag.as_ref()
    }

    pub fn drag_mut(&mut self) -> Option<&mut DragController> {
        self.drag.as_mut()
    }

    pub fn resize(&self) -> Option<&ResizeController> {
        self.resize.as_ref()
    }

    pub fn resize_mut(&mut self) -> Option<&mut ResizeController> {
        self.resize.as_mut()
    }

    /// Whether a drag or resize is in progress.
    pub fn is_busy(&self) -> bool {
        self.drag.as_ref().is_some_and(DragController::is_dragging)
            || self.resize.as_ref().is_some_and(ResizeController::is_resizing)
    }

    /// Global shortcuts owned by edit mode. Returns `true` if handled.
    pub fn handle_key(&mut self, key: Key, surface: &mut Surface) -> bool {
        match key {
            Key::Escape if self.is_editing() => {
                self.exit(surface);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerId;
    use crate::surface::{NodeStyle, WidgetContent, WidgetNode};
    use crate::widget::{Appearance, WidgetKind};
    use kurbo::{Point, Size};

    fn surface_with(ids: &[&str]) -> Surface {
        let mut surface = Surface::new(Size::new(1000.0, 800.0));
        for id in ids {
            surface.mount(
                WidgetId::from(*id),
                WidgetNode {
                    kind: WidgetKind::Clock,
                    origin: Point::new(100.0, 100.0),
                    size: Size::new(200.0, 150.0),
                    style: NodeStyle::from(&Appearance::default()),
                    content: WidgetContent::default(),
                },
            );
        }
        surface
    }

    fn ids(names: &[&str]) -> Vec<WidgetId> {
        names.iter().map(|n| WidgetId::from(*n)).collect()
    }

    #[test]
    fn test_controllers_exist_only_while_editing() {
        let mut surface = surface_with(&["w-a"]);
        let mut edit = EditModeCoordinator::new(true);
        assert!(edit.drag().is_none());

        edit.enter(false, ids(&["w-a"]));
        assert!(edit.is_editing());
        assert!(!edit.grid_snap());
        assert!(edit.drag().is_some() && edit.resize().is_some());

        edit.exit(&mut surface);
        assert_eq!(edit.mode(), EditMode::Viewing);
        assert!(edit.drag().is_none() && edit.resize().is_none());
        assert_eq!(edit.attached_count(), 0);
    }

    #[test]
    fn test_repeated_toggles_do_not_accumulate() {
        let mut surface = surface_with(&["w-a", "w-b"]);
        let mut edit = EditModeCoordinator::new(true);
        for _ in 0..10 {
            edit.toggle(true, ids(&["w-a", "w-b"]), &mut surface);
            edit.attach(WidgetId::from("w-a"));
        }
        assert_eq!(edit.mode(), EditMode::Viewing);
        assert_eq!(edit.attached_count(), 0);
        edit.toggle(true, ids(&["w-a", "w-b"]), &mut surface);
        assert_eq!(edit.attached_count(), 2);
    }

    #[test]
    fn test_exit_cancels_drag_and_clears_selection() {
        let mut surface = surface_with(&["w-a"]);
        let a = WidgetId::from("w-a");
        let mut edit = EditModeCoordinator::new(true);
        edit.enter(true, ids(&["w-a"]));
        assert!(edit.toggle_selection(&a));

        let drag = edit.drag_mut().unwrap();
        drag.pointer_down(&mut surface, &a, PointerId::Mouse, Point::new(110.0, 110.0), None);
        drag.pointer_move(&surface, PointerId::Mouse, Point::new(400.0, 400.0));
        drag.on_frame(&mut surface);
        assert!(edit.is_busy());

        assert!(edit.handle_key(Key::Escape, &mut surface));
        assert!(!edit.is_busy());
        assert!(edit.selection().is_empty());
        assert_eq!(surface.frame(&a).unwrap().origin(), Point::new(100.0, 100.0));
        assert!(!edit.handle_key(Key::Escape, &mut surface));
    }

    #[test]
    fn test_attach_ignored_while_viewing() {
        let mut edit = EditModeCoordinator::new(true);
        assert!(!edit.attach(WidgetId::from("w-a")));
        assert!(!edit.toggle_selection(&WidgetId::from("w-a")));
    }

    #[test]
    fn test_detach_cancels_matching_session() {
        let mut surface = surface_with(&["w-a", "w-b"]);
        let a = WidgetId::from("w-a");
        let mut edit = EditModeCoordinator::new(false);
        edit.enter(false, ids(&["w-a", "w-b"]));
        if let Some(drag) = edit.drag_mut() {
            drag.pointer_down(&mut surface, &a, PointerId::Mouse, Point::new(110.0, 110.0), None);
        }
        edit.detach(&WidgetId::from("w-b"), &mut surface);
        assert!(edit.is_busy());
        edit.detach(&a, &mut surface);
        assert!(!edit.is_busy());
        assert!(!edit.is_attached(&a));
    }
}
