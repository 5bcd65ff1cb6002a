//! The dashboard controller.
//!
//! [`Dashboard`] is the single owner of the widget registry and of edit
//! mode. Front ends feed it pointer events, keys, frame ticks and viewport
//! changes; it routes them to the right session and commits finished
//! sessions through the registry.

use crate::config::DashboardConfig;
use crate::edit_mode::{EditMode, EditModeCoordinator};
use crate::input::{Key, PointerEvent, PointerTracker};
use crate::registry::WidgetRegistry;
use crate::settings::{StoredSettings, Theme};
use crate::storage::{ImportOutcome, Snapshot, StorageError, StorageResult, Store};
use crate::surface::Surface;
use crate::time::Instant;
use crate::widget::{
    AppearancePatch, ControlKind, HitTarget, RendererRegistry, WidgetId, WidgetKind,
    WidgetOverrides,
};
use kurbo::Size;

/// What a pointer event asks the host UI to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardAction {
    None,
    /// The settings button of a widget was pressed.
    OpenSettings(WidgetId),
    /// The delete button was pressed; deleting needs user confirmation.
    ConfirmDelete(WidgetId),
    /// Delete was pressed over a multi-selection; also needs confirmation.
    ConfirmDeleteSelection(Vec<WidgetId>),
}

pub struct Dashboard {
    registry: WidgetRegistry,
    edit: EditModeCoordinator,
    pointers: PointerTracker,
    settings: StoredSettings,
}

impl Dashboard {
    pub fn new(store: Store, config: DashboardConfig, renderers: RendererRegistry) -> Self {
        let settings = StoredSettings {
            grid_size: config.grid_size,
            ..StoredSettings::default()
        };
        Self {
            registry: WidgetRegistry::new(store, config, renderers),
            edit: EditModeCoordinator::new(settings.grid_snap_enabled),
            pointers: PointerTracker::new(),
            settings,
        }
    }

    /// Dashboard with the built-in renderers.
    pub fn with_store(store: Store, config: DashboardConfig) -> Self {
        Self::new(store, config, RendererRegistry::with_builtins())
    }

    /// Read settings and restore every persisted widget.
    pub async fn load(&mut self) -> usize {
        self.reload_settings().await;
        self.registry.render_all().await
    }

    async fn reload_settings(&mut self) {
        self.settings = StoredSettings::load(self.registry.store()).await;
        self.registry.apply_grid_size(self.settings.grid_size);
        self.edit.set_grid_snap(self.settings.grid_snap_enabled);
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn surface(&self) -> &Surface {
        self.registry.surface()
    }

    pub fn config(&self) -> &DashboardConfig {
        self.registry.config()
    }

    pub fn edit_mode(&self) -> &EditModeCoordinator {
        &self.edit
    }

    pub fn mode(&self) -> EditMode {
        self.edit.mode()
    }

    pub fn is_editing(&self) -> bool {
        self.edit.is_editing()
    }

    pub fn settings(&self) -> &StoredSettings {
        &self.settings
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.registry.set_viewport(viewport);
    }

    pub fn enter_edit_mode(&mut self) {
        self.edit.enter(self.settings.grid_snap_enabled, self.registry.ids());
    }

    pub fn exit_edit_mode(&mut self) {
        self.edit.exit(self.registry.surface_mut());
    }

    pub fn toggle_edit_mode(&mut self) -> EditMode {
        let ids = self.registry.ids();
        self.edit
            .toggle(self.settings.grid_snap_enabled, ids, self.registry.surface_mut())
    }

    pub async fn create(&mut self, kind: WidgetKind, overrides: WidgetOverrides) -> Option<WidgetId> {
        let id = self.registry.create(kind, overrides).await?;
        self.edit.attach(id.clone());
        Some(id)
    }

    pub async fn delete(&mut self, id: &WidgetId) -> bool {
        self.edit.detach(id, self.registry.surface_mut());
        self.registry.delete(id).await
    }

    /// Delete every listed widget. Returns how many were removed.
    pub async fn delete_all(&mut self, ids: &[WidgetId]) -> usize {
        let mut deleted = 0;
        for id in ids {
            if self.delete(id).await {
                deleted += 1;
            }
        }
        deleted
    }

    pub async fn update_appearance(&mut self, id: &WidgetId, patch: &AppearancePatch) -> bool {
        self.registry.update_appearance(id, patch).await
    }

    pub async fn update_grid_size(&mut self, grid_size: f64) -> bool {
        let updated = self.registry.update_grid_size(grid_size).await;
        if updated {
            self.settings.grid_size = grid_size;
        }
        updated
    }

    pub async fn set_grid_snap(&mut self, enabled: bool) {
        self.settings.grid_snap_enabled = enabled;
        self.edit.set_grid_snap(enabled);
        StoredSettings::save_grid_snap(self.registry.store(), enabled).await;
    }

    pub async fn set_theme(&mut self, theme: Theme) {
        self.settings.theme = theme;
        StoredSettings::save_theme(self.registry.store(), theme).await;
    }

    /// Route a pointer event. Only the primary pointer starts sessions.
    pub async fn handle_pointer(&mut self, event: PointerEvent) -> DashboardAction {
        let primary = self.pointers.handle(&event);
        match event {
            PointerEvent::Down {
                pointer,
                position,
                modifiers,
            } => {
                if !primary || !self.edit.is_editing() || self.edit.is_busy() {
                    return DashboardAction::None;
                }
                let target = self.surface().hit_test(position, self.config());
                let snap = self.registry.snap(self.edit.grid_snap());
                match target {
                    HitTarget::ResizeHandle(id) if self.edit.is_attached(&id) => {
                        if let Some(resize) = self.edit.resize_mut() {
                            resize.pointer_down(
                                self.registry.surface(),
                                &id,
                                pointer,
                                position,
                                self.registry.config(),
                                snap,
                            );
                        }
                    }
                    HitTarget::DragHandle(id) if self.edit.is_attached(&id) => {
                        if modifiers.shift {
                            self.edit.toggle_selection(&id);
                        } else if let Some(drag) = self.edit.drag_mut() {
                            drag.pointer_down(self.registry.surface_mut(), &id, pointer, position, snap);
                        }
                    }
                    HitTarget::Control(id, ControlKind::Settings) => {
                        return DashboardAction::OpenSettings(id);
                    }
                    HitTarget::Control(id, ControlKind::Delete) => {
                        return DashboardAction::ConfirmDelete(id);
                    }
                    HitTarget::Background => self.edit.clear_selection(),
                    _ => {}
                }
            }
            PointerEvent::Move { pointer, position } => {
                if let Some(drag) = self.edit.drag_mut() {
                    drag.pointer_move(self.registry.surface(), pointer, position);
                }
                if let Some(resize) = self.edit.resize_mut() {
                    resize.pointer_move(self.registry.surface(), pointer, position);
                }
            }
            PointerEvent::Up { pointer, position } => {
                let drag_commit = self
                    .edit
                    .drag_mut()
                    .and_then(|drag| drag.pointer_up(self.registry.surface_mut(), pointer, position));
                if let Some(commit) = drag_commit {
                    self.registry.commit_position(&commit).await;
                }
                let resize_commit = self
                    .edit
                    .resize_mut()
                    .and_then(|resize| resize.pointer_up(self.registry.surface_mut(), pointer, position));
                if let Some(commit) = resize_commit {
                    self.registry.commit_size(&commit).await;
                }
            }
            PointerEvent::Cancel { pointer } => {
                let surface = self.registry.surface_mut();
                if let Some(drag) = self.edit.drag_mut().filter(|d| d.active_pointer() == Some(pointer)) {
                    drag.cancel(surface);
                }
                if let Some(resize) = self.edit.resize_mut().filter(|r| r.active_pointer() == Some(pointer)) {
                    resize.cancel(surface);
                }
            }
        }
        DashboardAction::None
    }

    /// Apply recorded moves. Call once per rendered frame.
    pub fn on_frame(&mut self) {
        if let Some(drag) = self.edit.drag_mut() {
            drag.on_frame(self.registry.surface_mut());
        }
        if let Some(resize) = self.edit.resize_mut() {
            resize.on_frame(self.registry.surface_mut());
        }
    }

    /// Global shortcuts. Hosts must not forward keys typed into an editor.
    ///
    /// Escape leaves edit mode and `E` toggles it. Delete over a non-empty
    /// multi-selection asks the host to confirm; nothing is removed here.
    pub fn handle_key(&mut self, key: Key) -> DashboardAction {
        if self.edit.handle_key(key, self.registry.surface_mut()) {
            return DashboardAction::None;
        }
        match key {
            Key::Char('e' | 'E') => {
                self.toggle_edit_mode();
                DashboardAction::None
            }
            Key::Delete if self.edit.is_editing() => {
                let selected = self.edit.selection();
                if selected.is_empty() {
                    DashboardAction::None
                } else {
                    DashboardAction::ConfirmDeleteSelection(selected)
                }
            }
            _ => DashboardAction::None,
        }
    }

    /// Fire due autosaves.
    pub async fn tick(&mut self, now: Instant) -> usize {
        self.registry.tick(now).await
    }

    pub fn edit_text(&mut self, id: &WidgetId, field: &str, text: &str, now: Instant) -> bool {
        self.registry.edit_text(id, field, text, now)
    }

    pub async fn close_editor(&mut self, id: &WidgetId, field: &str) -> bool {
        self.registry.close_editor(id, field).await
    }

    /// Write pending edits, e.g. before the app exits.
    pub async fn flush(&mut self) -> usize {
        self.registry.flush_editors().await
    }

    pub async fn export(&mut self) -> StorageResult<Snapshot> {
        self.registry.export().await
    }

    pub async fn export_json(&mut self) -> StorageResult<String> {
        let snapshot = self.export().await?;
        snapshot
            .to_json_pretty()
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Import a snapshot. On success the live dashboard is rebuilt from it;
    /// on failure nothing changes.
    pub async fn import(&mut self, json: &str) -> ImportOutcome {
        let was_editing = self.edit.is_editing();
        if was_editing {
            self.exit_edit_mode();
        }
        let result = self.registry.import(json).await;
        match &result {
            Ok(_) => self.reload_settings().await,
            Err(e) => log::warn!("Import rejected: {}", e),
        }
        if was_editing {
            self.enter_edit_mode();
        }
        ImportOutcome::from(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Modifiers, PointerId};
    use crate::storage::widget_key;
    use crate::testing::RecordingStorage;
    use crate::widget::WidgetRecord;
    use kurbo::Point;
    use pollster::block_on;
    use std::sync::Arc;

    fn dashboard() -> (Dashboard, Arc<RecordingStorage>) {
        let backend = Arc::new(RecordingStorage::new());
        let mut dashboard = Dashboard::with_store(Store::new(backend.clone()), DashboardConfig::default());
        block_on(dashboard.load());
        dashboard.set_viewport(Size::new(1000.0, 800.0));
        (dashboard, backend)
    }

    fn place(dashboard: &mut Dashboard, kind: WidgetKind, at: Point) -> WidgetId {
        let overrides = WidgetOverrides {
            position: Some(at),
            ..Default::default()
        };
        block_on(dashboard.create(kind, overrides)).unwrap()
    }

    fn down(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down {
            pointer: PointerId::Mouse,
            position: Point::new(x, y),
            modifiers: Modifiers::default(),
        }
    }

    fn shift_down(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down {
            pointer: PointerId::Mouse,
            position: Point::new(x, y),
            modifiers: Modifiers {
                shift: true,
                ..Default::default()
            },
        }
    }

    fn moved(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Move {
            pointer: PointerId::Mouse,
            position: Point::new(x, y),
        }
    }

    fn up(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Up {
            pointer: PointerId::Mouse,
            position: Point::new(x, y),
        }
    }

    fn stored(dashboard: &Dashboard, id: &WidgetId) -> WidgetRecord {
        let value = block_on(dashboard.registry().store().get_value(&widget_key(id))).unwrap();
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_drag_snaps_and_persists_once() {
        let (mut dashboard, backend) = dashboard();
        let id = place(&mut dashboard, WidgetKind::Clock, Point::new(100.0, 100.0));
        dashboard.enter_edit_mode();
        backend.reset_counts();

        block_on(dashboard.handle_pointer(down(110.0, 110.0)));
        for step in 1..=10 {
            let t = step as f64 / 10.0;
            block_on(dashboard.handle_pointer(moved(110.0 + 157.0 * t, 110.0 + 43.0 * t)));
            if step % 3 == 0 {
                dashboard.on_frame();
            }
        }
        assert_eq!(backend.total_sets(), 0);
        block_on(dashboard.handle_pointer(up(267.0, 153.0)));

        assert_eq!(backend.set_count(&widget_key(&id)), 1);
        assert_eq!(backend.total_sets(), 1);
        let record = stored(&dashboard, &id);
        assert!(record.positioned);
        assert_eq!(
            record.position().resolve(Size::new(1000.0, 800.0)),
            Point::new(260.0, 140.0)
        );
        assert_eq!(
            dashboard.surface().frame(&id).unwrap().origin(),
            Point::new(260.0, 140.0)
        );
    }

    #[test]
    fn test_resize_below_minimum_persists_minimum() {
        let (mut dashboard, _) = dashboard();
        let id = place(&mut dashboard, WidgetKind::Notes, Point::new(100.0, 100.0));
        dashboard.enter_edit_mode();

        block_on(dashboard.handle_pointer(down(395.0, 295.0)));
        block_on(dashboard.handle_pointer(moved(245.0, 295.0)));
        block_on(dashboard.handle_pointer(up(245.0, 295.0)));

        assert_eq!(stored(&dashboard, &id).width, 200.0);
        assert_eq!(dashboard.surface().frame(&id).unwrap().width(), 200.0);
        // The resize handle never starts a drag.
        assert_eq!(
            dashboard.surface().frame(&id).unwrap().origin(),
            Point::new(100.0, 100.0)
        );
    }

    #[test]
    fn test_viewing_mode_ignores_handles() {
        let (mut dashboard, backend) = dashboard();
        let id = place(&mut dashboard, WidgetKind::Clock, Point::new(100.0, 100.0));
        backend.reset_counts();

        block_on(dashboard.handle_pointer(down(110.0, 110.0)));
        block_on(dashboard.handle_pointer(moved(500.0, 500.0)));
        dashboard.on_frame();
        block_on(dashboard.handle_pointer(up(500.0, 500.0)));

        assert_eq!(backend.total_sets(), 0);
        assert_eq!(
            dashboard.surface().frame(&id).unwrap().origin(),
            Point::new(100.0, 100.0)
        );
    }

    #[test]
    fn test_escape_mid_drag_discards_session() {
        let (mut dashboard, backend) = dashboard();
        let id = place(&mut dashboard, WidgetKind::Clock, Point::new(100.0, 100.0));
        dashboard.enter_edit_mode();
        backend.reset_counts();

        block_on(dashboard.handle_pointer(down(110.0, 110.0)));
        block_on(dashboard.handle_pointer(moved(400.0, 400.0)));
        dashboard.on_frame();
        assert_eq!(dashboard.handle_key(Key::Escape), DashboardAction::None);
        block_on(dashboard.handle_pointer(up(400.0, 400.0)));

        assert_eq!(dashboard.mode(), EditMode::Viewing);
        assert_eq!(backend.total_sets(), 0);
        assert_eq!(
            dashboard.surface().frame(&id).unwrap().origin(),
            Point::new(100.0, 100.0)
        );
    }

    #[test]
    fn test_delete_mid_drag_writes_nothing() {
        let (mut dashboard, backend) = dashboard();
        let id = place(&mut dashboard, WidgetKind::Clock, Point::new(100.0, 100.0));
        dashboard.enter_edit_mode();
        block_on(dashboard.handle_pointer(down(110.0, 110.0)));
        block_on(dashboard.delete(&id));
        backend.reset_counts();

        block_on(dashboard.handle_pointer(moved(300.0, 300.0)));
        dashboard.on_frame();
        block_on(dashboard.handle_pointer(up(300.0, 300.0)));
        assert_eq!(backend.total_sets(), 0);
        assert!(!dashboard.edit_mode().is_busy());
    }

    #[test]
    fn test_control_buttons_request_actions() {
        let (mut dashboard, _) = dashboard();
        let id = place(&mut dashboard, WidgetKind::Clock, Point::new(100.0, 100.0));
        dashboard.enter_edit_mode();
        assert_eq!(
            block_on(dashboard.handle_pointer(down(390.0, 110.0))),
            DashboardAction::ConfirmDelete(id.clone())
        );
        block_on(dashboard.handle_pointer(up(390.0, 110.0)));
        assert_eq!(
            block_on(dashboard.handle_pointer(down(365.0, 110.0))),
            DashboardAction::OpenSettings(id)
        );
    }

    #[test]
    fn test_delete_key_asks_before_removing_selection() {
        let (mut dashboard, _) = dashboard();
        let a = place(&mut dashboard, WidgetKind::Clock, Point::new(0.0, 0.0));
        let b = place(&mut dashboard, WidgetKind::Clock, Point::new(400.0, 0.0));
        let c = place(&mut dashboard, WidgetKind::Clock, Point::new(0.0, 400.0));
        dashboard.enter_edit_mode();

        block_on(dashboard.handle_pointer(shift_down(10.0, 10.0)));
        block_on(dashboard.handle_pointer(up(10.0, 10.0)));
        block_on(dashboard.handle_pointer(shift_down(410.0, 10.0)));
        block_on(dashboard.handle_pointer(up(410.0, 10.0)));
        assert_eq!(dashboard.edit_mode().selection().len(), 2);

        let DashboardAction::ConfirmDeleteSelection(mut ids) = dashboard.handle_key(Key::Delete)
        else {
            panic!("expected a confirmation request");
        };
        assert!(dashboard.registry().contains(&a));
        assert!(dashboard.registry().contains(&b));

        ids.sort();
        let mut expected = vec![a.clone(), b.clone()];
        expected.sort();
        assert_eq!(ids, expected);

        assert_eq!(block_on(dashboard.delete_all(&ids)), 2);
        assert!(!dashboard.registry().contains(&a));
        assert!(!dashboard.registry().contains(&b));
        assert!(dashboard.registry().contains(&c));
    }

    #[test]
    fn test_delete_key_without_selection_does_nothing() {
        let (mut dashboard, _) = dashboard();
        let id = place(&mut dashboard, WidgetKind::Notes, Point::new(0.0, 0.0));
        assert_eq!(dashboard.handle_key(Key::Delete), DashboardAction::None);
        dashboard.enter_edit_mode();
        assert_eq!(dashboard.handle_key(Key::Delete), DashboardAction::None);
        assert!(dashboard.registry().contains(&id));
    }

    #[test]
    fn test_e_toggles_and_new_widgets_attach() {
        let (mut dashboard, _) = dashboard();
        dashboard.handle_key(Key::Char('e'));
        assert!(dashboard.is_editing());
        let id = place(&mut dashboard, WidgetKind::Calendar, Point::new(0.0, 0.0));
        assert!(dashboard.edit_mode().is_attached(&id));
        dashboard.handle_key(Key::Char('E'));
        assert!(!dashboard.is_editing());
    }

    #[test]
    fn test_load_applies_stored_settings() {
        let store = Store::memory();
        block_on(StoredSettings::save_grid_size(&store, 50.0));
        block_on(StoredSettings::save_grid_snap(&store, false));
        let mut dashboard = Dashboard::with_store(store, DashboardConfig::default());
        block_on(dashboard.load());
        dashboard.set_viewport(Size::new(1000.0, 800.0));
        assert_eq!(dashboard.registry().grid_size(), 50.0);

        let id = place(&mut dashboard, WidgetKind::Clock, Point::new(100.0, 100.0));
        dashboard.enter_edit_mode();
        assert!(!dashboard.edit_mode().grid_snap());
        block_on(dashboard.handle_pointer(down(110.0, 110.0)));
        block_on(dashboard.handle_pointer(up(123.0, 117.0)));
        assert_eq!(
            dashboard.surface().frame(&id).unwrap().origin(),
            Point::new(113.0, 107.0)
        );
    }

    #[test]
    fn test_import_missing_version_changes_nothing() {
        let (mut dashboard, _) = dashboard();
        let id = place(&mut dashboard, WidgetKind::Clock, Point::new(100.0, 100.0));
        let before = block_on(dashboard.export()).unwrap();

        let outcome = block_on(dashboard.import(r#"{"settings": {}, "widgets": {}}"#));
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("missing version"));
        assert!(dashboard.registry().contains(&id));
        let after = block_on(dashboard.export()).unwrap();
        assert_eq!(before.widgets, after.widgets);
    }

    #[test]
    fn test_export_then_import_restores() {
        let (mut dashboard, _) = dashboard();
        let id = place(&mut dashboard, WidgetKind::Notes, Point::new(100.0, 100.0));
        dashboard.edit_text(&id, "notes", "keep me", Instant::now());
        let json = block_on(dashboard.export_json()).unwrap();

        block_on(dashboard.delete(&id));
        block_on(dashboard.update_grid_size(40.0));
        let outcome = block_on(dashboard.import(&json));
        assert!(outcome.success);
        assert!(dashboard.registry().contains(&id));
        assert_eq!(dashboard.registry().grid_size(), 20.0);
        assert_eq!(
            dashboard.surface().node(&id).unwrap().content.editor_text("notes"),
            Some("keep me")
        );
    }
}
