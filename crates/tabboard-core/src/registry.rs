//! The set of live widget instances.
//!
//! [`WidgetRegistry`] keeps three things consistent: the in-memory records,
//! the mounted surface nodes, and what is persisted in the [`Store`]. Every
//! lifecycle change (create, appearance edit, drag/resize commit, delete)
//! goes through it, and none of its operations fail loudly: unknown ids and
//! rendering problems are logged and ignored.

use crate::config::DashboardConfig;
use crate::drag::DragCommit;
use crate::resize::ResizeCommit;
use crate::settings::StoredSettings;
use crate::storage::{
    AutosaveSession, ImportError, ImportSummary, Snapshot, StorageResult, Store, widget_data_key,
    widget_key,
};
use crate::surface::{NodeStyle, Surface, WidgetContent, WidgetNode};
use crate::time::Instant;
use crate::widget::{
    AppearancePatch, RenderContext, RendererRegistry, WidgetId, WidgetKind, WidgetOverrides,
    WidgetRecord,
};
use kurbo::{Point, Rect, Size};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// One open text editor: `(widget, namespaced field)`.
type EditorKey = (WidgetId, String);

/// Pick a spawn point inside `area` from the id's random bits.
fn spawn_origin(area: Rect, uuid: &Uuid) -> Point {
    let bytes = uuid.as_bytes();
    let fx = u16::from_le_bytes([bytes[0], bytes[1]]) as f64 / u16::MAX as f64;
    let fy = u16::from_le_bytes([bytes[2], bytes[3]]) as f64 / u16::MAX as f64;
    Point::new(
        (area.x0 + fx * area.width()).round(),
        (area.y0 + fy * area.height()).round(),
    )
}

/// Owns every live widget instance.
pub struct WidgetRegistry {
    store: Store,
    config: DashboardConfig,
    renderers: RendererRegistry,
    records: HashMap<WidgetId, WidgetRecord>,
    surface: Surface,
    grid_size: f64,
    /// Ids deleted this session; never handed out again.
    retired: HashSet<WidgetId>,
    editors: HashMap<EditorKey, AutosaveSession>,
}

impl WidgetRegistry {
    pub fn new(store: Store, config: DashboardConfig, renderers: RendererRegistry) -> Self {
        Self {
            grid_size: config.grid_size,
            store,
            config,
            renderers,
            records: HashMap::new(),
            surface: Surface::default(),
            retired: HashSet::new(),
            editors: HashMap::new(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn renderers(&self) -> &RendererRegistry {
        &self.renderers
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    /// Grid unit for a new session, if snapping is on.
    pub fn snap(&self, enabled: bool) -> Option<f64> {
        enabled.then_some(self.grid_size)
    }

    pub fn record(&self, id: &WidgetId) -> Option<&WidgetRecord> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &WidgetId) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Live ids, sorted.
    pub fn ids(&self) -> Vec<WidgetId> {
        let mut ids: Vec<_> = self.records.keys().cloned().collect();
        ids.sort();
        ids
    }

    fn fresh_id(&self) -> (WidgetId, Uuid) {
        loop {
            let uuid = Uuid::new_v4();
            let id = WidgetId::from_uuid(uuid);
            if !self.records.contains_key(&id) && !self.retired.contains(&id) {
                return (id, uuid);
            }
        }
    }

    /// Create, persist and mount a widget of `kind`.
    ///
    /// Returns `None` without touching storage when no renderer is
    /// registered for `kind`.
    pub async fn create(&mut self, kind: WidgetKind, overrides: WidgetOverrides) -> Option<WidgetId> {
        if !self.renderers.is_registered(&kind) {
            log::warn!("No renderer registered for widget type {}", kind);
            return None;
        }
        let (id, uuid) = self.fresh_id();
        let origin = overrides
            .position
            .unwrap_or_else(|| spawn_origin(self.config.spawn_area, &uuid));
        let size = self
            .config
            .clamp_size(overrides.size.unwrap_or(self.config.default_size));

        let mut record = WidgetRecord::new(kind, origin, size);
        record.appearance.apply(&overrides.appearance);
        record.type_state = overrides.type_state;

        self.store.save_widget(&id, &record).await;
        log::info!("Created {} widget {}", record.kind, id);
        self.records.insert(id.clone(), record);
        self.mount(&id).await;
        Some(id)
    }

    /// Build (or rebuild) the surface node for a loaded record.
    ///
    /// Stored sizes outside the configured bounds are clamped in memory; the
    /// next commit persists the clamped value.
    async fn mount(&mut self, id: &WidgetId) {
        let Some(record) = self.records.get_mut(id) else {
            return;
        };
        let size = self.config.clamp_size(record.size());
        if size != record.size() {
            log::debug!("Clamping stored size {:?} of {} to {:?}", record.size(), id, size);
            record.set_size(size);
        }
        let record = &*record;
        let origin = self
            .surface
            .clamp_origin(record.position().resolve(self.surface.viewport()), size);
        let ctx = RenderContext {
            id: id.clone(),
            kind: record.kind.clone(),
            type_state: record.type_state.clone(),
            namespace: self.store.namespace(id),
        };
        let style = NodeStyle::from(&record.appearance);

        let mut content = self
            .surface
            .content_mut(id)
            .map(std::mem::take)
            .unwrap_or_default();
        if let Err(e) = self.renderers.get(&ctx.kind).render(&ctx, &mut content).await {
            log::warn!("Renderer for {} failed on {}: {}", ctx.kind, id, e);
            if let Err(e) = self.renderers.fallback().render(&ctx, &mut content).await {
                log::error!("Placeholder failed on {}: {}", id, e);
                content = WidgetContent::default();
            }
        }

        self.surface.mount(
            id.clone(),
            WidgetNode {
                kind: ctx.kind,
                origin,
                size,
                style,
                content,
            },
        );
    }

    /// Re-render one widget, loading its record from storage if needed.
    /// Returns `false` if no such widget exists.
    pub async fn render(&mut self, id: &WidgetId) -> bool {
        if !self.records.contains_key(id) {
            let Some(value) = self.store.get_value(&widget_key(id)).await else {
                log::debug!("render: unknown widget {}", id);
                return false;
            };
            match serde_json::from_value::<WidgetRecord>(value) {
                Ok(record) => {
                    self.records.insert(id.clone(), record);
                }
                Err(e) => {
                    log::warn!("render: unreadable record for {}: {}", id, e);
                    return false;
                }
            }
        }
        // Renderers read from storage, so pending text must land first.
        self.flush_editors_for(id).await;
        self.mount(id).await;
        true
    }

    /// Replace the live set with every persisted record. Returns how many
    /// widgets were mounted.
    ///
    /// Positions are clamped into the current viewport on the surface only;
    /// stored records are not rewritten.
    pub async fn render_all(&mut self) -> usize {
        let records = self.store.widget_records().await;
        self.records.clear();
        self.surface.clear();
        self.editors.retain(|(id, _), _| records.iter().any(|(other, _)| other == id));
        for (id, record) in records {
            self.records.insert(id.clone(), record);
            self.mount(&id).await;
        }
        log::info!("Restored {} widgets", self.records.len());
        self.records.len()
    }

    /// Merge an appearance patch, persist it and restyle the node without
    /// re-running the renderer.
    pub async fn update_appearance(&mut self, id: &WidgetId, patch: &AppearancePatch) -> bool {
        let Some(record) = self.records.get_mut(id) else {
            log::debug!("update_appearance: unknown widget {}", id);
            return false;
        };
        record.appearance.apply(patch);
        let style = NodeStyle::from(&record.appearance);
        self.store.save_widget(id, record).await;
        self.surface.apply_style(id, style);
        true
    }

    /// Remove a widget, its record and all of its namespaced state.
    ///
    /// Pending autosaves for it are dropped. Deleting an unknown or already
    /// deleted id does nothing.
    pub async fn delete(&mut self, id: &WidgetId) -> bool {
        if self.records.remove(id).is_none() {
            log::debug!("delete: unknown widget {}", id);
            return false;
        }
        self.surface.unmount(id);
        self.editors.retain(|(owner, _), session| {
            if owner == id {
                session.cancel();
                false
            } else {
                true
            }
        });
        self.store.delete_widget(id).await;
        self.retired.insert(id.clone());
        log::info!("Deleted widget {}", id);
        true
    }

    /// Change the grid unit for subsequent sessions and persist it.
    /// Existing widgets are not re-snapped.
    pub async fn update_grid_size(&mut self, grid_size: f64) -> bool {
        if !(grid_size > 0.0 && grid_size.is_finite()) {
            log::warn!("Ignoring invalid grid size {}", grid_size);
            return false;
        }
        self.grid_size = grid_size;
        StoredSettings::save_grid_size(&self.store, grid_size).await;
        true
    }

    /// Set the grid unit from loaded settings without writing it back.
    pub(crate) fn apply_grid_size(&mut self, grid_size: f64) {
        if grid_size > 0.0 && grid_size.is_finite() {
            self.grid_size = grid_size;
        }
    }

    /// Persist the result of a drag: one write.
    pub async fn commit_position(&mut self, commit: &DragCommit) -> bool {
        let Some(record) = self.records.get_mut(&commit.id) else {
            log::debug!("commit_position: widget {} is gone", commit.id);
            return false;
        };
        if commit.container.width > 0.0 && commit.container.height > 0.0 {
            record.set_origin(commit.origin, commit.container);
        } else {
            record.x = commit.origin.x;
            record.y = commit.origin.y;
            record.positioned = false;
        }
        self.store.save_widget(&commit.id, record).await;
        true
    }

    /// Persist the result of a resize: one write.
    pub async fn commit_size(&mut self, commit: &ResizeCommit) -> bool {
        let Some(record) = self.records.get_mut(&commit.id) else {
            log::debug!("commit_size: widget {} is gone", commit.id);
            return false;
        };
        record.set_size(self.config.clamp_size(commit.size));
        self.store.save_widget(&commit.id, record).await;
        true
    }

    /// Resolve and clamp every node against the current viewport.
    pub fn relayout(&mut self) {
        let viewport = self.surface.viewport();
        for (id, record) in &self.records {
            let origin = self
                .surface
                .clamp_origin(record.position().resolve(viewport), record.size());
            self.surface.set_origin(id, origin);
        }
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        if self.surface.viewport() != viewport {
            self.surface.set_viewport(viewport);
            self.relayout();
        }
    }

    /// Record a keystroke in an editor. The text is written once the
    /// autosave delay passes without further edits.
    pub fn edit_text(&mut self, id: &WidgetId, field: &str, text: &str, now: Instant) -> bool {
        if !self.records.contains_key(id) {
            return false;
        }
        if let Some(content) = self.surface.content_mut(id) {
            content.set_editor_text(field, text);
        }
        let delay = self.config.autosave_delay();
        self.editors
            .entry((id.clone(), field.to_string()))
            .or_insert_with(|| AutosaveSession::new(widget_data_key(id, field), delay))
            .touch(Value::String(text.to_string()), now);
        true
    }

    /// Whether any editor has unsaved text.
    pub fn has_pending_edits(&self) -> bool {
        self.editors.values().any(AutosaveSession::is_dirty)
    }

    /// Write every autosave that is due. Returns the number of writes.
    pub async fn tick(&mut self, now: Instant) -> usize {
        let due: Vec<(WidgetId, String, Value)> = self
            .editors
            .iter_mut()
            .filter_map(|((id, _), session)| {
                session
                    .take_due(now)
                    .map(|value| (id.clone(), session.key().to_string(), value))
            })
            .collect();
        self.write_edits(due).await
    }

    /// Close an editor, writing its text immediately if unsaved.
    pub async fn close_editor(&mut self, id: &WidgetId, field: &str) -> bool {
        let Some(mut session) = self.editors.remove(&(id.clone(), field.to_string())) else {
            return false;
        };
        let Some(value) = session.flush() else {
            return false;
        };
        let edit = (id.clone(), session.key().to_string(), value);
        self.write_edits(vec![edit]).await > 0
    }

    /// Write all unsaved text, keeping the editors open.
    pub async fn flush_editors(&mut self) -> usize {
        let pending = self
            .editors
            .iter_mut()
            .filter_map(|((id, _), session)| {
                session
                    .flush()
                    .map(|value| (id.clone(), session.key().to_string(), value))
            })
            .collect();
        self.write_edits(pending).await
    }

    async fn flush_editors_for(&mut self, target: &WidgetId) -> usize {
        let pending = self
            .editors
            .iter_mut()
            .filter(|(key, _)| &key.0 == target)
            .filter_map(|((id, _), session)| {
                session
                    .flush()
                    .map(|value| (id.clone(), session.key().to_string(), value))
            })
            .collect();
        self.write_edits(pending).await
    }

    async fn write_edits(&mut self, edits: Vec<(WidgetId, String, Value)>) -> usize {
        let mut written = 0;
        for (id, key, value) in edits {
            if !self.records.contains_key(&id) {
                log::debug!("Dropping autosave for deleted widget {}", id);
                continue;
            }
            self.store.set(&key, &value).await;
            written += 1;
        }
        written
    }

    pub async fn export(&mut self) -> StorageResult<Snapshot> {
        self.flush_editors().await;
        self.store.export().await
    }

    /// Apply a snapshot and rebuild the live set from it.
    ///
    /// On rejection nothing is written and the live set is left alone.
    pub async fn import(&mut self, json: &str) -> Result<ImportSummary, ImportError> {
        let summary = self.store.import(json).await?;
        for session in self.editors.values_mut() {
            session.cancel();
        }
        self.editors.clear();
        self.render_all().await;
        Ok(summary)
    }
}
