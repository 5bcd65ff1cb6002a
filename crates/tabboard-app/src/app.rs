//! Application state and the eframe frame loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use egui::{Context, Frame};
use pollster::block_on;
use tabboard_core::storage::{
    FileStorage, MemoryStorage, create_default_storage, file_storage_with_fallback,
};
use tabboard_core::time::{Duration, Instant};
use tabboard_core::widget::WidgetOverrides;
use tabboard_core::{
    Dashboard, DashboardAction, DashboardConfig, RendererRegistry, Storage, Store, Theme,
    WidgetKind,
};
use tabboard_widgets::{
    CanvasOutput, DashboardView, DeleteConfirmation, SettingsAction, SettingsPanel, TextButton,
    ToggleButton, layout, menu, picker, theme,
};

use crate::file_ops;
use crate::shortcuts::ShortcutRegistry;

/// Overrides the storage directory when set.
const STORAGE_DIR_VAR: &str = "TABBOARD_STORAGE_DIR";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: f32,
    pub height: f32,
    /// Storage directory; the platform data dir when `None`.
    pub storage_dir: Option<PathBuf>,
    pub dashboard: DashboardConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Tabboard".to_string(),
            width: 1280.0,
            height: 800.0,
            storage_dir: None,
            dashboard: DashboardConfig::default(),
        }
    }
}

impl AppConfig {
    /// `<config dir>/tabboard/tabboard.json`.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tabboard").join("tabboard.json"))
    }

    /// Defaults, plus the dashboard config file and the storage override from
    /// the environment. An unreadable config file is logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(path) = Self::config_path() {
            config.dashboard = load_dashboard_config(&path);
        }
        config.storage_dir = std::env::var_os(STORAGE_DIR_VAR).map(PathBuf::from);
        config
    }

    fn open_storage(&self) -> Arc<dyn Storage> {
        let backend = match &self.storage_dir {
            Some(dir) => FileStorage::new(dir.clone()).map(file_storage_with_fallback),
            None => create_default_storage(),
        };
        backend.unwrap_or_else(|e| {
            log::warn!("Persistent storage unavailable ({}), changes will not be kept", e);
            Arc::new(MemoryStorage::new())
        })
    }
}

fn load_dashboard_config(path: &Path) -> DashboardConfig {
    match DashboardConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Ignoring {:?}: {}", path, e);
            DashboardConfig::default()
        }
    }
}

/// Something the toolbar asked for this frame.
#[derive(Debug, Clone, PartialEq)]
enum ToolbarAction {
    ToggleEdit,
    SetGridSnap(bool),
    SetGridSize(f64),
    SetTheme(Theme),
    Add(WidgetKind),
    Export,
    Import,
    ToggleHelp,
}

pub struct TabboardApp {
    dashboard: Dashboard,
    settings_panel: SettingsPanel,
    delete_confirmation: DeleteConfirmation,
    show_help: bool,
    /// Last import/export result, shown in the toolbar.
    status: Option<String>,
}

impl TabboardApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let store = Store::new(config.open_storage());
        let app = Self::with_dashboard(Dashboard::new(
            store,
            config.dashboard,
            RendererRegistry::with_builtins(),
        ));
        theme::apply(&cc.egui_ctx, app.dashboard.settings().theme);
        ShortcutRegistry::log_all();
        app
    }

    /// Wrap a dashboard and load its persisted state.
    pub fn with_dashboard(mut dashboard: Dashboard) -> Self {
        let count = block_on(dashboard.load());
        log::info!("Loaded {} widgets", count);
        Self {
            dashboard,
            settings_panel: SettingsPanel::new(),
            delete_confirmation: DeleteConfirmation::new(),
            show_help: false,
            status: None,
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    fn toolbar(&self, ctx: &Context) -> Vec<ToolbarAction> {
        let mut actions = Vec::new();
        let settings = self.dashboard.settings();
        egui::TopBottomPanel::top("toolbar")
            .frame(menu::toolbar_frame())
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if ToggleButton::new("Edit", self.dashboard.is_editing())
                        .tooltip("Toggle edit mode (E)")
                        .show(ui)
                    {
                        actions.push(ToolbarAction::ToggleEdit);
                    }
                    layout::vertical_separator(ui);

                    if ToggleButton::new("Snap", settings.grid_snap_enabled)
                        .tooltip("Snap to grid while moving and resizing")
                        .show(ui)
                    {
                        actions.push(ToolbarAction::SetGridSnap(!settings.grid_snap_enabled));
                    }
                    let mut grid_size = settings.grid_size;
                    let response = ui.add(
                        egui::DragValue::new(&mut grid_size)
                            .range(4.0..=200.0)
                            .speed(1.0)
                            .suffix(" px"),
                    );
                    if response.changed() {
                        actions.push(ToolbarAction::SetGridSize(grid_size));
                    }
                    layout::vertical_separator(ui);

                    ui.menu_button("Add widget", |ui| {
                        if let Some(kind) =
                            picker::widget_picker(ui, self.dashboard.registry().renderers())
                        {
                            actions.push(ToolbarAction::Add(kind));
                        }
                    });
                    ui.menu_button("Data", |ui| {
                        if menu::menu_item(ui, "Export...", "") {
                            actions.push(ToolbarAction::Export);
                            ui.close();
                        }
                        if menu::menu_item(ui, "Import...", "") {
                            actions.push(ToolbarAction::Import);
                            ui.close();
                        }
                    });

                    let mut selected = settings.theme;
                    egui::ComboBox::from_id_salt("theme")
                        .selected_text(theme_label(selected))
                        .show_ui(ui, |ui| {
                            for option in [Theme::Dark, Theme::Light, Theme::System] {
                                ui.selectable_value(&mut selected, option, theme_label(option));
                            }
                        });
                    if selected != settings.theme {
                        actions.push(ToolbarAction::SetTheme(selected));
                    }

                    if TextButton::new("Shortcuts").show(ui) {
                        actions.push(ToolbarAction::ToggleHelp);
                    }
                    if let Some(status) = &self.status {
                        layout::section_label(ui, status);
                    }
                });
            });
        actions
    }

    fn apply_toolbar(&mut self, ctx: &Context, action: ToolbarAction) {
        match action {
            ToolbarAction::ToggleEdit => {
                self.dashboard.toggle_edit_mode();
            }
            ToolbarAction::SetGridSnap(enabled) => block_on(self.dashboard.set_grid_snap(enabled)),
            ToolbarAction::SetGridSize(size) => {
                block_on(self.dashboard.update_grid_size(size));
            }
            ToolbarAction::SetTheme(choice) => {
                block_on(self.dashboard.set_theme(choice));
                theme::apply(ctx, choice);
            }
            ToolbarAction::Add(kind) => {
                if block_on(self.dashboard.create(kind.clone(), WidgetOverrides::default())).is_none() {
                    log::warn!("Could not add a {} widget", kind);
                }
            }
            ToolbarAction::Export => self.export(),
            ToolbarAction::Import => self.import(),
            ToolbarAction::ToggleHelp => self.show_help = !self.show_help,
        }
    }

    fn export(&mut self) {
        let json = match block_on(self.dashboard.export_json()) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Export failed: {}", e);
                self.status = Some(format!("Export failed: {}", e));
                return;
            }
        };
        match file_ops::save_snapshot(&json) {
            Ok(Some(_)) => self.status = Some("Exported".to_string()),
            Ok(None) => {}
            Err(e) => {
                log::error!("{}", e);
                self.status = Some(e.to_string());
            }
        }
    }

    fn import(&mut self) {
        let json = match file_ops::open_snapshot() {
            Ok(Some(json)) => json,
            Ok(None) => return,
            Err(e) => {
                log::error!("{}", e);
                self.status = Some(e.to_string());
                return;
            }
        };
        self.import_json(&json);
    }

    fn import_json(&mut self, json: &str) {
        self.settings_panel.close();
        self.delete_confirmation.cancel();
        let outcome = block_on(self.dashboard.import(json));
        self.status = Some(match outcome.error {
            None => "Imported".to_string(),
            Some(error) => format!("Import failed: {}", error),
        });
    }

    /// Feed one frame of canvas input into the dashboard.
    fn apply_canvas(&mut self, output: CanvasOutput, now: Instant) {
        self.dashboard.set_viewport(output.viewport);
        for edit in output.edits {
            self.dashboard.edit_text(&edit.id, &edit.field, &edit.text, now);
        }
        for (id, field) in output.closed {
            block_on(self.dashboard.close_editor(&id, &field));
        }
        for event in output.pointer {
            let action = block_on(self.dashboard.handle_pointer(event));
            self.apply_action(action);
        }
        for key in output.keys {
            let action = self.dashboard.handle_key(key);
            self.apply_action(action);
        }
        self.dashboard.on_frame();
    }

    fn apply_action(&mut self, action: DashboardAction) {
        match action {
            DashboardAction::OpenSettings(id) => self.settings_panel.open(id),
            DashboardAction::ConfirmDelete(id) => self.settings_panel.open_delete_confirmation(id),
            DashboardAction::ConfirmDeleteSelection(ids) => self.delete_confirmation.request(ids),
            DashboardAction::None => {}
        }
    }

    fn delete_confirmation_window(&mut self, ctx: &Context) {
        if let Some(ids) = self.delete_confirmation.show(ctx) {
            let deleted = block_on(self.dashboard.delete_all(&ids));
            log::info!("Deleted {} selected widgets", deleted);
        }
    }

    fn settings_window(&mut self, ctx: &Context) {
        let Some(id) = self.settings_panel.target().cloned() else {
            return;
        };
        let record = self.dashboard.registry().record(&id);
        let title = record
            .map(|r| r.kind.display_name().to_string())
            .unwrap_or_default();
        let action = self
            .settings_panel
            .show(ctx, &title, record.map(|r| &r.appearance));
        match action {
            SettingsAction::Update(id, patch) => {
                block_on(self.dashboard.update_appearance(&id, &patch));
            }
            SettingsAction::Delete(id) => {
                block_on(self.dashboard.delete(&id));
            }
            SettingsAction::None => {}
        }
    }

    fn help_window(&mut self, ctx: &Context) {
        egui::Window::new("Shortcuts")
            .frame(menu::panel_frame())
            .collapsible(false)
            .resizable(false)
            .open(&mut self.show_help)
            .show(ctx, |ui| {
                egui::Grid::new("shortcut-grid").num_columns(2).show(ui, |ui| {
                    for shortcut in ShortcutRegistry::all() {
                        ui.label(shortcut.format());
                        ui.label(shortcut.description);
                        ui.end_row();
                    }
                    for (gesture, description) in ShortcutRegistry::gestures() {
                        ui.label(*gesture);
                        ui.label(*description);
                        ui.end_row();
                    }
                });
            });
    }
}

fn theme_label(theme: Theme) -> &'static str {
    match theme {
        Theme::Dark => "Dark",
        Theme::Light => "Light",
        Theme::System => "System",
    }
}

impl eframe::App for TabboardApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        block_on(self.dashboard.tick(now));

        for action in self.toolbar(ctx) {
            self.apply_toolbar(ctx, action);
        }
        let output = egui::CentralPanel::default()
            .frame(Frame::new())
            .show(ctx, |ui| DashboardView::new(&self.dashboard).show(ui))
            .inner;
        self.apply_canvas(output, now);
        self.settings_window(ctx);
        self.delete_confirmation_window(ctx);
        self.help_window(ctx);

        if ctx.input(|i| i.viewport().close_requested()) {
            let written = block_on(self.dashboard.flush());
            log::debug!("Flushed {} pending edits on close", written);
        }
        if self.dashboard.registry().has_pending_edits() {
            // Wake up for the autosave deadline even without input.
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}

/// Open the native window and run until it closes.
pub fn run(config: AppConfig) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(config.title.clone())
            .with_inner_size([config.width, config.height]),
        ..Default::default()
    };
    let title = config.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Ok(Box::new(TabboardApp::new(cc, config)))),
    )
}
