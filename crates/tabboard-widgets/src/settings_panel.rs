//! Per-widget settings window.
//!
//! Edits a widget's appearance and offers deletion behind a confirmation
//! step. The panel never writes anything itself: every change comes back as
//! a [`SettingsAction`] for the host to apply through the dashboard.

use egui::{Context, Ui};
use tabboard_core::{Appearance, AppearancePatch, VisualEffect, WidgetId};

use crate::buttons::ToggleButton;
use crate::{colors, layout, menu, theme};

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsAction {
    None,
    Update(WidgetId, AppearancePatch),
    /// Deletion was confirmed.
    Delete(WidgetId),
}

#[derive(Debug, Default)]
pub struct SettingsPanel {
    target: Option<WidgetId>,
    confirming_delete: bool,
}

impl SettingsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the panel for `id`, dropping any pending confirmation.
    pub fn open(&mut self, id: WidgetId) {
        self.target = Some(id);
        self.confirming_delete = false;
    }

    /// Open straight at the delete confirmation.
    pub fn open_delete_confirmation(&mut self, id: WidgetId) {
        self.target = Some(id);
        self.confirming_delete = true;
    }

    pub fn close(&mut self) {
        self.target = None;
        self.confirming_delete = false;
    }

    pub fn target(&self) -> Option<&WidgetId> {
        self.target.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }

    pub fn is_confirming_delete(&self) -> bool {
        self.confirming_delete
    }

    pub fn request_delete(&mut self) {
        if self.target.is_some() {
            self.confirming_delete = true;
        }
    }

    pub fn cancel_delete(&mut self) {
        self.confirming_delete = false;
    }

    /// Confirm a requested delete. Closes the panel and yields the id.
    pub fn confirm_delete(&mut self) -> Option<WidgetId> {
        if !self.confirming_delete {
            return None;
        }
        let id = self.target.take();
        self.confirming_delete = false;
        id
    }

    /// Show the window. `appearance` is the target's current appearance; a
    /// panel whose target has no appearance (e.g. deleted meanwhile) closes.
    pub fn show(
        &mut self,
        ctx: &Context,
        title: &str,
        appearance: Option<&Appearance>,
    ) -> SettingsAction {
        let (Some(id), Some(appearance)) = (self.target.clone(), appearance) else {
            self.close();
            return SettingsAction::None;
        };

        let mut open = true;
        let mut action = SettingsAction::None;
        egui::Window::new(format!("{} settings", title))
            .id(egui::Id::new(("widget-settings", id.as_str())))
            .frame(menu::panel_frame())
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                if self.confirming_delete {
                    action = self.confirmation_ui(ui);
                    return;
                }
                if let Some(patch) = appearance_ui(ui, appearance) {
                    action = SettingsAction::Update(id.clone(), patch);
                }
                layout::separator(ui);
                if ToggleButton::new("Delete widget", false).show(ui) {
                    self.request_delete();
                }
            });
        if !open {
            self.close();
        }
        action
    }

    fn confirmation_ui(&mut self, ui: &mut Ui) -> SettingsAction {
        ui.label(egui::RichText::new("Delete this widget?").color(theme::DANGER));
        ui.label(egui::RichText::new("Its saved data is removed too.").color(theme::TEXT_MUTED));
        let mut action = SettingsAction::None;
        ui.horizontal(|ui| {
            if ToggleButton::new("Delete", true).show(ui) {
                if let Some(id) = self.confirm_delete() {
                    action = SettingsAction::Delete(id);
                }
            }
            if ToggleButton::new("Cancel", false).show(ui) {
                self.cancel_delete();
            }
        });
        action
    }
}

/// Appearance controls. Returns a patch holding only what changed.
fn appearance_ui(ui: &mut Ui, appearance: &Appearance) -> Option<AppearancePatch> {
    let mut patch = AppearancePatch::default();

    layout::section_label(ui, "Background");
    patch.background_color = colors::swatch_grid(ui, &appearance.background_color, 6)
        .filter(|hex| *hex != appearance.background_color);

    layout::section_label(ui, "Opacity");
    let mut opacity = appearance.opacity;
    if ui
        .add(egui::Slider::new(&mut opacity, 0..=100).suffix("%"))
        .changed()
    {
        patch.opacity = Some(opacity);
    }

    layout::section_label(ui, "Effect");
    ui.horizontal(|ui| {
        for effect in VisualEffect::ALL {
            if ToggleButton::new(effect.label(), effect == appearance.effect).show(ui)
                && effect != appearance.effect
            {
                patch.effect = Some(effect);
            }
        }
    });

    let mut auto_hide = appearance.auto_hide;
    if ui.checkbox(&mut auto_hide, "Hide header until hovered").changed() {
        patch.auto_hide = Some(auto_hide);
    }

    (!patch.is_empty()).then_some(patch)
}
