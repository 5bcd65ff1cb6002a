//! Confirmation dialog for deleting several widgets at once.

use egui::Context;
use tabboard_core::WidgetId;

use crate::buttons::ToggleButton;
use crate::{menu, theme};

#[derive(Debug, Default)]
pub struct DeleteConfirmation {
    pending: Vec<WidgetId>,
}

impl DeleteConfirmation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask about `ids`, replacing any earlier request. An empty list closes
    /// the dialog.
    pub fn request(&mut self, ids: Vec<WidgetId>) {
        self.pending = ids;
    }

    pub fn pending(&self) -> &[WidgetId] {
        &self.pending
    }

    pub fn is_open(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn cancel(&mut self) {
        self.pending.clear();
    }

    /// Close the dialog and hand back the ids to delete.
    pub fn confirm(&mut self) -> Option<Vec<WidgetId>> {
        (!self.pending.is_empty()).then(|| std::mem::take(&mut self.pending))
    }

    /// Show the dialog. Returns the ids once the user confirms.
    pub fn show(&mut self, ctx: &Context) -> Option<Vec<WidgetId>> {
        if !self.is_open() {
            return None;
        }
        let count = self.pending.len();
        let mut open = true;
        let mut confirmed = None;
        egui::Window::new("Delete widgets")
            .id(egui::Id::new("delete-selection"))
            .frame(menu::panel_frame())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .open(&mut open)
            .show(ctx, |ui| {
                let noun = if count == 1 { "widget" } else { "widgets" };
                ui.label(
                    egui::RichText::new(format!("Delete {} selected {}?", count, noun))
                        .color(theme::DANGER),
                );
                ui.label(egui::RichText::new("Their saved data is removed too.").color(theme::TEXT_MUTED));
                ui.horizontal(|ui| {
                    if ToggleButton::new("Delete", true).show(ui) {
                        confirmed = self.confirm();
                    }
                    if ToggleButton::new("Cancel", false).show(ui) {
                        self.cancel();
                    }
                });
            });
        if !open {
            self.cancel();
        }
        confirmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_yields_pending_once() {
        let mut dialog = DeleteConfirmation::new();
        let ids = vec![WidgetId::from("w-a"), WidgetId::from("w-b")];
        dialog.request(ids.clone());
        assert!(dialog.is_open());
        assert_eq!(dialog.confirm(), Some(ids));
        assert!(!dialog.is_open());
        assert_eq!(dialog.confirm(), None);
    }

    #[test]
    fn test_cancel_drops_request() {
        let mut dialog = DeleteConfirmation::new();
        dialog.request(vec![WidgetId::from("w-a")]);
        dialog.cancel();
        assert!(!dialog.is_open());
        assert_eq!(dialog.confirm(), None);
    }

    #[test]
    fn test_showing_does_not_confirm() {
        let ctx = Context::default();
        let mut dialog = DeleteConfirmation::new();
        dialog.request(vec![WidgetId::from("w-a")]);
        let mut result = Some(Vec::new());
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            result = dialog.show(ctx);
        });
        assert_eq!(result, None);
        assert!(dialog.is_open());
    }
}
