//! Keyboard shortcut registry, shown in the help window.

use tabboard_core::{EditMode, Key};

#[derive(Debug, Clone, PartialEq)]
pub struct Shortcut {
    pub key: Key,
    /// Mode the shortcut works in, `None` for both.
    pub mode: Option<EditMode>,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: Key, mode: Option<EditMode>, description: &'static str) -> Self {
        Self {
            key,
            mode,
            description,
        }
    }

    /// Display form, e.g. "Esc" or "Del".
    pub fn format(&self) -> String {
        match self.key {
            Key::Escape => "Esc".to_string(),
            Key::Delete => "Del".to_string(),
            Key::Char(c) => c.to_ascii_uppercase().to_string(),
        }
    }
}

pub struct ShortcutRegistry;

impl ShortcutRegistry {
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new(Key::Char('e'), None, "Toggle edit mode"),
            Shortcut::new(Key::Escape, Some(EditMode::Editing), "Leave edit mode"),
            Shortcut::new(Key::Delete, Some(EditMode::Editing), "Delete selected widgets"),
        ]
    }

    /// Pointer gestures listed beside the keys.
    pub fn gestures() -> &'static [(&'static str, &'static str)] {
        &[
            ("Drag header", "Move a widget"),
            ("Drag corner", "Resize a widget"),
            ("Shift+Click header", "Add to selection"),
        ]
    }

    pub fn log_all() {
        for shortcut in Self::all() {
            log::debug!("{:18} {}", shortcut.format(), shortcut.description);
        }
    }
}
