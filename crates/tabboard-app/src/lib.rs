//! Tabboard application shell.
//!
//! Wires platform storage, configuration and logging to the dashboard core
//! and draws it with the egui components from `tabboard-widgets`.

mod app;
mod file_ops;
mod shortcuts;

pub use app::{AppConfig, TabboardApp, run};
pub use shortcuts::{Shortcut, ShortcutRegistry};
