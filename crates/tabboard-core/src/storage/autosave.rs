//! Debounced autosave for widgets that persist while the user types.
//!
//! An [`AutosaveSession`] is the timer owned by one open editor. Every edit
//! restarts the countdown; the value is written only after the configured
//! quiet period, when the editor closes (flush), or never if the widget is
//! deleted first (cancel).

use serde_json::Value;

use crate::time::{Duration, Instant};

/// Default debounce window in milliseconds.
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 1000;

/// A cancellable debounce timer holding the latest unsaved value.
#[derive(Debug, Clone)]
pub struct AutosaveSession {
    /// Storage key the value is written to.
    key: String,
    /// Quiet period before a write.
    delay: Duration,
    /// Latest value not yet written.
    pending: Option<Value>,
    /// When the pending value becomes due.
    deadline: Option<Instant>,
}

impl AutosaveSession {
    pub fn new(key: impl Into<String>, delay: Duration) -> Self {
        Self {
            key: key.into(),
            delay,
            pending: None,
            deadline: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a new value and restart the countdown.
    pub fn touch(&mut self, value: Value, now: Instant) {
        self.pending = Some(value);
        self.deadline = Some(now + self.delay);
    }

    /// Whether there is an unsaved value.
    pub fn is_dirty(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether the quiet period has elapsed for the pending value.
    pub fn is_due(&self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) => self.pending.is_some() && now >= deadline,
            None => false,
        }
    }

    /// Take the pending value if it is due.
    pub fn take_due(&mut self, now: Instant) -> Option<Value> {
        if self.is_due(now) { self.flush() } else { None }
    }

    /// Take the pending value immediately, regardless of the deadline.
    pub fn flush(&mut self) -> Option<Value> {
        self.deadline = None;
        self.pending.take()
    }

    /// Drop the pending value without writing it.
    pub fn cancel(&mut self) {
        if self.pending.is_some() {
            log::debug!("Cancelled pending autosave for {}", self.key);
        }
        self.pending = None;
        self.deadline = None;
    }
}
