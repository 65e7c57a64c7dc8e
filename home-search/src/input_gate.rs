//! The two debounced entry points of the component: typing and the reset
//! button. They run on independent timers.

use std::time::Duration;
use storefront_async_utils::Debouncer;

/// Origin of an input change, mirroring the DOM `InputEvent.inputType`
/// families the component cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    InsertText,
    DeleteBackward,
    DeleteForward,
    Paste,
    /// Value set by script, e.g. the component clearing itself.
    Programmatic,
}

impl InputKind {
    pub fn is_text_entry(self) -> bool {
        !matches!(self, InputKind::Programmatic)
    }
}

/// Coalesces keystrokes; fires once per quiet window with the last value.
#[derive(Debug)]
pub struct SearchGate {
    timer: Debouncer<String>,
}

impl SearchGate {
    pub fn new(delay: Duration) -> Self {
        Self {
            timer: Debouncer::new(delay),
        }
    }

    /// Restarts the window with `raw`. Returns `false` for changes that did
    /// not come from text entry, which never reach the gate.
    pub fn offer(&mut self, raw: &str, kind: InputKind) -> bool {
        if !kind.is_text_entry() {
            return false;
        }
        self.timer.schedule(raw.to_string());
        true
    }

    pub async fn due(&mut self) -> String {
        self.timer.fired().await
    }

    pub fn cancel(&mut self) {
        self.timer.cancel();
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_armed()
    }
}

/// Debounces the reset button.
#[derive(Debug)]
pub struct ResetGate {
    timer: Debouncer<()>,
}

impl ResetGate {
    pub fn new(delay: Duration) -> Self {
        Self {
            timer: Debouncer::new(delay),
        }
    }

    pub fn trigger(&mut self) {
        self.timer.schedule(());
    }

    pub async fn due(&mut self) {
        self.timer.fired().await
    }

    pub fn cancel(&mut self) {
        self.timer.cancel();
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_armed()
    }
}
