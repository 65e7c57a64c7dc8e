//! Keyboard state machine over the results index.
//!
//! [`transition`] is pure: it maps a key press and a snapshot of the overlay
//! to the action the widget should perform.

use crate::results_index::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowDown,
    ArrowUp,
    ArrowLeft,
    ArrowRight,
    Tab,
    Enter,
    Other,
}

impl Key {
    /// Parses a DOM `KeyboardEvent.key` value.
    pub fn from_dom(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => Key::Escape,
            "ArrowDown" | "Down" => Key::ArrowDown,
            "ArrowUp" | "Up" => Key::ArrowUp,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            "Tab" => Key::Tab,
            "Enter" => Key::Enter,
            _ => Key::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
}

impl KeyPress {
    pub fn new(key: Key) -> Self {
        Self { key, shift: false }
    }

    pub fn shifted(key: Key) -> Self {
        Self { key, shift: true }
    }
}

/// What the navigator sees when a key arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavState<'a> {
    pub open: bool,
    pub cursor: Cursor,
    pub item_count: usize,
    pub single_result_url: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAction {
    /// Clear the term and selection, then collapse.
    Reset,
    /// Highlight the item at this position (keyboard-originated).
    Move(usize),
    NavigateSingle(String),
    Activate(usize),
    SubmitSearch,
    Ignore,
}

impl NavAction {
    pub fn outcome(&self) -> KeyOutcome {
        KeyOutcome {
            prevent_default: matches!(
                self,
                NavAction::Move(_) | NavAction::NavigateSingle(_) | NavAction::Activate(_)
            ),
        }
    }
}

/// Tells the host whether to suppress the key's default action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyOutcome {
    pub prevent_default: bool,
}

pub fn transition(press: KeyPress, state: NavState<'_>) -> NavAction {
    if press.key == Key::Escape {
        return NavAction::Reset;
    }
    if !state.open || state.item_count == 0 {
        return NavAction::Ignore;
    }
    let forward = state.cursor.next(state.item_count);
    let backward = state.cursor.previous(state.item_count);
    let step = |target: Option<usize>| target.map_or(NavAction::Ignore, NavAction::Move);
    match press.key {
        Key::ArrowDown => step(forward),
        Key::ArrowUp => step(backward),
        Key::Tab if press.shift => step(backward),
        Key::Tab => step(forward),
        Key::Enter => match (state.single_result_url, state.cursor) {
            (Some(url), _) if !url.is_empty() => NavAction::NavigateSingle(url.to_string()),
            (_, Cursor::At(index)) if index < state.item_count => NavAction::Activate(index),
            _ => NavAction::SubmitSearch,
        },
        Key::ArrowLeft | Key::ArrowRight | Key::Escape | Key::Other => NavAction::Ignore,
    }
}
