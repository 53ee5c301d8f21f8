//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. Bindings are
//! edge-triggered: the host reports one `KeyEvent` per press.

use crate::input::KeyEvent;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Tools ──
    MoveTool,
    HandTool,

    // ── Nudge (fixed-step synthetic drag) ──
    NudgeLeft,
    NudgeUp,
    NudgeRight,
    NudgeDown,

    // ── Edit ──
    Undo,
    Redo,
    Delete,
    SelectAll,
    Copy,
    Cut,
    Paste,
    Deselect,
}

impl ShortcutAction {
    /// Unit direction of a nudge action.
    pub fn nudge_direction(&self) -> Option<(f64, f64)> {
        match self {
            Self::NudgeLeft => Some((-1.0, 0.0)),
            Self::NudgeUp => Some((0.0, -1.0)),
            Self::NudgeRight => Some((1.0, 0.0)),
            Self::NudgeDown => Some((0.0, 1.0)),
            _ => None,
        }
    }
}

/// Resolves key events into shortcut actions.
///
/// On macOS `meta` is ⌘; elsewhere `ctrl` serves the same role, so either
/// counts as the command modifier.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action, or `None` if unbound.
    pub fn resolve(event: &KeyEvent) -> Option<ShortcutAction> {
        let cmd = event.ctrl || event.meta;
        let key = event.key.as_str();

        if cmd && event.shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "a" | "A" => Some(ShortcutAction::SelectAll),
                "c" | "C" => Some(ShortcutAction::Copy),
                "x" | "X" => Some(ShortcutAction::Cut),
                "v" | "V" => Some(ShortcutAction::Paste),
                _ => None,
            };
        }

        match key {
            "v" | "V" => Some(ShortcutAction::MoveTool),
            "h" | "H" => Some(ShortcutAction::HandTool),
            "ArrowLeft" | "Left" => Some(ShortcutAction::NudgeLeft),
            "ArrowUp" | "Up" => Some(ShortcutAction::NudgeUp),
            "ArrowRight" | "Right" => Some(ShortcutAction::NudgeRight),
            "ArrowDown" | "Down" => Some(ShortcutAction::NudgeDown),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            _ => None,
        }
    }
}
