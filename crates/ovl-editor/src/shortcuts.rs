//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. Delete and
//! Backspace only remove the selected element when the canvas has focus;
//! while the user types into the element text or a property input they
//! belong to that field.

use crate::input::Modifiers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Edit ──
    Undo,
    Redo,
    Delete,
    Deselect,
    AddLayer,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ZoomReset,

    // ── Z-order ──
    SendBackward,
    BringForward,
}

/// Where keyboard focus currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Canvas,
    /// An element's editable text region.
    TextRegion,
    /// A property panel input (number, color, select).
    Input,
}

impl Focus {
    pub fn is_text_entry(self) -> bool {
        !matches!(self, Focus::Canvas)
    }
}

/// Resolves key events into shortcut actions.
///
/// On macOS `meta` is ⌘; elsewhere `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action, or `None` if unbound.
    pub fn resolve(key: &str, modifiers: Modifiers, focus: Focus) -> Option<ShortcutAction> {
        let cmd = modifiers.command();

        if cmd && modifiers.shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ZoomReset),
                "[" => Some(ShortcutAction::SendBackward),
                "]" => Some(ShortcutAction::BringForward),
                _ => None,
            };
        }

        // Bare keys are text while typing.
        if focus.is_text_entry() {
            return match key {
                "Escape" => Some(ShortcutAction::Deselect),
                _ => None,
            };
        }

        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            "t" | "T" => Some(ShortcutAction::AddLayer),
            _ => None,
        }
    }
}
