//! Platform-agnostic input events.
//!
//! The host translates its native pointer/keyboard/wheel events into these
//! before handing them to the session. Coordinates are screen pixels.

use kurbo::Point;

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// ⌘ on macOS.
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// ⌘ on macOS, Ctrl elsewhere.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp { x: f64, y: f64 },
    /// Double click on the canvas surface.
    DoubleClick { x: f64, y: f64 },
    /// One wheel tick. Negative `delta_y` scrolls up.
    Wheel { delta_y: f64 },
    /// `key` is the DOM `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    Key { key: String, modifiers: Modifiers },
}

impl InputEvent {
    pub fn key(key: &str, modifiers: Modifiers) -> Self {
        Self::Key {
            key: key.to_string(),
            modifiers,
        }
    }

    /// Extract position if this is a pointer event.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { x, y }
            | Self::PointerMove { x, y }
            | Self::PointerUp { x, y }
            | Self::DoubleClick { x, y } => Some(Point::new(*x, *y)),
            _ => None,
        }
    }
}
