//! Host-facing input snapshot consumed by the desktop once per frame.

use bitflags::bitflags;

use crate::math::{Point, Rect, Vector2};

/// A single mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    X1,
    X2,
}

impl MouseButton {
    pub const ALL: [MouseButton; 5] = [
        MouseButton::Left,
        MouseButton::Right,
        MouseButton::Middle,
        MouseButton::X1,
        MouseButton::X2,
    ];

    pub fn flag(self) -> MouseButtons {
        match self {
            MouseButton::Left => MouseButtons::LEFT,
            MouseButton::Right => MouseButtons::RIGHT,
            MouseButton::Middle => MouseButtons::MIDDLE,
            MouseButton::X1 => MouseButtons::X1,
            MouseButton::X2 => MouseButtons::X2,
        }
    }
}

bitflags! {
    /// Set of mouse buttons currently held down.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MouseButtons : u8 {
        const LEFT = 1;
        const RIGHT = 2;
        const MIDDLE = 4;
        const X1 = 8;
        const X2 = 16;
        const NONE = 0;
    }
}

bitflags! {
    /// Modifier keys held down alongside the key set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct KeyModifiers : u8 {
        const SHIFT = 1;
        const CTRL = 2;
        const ALT = 4;
        const NONE = 0;
    }
}

/// Keys the desktop routes. Printable keys travel as `Character`; text entry
/// itself arrives through [`TextEvent`], not through key edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Tab,
    Enter,
    Escape,
    Space,
    Backspace,
    Delete,
    Insert,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Character(char),
}

/// Committed text vs an in-flight IME composition preview. Previews replace
/// each other and never mutate control state permanently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextEvent {
    Committed(String),
    Preview(String),
}

/// Snapshot of raw input for one frame, filled by the host (or by
/// [`crate::renderer::gather_input`] when the macroquad backend is enabled).
#[derive(Debug, Clone, Default)]
pub struct InputFrame {
    pub mouse_position: Point,
    pub buttons: MouseButtons,
    /// Wheel movement this frame; positive y scrolls up.
    pub wheel_delta: Vector2,
    pub keys_down: Vec<Key>,
    pub modifiers: KeyModifiers,
    pub text_events: Vec<TextEvent>,
    /// Viewport pixel bounds. A change re-arranges the visible tree.
    pub viewport: Rect,
}
