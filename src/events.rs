//! Frame event stream.
//!
//! Instead of per-control multicast callbacks, state changes are queued as
//! `UiEvent` values and drained by the host after each frame
//! (`Desktop::poll_events`). The two interaction points that must be able to
//! veto a change synchronously (losing focus, context-menu close) are
//! registered as explicit hooks on the desktop.

use crate::input::{Key, MouseButton, TextEvent};
use crate::math::Point;
use crate::tree::ControlId;

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    MouseEntered(ControlId),
    MouseLeft(ControlId),
    MouseMoved {
        position: Point,
    },
    TouchDown {
        control: ControlId,
        position: Point,
        button: MouseButton,
    },
    TouchUp {
        control: ControlId,
        position: Point,
        button: MouseButton,
    },
    DoubleClick {
        control: ControlId,
        position: Point,
    },
    GotFocus(ControlId),
    LostFocus(ControlId),
    KeyDown {
        key: Key,
        repeat: bool,
        target: Option<ControlId>,
    },
    KeyUp {
        key: Key,
    },
    TextInput {
        control: ControlId,
        event: TextEvent,
    },
    /// Wheel movement routed to a wheel-capturing control.
    MouseWheel {
        control: ControlId,
        delta: f32,
    },
    /// Scroll offset changed; fired only on an actual value change.
    Scrolled {
        control: ControlId,
        position: Point,
    },
    /// Grid selection indices changed.
    SelectionChanged(ControlId),
    ContextMenuOpened(ControlId),
    ContextMenuClosed(ControlId),
}
