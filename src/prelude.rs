//! The commonly needed surface in one import.

pub use crate::assets::{AssetResolver, ImageHandle};
pub use crate::color::Color;
pub use crate::control::{
    ControlKind, ControlMut, FontHandle, HorizontalAlignment, ImageState, InteractionState,
    TextState, TextStyle, VerticalAlignment,
};
pub use crate::desktop::Desktop;
pub use crate::events::UiEvent;
pub use crate::grid::{GridSelectionMode, GridState, GridUnit, TrackDefinition};
pub use crate::input::{InputFrame, Key, KeyModifiers, MouseButton, MouseButtons, TextEvent};
pub use crate::math::{Point, Rect, Size, Thickness, Vector2};
pub use crate::render_commands::RenderCommand;
pub use crate::scroll::{set_scroll_position, ScrollState, ScrollbarVisibility};
pub use crate::stack::{Orientation, StackState};
pub use crate::style::{StyleResolver, StyleSheet};
pub use crate::transform::Transform;
pub use crate::tree::ControlId;
