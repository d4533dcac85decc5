//! Flat command stream produced by the render pass.
//!
//! The desktop walks the arranged tree and emits draw primitives plus
//! scissor/opacity/transform stack operations; a backend (see
//! [`crate::renderer`] for the macroquad one) replays them in order. The
//! core never touches a graphics API.

use crate::assets::ImageHandle;
use crate::color::Color;
use crate::control::FontHandle;
use crate::math::{Point, Rect, Thickness};
use crate::transform::Transform;

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Clip subsequent draws to the rectangle (intersected with any
    /// enclosing scissor by the backend).
    PushScissor(Rect),
    PopScissor,
    /// Multiplies into the backend's opacity stack.
    PushOpacity(f32),
    PopOpacity,
    /// Composes onto the backend's transform stack.
    PushTransform(Transform),
    PopTransform,
    Rectangle {
        bounds: Rect,
        color: Color,
    },
    Border {
        bounds: Rect,
        color: Color,
        thickness: Thickness,
    },
    Image {
        bounds: Rect,
        handle: ImageHandle,
        tint: Color,
    },
    Text {
        position: Point,
        text: String,
        font: FontHandle,
        size: u16,
        color: Color,
    },
}
