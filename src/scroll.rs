//! Scroll viewer: overflow negotiation for a single child.
//!
//! Measure flags an axis as scrollable when the child's measured size
//! exceeds the available extent, growing the *perpendicular* desired axis by
//! the scrollbar thickness (a vertical bar consumes horizontal space and
//! vice versa). Arrange re-measures the child minus shown bars, computes
//! area-proportional thumb geometry, arranges the child at its full measured
//! size and clamps the scroll offset into `[0, scroll_maximum]`.

use crate::color::Color;
use crate::control::ControlKind;
use crate::desktop::Desktop;
use crate::events::UiEvent;
use crate::math::{Point, Rect, Size};
use crate::tree::ControlId;

/// Content-pixels moved per wheel unit, before track scaling.
pub(crate) const WHEEL_STEP: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollbarVisibility {
    /// Bar appears when content overflows.
    #[default]
    Auto,
    /// Axis never scrolls, even on overflow.
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScrollAxis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ThumbDrag {
    pub axis: ScrollAxis,
    pub grab: Point,
    pub start: Point,
}

pub struct ScrollState {
    pub horizontal_visibility: ScrollbarVisibility,
    pub vertical_visibility: ScrollbarVisibility,
    pub scrollbar_thickness: i32,
    pub knob_min_size: i32,
    pub track_color: Color,
    pub thumb_color: Color,

    pub(crate) scroll_position: Point,
    pub(crate) scroll_maximum: Point,
    pub(crate) thumb_maximum: Point,
    pub(crate) show_horizontal: bool,
    pub(crate) show_vertical: bool,
    pub(crate) horizontal_thumb: Rect,
    pub(crate) vertical_thumb: Rect,
    pub(crate) horizontal_track: Rect,
    pub(crate) vertical_track: Rect,
    pub(crate) drag: Option<ThumbDrag>,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            horizontal_visibility: ScrollbarVisibility::Auto,
            vertical_visibility: ScrollbarVisibility::Auto,
            scrollbar_thickness: 8,
            knob_min_size: 16,
            track_color: Color::u_rgba(0x30, 0x30, 0x30, 0xC0),
            thumb_color: Color::u_rgb(0x70, 0x70, 0x70),
            scroll_position: Point::ZERO,
            scroll_maximum: Point::ZERO,
            thumb_maximum: Point::new(1, 1),
            show_horizontal: false,
            show_vertical: false,
            horizontal_thumb: Rect::ZERO,
            vertical_thumb: Rect::ZERO,
            horizontal_track: Rect::ZERO,
            vertical_track: Rect::ZERO,
            drag: None,
        }
    }
}

impl ScrollState {
    pub fn scroll_position(&self) -> Point {
        self.scroll_position
    }

    pub fn scroll_maximum(&self) -> Point {
        self.scroll_maximum
    }

    pub fn shows_horizontal_scrollbar(&self) -> bool {
        self.show_horizontal
    }

    pub fn shows_vertical_scrollbar(&self) -> bool {
        self.show_vertical
    }

    fn clamp(&self, p: Point) -> Point {
        Point::new(
            p.x.clamp(0, self.scroll_maximum.x.max(0)),
            p.y.clamp(0, self.scroll_maximum.y.max(0)),
        )
    }
}

/// Area-proportional thumb: `max(knob_min, viewport² / content)`, so small
/// content never produces a vanishing thumb.
fn thumb_size(knob_min: i32, viewport: i32, content: i32) -> i32 {
    if content <= 0 {
        return knob_min;
    }
    let proportional = ((viewport as i64 * viewport as i64) / content as i64) as i32;
    proportional.max(knob_min)
}

pub(crate) fn measure(desktop: &mut Desktop, id: ControlId, available: Size) -> Size {
    let (h_vis, v_vis, thickness) = {
        let state = state_ref(desktop, id);
        (
            state.horizontal_visibility,
            state.vertical_visibility,
            state.scrollbar_thickness,
        )
    };

    let child = desktop.children_snapshot(id).first().copied();
    let mut desired = match child {
        Some(child) if desktop.control(child).visible() => {
            desktop.measure(child, available, true)
        }
        _ => Size::ZERO,
    };

    let needs_horizontal =
        desired.width > available.width && h_vis != ScrollbarVisibility::Hidden;
    let needs_vertical =
        desired.height > available.height && v_vis != ScrollbarVisibility::Hidden;

    // A scrollbar consumes space along the perpendicular edge.
    if needs_vertical {
        desired.width += thickness;
    }
    if needs_horizontal {
        desired.height += thickness;
    }

    let state = state_mut(desktop, id);
    state.show_horizontal = needs_horizontal;
    state.show_vertical = needs_vertical;
    desired
}

pub(crate) fn arrange(desktop: &mut Desktop, id: ControlId, content: Rect) {
    let (show_h, show_v, thickness, knob_min) = {
        let state = state_ref(desktop, id);
        (
            state.show_horizontal,
            state.show_vertical,
            state.scrollbar_thickness,
            state.knob_min_size,
        )
    };

    let child = desktop.children_snapshot(id).first().copied();
    let child = match child {
        Some(c) if desktop.control(c).visible() => Some(c),
        _ => None,
    };

    let child_available = Size::new(
        (content.width - if show_v { thickness } else { 0 }).max(0),
        (content.height - if show_h { thickness } else { 0 }).max(0),
    );
    let child_size = match child {
        Some(c) => desktop.measure(c, child_available, true),
        None => Size::ZERO,
    };

    let scroll_maximum = Point::new(
        if show_h {
            (child_size.width - content.width + if show_v { thickness } else { 0 }).max(0)
        } else {
            0
        },
        if show_v {
            (child_size.height - content.height + if show_h { thickness } else { 0 }).max(0)
        } else {
            0
        },
    );

    // Track runs along its own edge, shortened where both bars meet.
    let h_track = Rect::new(
        content.x,
        content.bottom() - thickness,
        (content.width - if show_v { thickness } else { 0 }).max(0),
        thickness,
    );
    let v_track = Rect::new(
        content.right() - thickness,
        content.y,
        thickness,
        (content.height - if show_h { thickness } else { 0 }).max(0),
    );

    let h_thumb_size = thumb_size(knob_min, child_available.width, child_size.width);
    let v_thumb_size = thumb_size(knob_min, child_available.height, child_size.height);
    // Floor 1 so offset/ratio math never divides by zero.
    let thumb_maximum = Point::new(
        (h_track.width - h_thumb_size).max(1),
        (v_track.height - v_thumb_size).max(1),
    );

    let position = {
        let state = state_mut(desktop, id);
        state.scroll_maximum = scroll_maximum;
        state.thumb_maximum = thumb_maximum;
        state.scroll_position = state.clamp(state.scroll_position);
        state.scroll_position
    };

    if let Some(child) = child {
        // Child keeps its full measured size; overflow is clipped at render.
        desktop.arrange(
            child,
            Rect::new(
                content.x - position.x,
                content.y - position.y,
                child_size.width,
                child_size.height,
            ),
        );
    }

    let state = state_mut(desktop, id);
    let h_offset = if scroll_maximum.x > 0 {
        (position.x as i64 * thumb_maximum.x as i64 / scroll_maximum.x as i64) as i32
    } else {
        0
    };
    let v_offset = if scroll_maximum.y > 0 {
        (position.y as i64 * thumb_maximum.y as i64 / scroll_maximum.y as i64) as i32
    } else {
        0
    };
    state.horizontal_track = h_track;
    state.vertical_track = v_track;
    state.horizontal_thumb = Rect::new(
        h_track.x + h_offset,
        h_track.y,
        h_thumb_size.min(h_track.width),
        thickness,
    );
    state.vertical_thumb = Rect::new(
        v_track.x,
        v_track.y + v_offset,
        thickness,
        v_thumb_size.min(v_track.height),
    );
}

/// Clamps and applies a new scroll offset. Setting an already-clamped value
/// is a no-op: no event fires and no re-arrange is scheduled.
pub fn set_scroll_position(desktop: &mut Desktop, id: ControlId, position: Point) {
    let changed = {
        let state = state_mut(desktop, id);
        let clamped = state.clamp(position);
        if clamped == state.scroll_position {
            None
        } else {
            state.scroll_position = clamped;
            Some(clamped)
        }
    };
    if let Some(position) = changed {
        desktop.invalidate_arrange(id);
        desktop.push_event(UiEvent::Scrolled {
            control: id,
            position,
        });
    }
}

pub(crate) fn handle_wheel(desktop: &mut Desktop, id: ControlId, delta: f32, shift: bool) {
    let (position, maximum, thumb_maximum, show_h) = {
        let state = state_ref(desktop, id);
        (
            state.scroll_position,
            state.scroll_maximum,
            state.thumb_maximum,
            state.show_horizontal,
        )
    };

    // Wheel step scaled by the same content/track ratio as thumb dragging.
    let horizontal = shift && show_h;
    let (max_axis, thumb_axis) = if horizontal {
        (maximum.x, thumb_maximum.x)
    } else {
        (maximum.y, thumb_maximum.y)
    };
    let movement =
        (-delta as i64 * WHEEL_STEP as i64 * max_axis as i64 / thumb_axis.max(1) as i64) as i32;
    let target = if horizontal {
        Point::new(position.x + movement, position.y)
    } else {
        Point::new(position.x, position.y + movement)
    };
    set_scroll_position(desktop, id, target);
}

/// Starts a thumb drag if the point lies on a thumb. Returns true when the
/// touch was consumed.
pub(crate) fn try_begin_drag(desktop: &mut Desktop, id: ControlId, point: Point) -> bool {
    let state = state_mut(desktop, id);
    let axis = if state.show_horizontal && state.horizontal_thumb.contains(point) {
        Some(ScrollAxis::Horizontal)
    } else if state.show_vertical && state.vertical_thumb.contains(point) {
        Some(ScrollAxis::Vertical)
    } else {
        None
    };
    match axis {
        Some(axis) => {
            state.drag = Some(ThumbDrag {
                axis,
                grab: point,
                start: state.scroll_position,
            });
            true
        }
        None => false,
    }
}

/// Converts thumb pixel travel to content offset via
/// `scroll_maximum / thumb_maximum`.
pub(crate) fn drag_to(desktop: &mut Desktop, id: ControlId, point: Point) {
    let target = {
        let state = state_ref(desktop, id);
        let Some(drag) = state.drag else {
            return;
        };
        match drag.axis {
            ScrollAxis::Horizontal => {
                let delta = point.x - drag.grab.x;
                let movement = (delta as i64 * state.scroll_maximum.x as i64
                    / state.thumb_maximum.x.max(1) as i64) as i32;
                Point::new(drag.start.x + movement, state.scroll_position.y)
            }
            ScrollAxis::Vertical => {
                let delta = point.y - drag.grab.y;
                let movement = (delta as i64 * state.scroll_maximum.y as i64
                    / state.thumb_maximum.y.max(1) as i64) as i32;
                Point::new(state.scroll_position.x, drag.start.y + movement)
            }
        }
    };
    set_scroll_position(desktop, id, target);
}

pub(crate) fn end_drag(desktop: &mut Desktop, id: ControlId) {
    state_mut(desktop, id).drag = None;
}

pub(crate) fn state_ref(desktop: &Desktop, id: ControlId) -> &ScrollState {
    match &desktop.control(id).kind {
        ControlKind::Scroll(state) => state,
        _ => unreachable!("scroll operation invoked on a non-scroll control"),
    }
}

pub(crate) fn state_mut(desktop: &mut Desktop, id: ControlId) -> &mut ScrollState {
    match &mut desktop.arena_mut().get_mut(id).kind {
        ControlKind::Scroll(state) => state,
        _ => unreachable!("scroll operation invoked on a non-scroll control"),
    }
}
