//! The base UI element: layout inputs, cached layout outputs, interaction
//! flags, and the tagged kind that supplies measure/arrange behavior.
//!
//! Controls live in the desktop's arena ([`crate::tree`]); all structural
//! relationships are ids. Mutation goes through [`ControlMut`], which routes
//! the right invalidation (measure, arrange, transform, z-order) to the
//! desktop so the dirty-flag memoization in the layout pass stays sound.

use crate::assets::ImageHandle;
use crate::color::Color;
use crate::desktop::Desktop;
use crate::grid::{GridSelectionMode, GridState, TrackDefinition};
use crate::math::{Point, Rect, Size, Thickness, Vector2};
use crate::scroll::ScrollState;
use crate::stack::{Orientation, StackState};
use crate::transform::Transform;
use crate::tree::ControlId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum HorizontalAlignment {
    #[default]
    Stretch,
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum VerticalAlignment {
    #[default]
    Stretch,
    Top,
    Center,
    Bottom,
}

/// Visual/foreground state, derived in fixed precedence order:
/// disabled > clicking > hovered > focused > default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Disabled,
    Clicking,
    Hovered,
    Focused,
    Default,
}

/// Style for text leaf controls. Measurement is delegated to the host's
/// measure callback; no font set means zero size and no draw.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font: Option<FontHandle>,
    pub size: u16,
    pub color: Color,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: None,
            size: 16,
            color: Color::u_rgb(0xFF, 0xFF, 0xFF),
        }
    }
}

/// Opaque font identifier resolved by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontHandle(pub u32);

#[derive(Debug, Clone, Default)]
pub struct TextState {
    pub text: String,
    pub style: TextStyle,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImageState {
    pub handle: Option<ImageHandle>,
    pub tint: Option<Color>,
}

/// The control's layout/render behavior, as a flat tagged variant rather
/// than an inheritance lattice.
pub enum ControlKind {
    /// Free overlay container: children positioned by their own offsets.
    Panel,
    Stack(StackState),
    Grid(GridState),
    Scroll(ScrollState),
    Text(TextState),
    Image(ImageState),
}

/// Copyable discriminant used by the layout dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KindTag {
    Panel,
    Stack,
    Grid,
    Scroll,
    Text,
    Image,
}

pub struct Control {
    // Tree links (non-owning ids).
    pub(crate) parent: Option<ControlId>,
    pub(crate) children: Vec<ControlId>,
    pub(crate) children_copy: Vec<ControlId>,
    pub(crate) children_copy_dirty: bool,
    pub(crate) on_desktop: bool,

    // Layout inputs.
    pub(crate) position: Point,
    pub(crate) width: Option<i32>,
    pub(crate) height: Option<i32>,
    pub(crate) min_width: i32,
    pub(crate) min_height: i32,
    pub(crate) max_width: i32,
    pub(crate) max_height: i32,
    pub(crate) margin: Thickness,
    pub(crate) padding: Thickness,
    pub(crate) border_thickness: Thickness,
    pub(crate) horizontal_alignment: HorizontalAlignment,
    pub(crate) vertical_alignment: VerticalAlignment,
    pub(crate) grid_column: i32,
    pub(crate) grid_row: i32,
    pub(crate) grid_column_span: i32,
    pub(crate) grid_row_span: i32,
    pub(crate) z_index: i32,

    // Visual inputs.
    pub(crate) opacity: f32,
    pub(crate) visible: bool,
    pub(crate) enabled: bool,
    pub(crate) scale: Vector2,
    pub(crate) rotation: f32,
    pub(crate) transform_origin: Vector2,
    pub(crate) background: Option<Color>,
    pub(crate) border_color: Option<Color>,

    // Behavior opt-ins.
    pub(crate) accepts_focus: bool,
    pub(crate) accepts_text_input: bool,
    pub(crate) captures_wheel: bool,
    pub(crate) falls_through: bool,
    pub(crate) is_modal: bool,

    pub(crate) kind: ControlKind,

    // Measure memoization: keyed on the available size (clamped calls only).
    pub(crate) measure_dirty: bool,
    pub(crate) has_measure_cache: bool,
    pub(crate) last_measure_available: Size,
    pub(crate) last_measure_result: Size,
    pub(crate) measure_invocations: u32,

    // Arrange memoization: keyed on the container rectangle.
    pub(crate) arrange_dirty: bool,
    pub(crate) has_arrange_cache: bool,
    pub(crate) last_container: Rect,
    pub(crate) bounds: Rect,

    // Transform cache: forward and inverse, independently gated.
    pub(crate) transform: Transform,
    pub(crate) transform_dirty: bool,
    pub(crate) inverse_transform: Option<Transform>,
    pub(crate) inverse_dirty: bool,

    // Interaction state written by the desktop.
    pub(crate) active: bool,
    pub(crate) is_touching: bool,
}

impl Control {
    pub fn new(kind: ControlKind) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            children_copy: Vec::new(),
            children_copy_dirty: false,
            on_desktop: false,
            position: Point::ZERO,
            width: None,
            height: None,
            min_width: 0,
            min_height: 0,
            max_width: 0,
            max_height: 0,
            margin: Thickness::ZERO,
            padding: Thickness::ZERO,
            border_thickness: Thickness::ZERO,
            horizontal_alignment: HorizontalAlignment::Stretch,
            vertical_alignment: VerticalAlignment::Stretch,
            grid_column: 0,
            grid_row: 0,
            grid_column_span: 1,
            grid_row_span: 1,
            z_index: 0,
            opacity: 1.0,
            visible: true,
            enabled: true,
            scale: Vector2::ONE,
            rotation: 0.0,
            transform_origin: Vector2::new(0.5, 0.5),
            background: None,
            border_color: None,
            accepts_focus: false,
            accepts_text_input: false,
            captures_wheel: false,
            falls_through: false,
            is_modal: false,
            kind,
            measure_dirty: true,
            has_measure_cache: false,
            last_measure_available: Size::ZERO,
            last_measure_result: Size::ZERO,
            measure_invocations: 0,
            arrange_dirty: true,
            has_arrange_cache: false,
            last_container: Rect::ZERO,
            bounds: Rect::ZERO,
            transform: Transform::IDENTITY,
            transform_dirty: true,
            inverse_transform: Some(Transform::IDENTITY),
            inverse_dirty: true,
            active: true,
            is_touching: false,
        }
    }

    pub(crate) fn kind_tag(&self) -> KindTag {
        match self.kind {
            ControlKind::Panel => KindTag::Panel,
            ControlKind::Stack(_) => KindTag::Stack,
            ControlKind::Grid(_) => KindTag::Grid,
            ControlKind::Scroll(_) => KindTag::Scroll,
            ControlKind::Text(_) => KindTag::Text,
            ControlKind::Image(_) => KindTag::Image,
        }
    }

    /// Margin + border + padding: the inset between the allocated bounds and
    /// the content rectangle.
    pub(crate) fn indentation(&self) -> Thickness {
        self.margin + self.border_thickness + self.padding
    }

    // ------------------------------------------------------------------
    // Read surface
    // ------------------------------------------------------------------

    pub fn parent(&self) -> Option<ControlId> {
        self.parent
    }

    pub fn children(&self) -> &[ControlId] {
        &self.children
    }

    pub fn is_placed(&self) -> bool {
        self.on_desktop
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn width(&self) -> Option<i32> {
        self.width
    }

    pub fn height(&self) -> Option<i32> {
        self.height
    }

    pub fn margin(&self) -> Thickness {
        self.margin
    }

    pub fn padding(&self) -> Thickness {
        self.padding
    }

    pub fn border_thickness(&self) -> Thickness {
        self.border_thickness
    }

    pub fn horizontal_alignment(&self) -> HorizontalAlignment {
        self.horizontal_alignment
    }

    pub fn vertical_alignment(&self) -> VerticalAlignment {
        self.vertical_alignment
    }

    pub fn grid_column(&self) -> i32 {
        self.grid_column
    }

    pub fn grid_row(&self) -> i32 {
        self.grid_row
    }

    pub fn grid_column_span(&self) -> i32 {
        self.grid_column_span
    }

    pub fn grid_row_span(&self) -> i32 {
        self.grid_row_span
    }

    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_modal(&self) -> bool {
        self.is_modal
    }

    pub fn accepts_focus(&self) -> bool {
        self.accepts_focus
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    /// Whether this control's root is not blocked by a modal. Recomputed
    /// every layout pass.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Allocated layout bounds (including margin). Only valid between an
    /// arrange and the next invalidation.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Bounds minus margin: where background and border are drawn.
    pub fn border_bounds(&self) -> Rect {
        self.bounds.deflate(self.margin)
    }

    /// Bounds minus margin, border and padding: where content lives.
    pub fn content_bounds(&self) -> Rect {
        self.bounds.deflate(self.indentation())
    }

    pub fn is_measure_dirty(&self) -> bool {
        self.measure_dirty
    }

    pub fn is_arrange_dirty(&self) -> bool {
        self.arrange_dirty
    }

    /// Last measured desired size. Test hook for memoization checks.
    pub fn desired_size(&self) -> Size {
        self.last_measure_result
    }

    /// Number of times the kind-specific measure has actually run.
    /// Unchanged on memoized calls.
    pub fn measure_invocations(&self) -> u32 {
        self.measure_invocations
    }

    pub fn kind(&self) -> &ControlKind {
        &self.kind
    }

    pub(crate) fn mark_children_copy_dirty(&mut self) {
        self.children_copy_dirty = true;
    }
}

// ======================================================================
// Mutation guard
// ======================================================================

/// Mutable access to a control that routes invalidation to the desktop.
///
/// Layout-affecting setters invalidate measure; placement-only ones
/// invalidate arrange; pose setters invalidate the transform subtree.
pub struct ControlMut<'a> {
    pub(crate) desktop: &'a mut Desktop,
    pub(crate) id: ControlId,
}

impl ControlMut<'_> {
    pub fn id(&self) -> ControlId {
        self.id
    }

    fn control(&mut self) -> &mut Control {
        self.desktop.arena_mut().get_mut(self.id)
    }

    fn invalidate_measure(&mut self) {
        self.desktop.invalidate_measure(self.id);
    }

    pub fn set_position(&mut self, position: Point) -> &mut Self {
        if self.control().position != position {
            self.control().position = position;
            self.desktop.invalidate_arrange(self.id);
            self.desktop.invalidate_transform(self.id);
        }
        self
    }

    pub fn set_width(&mut self, width: Option<i32>) -> &mut Self {
        if self.control().width != width {
            self.control().width = width;
            self.invalidate_measure();
        }
        self
    }

    pub fn set_height(&mut self, height: Option<i32>) -> &mut Self {
        if self.control().height != height {
            self.control().height = height;
            self.invalidate_measure();
        }
        self
    }

    pub fn set_min_width(&mut self, value: i32) -> &mut Self {
        assert!(value >= 0, "min width must be non-negative, got {value}");
        self.control().min_width = value;
        self.invalidate_measure();
        self
    }

    pub fn set_min_height(&mut self, value: i32) -> &mut Self {
        assert!(value >= 0, "min height must be non-negative, got {value}");
        self.control().min_height = value;
        self.invalidate_measure();
        self
    }

    /// A max of 0 means unbounded.
    pub fn set_max_width(&mut self, value: i32) -> &mut Self {
        assert!(value >= 0, "max width must be non-negative, got {value}");
        self.control().max_width = value;
        self.invalidate_measure();
        self
    }

    /// A max of 0 means unbounded.
    pub fn set_max_height(&mut self, value: i32) -> &mut Self {
        assert!(value >= 0, "max height must be non-negative, got {value}");
        self.control().max_height = value;
        self.invalidate_measure();
        self
    }

    pub fn set_margin(&mut self, value: Thickness) -> &mut Self {
        self.control().margin = value;
        self.invalidate_measure();
        self
    }

    pub fn set_padding(&mut self, value: Thickness) -> &mut Self {
        self.control().padding = value;
        self.invalidate_measure();
        self
    }

    pub fn set_border_thickness(&mut self, value: Thickness) -> &mut Self {
        self.control().border_thickness = value;
        self.invalidate_measure();
        self
    }

    pub fn set_horizontal_alignment(&mut self, value: HorizontalAlignment) -> &mut Self {
        if self.control().horizontal_alignment != value {
            self.control().horizontal_alignment = value;
            self.invalidate_measure();
        }
        self
    }

    pub fn set_vertical_alignment(&mut self, value: VerticalAlignment) -> &mut Self {
        if self.control().vertical_alignment != value {
            self.control().vertical_alignment = value;
            self.invalidate_measure();
        }
        self
    }

    pub fn set_grid_column(&mut self, value: i32) -> &mut Self {
        assert!(value >= 0, "grid column must be non-negative, got {value}");
        self.control().grid_column = value;
        self.invalidate_measure();
        self
    }

    pub fn set_grid_row(&mut self, value: i32) -> &mut Self {
        assert!(value >= 0, "grid row must be non-negative, got {value}");
        self.control().grid_row = value;
        self.invalidate_measure();
        self
    }

    pub fn set_grid_column_span(&mut self, value: i32) -> &mut Self {
        assert!(value >= 0, "grid column span must be non-negative, got {value}");
        self.control().grid_column_span = value;
        self.invalidate_measure();
        self
    }

    pub fn set_grid_row_span(&mut self, value: i32) -> &mut Self {
        assert!(value >= 0, "grid row span must be non-negative, got {value}");
        self.control().grid_row_span = value;
        self.invalidate_measure();
        self
    }

    pub fn set_z_index(&mut self, value: i32) -> &mut Self {
        if self.control().z_index != value {
            self.control().z_index = value;
            self.desktop.mark_roots_dirty();
        }
        self
    }

    /// Panics if `value` is outside `[0, 1]`: out-of-range opacity is a
    /// caller bug, not something to clamp silently.
    pub fn set_opacity(&mut self, value: f32) -> &mut Self {
        assert!(
            (0.0..=1.0).contains(&value),
            "opacity must be within [0, 1], got {value}"
        );
        self.control().opacity = value;
        self
    }

    pub fn set_visible(&mut self, value: bool) -> &mut Self {
        if self.control().visible != value {
            self.control().visible = value;
            self.invalidate_measure();
            self.desktop.clear_interaction_references(self.id);
        }
        self
    }

    pub fn set_enabled(&mut self, value: bool) -> &mut Self {
        self.control().enabled = value;
        self
    }

    pub fn set_scale(&mut self, value: Vector2) -> &mut Self {
        if self.control().scale != value {
            self.control().scale = value;
            self.desktop.invalidate_transform(self.id);
        }
        self
    }

    pub fn set_rotation(&mut self, degrees: f32) -> &mut Self {
        if self.control().rotation != degrees {
            self.control().rotation = degrees;
            self.desktop.invalidate_transform(self.id);
        }
        self
    }

    /// Pivot for scale/rotation as a fraction of the control's own bounds.
    pub fn set_transform_origin(&mut self, value: Vector2) -> &mut Self {
        if self.control().transform_origin != value {
            self.control().transform_origin = value;
            self.desktop.invalidate_transform(self.id);
        }
        self
    }

    pub fn set_background(&mut self, value: Option<Color>) -> &mut Self {
        self.control().background = value;
        self
    }

    pub fn set_border_color(&mut self, value: Option<Color>) -> &mut Self {
        self.control().border_color = value;
        self
    }

    pub fn set_accepts_focus(&mut self, value: bool) -> &mut Self {
        self.control().accepts_focus = value;
        self
    }

    pub fn set_accepts_text_input(&mut self, value: bool) -> &mut Self {
        self.control().accepts_text_input = value;
        self
    }

    pub fn set_captures_wheel(&mut self, value: bool) -> &mut Self {
        self.control().captures_wheel = value;
        self
    }

    /// Transparent to hit-testing: the search continues into children and
    /// past this control.
    pub fn set_falls_through(&mut self, value: bool) -> &mut Self {
        self.control().falls_through = value;
        self
    }

    pub fn set_modal(&mut self, value: bool) -> &mut Self {
        self.control().is_modal = value;
        self.desktop.mark_roots_dirty();
        self
    }

    // ------------------------------------------------------------------
    // Kind-specific setters
    // ------------------------------------------------------------------

    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        if let ControlKind::Text(state) = &mut self.control().kind {
            state.text = text.into();
            self.invalidate_measure();
        }
        self
    }

    pub fn set_text_style(&mut self, style: TextStyle) -> &mut Self {
        if let ControlKind::Text(state) = &mut self.control().kind {
            state.style = style;
            self.invalidate_measure();
        }
        self
    }

    pub fn set_image(&mut self, handle: Option<ImageHandle>) -> &mut Self {
        if let ControlKind::Image(state) = &mut self.control().kind {
            state.handle = handle;
            self.invalidate_measure();
        }
        self
    }

    pub fn set_image_tint(&mut self, tint: Option<Color>) -> &mut Self {
        if let ControlKind::Image(state) = &mut self.control().kind {
            state.tint = tint;
        }
        self
    }

    /// Replaces the grid's column definitions. Fires the grid's measure
    /// invalidation, like any other definition mutation.
    pub fn set_columns(&mut self, columns: Vec<TrackDefinition>) -> &mut Self {
        if let ControlKind::Grid(state) = &mut self.control().kind {
            state.columns = columns;
            self.invalidate_measure();
        }
        self
    }

    pub fn set_rows(&mut self, rows: Vec<TrackDefinition>) -> &mut Self {
        if let ControlKind::Grid(state) = &mut self.control().kind {
            state.rows = rows;
            self.invalidate_measure();
        }
        self
    }

    pub fn set_grid_spacing(&mut self, column_spacing: i32, row_spacing: i32) -> &mut Self {
        if let ControlKind::Grid(state) = &mut self.control().kind {
            state.column_spacing = column_spacing;
            state.row_spacing = row_spacing;
            self.invalidate_measure();
        }
        self
    }

    /// When set, integer leftover from star distribution is donated to the
    /// last non-fixed track so tracks tile the grid exactly.
    pub fn set_fill_remainder(&mut self, value: bool) -> &mut Self {
        if let ControlKind::Grid(state) = &mut self.control().kind {
            state.fill_remainder = value;
            self.invalidate_measure();
        }
        self
    }

    pub fn set_selection_mode(&mut self, mode: GridSelectionMode) -> &mut Self {
        if let ControlKind::Grid(state) = &mut self.control().kind {
            state.selection_mode = mode;
        }
        self
    }

    pub fn set_orientation(&mut self, orientation: Orientation) -> &mut Self {
        if let ControlKind::Stack(state) = &mut self.control().kind {
            state.orientation = orientation;
            self.invalidate_measure();
        }
        self
    }

    pub fn set_spacing(&mut self, spacing: i32) -> &mut Self {
        if let ControlKind::Stack(state) = &mut self.control().kind {
            state.spacing = spacing;
            self.invalidate_measure();
        }
        self
    }

    /// Measure children without a budget along the stack axis.
    pub fn set_boundless(&mut self, value: bool) -> &mut Self {
        if let ControlKind::Stack(state) = &mut self.control().kind {
            state.boundless = value;
            self.invalidate_measure();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::Desktop;
    use crate::math::Rect;

    fn desktop() -> Desktop {
        Desktop::new(Rect::new(0, 0, 800, 600))
    }

    #[test]
    #[should_panic(expected = "grid column must be non-negative")]
    fn negative_grid_column_panics() {
        let mut d = desktop();
        let id = d.new_control(ControlKind::Panel);
        d.control_mut(id).set_grid_column(-1);
    }

    #[test]
    #[should_panic(expected = "opacity must be within [0, 1]")]
    fn out_of_range_opacity_panics() {
        let mut d = desktop();
        let id = d.new_control(ControlKind::Panel);
        d.control_mut(id).set_opacity(1.5);
    }

    #[test]
    fn opacity_bounds_are_inclusive() {
        let mut d = desktop();
        let id = d.new_control(ControlKind::Panel);
        d.control_mut(id).set_opacity(0.0);
        d.control_mut(id).set_opacity(1.0);
        assert_eq!(d.control(id).opacity(), 1.0);
    }
}
