//! Grid container: fixed/auto/star track sizing, cell placement, and
//! row/column/cell selection.
//!
//! Sizing is two-phase per axis. The fixed pass (measure) assigns pixel
//! tracks directly and sizes auto/star tracks to the largest measured
//! span-1 child; spanned children contribute nothing to track sizing. The
//! star pass (arrange only) distributes the remaining space by weight,
//! clamped per track, optionally donating integer leftover to the last
//! non-fixed track so the tracks tile the grid exactly.

use crate::control::ControlKind;
use crate::desktop::Desktop;
use crate::events::UiEvent;
use crate::math::{clamp_axis, Point, Rect, Size};
use crate::tree::ControlId;

/// Track sizing policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridUnit {
    /// Track sized to its largest span-1 child.
    Auto,
    /// Fixed pixel size.
    Pixels(i32),
    /// Weighted share of the space left after fixed/auto tracks.
    Star(f32),
}

/// A row or column definition: a unit plus min/max clamps
/// (max 0 = unbounded).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackDefinition {
    pub unit: GridUnit,
    pub min: i32,
    pub max: i32,
}

impl TrackDefinition {
    pub const fn new(unit: GridUnit) -> Self {
        Self {
            unit,
            min: 0,
            max: 0,
        }
    }

    pub const fn auto() -> Self {
        Self::new(GridUnit::Auto)
    }

    pub const fn pixels(value: i32) -> Self {
        Self::new(GridUnit::Pixels(value))
    }

    pub const fn star(weight: f32) -> Self {
        Self::new(GridUnit::Star(weight))
    }

    pub const fn with_min(mut self, min: i32) -> Self {
        self.min = min;
        self
    }

    pub const fn with_max(mut self, max: i32) -> Self {
        self.max = max;
        self
    }
}

impl Default for TrackDefinition {
    fn default() -> Self {
        Self::star(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridSelectionMode {
    #[default]
    None,
    Row,
    Column,
    Cell,
}

pub struct GridState {
    pub columns: Vec<TrackDefinition>,
    pub rows: Vec<TrackDefinition>,
    pub column_spacing: i32,
    pub row_spacing: i32,
    /// Donate star-pass integer leftover to the last non-fixed track.
    pub fill_remainder: bool,
    pub selection_mode: GridSelectionMode,

    // Computed per layout pass; offsets are relative to the content origin.
    pub(crate) column_widths: Vec<i32>,
    pub(crate) row_heights: Vec<i32>,
    pub(crate) cell_x_locations: Vec<i32>,
    pub(crate) cell_y_locations: Vec<i32>,

    // Children bucketed by exact (column, row); the backing arrays are only
    // reallocated when the grid grows.
    cell_children: Vec<Vec<ControlId>>,
    bucket_columns: usize,
    bucket_rows: usize,

    // Observable indices, -1 = none. Hover and selection are independent.
    pub(crate) hover_row: i32,
    pub(crate) hover_column: i32,
    pub(crate) selected_row: i32,
    pub(crate) selected_column: i32,
}

impl Default for GridState {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            column_spacing: 0,
            row_spacing: 0,
            fill_remainder: true,
            selection_mode: GridSelectionMode::None,
            column_widths: Vec::new(),
            row_heights: Vec::new(),
            cell_x_locations: Vec::new(),
            cell_y_locations: Vec::new(),
            cell_children: Vec::new(),
            bucket_columns: 0,
            bucket_rows: 0,
            hover_row: -1,
            hover_column: -1,
            selected_row: -1,
            selected_column: -1,
        }
    }
}

impl GridState {
    pub fn column_widths(&self) -> &[i32] {
        &self.column_widths
    }

    pub fn row_heights(&self) -> &[i32] {
        &self.row_heights
    }

    pub fn hover_row(&self) -> i32 {
        self.hover_row
    }

    pub fn hover_column(&self) -> i32 {
        self.hover_column
    }

    pub fn selected_row(&self) -> i32 {
        self.selected_row
    }

    pub fn selected_column(&self) -> i32 {
        self.selected_column
    }

    fn track(defs: &[TrackDefinition], index: usize) -> TrackDefinition {
        defs.get(index).copied().unwrap_or_default()
    }

    fn rebuild_buckets(&mut self, columns: usize, rows: usize, placements: &[(ControlId, usize, usize)]) {
        if columns > self.bucket_columns || rows > self.bucket_rows {
            self.bucket_columns = columns.max(self.bucket_columns);
            self.bucket_rows = rows.max(self.bucket_rows);
            self.cell_children = Vec::new();
            self.cell_children
                .resize_with(self.bucket_columns * self.bucket_rows, Vec::new);
        }
        for bucket in &mut self.cell_children {
            bucket.clear();
        }
        for &(child, column, row) in placements {
            if column < self.bucket_columns && row < self.bucket_rows {
                self.cell_children[row * self.bucket_columns + column].push(child);
            }
        }
    }

    /// Children whose anchor cell is exactly `(column, row)`. Rebuilt by the
    /// measure pass; the backing buckets only reallocate when the grid grows.
    pub fn children_at(&self, column: usize, row: usize) -> &[ControlId] {
        if column < self.bucket_columns && row < self.bucket_rows {
            &self.cell_children[row * self.bucket_columns + column]
        } else {
            &[]
        }
    }

    /// Maps a point relative to the content origin to a track index via
    /// linear scan of the cached offsets.
    fn track_at(locations: &[i32], sizes: &[i32], value: i32) -> i32 {
        for (i, (&loc, &size)) in locations.iter().zip(sizes).enumerate() {
            if value >= loc && value < loc + size {
                return i as i32;
            }
        }
        -1
    }

    pub fn cell_at(&self, local: Point) -> Option<(i32, i32)> {
        let column = Self::track_at(&self.cell_x_locations, &self.column_widths, local.x);
        let row = Self::track_at(&self.cell_y_locations, &self.row_heights, local.y);
        if column >= 0 && row >= 0 {
            Some((column, row))
        } else {
            None
        }
    }
}

// ======================================================================
// Layout over the arena
// ======================================================================

struct ChildPlacement {
    id: ControlId,
    column: usize,
    row: usize,
    column_span: usize,
    row_span: usize,
}

fn placements(desktop: &Desktop, children: &[ControlId]) -> Vec<ChildPlacement> {
    children
        .iter()
        .filter(|&&child| desktop.control(child).visible())
        .map(|&child| {
            let c = desktop.control(child);
            ChildPlacement {
                id: child,
                column: c.grid_column().max(0) as usize,
                row: c.grid_row().max(0) as usize,
                column_span: c.grid_column_span().max(1) as usize,
                row_span: c.grid_row_span().max(1) as usize,
            }
        })
        .collect()
}

fn track_count(defs: &[TrackDefinition], placements: &[ChildPlacement], x_axis: bool) -> usize {
    let from_children = placements
        .iter()
        .map(|p| {
            if x_axis {
                p.column + p.column_span
            } else {
                p.row + p.row_span
            }
        })
        .max()
        .unwrap_or(0);
    defs.len().max(from_children)
}

/// Fixed pass: pixel tracks directly, auto/star tracks from span-1 content.
/// Star tracks size to content here so the grid's desired size reflects it;
/// the arrange star pass overrides them with proportional sizes.
fn fixed_pass(
    state: &GridState,
    desktop: &mut Desktop,
    placements: &[ChildPlacement],
    available: Size,
    x_axis: bool,
) -> Vec<i32> {
    let defs = if x_axis { &state.columns } else { &state.rows };
    let count = track_count(defs, placements, x_axis);
    let mut sizes = vec![0i32; count];

    for (index, size) in sizes.iter_mut().enumerate() {
        let def = GridState::track(defs, index);
        if let GridUnit::Pixels(px) = def.unit {
            *size = clamp_axis(px, def.min, def.max);
            continue;
        }
        let mut content = 0;
        for p in placements {
            let (pos, span) = if x_axis {
                (p.column, p.column_span)
            } else {
                (p.row, p.row_span)
            };
            // Spanned children do not contribute to track sizing.
            if pos != index || span != 1 {
                continue;
            }
            let desired = desktop.measure(p.id, available, true);
            let axis_size = if x_axis { desired.width } else { desired.height };
            content = content.max(axis_size);
        }
        *size = clamp_axis(content, def.min, def.max);
    }
    sizes
}

/// Star pass: distribute the space remaining after fixed/auto tracks and
/// spacing, proportionally by weight, each track clamped to its own
/// min/max. Integer leftover goes to the last non-fixed track when
/// `fill_remainder` is set.
fn star_pass(state: &GridState, sizes: &mut [i32], total: i32, x_axis: bool) {
    let defs = if x_axis { &state.columns } else { &state.rows };
    let spacing = if x_axis {
        state.column_spacing
    } else {
        state.row_spacing
    };

    let spacing_total = spacing * (sizes.len().max(1) as i32 - 1);
    let mut star_weight_total = 0.0f32;
    let mut fixed_total = 0;
    for (index, size) in sizes.iter().enumerate() {
        match GridState::track(defs, index).unit {
            GridUnit::Star(weight) => star_weight_total += weight.max(0.0),
            _ => fixed_total += *size,
        }
    }

    let remaining = (total - fixed_total - spacing_total).max(0);
    if star_weight_total > 0.0 {
        for (index, size) in sizes.iter_mut().enumerate() {
            let def = GridState::track(defs, index);
            if let GridUnit::Star(weight) = def.unit {
                let share = (remaining as f32 * weight.max(0.0) / star_weight_total) as i32;
                *size = clamp_axis(share, def.min, def.max);
            }
        }
    }

    if state.fill_remainder {
        let used: i32 = sizes.iter().sum::<i32>() + spacing_total;
        let leftover = total - used;
        if leftover > 0 {
            // Donated entirely to the last non-fixed track.
            let target = (0..sizes.len()).rev().find(|&i| {
                !matches!(GridState::track(defs, i).unit, GridUnit::Pixels(_))
            });
            if let Some(i) = target {
                sizes[i] += leftover;
            }
        }
    }
}

fn prefix_locations(sizes: &[i32], spacing: i32) -> Vec<i32> {
    let mut locations = Vec::with_capacity(sizes.len());
    let mut cursor = 0;
    for &size in sizes {
        locations.push(cursor);
        cursor += size + spacing;
    }
    locations
}

fn span_extent(sizes: &[i32], start: usize, span: usize, spacing: i32) -> i32 {
    let end = (start + span).min(sizes.len());
    if end <= start {
        return 0;
    }
    let width: i32 = sizes[start..end].iter().sum();
    width + spacing * (end - start - 1) as i32
}

pub(crate) fn measure(desktop: &mut Desktop, id: ControlId, available: Size) -> Size {
    let mut state = take_state(desktop, id);
    let children = desktop.children_snapshot(id);
    let placed = placements(desktop, &children);

    state.rebuild_buckets(
        track_count(&state.columns, &placed, true),
        track_count(&state.rows, &placed, false),
        &placed
            .iter()
            .map(|p| (p.id, p.column, p.row))
            .collect::<Vec<_>>(),
    );

    let column_widths = fixed_pass(&state, desktop, &placed, available, true);
    let row_heights = fixed_pass(&state, desktop, &placed, available, false);

    let width: i32 = column_widths.iter().sum::<i32>()
        + state.column_spacing * (column_widths.len().max(1) as i32 - 1);
    let height: i32 = row_heights.iter().sum::<i32>()
        + state.row_spacing * (row_heights.len().max(1) as i32 - 1);

    state.column_widths = column_widths;
    state.row_heights = row_heights;
    restore_state(desktop, id, state);
    Size::new(width, height)
}

pub(crate) fn arrange(desktop: &mut Desktop, id: ControlId, content: Rect) {
    let mut state = take_state(desktop, id);
    let children = desktop.children_snapshot(id);
    let placed = placements(desktop, &children);

    let mut column_widths = fixed_pass(&state, desktop, &placed, content.size(), true);
    let mut row_heights = fixed_pass(&state, desktop, &placed, content.size(), false);
    star_pass(&state, &mut column_widths, content.width, true);
    star_pass(&state, &mut row_heights, content.height, false);

    let cell_x = prefix_locations(&column_widths, state.column_spacing);
    let cell_y = prefix_locations(&row_heights, state.row_spacing);

    // Children never overflow the grid's own bounds, even when their
    // measured size exceeds the cell.
    let grid_bounds = desktop.control(id).bounds();

    for p in &placed {
        let column = p.column.min(column_widths.len().saturating_sub(1));
        let row = p.row.min(row_heights.len().saturating_sub(1));
        let cell = Rect::new(
            content.x + cell_x.get(column).copied().unwrap_or(0),
            content.y + cell_y.get(row).copied().unwrap_or(0),
            span_extent(&column_widths, column, p.column_span, state.column_spacing),
            span_extent(&row_heights, row, p.row_span, state.row_spacing),
        );
        desktop.arrange(p.id, cell.intersect(grid_bounds));
    }

    state.column_widths = column_widths;
    state.row_heights = row_heights;
    state.cell_x_locations = cell_x;
    state.cell_y_locations = cell_y;
    restore_state(desktop, id, state);
}

// ======================================================================
// Pointer integration
// ======================================================================

/// Updates hover indices from the pointer position. Returns true when the
/// hover changed.
pub(crate) fn update_hover(desktop: &mut Desktop, id: ControlId, global: Point) -> bool {
    let content = desktop.control(id).content_bounds();
    let local = Point::new(global.x - content.x, global.y - content.y);

    let ControlKind::Grid(state) = &mut desktop.arena_mut().get_mut(id).kind else {
        return false;
    };
    if state.selection_mode == GridSelectionMode::None {
        return false;
    }

    let (mut column, mut row) = state.cell_at(local).unwrap_or((-1, -1));
    match state.selection_mode {
        GridSelectionMode::Row => column = -1,
        GridSelectionMode::Column => row = -1,
        _ => {}
    }
    let changed = state.hover_column != column || state.hover_row != row;
    state.hover_column = column;
    state.hover_row = row;
    changed
}

/// Commits the hover indices as the selection on touch-down.
pub(crate) fn update_selection(desktop: &mut Desktop, id: ControlId, global: Point) {
    update_hover(desktop, id, global);
    let changed = {
        let ControlKind::Grid(state) = &mut desktop.arena_mut().get_mut(id).kind else {
            return;
        };
        if state.selection_mode == GridSelectionMode::None {
            return;
        }
        if state.selected_column != state.hover_column || state.selected_row != state.hover_row {
            state.selected_column = state.hover_column;
            state.selected_row = state.hover_row;
            true
        } else {
            false
        }
    };
    if changed {
        desktop.push_event(UiEvent::SelectionChanged(id));
    }
}

fn take_state(desktop: &mut Desktop, id: ControlId) -> GridState {
    match std::mem::replace(&mut desktop.arena_mut().get_mut(id).kind, ControlKind::Panel) {
        ControlKind::Grid(state) => state,
        _ => unreachable!("grid layout invoked on a non-grid control"),
    }
}

fn restore_state(desktop: &mut Desktop, id: ControlId, state: GridState) {
    desktop.arena_mut().get_mut(id).kind = ControlKind::Grid(state);
}
