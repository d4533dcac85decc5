//! Two-pass layout: measure (bottom-up desired sizes) and arrange
//! (top-down rectangle assignment), both memoized behind dirty flags.
//!
//! Measure is keyed on the available size; arrange on the container
//! rectangle. Invalidation ([`Desktop::invalidate_measure`] /
//! [`Desktop::invalidate_arrange`]) walks the ancestor chain, so a clean
//! subtree under an unchanged constraint is skipped entirely.

use crate::control::{ControlKind, HorizontalAlignment, KindTag, VerticalAlignment};
use crate::desktop::Desktop;
use crate::grid;
use crate::math::{clamp_axis, Rect, Size};
use crate::scroll;
use crate::stack;
use crate::tree::ControlId;

impl Desktop {
    /// Computes the control's desired size under `available` (an outer
    /// budget, margin included). With `clamp` set, the content-derived
    /// desired size is capped at the budget; an explicit width/height
    /// always wins over both content and budget.
    pub fn measure(&mut self, id: ControlId, available: Size, clamp: bool) -> Size {
        {
            let control = self.control(id);
            if clamp
                && !control.measure_dirty
                && control.has_measure_cache
                && control.last_measure_available == available
            {
                return control.last_measure_result;
            }
        }

        let (margin, chrome, width, height, min_w, min_h, max_w, max_h) = {
            let c = self.control(id);
            (
                c.margin,
                c.border_thickness + c.padding,
                c.width,
                c.height,
                c.min_width,
                c.min_height,
                c.max_width,
                c.max_height,
            )
        };

        // Budget excluding margin; explicit and max sizes tighten it so
        // children never measure against space the control cannot take.
        let mut budget = Size::new(
            (available.width - margin.horizontal()).max(0),
            (available.height - margin.vertical()).max(0),
        );
        if let Some(w) = width {
            budget.width = w;
        }
        if let Some(h) = height {
            budget.height = h;
        }
        if max_w > 0 {
            budget.width = budget.width.min(max_w);
        }
        if max_h > 0 {
            budget.height = budget.height.min(max_h);
        }

        let content_available = Size::new(
            (budget.width - chrome.horizontal()).max(0),
            (budget.height - chrome.vertical()).max(0),
        );

        let content = self.measure_internal(id, content_available);
        let mut desired = Size::new(
            content.width + chrome.horizontal(),
            content.height + chrome.vertical(),
        );

        if clamp {
            desired = desired.min(budget);
        }
        if let Some(w) = width {
            desired.width = w;
        }
        if let Some(h) = height {
            desired.height = h;
        }
        desired.width = clamp_axis(desired.width.max(0), min_w, max_w);
        desired.height = clamp_axis(desired.height.max(0), min_h, max_h);

        let result = Size::new(
            desired.width + margin.horizontal(),
            desired.height + margin.vertical(),
        );

        // Only clamped calls write the cache; an unclamped call must not
        // repoint the cached result at a different budget.
        if clamp {
            let control = self.arena_mut().get_mut(id);
            control.measure_dirty = false;
            control.has_measure_cache = true;
            control.last_measure_available = available;
            control.last_measure_result = result;
        }
        result
    }

    /// Kind-specific content measurement. Runs only on cache misses; the
    /// invocation counter exists so tests can observe memoization.
    fn measure_internal(&mut self, id: ControlId, available: Size) -> Size {
        self.arena_mut().get_mut(id).measure_invocations += 1;
        match self.control(id).kind_tag() {
            KindTag::Panel => self.measure_panel(id, available),
            KindTag::Stack => stack::measure(self, id, available),
            KindTag::Grid => grid::measure(self, id, available),
            KindTag::Scroll => scroll::measure(self, id, available),
            KindTag::Text => {
                let (text, style) = match &self.control(id).kind {
                    ControlKind::Text(state) => (state.text.clone(), state.style.clone()),
                    _ => unreachable!(),
                };
                self.measure_text(&text, &style)
            }
            KindTag::Image => match &self.control(id).kind {
                ControlKind::Image(state) => {
                    state.handle.map(|h| h.size).unwrap_or(Size::ZERO)
                }
                _ => unreachable!(),
            },
        }
    }

    /// Free overlay: the panel's content extent is the union of each
    /// child's own offset plus its desired size.
    fn measure_panel(&mut self, id: ControlId, available: Size) -> Size {
        let children = self.children_snapshot(id);
        let mut extent = Size::ZERO;
        for child in children {
            if !self.control(child).visible() {
                continue;
            }
            let offset = self.control(child).position();
            let child_available = Size::new(
                (available.width - offset.x).max(0),
                (available.height - offset.y).max(0),
            );
            let desired = self.measure(child, child_available, true);
            extent.width = extent.width.max(offset.x + desired.width);
            extent.height = extent.height.max(offset.y + desired.height);
        }
        extent
    }

    /// Assigns the control's final rectangle within `container` and
    /// recurses. Stretch alignment fills the container; any other
    /// alignment uses the measured desired size, positioned within it.
    /// Explicit sizes win over both.
    pub fn arrange(&mut self, id: ControlId, container: Rect) {
        {
            let control = self.control(id);
            if !control.arrange_dirty
                && control.has_arrange_cache
                && control.last_container == container
            {
                return;
            }
        }

        // Non-stretch axes size to content, so the desired size must be
        // re-derived under the actual container. Memoization makes this a
        // cache hit whenever the constraint is unchanged.
        let needs_measure = {
            let c = self.control(id);
            !c.has_measure_cache
                || c.horizontal_alignment != HorizontalAlignment::Stretch
                || c.vertical_alignment != VerticalAlignment::Stretch
        };
        if needs_measure {
            self.measure(id, container.size(), true);
        }

        let (desired, margin, h_align, v_align, width, height, min_w, min_h, max_w, max_h, offset) = {
            let c = self.control(id);
            (
                c.last_measure_result,
                c.margin,
                c.horizontal_alignment,
                c.vertical_alignment,
                c.width,
                c.height,
                c.min_width,
                c.min_height,
                c.max_width,
                c.max_height,
                c.position,
            )
        };

        let mut outer = Size::new(
            match h_align {
                HorizontalAlignment::Stretch => container.width,
                _ => desired.width.min(container.width),
            },
            match v_align {
                VerticalAlignment::Stretch => container.height,
                _ => desired.height.min(container.height),
            },
        );
        if let Some(w) = width {
            outer.width = w + margin.horizontal();
        }
        if let Some(h) = height {
            outer.height = h + margin.vertical();
        }
        outer.width =
            clamp_axis((outer.width - margin.horizontal()).max(0), min_w, max_w) + margin.horizontal();
        outer.height =
            clamp_axis((outer.height - margin.vertical()).max(0), min_h, max_h) + margin.vertical();

        let x = container.x
            + match h_align {
                HorizontalAlignment::Stretch | HorizontalAlignment::Left => 0,
                HorizontalAlignment::Center => (container.width - outer.width) / 2,
                HorizontalAlignment::Right => container.width - outer.width,
            };
        let y = container.y
            + match v_align {
                VerticalAlignment::Stretch | VerticalAlignment::Top => 0,
                VerticalAlignment::Center => (container.height - outer.height) / 2,
                VerticalAlignment::Bottom => container.height - outer.height,
            };

        let bounds = Rect::new(x + offset.x, y + offset.y, outer.width, outer.height);
        let moved = self.control(id).bounds != bounds;
        {
            let control = self.arena_mut().get_mut(id);
            control.bounds = bounds;
            control.arrange_dirty = false;
            control.has_arrange_cache = true;
            control.last_container = container;
        }
        if moved {
            self.invalidate_transform(id);
        }

        let content = self.control(id).content_bounds();
        match self.control(id).kind_tag() {
            KindTag::Panel => {
                for child in self.children_snapshot(id) {
                    if self.control(child).visible() {
                        self.arrange(child, content);
                    }
                }
            }
            KindTag::Stack => stack::arrange(self, id, content),
            KindTag::Grid => grid::arrange(self, id, content),
            KindTag::Scroll => scroll::arrange(self, id, content),
            KindTag::Text | KindTag::Image => {}
        }
    }

    /// Runs the layout pass if anything is dirty. Root activity (modal
    /// blocking) is re-derived on every call; measure/arrange only run for
    /// dirty subtrees.
    pub fn update_layout(&mut self) {
        self.update_active_states();
        if !self.is_layout_dirty() {
            return;
        }
        let viewport = self.viewport();
        for root in self.sorted_roots() {
            if !self.control(root).visible() {
                continue;
            }
            self.measure(root, viewport.size(), true);
            self.arrange(root, viewport);
        }
        self.clear_layout_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ControlKind;
    use crate::grid::TrackDefinition;
    use crate::math::{Point, Thickness};
    use crate::stack::{Orientation, StackState};

    fn desktop() -> Desktop {
        Desktop::new(Rect::new(0, 0, 800, 600))
    }

    #[test]
    fn measure_is_memoized_per_available_size() {
        let mut d = desktop();
        let panel = d.new_control(ControlKind::Panel);
        d.attach_root(panel);

        let available = Size::new(200, 100);
        d.measure(panel, available, true);
        let first = d.control(panel).measure_invocations();
        d.measure(panel, available, true);
        assert_eq!(d.control(panel).measure_invocations(), first);

        // Different constraint misses the cache.
        d.measure(panel, Size::new(300, 100), true);
        assert_eq!(d.control(panel).measure_invocations(), first + 1);
    }

    #[test]
    fn unclamped_measure_leaves_the_cache_untouched() {
        let mut d = desktop();
        let panel = d.new_control(ControlKind::Panel);
        let inner = d.new_control(ControlKind::Panel);
        d.control_mut(inner).set_width(Some(500)).set_height(Some(400));
        d.attach_root(panel);
        d.attach_child(panel, inner);

        let tight = Size::new(200, 200);
        assert_eq!(d.measure(panel, tight, true), tight);

        // An unclamped call against a looser budget reports the natural
        // extent without repointing the cached entry at it.
        assert_eq!(d.measure(panel, Size::new(800, 600), false), Size::new(500, 400));
        assert_eq!(d.measure(panel, tight, true), tight);
    }

    #[test]
    fn non_stretch_arrange_remeasures_against_the_container() {
        // The grid measures its children against the full content budget
        // but arranges them into a narrower cell; a left-aligned child must
        // report the size it would take under the cell, not the budget.
        let mut d = desktop();
        let grid = d.new_control(ControlKind::Grid(Default::default()));
        d.control_mut(grid)
            .set_width(Some(300))
            .set_height(Some(100))
            .set_columns(vec![TrackDefinition::pixels(100), TrackDefinition::star(1.0)]);
        let child = d.new_control(ControlKind::Panel);
        d.control_mut(child)
            .set_horizontal_alignment(crate::control::HorizontalAlignment::Left);
        let inner = d.new_control(ControlKind::Panel);
        d.control_mut(inner).set_width(Some(250)).set_height(Some(40));
        d.attach_root(grid);
        d.attach_child(grid, child);
        d.attach_child(child, inner);
        d.update_layout();

        assert_eq!(d.control(child).desired_size().width, 100);
        assert_eq!(d.control(child).bounds().width, 100);
    }

    #[test]
    fn invalidation_walks_to_the_root() {
        let mut d = desktop();
        let outer = d.new_control(ControlKind::Panel);
        let inner = d.new_control(ControlKind::Panel);
        d.attach_root(outer);
        d.attach_child(outer, inner);
        d.update_layout();
        assert!(!d.control(outer).is_measure_dirty());

        d.control_mut(inner).set_width(Some(50));
        assert!(d.control(inner).is_measure_dirty());
        assert!(d.control(outer).is_measure_dirty());
    }

    #[test]
    fn explicit_size_wins_over_stretch() {
        let mut d = desktop();
        let panel = d.new_control(ControlKind::Panel);
        d.control_mut(panel).set_width(Some(300)).set_height(Some(200));
        d.attach_root(panel);
        d.update_layout();
        assert_eq!(d.control(panel).bounds(), Rect::new(0, 0, 300, 200));
    }

    #[test]
    fn margin_is_outside_the_border_box() {
        let mut d = desktop();
        let panel = d.new_control(ControlKind::Panel);
        d.control_mut(panel)
            .set_width(Some(100))
            .set_height(Some(80))
            .set_margin(Thickness::uniform(10))
            .set_padding(Thickness::uniform(5));
        d.attach_root(panel);
        d.update_layout();

        let c = d.control(panel);
        assert_eq!(c.bounds(), Rect::new(0, 0, 120, 100));
        assert_eq!(c.border_bounds(), Rect::new(10, 10, 100, 80));
        assert_eq!(c.content_bounds(), Rect::new(15, 15, 90, 70));
    }

    #[test]
    fn alignment_positions_within_container() {
        let mut d = desktop();
        let panel = d.new_control(ControlKind::Panel);
        d.control_mut(panel)
            .set_width(Some(100))
            .set_height(Some(50))
            .set_horizontal_alignment(crate::control::HorizontalAlignment::Center)
            .set_vertical_alignment(crate::control::VerticalAlignment::Bottom);
        d.attach_root(panel);
        d.update_layout();
        assert_eq!(d.control(panel).bounds(), Rect::new(350, 550, 100, 50));
    }

    #[test]
    fn stack_places_children_sequentially() {
        let mut d = desktop();
        let stack = d.new_control(ControlKind::Stack(StackState {
            orientation: Orientation::Vertical,
            spacing: 4,
            boundless: false,
        }));
        let a = d.new_control(ControlKind::Panel);
        let b = d.new_control(ControlKind::Panel);
        d.control_mut(a).set_height(Some(30));
        d.control_mut(b).set_height(Some(20));
        d.attach_root(stack);
        d.attach_child(stack, a);
        d.attach_child(stack, b);
        d.update_layout();

        assert_eq!(d.control(a).bounds(), Rect::new(0, 0, 800, 30));
        assert_eq!(d.control(b).bounds(), Rect::new(0, 34, 800, 20));
    }

    #[test]
    fn grid_sizes_fixed_auto_and_star_tracks() {
        // 300x200 grid, columns [100px, 1*], rows [Auto, 1*]; the auto row
        // is sized by a 40-tall child in (0, 0).
        let mut d = desktop();
        let grid = d.new_control(ControlKind::Grid(Default::default()));
        d.control_mut(grid)
            .set_width(Some(300))
            .set_height(Some(200))
            .set_columns(vec![TrackDefinition::pixels(100), TrackDefinition::star(1.0)])
            .set_rows(vec![TrackDefinition::auto(), TrackDefinition::star(1.0)]);
        let child = d.new_control(ControlKind::Panel);
        d.control_mut(child).set_height(Some(40));
        d.attach_root(grid);
        d.attach_child(grid, child);
        d.update_layout();

        let ControlKind::Grid(state) = d.control(grid).kind() else {
            unreachable!();
        };
        assert_eq!(state.column_widths(), &[100, 200]);
        assert_eq!(state.row_heights(), &[40, 160]);
        assert_eq!(d.control(child).bounds(), Rect::new(0, 0, 100, 40));
    }

    #[test]
    fn star_tracks_split_proportionally_and_tile_exactly() {
        let mut d = desktop();
        let grid = d.new_control(ControlKind::Grid(Default::default()));
        d.control_mut(grid)
            .set_width(Some(250))
            .set_height(Some(100))
            .set_columns(vec![
                TrackDefinition::star(1.0),
                TrackDefinition::star(2.0),
            ]);
        d.attach_root(grid);
        d.update_layout();

        let ControlKind::Grid(state) = d.control(grid).kind() else {
            unreachable!();
        };
        // floor(250/3)=83, floor(500/3)=166; the 1px leftover is donated to
        // the last non-fixed track.
        assert_eq!(state.column_widths(), &[83, 167]);
        assert_eq!(state.column_widths().iter().sum::<i32>(), 250);
    }

    #[test]
    fn star_tracks_respect_their_own_clamps() {
        let mut d = desktop();
        let grid = d.new_control(ControlKind::Grid(Default::default()));
        d.control_mut(grid)
            .set_width(Some(300))
            .set_height(Some(100))
            .set_columns(vec![
                TrackDefinition::star(1.0).with_max(50),
                TrackDefinition::star(1.0).with_min(120),
            ]);
        d.attach_root(grid);
        d.update_layout();

        let ControlKind::Grid(state) = d.control(grid).kind() else {
            unreachable!();
        };
        // Each star share is clamped individually; the clamped first track's
        // slack goes to the remainder track, not back into redistribution.
        assert_eq!(state.column_widths()[0], 50);
        assert!(state.column_widths()[1] >= 150);
        assert_eq!(state.column_widths().iter().sum::<i32>(), 300);
    }

    #[test]
    fn grid_children_stay_inside_grid_bounds() {
        let mut d = desktop();
        let grid = d.new_control(ControlKind::Grid(Default::default()));
        d.control_mut(grid)
            .set_width(Some(100))
            .set_height(Some(100))
            .set_columns(vec![TrackDefinition::star(1.0)])
            .set_rows(vec![TrackDefinition::star(1.0)]);
        let child = d.new_control(ControlKind::Panel);
        d.attach_root(grid);
        d.attach_child(grid, child);
        d.update_layout();

        let grid_bounds = d.control(grid).bounds();
        let child_bounds = d.control(child).bounds();
        assert_eq!(child_bounds.intersect(grid_bounds), child_bounds);
    }

    #[test]
    fn scroll_viewer_negotiates_overflow() {
        // 500x800 content inside a 200x300 viewer: both bars show, and the
        // scroll range accounts for the perpendicular bar's thickness.
        let mut d = Desktop::new(Rect::new(0, 0, 200, 300));
        let viewer = d.new_control(ControlKind::Scroll(Default::default()));
        let content = d.new_control(ControlKind::Panel);
        d.control_mut(content).set_width(Some(500)).set_height(Some(800));
        d.attach_root(viewer);
        d.attach_child(viewer, content);
        d.update_layout();

        let state = crate::scroll::state_ref(&d, viewer);
        assert!(state.shows_horizontal_scrollbar());
        assert!(state.shows_vertical_scrollbar());
        assert_eq!(state.scroll_maximum(), Point::new(308, 508));
        assert_eq!(d.control(content).bounds(), Rect::new(0, 0, 500, 800));
    }

    #[test]
    fn scroll_position_set_is_clamped_and_idempotent() {
        let mut d = Desktop::new(Rect::new(0, 0, 200, 300));
        let viewer = d.new_control(ControlKind::Scroll(Default::default()));
        let content = d.new_control(ControlKind::Panel);
        d.control_mut(content).set_width(Some(500)).set_height(Some(800));
        d.attach_root(viewer);
        d.attach_child(viewer, content);
        d.update_layout();
        d.poll_events();

        crate::scroll::set_scroll_position(&mut d, viewer, Point::new(9999, -50));
        let state = crate::scroll::state_ref(&d, viewer);
        assert_eq!(state.scroll_position(), Point::new(308, 0));
        assert_eq!(d.poll_events().len(), 1);

        // Setting the same clamped value again fires nothing.
        crate::scroll::set_scroll_position(&mut d, viewer, Point::new(9999, -50));
        assert!(d.poll_events().is_empty());
    }

    #[test]
    fn scrolled_content_shifts_against_the_offset() {
        let mut d = Desktop::new(Rect::new(0, 0, 200, 300));
        let viewer = d.new_control(ControlKind::Scroll(Default::default()));
        let content = d.new_control(ControlKind::Panel);
        d.control_mut(content).set_width(Some(500)).set_height(Some(800));
        d.attach_root(viewer);
        d.attach_child(viewer, content);
        d.update_layout();

        crate::scroll::set_scroll_position(&mut d, viewer, Point::new(30, 100));
        d.update_layout();
        assert_eq!(d.control(content).bounds(), Rect::new(-30, -100, 500, 800));
    }

    #[test]
    fn hidden_axis_never_scrolls() {
        let mut d = Desktop::new(Rect::new(0, 0, 200, 300));
        let viewer = d.new_control(ControlKind::Scroll(crate::scroll::ScrollState {
            horizontal_visibility: crate::scroll::ScrollbarVisibility::Hidden,
            ..Default::default()
        }));
        let content = d.new_control(ControlKind::Panel);
        d.control_mut(content).set_width(Some(500)).set_height(Some(800));
        d.attach_root(viewer);
        d.attach_child(viewer, content);
        d.update_layout();

        let state = crate::scroll::state_ref(&d, viewer);
        assert!(!state.shows_horizontal_scrollbar());
        assert_eq!(state.scroll_maximum().x, 0);
    }

    #[test]
    fn invisible_children_take_no_space() {
        let mut d = desktop();
        let stack = d.new_control(ControlKind::Stack(Default::default()));
        let a = d.new_control(ControlKind::Panel);
        let b = d.new_control(ControlKind::Panel);
        d.control_mut(a).set_height(Some(30)).set_visible(false);
        d.control_mut(b).set_height(Some(20));
        d.attach_root(stack);
        d.attach_child(stack, a);
        d.attach_child(stack, b);
        d.update_layout();

        assert_eq!(d.control(b).bounds(), Rect::new(0, 0, 800, 20));
    }

    #[test]
    fn zero_available_space_degrades_silently() {
        let mut d = Desktop::new(Rect::new(0, 0, 0, 0));
        let stack = d.new_control(ControlKind::Stack(Default::default()));
        let child = d.new_control(ControlKind::Panel);
        d.attach_root(stack);
        d.attach_child(stack, child);
        d.update_layout();
        assert_eq!(d.control(child).bounds().size(), Size::ZERO);
    }
}
