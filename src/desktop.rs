//! The root coordinator: owns the control arena and the z-ordered root
//! list, drives the frame (input → layout → render → deferred flush), and
//! runs the input-routing state machine (hover, focus, double click,
//! modal blocking, context-menu lifecycle).

use rustc_hash::{FxHashMap, FxHashSet};

use crate::control::{Control, ControlKind, ControlMut, InteractionState, KindTag, TextStyle};
use crate::dispatch::DeferredQueue;
use crate::events::UiEvent;
use crate::grid;
use crate::input::{InputFrame, Key, KeyModifiers, MouseButton, MouseButtons};
use crate::math::{Point, Rect, Size, Vector2};
use crate::render_commands::RenderCommand;
use crate::scroll;
use crate::transform::Transform;
use crate::tree::{ControlArena, ControlId};

/// Two touch-downs closer together than this (ms) are a double-click
/// candidate.
pub const DOUBLE_CLICK_INTERVAL_MS: f64 = 500.0;
/// Maximum pointer travel (pixels) between the two downs of a double click.
pub const DOUBLE_CLICK_RADIUS: i32 = 8;
/// Delay (ms) before a held key starts repeating.
pub const REPEAT_KEY_DOWN_START_MS: f64 = 500.0;
/// Interval (ms) between repeats once repeating has started.
pub const REPEAT_KEY_DOWN_INTERVAL_MS: f64 = 50.0;

pub struct Desktop {
    arena: ControlArena,
    roots: Vec<ControlId>,
    roots_sorted: Vec<ControlId>,
    roots_dirty: bool,
    layout_dirty: bool,
    viewport: Rect,

    focused: Option<ControlId>,
    mouse_over: Option<ControlId>,
    context_menu: Option<ControlId>,
    focus_before_menu: Option<ControlId>,
    menu_bar: Option<ControlId>,

    mouse_position: Point,
    buttons_down: MouseButtons,
    is_touching_down: bool,
    touched_control: Option<ControlId>,
    scroll_drag: Option<ControlId>,
    last_touch_time: Option<f64>,
    last_touch_position: Point,

    keys_down: FxHashSet<Key>,
    modifiers: KeyModifiers,
    last_key: Option<Key>,
    last_key_time: f64,
    key_repeats: u32,

    now: f64,

    measure_text_fn: Option<Box<dyn Fn(&str, &TextStyle) -> Size>>,
    text_input_changed: Option<Box<dyn FnMut(bool)>>,
    losing_focus_hooks: FxHashMap<ControlId, Box<dyn FnMut(ControlId) -> bool>>,
    menu_closing_hook: Option<Box<dyn FnMut(ControlId) -> bool>>,

    events: Vec<UiEvent>,
    deferred: DeferredQueue,
    pub(crate) commands: Vec<RenderCommand>,
}

impl Desktop {
    pub fn new(viewport: Rect) -> Self {
        Self {
            arena: ControlArena::default(),
            roots: Vec::new(),
            roots_sorted: Vec::new(),
            roots_dirty: false,
            layout_dirty: true,
            viewport,
            focused: None,
            mouse_over: None,
            context_menu: None,
            focus_before_menu: None,
            menu_bar: None,
            mouse_position: Point::ZERO,
            buttons_down: MouseButtons::NONE,
            is_touching_down: false,
            touched_control: None,
            scroll_drag: None,
            last_touch_time: None,
            last_touch_position: Point::ZERO,
            keys_down: FxHashSet::default(),
            modifiers: KeyModifiers::NONE,
            last_key: None,
            last_key_time: 0.0,
            key_repeats: 0,
            now: 0.0,
            measure_text_fn: None,
            text_input_changed: None,
            losing_focus_hooks: FxHashMap::default(),
            menu_closing_hook: None,
            events: Vec::new(),
            deferred: DeferredQueue::default(),
            commands: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Arena and tree
    // ------------------------------------------------------------------

    pub(crate) fn arena_mut(&mut self) -> &mut ControlArena {
        &mut self.arena
    }

    /// Creates a detached control: no parent, not on the desktop.
    pub fn new_control(&mut self, kind: ControlKind) -> ControlId {
        self.arena.insert(Control::new(kind))
    }

    pub fn control(&self, id: ControlId) -> &Control {
        self.arena.get(id)
    }

    pub fn try_control(&self, id: ControlId) -> Option<&Control> {
        self.arena.try_get(id)
    }

    pub fn control_mut(&mut self, id: ControlId) -> ControlMut<'_> {
        assert!(self.arena.contains(id), "stale or unknown control id");
        ControlMut { desktop: self, id }
    }

    pub fn contains(&self, id: ControlId) -> bool {
        self.arena.contains(id)
    }

    pub fn roots(&self) -> &[ControlId] {
        &self.roots
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        if self.viewport != viewport {
            self.viewport = viewport;
            for root in self.roots.clone() {
                self.invalidate_measure(root);
            }
            self.layout_dirty = true;
        }
    }

    /// Attaches a control as a new top-level root, on top of existing roots
    /// with equal z-index.
    pub fn attach_root(&mut self, id: ControlId) {
        assert!(
            self.arena.get(id).parent.is_none(),
            "control is already parented"
        );
        assert!(!self.roots.contains(&id), "control is already a root");
        self.roots.push(id);
        self.roots_dirty = true;
        self.set_placed(id, true);
        self.invalidate_measure(id);
    }

    pub fn detach_root(&mut self, id: ControlId) {
        if let Some(index) = self.roots.iter().position(|&r| r == id) {
            self.roots.remove(index);
            self.roots_dirty = true;
            self.set_placed(id, false);
            self.clear_interaction_references(id);
            if self.context_menu == Some(id) {
                self.context_menu = None;
            }
            self.layout_dirty = true;
        }
    }

    pub fn attach_child(&mut self, parent: ControlId, child: ControlId) {
        assert!(
            self.arena.get(child).parent.is_none() && !self.roots.contains(&child),
            "control is already placed"
        );
        self.arena.get_mut(child).parent = Some(parent);
        let p = self.arena.get_mut(parent);
        p.children.push(child);
        p.mark_children_copy_dirty();
        if self.arena.get(parent).on_desktop {
            self.set_placed(child, true);
        }
        self.invalidate_measure(parent);
    }

    /// Detaches `child` from its parent. The subtree stays alive (it can be
    /// re-attached); desktop back-references into it are cleared.
    pub fn detach_child(&mut self, child: ControlId) {
        let Some(parent) = self.arena.get(child).parent else {
            return;
        };
        let p = self.arena.get_mut(parent);
        p.children.retain(|&c| c != child);
        p.mark_children_copy_dirty();
        self.arena.get_mut(child).parent = None;
        self.set_placed(child, false);
        self.clear_interaction_references(child);
        self.invalidate_measure(parent);
    }

    /// Destroys a control and its whole subtree, freeing the arena slots.
    pub fn destroy(&mut self, id: ControlId) {
        if !self.arena.contains(id) {
            return;
        }
        if self.arena.get(id).parent.is_some() {
            self.detach_child(id);
        } else if self.roots.contains(&id) {
            self.detach_root(id);
        } else {
            // Never-attached controls can still hold focus or touch state.
            self.clear_interaction_references(id);
        }
        self.free_subtree(id);
    }

    fn free_subtree(&mut self, id: ControlId) {
        for child in self.arena.get(id).children.clone() {
            self.free_subtree(child);
        }
        self.losing_focus_hooks.remove(&id);
        self.arena.remove(id);
    }

    /// Placement is transitive: attaching a subtree to a placed parent (or
    /// the root set) places every descendant and invalidates its measure.
    fn set_placed(&mut self, id: ControlId, placed: bool) {
        let control = self.arena.get_mut(id);
        control.on_desktop = placed;
        if placed {
            control.measure_dirty = true;
            control.arrange_dirty = true;
        }
        for child in self.arena.get(id).children.clone() {
            self.set_placed(child, placed);
        }
    }

    /// Clears focus/hover/touch back-references pointing into `id`'s
    /// subtree. Used on detach so the desktop never routes to a removed
    /// control.
    pub(crate) fn clear_interaction_references(&mut self, id: ControlId) {
        if let Some(focused) = self.focused {
            if self.is_self_or_descendant(focused, id) {
                self.focused = None;
                self.push_event(UiEvent::LostFocus(focused));
                self.notify_text_input(false);
            }
        }
        if let Some(over) = self.mouse_over {
            if self.is_self_or_descendant(over, id) {
                self.mouse_over = None;
            }
        }
        if let Some(touched) = self.touched_control {
            if self.is_self_or_descendant(touched, id) {
                self.touched_control = None;
            }
        }
        if let Some(drag) = self.scroll_drag {
            if self.is_self_or_descendant(drag, id) {
                self.scroll_drag = None;
            }
        }
    }

    fn is_self_or_descendant(&self, candidate: ControlId, ancestor: ControlId) -> bool {
        let mut current = Some(candidate);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.arena.try_get(id).and_then(|c| c.parent);
        }
        false
    }

    /// Snapshot of a container's children, rebuilt lazily after structural
    /// mutation so iteration never observes a mutation it triggered.
    pub(crate) fn children_snapshot(&mut self, id: ControlId) -> Vec<ControlId> {
        let control = self.arena.get_mut(id);
        if control.children_copy_dirty || control.children_copy.len() != control.children.len() {
            control.children_copy = control.children.clone();
            control.children_copy_dirty = false;
        }
        control.children_copy.clone()
    }

    // ------------------------------------------------------------------
    // Invalidation
    // ------------------------------------------------------------------

    /// Bottom-up: dirties this control and every ancestor (a child's size
    /// change can affect ancestor sizing) and flags the desktop for one
    /// top-down arrange pass.
    pub(crate) fn invalidate_measure(&mut self, id: ControlId) {
        let mut current = Some(id);
        while let Some(node) = current {
            let Some(control) = self.arena.try_get_mut(node) else {
                break;
            };
            control.measure_dirty = true;
            control.arrange_dirty = true;
            current = control.parent;
        }
        self.layout_dirty = true;
    }

    pub(crate) fn invalidate_arrange(&mut self, id: ControlId) {
        let mut current = Some(id);
        while let Some(node) = current {
            let Some(control) = self.arena.try_get_mut(node) else {
                break;
            };
            control.arrange_dirty = true;
            current = control.parent;
        }
        self.layout_dirty = true;
    }

    /// Top-down: dirties an entire subtree's measure. Needed when a global
    /// measurement input changes without any per-control mutation, so the
    /// ancestor-walking invalidation never reaches the affected leaves.
    fn invalidate_measure_subtree(&mut self, id: ControlId) {
        let Some(control) = self.arena.try_get_mut(id) else {
            return;
        };
        control.measure_dirty = true;
        control.arrange_dirty = true;
        for child in self.arena.get(id).children.clone() {
            self.invalidate_measure_subtree(child);
        }
    }

    /// Transform invalidation is top-down: an ancestor's pose change moves
    /// every descendant.
    pub(crate) fn invalidate_transform(&mut self, id: ControlId) {
        let Some(control) = self.arena.try_get_mut(id) else {
            return;
        };
        control.transform_dirty = true;
        control.inverse_dirty = true;
        for child in self.arena.get(id).children.clone() {
            self.invalidate_transform(child);
        }
    }

    pub(crate) fn is_layout_dirty(&self) -> bool {
        self.layout_dirty
    }

    pub(crate) fn clear_layout_dirty(&mut self) {
        self.layout_dirty = false;
    }

    pub(crate) fn mark_roots_dirty(&mut self) {
        self.roots_dirty = true;
        self.layout_dirty = true;
    }

    /// Root list sorted by z-index; stable, so attach order breaks ties.
    pub(crate) fn sort_roots(&mut self) {
        if self.roots_dirty || self.roots_sorted.len() != self.roots.len() {
            let arena = &self.arena;
            self.roots.retain(|&id| arena.contains(id));
            self.roots_sorted = self.roots.clone();
            self.roots_sorted.sort_by_key(|&id| arena.get(id).z_index);
            self.roots_dirty = false;
        }
    }

    pub(crate) fn sorted_roots(&mut self) -> Vec<ControlId> {
        self.sort_roots();
        self.roots_sorted.clone()
    }

    // ------------------------------------------------------------------
    // Transforms
    // ------------------------------------------------------------------

    /// Composed visual transform (own pose, then ancestors). Cached until a
    /// pose, position, or size change invalidates it.
    pub fn transform(&mut self, id: ControlId) -> Transform {
        let control = self.arena.get(id);
        if !control.transform_dirty {
            return control.transform;
        }
        let local = Transform::from_pose(
            control.bounds,
            control.transform_origin,
            control.scale,
            control.rotation,
        );
        let parent = control.parent;
        let composed = match parent {
            Some(parent) => local.then(&self.transform(parent)),
            None => local,
        };
        let control = self.arena.get_mut(id);
        control.transform = composed;
        control.transform_dirty = false;
        control.inverse_dirty = true;
        composed
    }

    /// Inverse of the composed transform, recomputed only when the forward
    /// transform changed. `None` for singular transforms (zero scale).
    pub fn inverse_transform(&mut self, id: ControlId) -> Option<Transform> {
        let forward = self.transform(id);
        let control = self.arena.get_mut(id);
        if control.inverse_dirty {
            control.inverse_transform = forward.invert();
            control.inverse_dirty = false;
        }
        control.inverse_transform
    }

    /// Maps a point in the control's layout space to screen space.
    pub fn to_global(&mut self, id: ControlId, point: Vector2) -> Vector2 {
        self.transform(id).apply(point)
    }

    /// Maps a screen-space point into the control's layout space.
    pub fn to_local(&mut self, id: ControlId, point: Vector2) -> Vector2 {
        match self.inverse_transform(id) {
            Some(inverse) => inverse.apply(point),
            None => point,
        }
    }

    // ------------------------------------------------------------------
    // Hit testing
    // ------------------------------------------------------------------

    fn point_within(&mut self, id: ControlId, point: Point) -> bool {
        let bounds = self.arena.get(id).bounds;
        if self.transform(id) == Transform::IDENTITY {
            return bounds.contains(point);
        }
        let Some(inverse) = self.inverse_transform(id) else {
            // Singular transform: nothing to hit.
            return false;
        };
        let local = inverse.apply(point.into());
        bounds.contains(Point::new(local.x.floor() as i32, local.y.floor() as i32))
    }

    /// Depth-first hit test over roots in descending z. Inactive (modal
    /// blocked) and invisible controls are skipped; fall-through controls
    /// let the search continue past them.
    pub fn hit_test(&mut self, point: Point) -> Option<ControlId> {
        let roots = self.sorted_roots();
        for root in roots.iter().rev() {
            if !self.arena.get(*root).active {
                continue;
            }
            if let Some(hit) = self.hit_test_control(*root, point) {
                return Some(hit);
            }
        }
        None
    }

    fn hit_test_control(&mut self, id: ControlId, point: Point) -> Option<ControlId> {
        if !self.arena.get(id).visible || !self.point_within(id, point) {
            return None;
        }
        let children = self.children_snapshot(id);
        for child in children.iter().rev() {
            if let Some(hit) = self.hit_test_control(*child, point) {
                return Some(hit);
            }
        }
        if self.arena.get(id).falls_through {
            None
        } else {
            Some(id)
        }
    }

    pub fn is_point_over_gui(&mut self, point: Point) -> bool {
        self.hit_test(point).is_some()
    }

    // ------------------------------------------------------------------
    // Interaction state
    // ------------------------------------------------------------------

    /// Effective enabled: a control is enabled only if all ancestors are.
    pub fn is_enabled_in_hierarchy(&self, id: ControlId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            let control = self.arena.get(node);
            if !control.enabled {
                return false;
            }
            current = control.parent;
        }
        true
    }

    /// Derives the visual state with fixed precedence:
    /// disabled > clicking > hovered > focused > default.
    pub fn interaction_state(&self, id: ControlId) -> InteractionState {
        let control = self.arena.get(id);
        if !self.is_enabled_in_hierarchy(id) {
            return InteractionState::Disabled;
        }
        let over = self.mouse_over == Some(id);
        if control.active && over && control.is_touching {
            return InteractionState::Clicking;
        }
        if control.active && over {
            return InteractionState::Hovered;
        }
        if self.focused == Some(id) {
            return InteractionState::Focused;
        }
        InteractionState::Default
    }

    // ------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------

    pub fn focused_control(&self) -> Option<ControlId> {
        self.focused
    }

    pub fn mouse_over_control(&self) -> Option<ControlId> {
        self.mouse_over
    }

    /// Registers the cancellable losing-focus hook for a control. Returning
    /// false from the hook aborts the focus change.
    pub fn set_losing_focus_hook(
        &mut self,
        id: ControlId,
        hook: impl FnMut(ControlId) -> bool + 'static,
    ) {
        self.losing_focus_hooks.insert(id, Box::new(hook));
    }

    /// Moves keyboard focus. The old control (if still attached) may cancel
    /// via its losing-focus hook; after that the change is unconditional:
    /// lost/got events fire and the text-input signal follows the new
    /// control's text acceptance.
    pub fn set_focus(&mut self, target: Option<ControlId>) -> bool {
        if self.focused == target {
            return true;
        }
        if let Some(old) = self.focused {
            if self.arena.contains(old) && self.arena.get(old).on_desktop {
                if let Some(mut hook) = self.losing_focus_hooks.remove(&old) {
                    let allow = hook(old);
                    self.losing_focus_hooks.insert(old, hook);
                    if !allow {
                        return false;
                    }
                }
            }
        }
        let old = self.focused;
        self.focused = target;
        if let Some(old) = old {
            self.push_event(UiEvent::LostFocus(old));
        }
        if let Some(new) = target {
            self.push_event(UiEvent::GotFocus(new));
        }
        let accepts_text = target
            .and_then(|id| self.arena.try_get(id))
            .map(|c| c.accepts_text_input)
            .unwrap_or(false);
        self.notify_text_input(accepts_text);
        true
    }

    fn notify_text_input(&mut self, enabled: bool) {
        if let Some(hook) = &mut self.text_input_changed {
            hook(enabled);
        }
    }

    /// External signal for platform text input (soft keyboard / IME).
    pub fn set_text_input_listener(&mut self, listener: impl FnMut(bool) + 'static) {
        self.text_input_changed = Some(Box::new(listener));
    }

    fn is_focusable(&self, id: ControlId) -> bool {
        let control = self.arena.get(id);
        control.visible
            && control.active
            && control.on_desktop
            && control.accepts_focus
            && self.is_enabled_in_hierarchy(id)
    }

    /// Focusable controls in traversal order: sorted roots ascending,
    /// pre-order within each subtree. Forward and backward traversal walk
    /// this total cyclic order.
    fn collect_focusable(&mut self) -> Vec<ControlId> {
        let mut out = Vec::new();
        let roots = self.sorted_roots();
        for root in roots {
            self.collect_focusable_in(root, &mut out);
        }
        out
    }

    fn collect_focusable_in(&mut self, id: ControlId, out: &mut Vec<ControlId>) {
        if !self.arena.get(id).visible {
            return;
        }
        if self.is_focusable(id) {
            out.push(id);
        }
        for child in self.children_snapshot(id) {
            self.collect_focusable_in(child, out);
        }
    }

    /// Tab traversal: focuses the control after the current one, wrapping
    /// to the first focusable control.
    pub fn focus_next(&mut self) -> bool {
        self.focus_step(1)
    }

    /// Shift+Tab traversal: the exact inverse permutation of `focus_next`.
    pub fn focus_previous(&mut self) -> bool {
        self.focus_step(-1)
    }

    fn focus_step(&mut self, direction: isize) -> bool {
        let order = self.collect_focusable();
        if order.is_empty() {
            return false;
        }
        let target = match self.focused.and_then(|f| order.iter().position(|&c| c == f)) {
            Some(index) => {
                let len = order.len() as isize;
                order[((index as isize + direction).rem_euclid(len)) as usize]
            }
            None => {
                if direction > 0 {
                    order[0]
                } else {
                    *order.last().unwrap()
                }
            }
        };
        self.set_focus(Some(target))
    }

    // ------------------------------------------------------------------
    // Context menu and menu bar
    // ------------------------------------------------------------------

    pub fn context_menu(&self) -> Option<ControlId> {
        self.context_menu
    }

    pub fn menu_bar(&self) -> Option<ControlId> {
        self.menu_bar
    }

    pub fn set_menu_bar(&mut self, id: Option<ControlId>) {
        self.menu_bar = id;
    }

    /// Hook consulted when an outside click asks the open context menu to
    /// close. Returning false keeps the menu open.
    pub fn set_context_menu_closing_hook(
        &mut self,
        hook: impl FnMut(ControlId) -> bool + 'static,
    ) {
        self.menu_closing_hook = Some(Box::new(hook));
    }

    /// Opens `menu` as a top-level root at `position`, shifted left/up so it
    /// never overflows the right/bottom viewport edges (top/left overflow is
    /// not corrected). Focus optionally moves to the menu; the previous
    /// focus is restored on close.
    pub fn show_context_menu(&mut self, menu: ControlId, position: Point, take_focus: bool) {
        if let Some(open) = self.context_menu {
            self.hide_context_menu();
            if open == menu {
                return;
            }
        }
        let desired = self.measure(menu, self.viewport.size(), true);
        let mut position = position;
        if position.x + desired.width > self.viewport.right() {
            position.x = self.viewport.right() - desired.width;
        }
        if position.y + desired.height > self.viewport.bottom() {
            position.y = self.viewport.bottom() - desired.height;
        }
        self.control_mut(menu)
            .set_position(position)
            .set_visible(true);
        if !self.roots.contains(&menu) {
            self.attach_root(menu);
        }
        self.context_menu = Some(menu);
        if take_focus {
            self.focus_before_menu = self.focused;
            if self.arena.get(menu).accepts_focus {
                self.set_focus(Some(menu));
            }
        } else {
            self.focus_before_menu = None;
        }
        self.push_event(UiEvent::ContextMenuOpened(menu));
    }

    /// Closes the open context menu unconditionally and restores the focus
    /// saved when it opened.
    pub fn hide_context_menu(&mut self) {
        let Some(menu) = self.context_menu.take() else {
            return;
        };
        self.detach_root(menu);
        let saved = self.focus_before_menu.take();
        if let Some(saved) = saved {
            if self.arena.contains(saved) && self.arena.get(saved).on_desktop {
                self.set_focus(Some(saved));
            }
        }
        self.push_event(UiEvent::ContextMenuClosed(menu));
    }

    /// Outside-click close: cancellable through the closing hook.
    fn try_close_context_menu(&mut self) {
        let Some(menu) = self.context_menu else {
            return;
        };
        if let Some(mut hook) = self.menu_closing_hook.take() {
            let allow = hook(menu);
            self.menu_closing_hook = Some(hook);
            if !allow {
                return;
            }
        }
        self.hide_context_menu();
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    pub fn mouse_position(&self) -> Point {
        self.mouse_position
    }

    pub fn is_touching(&self) -> bool {
        self.is_touching_down
    }

    /// Consumes one frame of raw input: mouse first, then keyboard, then
    /// text events. `now` is the host clock in milliseconds.
    pub fn update_input(&mut self, frame: &InputFrame, now: f64) {
        self.now = now;
        // A degenerate viewport means the host didn't fill it in.
        if !frame.viewport.is_empty() {
            self.set_viewport(frame.viewport);
        }
        self.modifiers = frame.modifiers;

        self.update_mouse(frame);
        self.update_keyboard(frame);
        self.update_text_events(frame);
    }

    fn update_mouse(&mut self, frame: &InputFrame) {
        if frame.mouse_position != self.mouse_position {
            let position = frame.mouse_position;
            self.mouse_position = position;
            self.push_event(UiEvent::MouseMoved { position });

            if let Some(drag) = self.scroll_drag {
                scroll::drag_to(self, drag, position);
            }
            self.update_mouse_over();
            if let Some(over) = self.mouse_over {
                if let Some(grid) = self.grid_ancestor(over) {
                    grid::update_hover(self, grid, position);
                }
            }
        }

        // Five independently tracked buttons.
        for button in MouseButton::ALL {
            let was_down = self.buttons_down.contains(button.flag());
            let is_down = frame.buttons.contains(button.flag());
            if is_down && !was_down {
                self.on_touch_down(button);
            } else if !is_down && was_down {
                self.on_touch_up(button);
            }
        }
        self.buttons_down = frame.buttons;

        if frame.wheel_delta.y != 0.0 || frame.wheel_delta.x != 0.0 {
            let delta = if frame.wheel_delta.y != 0.0 {
                frame.wheel_delta.y
            } else {
                frame.wheel_delta.x
            };
            self.route_wheel(delta);
        }
    }

    fn update_mouse_over(&mut self) {
        let over = self.hit_test(self.mouse_position);
        if over != self.mouse_over {
            if let Some(old) = self.mouse_over {
                self.push_event(UiEvent::MouseLeft(old));
            }
            self.mouse_over = over;
            if let Some(new) = over {
                self.push_event(UiEvent::MouseEntered(new));
            }
        }
    }

    fn grid_ancestor(&self, id: ControlId) -> Option<ControlId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.arena.get(node).kind_tag() == KindTag::Grid {
                return Some(node);
            }
            current = self.arena.get(node).parent;
        }
        None
    }

    fn scroll_ancestor(&self, id: ControlId) -> Option<ControlId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.arena.get(node).kind_tag() == KindTag::Scroll {
                return Some(node);
            }
            current = self.arena.get(node).parent;
        }
        None
    }

    fn on_touch_down(&mut self, button: MouseButton) {
        let position = self.mouse_position;
        self.is_touching_down = true;

        let target = self.hit_test(position);

        // A click no part of the open menu consumes closes it (cancellable).
        if let Some(menu) = self.context_menu {
            let on_menu = target
                .map(|t| self.is_self_or_descendant(t, menu))
                .unwrap_or(false);
            if !on_menu {
                self.try_close_context_menu();
            }
        }

        let Some(target) = target else {
            return;
        };

        // Scrollbar thumbs take the touch before anything else.
        if let Some(scroll) = self.scroll_ancestor(target) {
            if scroll::try_begin_drag(self, scroll, position) {
                self.scroll_drag = Some(scroll);
                return;
            }
        }

        self.arena.get_mut(target).is_touching = true;
        self.touched_control = Some(target);
        self.push_event(UiEvent::TouchDown {
            control: target,
            position,
            button,
        });

        if let Some(grid) = self.grid_ancestor(target) {
            grid::update_selection(self, grid, position);
        }

        // Touch moves focus to the nearest focus-accepting ancestor.
        let mut focus_target = Some(target);
        while let Some(node) = focus_target {
            if self.is_focusable(node) {
                break;
            }
            focus_target = self.arena.get(node).parent;
        }
        if focus_target.is_some() {
            self.set_focus(focus_target);
        }

        // Double click: both the time and the squared-distance condition
        // must hold.
        if button == MouseButton::Left {
            let is_double = match self.last_touch_time {
                Some(last) => {
                    self.now - last < DOUBLE_CLICK_INTERVAL_MS
                        && position.distance_squared(self.last_touch_position)
                            <= (DOUBLE_CLICK_RADIUS as i64) * (DOUBLE_CLICK_RADIUS as i64)
                }
                None => false,
            };
            if is_double {
                self.push_event(UiEvent::DoubleClick {
                    control: target,
                    position,
                });
                // A third click starts a fresh cycle.
                self.last_touch_time = None;
            } else {
                self.last_touch_time = Some(self.now);
                self.last_touch_position = position;
            }
        }
    }

    fn on_touch_up(&mut self, button: MouseButton) {
        self.is_touching_down = false;
        if let Some(drag) = self.scroll_drag.take() {
            scroll::end_drag(self, drag);
        }
        if let Some(touched) = self.touched_control.take() {
            if let Some(control) = self.arena.try_get_mut(touched) {
                control.is_touching = false;
            }
            self.push_event(UiEvent::TouchUp {
                control: touched,
                position: self.mouse_position,
                button,
            });
        }
    }

    /// Wheel goes to the focused control if it captures wheel, else to the
    /// first wheel-capturing ancestor of the hovered control. First match
    /// wins.
    fn route_wheel(&mut self, delta: f32) {
        let target = match self.focused {
            Some(focused) if self.arena.get(focused).captures_wheel => Some(focused),
            _ => {
                let mut current = self.mouse_over;
                loop {
                    match current {
                        Some(node) if self.arena.get(node).captures_wheel => break Some(node),
                        Some(node) => current = self.arena.get(node).parent,
                        None => break None,
                    }
                }
            }
        };
        let Some(target) = target else {
            return;
        };
        self.push_event(UiEvent::MouseWheel {
            control: target,
            delta,
        });
        if self.arena.get(target).kind_tag() == KindTag::Scroll {
            let shift = self.modifiers.contains(KeyModifiers::SHIFT);
            scroll::handle_wheel(self, target, delta, shift);
        }
    }

    fn update_keyboard(&mut self, frame: &InputFrame) {
        let current: FxHashSet<Key> = frame.keys_down.iter().copied().collect();

        for &key in &frame.keys_down {
            if !self.keys_down.contains(&key) {
                self.on_key_down(key, false);
                self.last_key = Some(key);
                self.last_key_time = self.now;
                self.key_repeats = 0;
            }
        }

        // Key repeat: first after the start delay, then at the repeat
        // interval, counter reset on key change.
        if let Some(key) = self.last_key {
            if current.contains(&key) {
                let due = self.last_key_time
                    + REPEAT_KEY_DOWN_START_MS
                    + self.key_repeats as f64 * REPEAT_KEY_DOWN_INTERVAL_MS;
                if self.now >= due {
                    self.key_repeats += 1;
                    self.on_key_down(key, true);
                }
            } else {
                self.last_key = None;
                self.key_repeats = 0;
            }
        }

        for key in self.keys_down.clone() {
            if !current.contains(&key) {
                self.push_event(UiEvent::KeyUp { key });
            }
        }
        self.keys_down = current;
    }

    fn on_key_down(&mut self, key: Key, repeat: bool) {
        self.push_event(UiEvent::KeyDown {
            key,
            repeat,
            target: self.focused,
        });
        if key == Key::Tab {
            if self.modifiers.contains(KeyModifiers::SHIFT) {
                self.focus_previous();
            } else {
                self.focus_next();
            }
        }
    }

    fn update_text_events(&mut self, frame: &InputFrame) {
        if frame.text_events.is_empty() {
            return;
        }
        let Some(focused) = self.focused else {
            return;
        };
        if !self.arena.get(focused).accepts_text_input {
            return;
        }
        for event in &frame.text_events {
            self.push_event(UiEvent::TextInput {
                control: focused,
                event: event.clone(),
            });
        }
    }

    // ------------------------------------------------------------------
    // Events and deferred dispatch
    // ------------------------------------------------------------------

    pub(crate) fn push_event(&mut self, event: UiEvent) {
        self.events.push(event);
    }

    /// Drains the events queued since the last poll.
    pub fn poll_events(&mut self) -> Vec<UiEvent> {
        std::mem::take(&mut self.events)
    }

    /// Schedules a structural mutation to run after the current frame's
    /// traversal, at the deferred flush point.
    pub fn defer(&mut self, action: impl FnOnce(&mut Desktop) + 'static) {
        self.deferred.schedule(Box::new(action));
    }

    /// Runs pending deferred actions. Actions scheduled while flushing run
    /// in the same flush, unless cancellation intervenes.
    pub fn flush_deferred(&mut self) {
        loop {
            if self.deferred.is_cancelled() || self.deferred.is_empty() {
                break;
            }
            let batch = self.deferred.take_pending();
            for action in batch {
                if self.deferred.is_cancelled() {
                    break;
                }
                action(self);
            }
        }
    }

    /// Cancels all pending (and future) deferred actions. Idempotent; used
    /// on teardown.
    pub fn cancel_deferred(&mut self) {
        self.deferred.cancel();
    }

    // ------------------------------------------------------------------
    // Text measurement boundary
    // ------------------------------------------------------------------

    /// Host-provided text measurement. Without it, text controls measure
    /// zero and skip drawing.
    pub fn set_measure_text_function(
        &mut self,
        measure: impl Fn(&str, &TextStyle) -> Size + 'static,
    ) {
        self.measure_text_fn = Some(Box::new(measure));
        // Anything measured before the callback existed is stale.
        for root in self.roots.clone() {
            self.invalidate_measure_subtree(root);
        }
        self.layout_dirty = true;
    }

    pub(crate) fn measure_text(&self, text: &str, style: &TextStyle) -> Size {
        if style.font.is_none() {
            return Size::ZERO;
        }
        match &self.measure_text_fn {
            Some(measure) => measure(text, style),
            None => Size::ZERO,
        }
    }

    // ------------------------------------------------------------------
    // Frame driver
    // ------------------------------------------------------------------

    /// One full frame in the fixed order: input → layout → render →
    /// deferred flush.
    pub fn run_frame(&mut self, frame: &InputFrame, now: f64) -> &[RenderCommand] {
        self.update_input(frame, now);
        self.update_layout();
        self.build_render_commands();
        self.flush_deferred();
        &self.commands
    }

    /// Modal blocking, re-verified every pass: walking roots in ascending
    /// z, every root after the first visible+enabled modal one is inactive.
    pub(crate) fn update_active_states(&mut self) {
        let roots = self.sorted_roots();
        let mut active = true;
        for root in roots {
            self.set_active_recursive(root, active);
            let control = self.arena.get(root);
            if control.visible && control.enabled && control.is_modal {
                active = false;
            }
        }
    }

    fn set_active_recursive(&mut self, id: ControlId, active: bool) {
        self.arena.get_mut(id).active = active;
        for child in self.arena.get(id).children.clone() {
            self.set_active_recursive(child, active);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{ControlKind, FontHandle, TextState};
    use crate::input::TextEvent;
    use std::cell::Cell;
    use std::rc::Rc;

    fn desktop() -> Desktop {
        Desktop::new(Rect::new(0, 0, 800, 600))
    }

    fn frame(mouse: Point, buttons: MouseButtons) -> InputFrame {
        InputFrame {
            mouse_position: mouse,
            buttons,
            ..Default::default()
        }
    }

    fn click(d: &mut Desktop, at: Point, now: f64) {
        d.update_input(&frame(at, MouseButtons::LEFT), now);
        d.update_input(&frame(at, MouseButtons::NONE), now + 16.0);
    }

    #[test]
    fn hit_test_returns_topmost_non_falling_control() {
        let mut d = desktop();
        let back = d.new_control(ControlKind::Panel);
        let front = d.new_control(ControlKind::Panel);
        d.control_mut(front).set_width(Some(100)).set_height(Some(100));
        d.attach_root(back);
        d.attach_child(back, front);
        d.update_layout();

        assert_eq!(d.hit_test(Point::new(50, 50)), Some(front));
        assert_eq!(d.hit_test(Point::new(500, 500)), Some(back));

        d.control_mut(front).set_falls_through(true);
        assert_eq!(d.hit_test(Point::new(50, 50)), Some(back));
    }

    #[test]
    fn hover_fires_enter_and_leave() {
        let mut d = desktop();
        let back = d.new_control(ControlKind::Panel);
        let front = d.new_control(ControlKind::Panel);
        d.control_mut(front).set_width(Some(100)).set_height(Some(100));
        d.attach_root(back);
        d.attach_child(back, front);
        d.update_layout();

        d.update_input(&frame(Point::new(50, 50), MouseButtons::NONE), 0.0);
        let events = d.poll_events();
        assert!(events.contains(&UiEvent::MouseEntered(front)));

        d.update_input(&frame(Point::new(500, 500), MouseButtons::NONE), 16.0);
        let events = d.poll_events();
        assert!(events.contains(&UiEvent::MouseLeft(front)));
        assert!(events.contains(&UiEvent::MouseEntered(back)));
    }

    #[test]
    fn touch_moves_focus_to_nearest_focusable_ancestor() {
        let mut d = desktop();
        let root = d.new_control(ControlKind::Panel);
        let field = d.new_control(ControlKind::Panel);
        let label = d.new_control(ControlKind::Panel);
        d.control_mut(field)
            .set_width(Some(200))
            .set_height(Some(100))
            .set_accepts_focus(true);
        d.attach_root(root);
        d.attach_child(root, field);
        d.attach_child(field, label);
        d.update_layout();

        click(&mut d, Point::new(50, 50), 0.0);
        let events = d.poll_events();
        assert_eq!(d.focused_control(), Some(field));
        assert!(events.iter().any(|e| matches!(
            e,
            UiEvent::TouchDown { control, .. } if *control == label
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            UiEvent::TouchUp { control, .. } if *control == label
        )));
        assert!(events.contains(&UiEvent::GotFocus(field)));
    }

    #[test]
    fn double_click_requires_time_and_distance() {
        let mut d = desktop();
        let panel = d.new_control(ControlKind::Panel);
        d.attach_root(panel);
        d.update_layout();

        click(&mut d, Point::new(10, 10), 0.0);
        click(&mut d, Point::new(12, 10), 100.0);
        let events = d.poll_events();
        assert!(events.iter().any(|e| matches!(e, UiEvent::DoubleClick { .. })));

        // The pair is consumed: an immediate third click starts over.
        click(&mut d, Point::new(12, 10), 150.0);
        let events = d.poll_events();
        assert!(!events.iter().any(|e| matches!(e, UiEvent::DoubleClick { .. })));

        // Too far apart in space, even though in time.
        click(&mut d, Point::new(100, 100), 200.0);
        let events = d.poll_events();
        assert!(!events.iter().any(|e| matches!(e, UiEvent::DoubleClick { .. })));
    }

    #[test]
    fn modal_blocks_roots_above_it_only() {
        let mut d = desktop();
        let a = d.new_control(ControlKind::Panel);
        let b = d.new_control(ControlKind::Panel);
        let c = d.new_control(ControlKind::Panel);
        d.control_mut(b).set_modal(true);
        d.attach_root(a);
        d.attach_root(b);
        d.attach_root(c);
        d.update_layout();

        assert!(d.control(a).is_active());
        assert!(d.control(b).is_active());
        assert!(!d.control(c).is_active());

        // The blocked root is transparent to hit testing.
        assert_eq!(d.hit_test(Point::new(400, 300)), Some(b));
    }

    #[test]
    fn equal_z_roots_keep_attach_order() {
        let mut d = desktop();
        let a = d.new_control(ControlKind::Panel);
        let b = d.new_control(ControlKind::Panel);
        d.attach_root(a);
        d.attach_root(b);
        d.update_layout();
        assert_eq!(d.hit_test(Point::new(400, 300)), Some(b));

        d.control_mut(a).set_z_index(1);
        d.update_layout();
        assert_eq!(d.hit_test(Point::new(400, 300)), Some(a));
    }

    #[test]
    fn tab_traversal_cycles_forward_and_back() {
        let mut d = desktop();
        let root = d.new_control(ControlKind::Stack(Default::default()));
        let first = d.new_control(ControlKind::Panel);
        let second = d.new_control(ControlKind::Panel);
        let third = d.new_control(ControlKind::Panel);
        for &id in &[first, second, third] {
            d.control_mut(id).set_height(Some(20)).set_accepts_focus(true);
        }
        d.attach_root(root);
        d.attach_child(root, first);
        d.attach_child(root, second);
        d.attach_child(root, third);
        d.update_layout();

        d.focus_next();
        assert_eq!(d.focused_control(), Some(first));
        d.focus_next();
        d.focus_next();
        assert_eq!(d.focused_control(), Some(third));
        d.focus_next();
        assert_eq!(d.focused_control(), Some(first));

        // Shift+Tab is the exact inverse.
        d.focus_previous();
        assert_eq!(d.focused_control(), Some(third));
    }

    #[test]
    fn tab_key_drives_traversal() {
        let mut d = desktop();
        let root = d.new_control(ControlKind::Stack(Default::default()));
        let field = d.new_control(ControlKind::Panel);
        d.control_mut(field).set_height(Some(20)).set_accepts_focus(true);
        d.attach_root(root);
        d.attach_child(root, field);
        d.update_layout();

        let mut input = frame(Point::ZERO, MouseButtons::NONE);
        input.keys_down = vec![Key::Tab];
        d.update_input(&input, 0.0);
        assert_eq!(d.focused_control(), Some(field));
    }

    #[test]
    fn losing_focus_hook_can_veto() {
        let mut d = desktop();
        let root = d.new_control(ControlKind::Panel);
        let first = d.new_control(ControlKind::Panel);
        let second = d.new_control(ControlKind::Panel);
        d.control_mut(first).set_accepts_focus(true);
        d.control_mut(second).set_accepts_focus(true);
        d.attach_root(root);
        d.attach_child(root, first);
        d.attach_child(root, second);
        d.update_layout();

        assert!(d.set_focus(Some(first)));
        d.set_losing_focus_hook(first, |_| false);
        assert!(!d.set_focus(Some(second)));
        assert_eq!(d.focused_control(), Some(first));

        d.set_losing_focus_hook(first, |_| true);
        assert!(d.set_focus(Some(second)));
        assert_eq!(d.focused_control(), Some(second));
    }

    #[test]
    fn context_menu_is_clamped_to_the_viewport() {
        let mut d = desktop();
        let menu = d.new_control(ControlKind::Panel);
        d.control_mut(menu).set_width(Some(100)).set_height(Some(80));
        d.show_context_menu(menu, Point::new(750, 580), false);

        assert_eq!(d.control(menu).position(), Point::new(700, 520));
        assert!(d.poll_events().contains(&UiEvent::ContextMenuOpened(menu)));
    }

    #[test]
    fn outside_click_closes_menu_and_restores_focus() {
        let mut d = desktop();
        let root = d.new_control(ControlKind::Panel);
        d.control_mut(root).set_accepts_focus(true);
        d.attach_root(root);
        d.update_layout();
        d.set_focus(Some(root));

        let menu = d.new_control(ControlKind::Panel);
        d.control_mut(menu)
            .set_width(Some(100))
            .set_height(Some(80))
            .set_accepts_focus(true);
        d.show_context_menu(menu, Point::new(300, 300), true);
        d.update_layout();
        assert_eq!(d.focused_control(), Some(menu));
        d.poll_events();

        click(&mut d, Point::new(10, 10), 0.0);
        let events = d.poll_events();
        assert!(events.contains(&UiEvent::ContextMenuClosed(menu)));
        assert_eq!(d.context_menu(), None);
        assert_eq!(d.focused_control(), Some(root));
    }

    #[test]
    fn closing_hook_keeps_the_menu_open() {
        let mut d = desktop();
        let menu = d.new_control(ControlKind::Panel);
        d.control_mut(menu).set_width(Some(100)).set_height(Some(80));
        d.show_context_menu(menu, Point::new(300, 300), false);
        d.update_layout();
        d.set_context_menu_closing_hook(|_| false);

        click(&mut d, Point::new(10, 10), 0.0);
        assert_eq!(d.context_menu(), Some(menu));
    }

    #[test]
    fn deferred_actions_run_at_flush_and_cancel_drops_them() {
        let mut d = desktop();
        let ran = Rc::new(Cell::new(0));

        let counter = ran.clone();
        d.defer(move |_| counter.set(counter.get() + 1));
        assert_eq!(ran.get(), 0);
        d.flush_deferred();
        assert_eq!(ran.get(), 1);

        let counter = ran.clone();
        d.defer(move |_| counter.set(counter.get() + 1));
        d.cancel_deferred();
        d.flush_deferred();
        assert_eq!(ran.get(), 1);
    }

    #[test]
    fn wheel_scrolls_the_capturing_viewer_under_the_mouse() {
        let mut d = Desktop::new(Rect::new(0, 0, 200, 300));
        let viewer = d.new_control(ControlKind::Scroll(Default::default()));
        d.control_mut(viewer).set_captures_wheel(true);
        let content = d.new_control(ControlKind::Panel);
        d.control_mut(content).set_width(Some(500)).set_height(Some(800));
        d.attach_root(viewer);
        d.attach_child(viewer, content);
        d.update_layout();

        let mut input = InputFrame {
            mouse_position: Point::new(100, 100),
            ..Default::default()
        };
        input.wheel_delta = Vector2::new(0.0, -1.0);
        d.update_input(&input, 0.0);

        let state = crate::scroll::state_ref(&d, viewer);
        assert!(state.scroll_position().y > 0);
        let events = d.poll_events();
        assert!(events.iter().any(|e| matches!(e, UiEvent::Scrolled { .. })));
        assert!(events.iter().any(|e| matches!(
            e,
            UiEvent::MouseWheel { control, .. } if *control == viewer
        )));
    }

    #[test]
    fn key_repeat_starts_after_delay() {
        let mut d = desktop();
        let mut input = frame(Point::ZERO, MouseButtons::NONE);
        input.keys_down = vec![Key::Space];

        d.update_input(&input, 0.0);
        let events = d.poll_events();
        assert!(events.contains(&UiEvent::KeyDown {
            key: Key::Space,
            repeat: false,
            target: None
        }));

        // Held but not yet due.
        d.update_input(&input, 100.0);
        assert!(d.poll_events().is_empty());

        d.update_input(&input, 600.0);
        assert!(d.poll_events().contains(&UiEvent::KeyDown {
            key: Key::Space,
            repeat: true,
            target: None
        }));

        // Release fires the up edge.
        d.update_input(&frame(Point::ZERO, MouseButtons::NONE), 700.0);
        assert!(d.poll_events().contains(&UiEvent::KeyUp { key: Key::Space }));
    }

    #[test]
    fn text_events_go_only_to_text_accepting_focus() {
        let mut d = desktop();
        let field = d.new_control(ControlKind::Panel);
        d.control_mut(field)
            .set_accepts_focus(true)
            .set_accepts_text_input(true);
        d.attach_root(field);
        d.update_layout();

        let mut input = frame(Point::ZERO, MouseButtons::NONE);
        input.text_events = vec![TextEvent::Committed("hi".into())];

        // No focus: dropped.
        d.update_input(&input, 0.0);
        assert!(!d
            .poll_events()
            .iter()
            .any(|e| matches!(e, UiEvent::TextInput { .. })));

        d.set_focus(Some(field));
        d.poll_events();
        d.update_input(&input, 16.0);
        let events = d.poll_events();
        assert!(events.contains(&UiEvent::TextInput {
            control: field,
            event: TextEvent::Committed("hi".into())
        }));
    }

    #[test]
    fn detaching_the_focused_subtree_clears_focus() {
        let mut d = desktop();
        let root = d.new_control(ControlKind::Panel);
        let child = d.new_control(ControlKind::Panel);
        d.control_mut(child).set_accepts_focus(true);
        d.attach_root(root);
        d.attach_child(root, child);
        d.update_layout();
        d.set_focus(Some(child));
        d.poll_events();

        d.detach_child(child);
        assert_eq!(d.focused_control(), None);
        assert!(d.poll_events().contains(&UiEvent::LostFocus(child)));

        // Detached is not destroyed: the subtree can come back.
        assert!(d.contains(child));
        d.attach_child(root, child);
        assert!(d.control(child).is_placed());
    }

    #[test]
    fn installing_text_measurement_remeasures_existing_text() {
        let mut d = desktop();
        let label = d.new_control(ControlKind::Text(TextState {
            text: "hello".into(),
            style: TextStyle {
                font: Some(FontHandle(0)),
                ..Default::default()
            },
        }));
        d.attach_root(label);
        d.update_layout();
        assert_eq!(d.control(label).desired_size(), Size::ZERO);

        d.set_measure_text_function(|text, style| {
            Size::new(text.len() as i32 * 8, style.size as i32)
        });
        d.update_layout();
        assert_eq!(d.control(label).desired_size(), Size::new(40, 16));
    }

    #[test]
    fn destroying_a_never_attached_focused_control_clears_focus() {
        let mut d = desktop();
        let floating = d.new_control(ControlKind::Panel);
        d.control_mut(floating).set_accepts_focus(true);
        d.set_focus(Some(floating));
        assert_eq!(d.focused_control(), Some(floating));

        d.destroy(floating);
        assert_eq!(d.focused_control(), None);
        assert!(!d.contains(floating));

        // The next input frame must not route to the freed id.
        let mut input = frame(Point::ZERO, MouseButtons::NONE);
        input.wheel_delta = Vector2::new(0.0, -1.0);
        input.text_events = vec![TextEvent::Committed("x".into())];
        d.update_input(&input, 0.0);
        assert!(d
            .poll_events()
            .iter()
            .all(|e| !matches!(e, UiEvent::MouseWheel { .. } | UiEvent::TextInput { .. })));
    }

    #[test]
    fn destroy_frees_the_whole_subtree() {
        let mut d = desktop();
        let root = d.new_control(ControlKind::Panel);
        let child = d.new_control(ControlKind::Panel);
        d.attach_root(root);
        d.attach_child(root, child);
        d.destroy(root);

        assert!(!d.contains(root));
        assert!(!d.contains(child));
        assert!(d.roots().is_empty());
    }

    #[test]
    fn disabled_ancestors_disable_the_subtree() {
        let mut d = desktop();
        let root = d.new_control(ControlKind::Panel);
        let child = d.new_control(ControlKind::Panel);
        d.attach_root(root);
        d.attach_child(root, child);
        d.update_layout();
        assert!(d.is_enabled_in_hierarchy(child));

        d.control_mut(root).set_enabled(false);
        assert!(!d.is_enabled_in_hierarchy(child));
        assert_eq!(d.interaction_state(child), InteractionState::Disabled);
    }
}
