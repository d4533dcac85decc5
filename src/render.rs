//! Command emission: walks the arranged tree in paint order (roots
//! ascending by z, children in attach order) and appends to the desktop's
//! command list. Pose transforms, sub-unit opacity and scroll clipping are
//! emitted as stack operations around the affected subtree.

use crate::control::{ControlKind, KindTag};
use crate::desktop::Desktop;
use crate::math::{Rect, Thickness};
use crate::render_commands::RenderCommand;
use crate::transform::Transform;
use crate::tree::ControlId;

impl Desktop {
    pub(crate) fn build_render_commands(&mut self) {
        self.commands.clear();
        for root in self.sorted_roots() {
            self.render_control(root);
        }
    }

    /// The full command list produced by the last frame.
    pub fn render_commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    fn render_control(&mut self, id: ControlId) {
        if !self.control(id).visible {
            return;
        }

        let (pose, opacity) = {
            let c = self.control(id);
            (
                Transform::from_pose(c.bounds, c.transform_origin, c.scale, c.rotation),
                c.opacity,
            )
        };
        let pushed_transform = pose != Transform::IDENTITY;
        if pushed_transform {
            self.commands.push(RenderCommand::PushTransform(pose));
        }
        let pushed_opacity = opacity < 1.0;
        if pushed_opacity {
            self.commands.push(RenderCommand::PushOpacity(opacity));
        }

        self.render_chrome(id);
        match self.control(id).kind_tag() {
            KindTag::Scroll => self.render_scroll(id),
            KindTag::Text => self.render_text(id),
            KindTag::Image => self.render_image(id),
            _ => {
                for child in self.children_snapshot(id) {
                    self.render_control(child);
                }
            }
        }

        if pushed_opacity {
            self.commands.push(RenderCommand::PopOpacity);
        }
        if pushed_transform {
            self.commands.push(RenderCommand::PopTransform);
        }
    }

    fn render_chrome(&mut self, id: ControlId) {
        let c = self.control(id);
        let border_bounds = c.border_bounds();
        let background = c.background;
        let border = c.border_color.filter(|_| c.border_thickness != Thickness::ZERO);
        let thickness = c.border_thickness;

        if let Some(color) = background {
            self.commands.push(RenderCommand::Rectangle {
                bounds: border_bounds,
                color,
            });
        }
        if let Some(color) = border {
            self.commands.push(RenderCommand::Border {
                bounds: border_bounds,
                color,
                thickness,
            });
        }
    }

    fn render_text(&mut self, id: ControlId) {
        let command = {
            let c = self.control(id);
            let ControlKind::Text(state) = &c.kind else {
                return;
            };
            // No font means nothing measurable, nothing drawable.
            let Some(font) = state.style.font else {
                return;
            };
            if state.text.is_empty() {
                return;
            }
            RenderCommand::Text {
                position: c.content_bounds().location(),
                text: state.text.clone(),
                font,
                size: state.style.size,
                color: state.style.color,
            }
        };
        self.commands.push(command);
    }

    fn render_image(&mut self, id: ControlId) {
        let command = {
            let c = self.control(id);
            let ControlKind::Image(state) = &c.kind else {
                return;
            };
            let Some(handle) = state.handle else {
                return;
            };
            RenderCommand::Image {
                bounds: c.content_bounds(),
                handle,
                tint: state.tint.unwrap_or(crate::color::Color::u_rgb(0xFF, 0xFF, 0xFF)),
            }
        };
        self.commands.push(command);
    }

    /// Child clipped to the content viewport (content minus shown bars),
    /// bars drawn unclipped on top.
    fn render_scroll(&mut self, id: ControlId) {
        let (viewport, bars) = {
            let content = self.control(id).content_bounds();
            let state = crate::scroll::state_ref(self, id);
            let viewport = Rect::new(
                content.x,
                content.y,
                (content.width
                    - if state.show_vertical {
                        state.scrollbar_thickness
                    } else {
                        0
                    })
                .max(0),
                (content.height
                    - if state.show_horizontal {
                        state.scrollbar_thickness
                    } else {
                        0
                    })
                .max(0),
            );
            let mut bars = Vec::new();
            if state.show_horizontal {
                bars.push((state.horizontal_track, state.horizontal_thumb));
            }
            if state.show_vertical {
                bars.push((state.vertical_track, state.vertical_thumb));
            }
            (viewport, (bars, state.track_color, state.thumb_color))
        };
        let (bars, track_color, thumb_color) = bars;

        self.commands.push(RenderCommand::PushScissor(viewport));
        for child in self.children_snapshot(id) {
            self.render_control(child);
        }
        self.commands.push(RenderCommand::PopScissor);

        for (track, thumb) in bars {
            self.commands.push(RenderCommand::Rectangle {
                bounds: track,
                color: track_color,
            });
            self.commands.push(RenderCommand::Rectangle {
                bounds: thumb,
                color: thumb_color,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::control::ControlKind;
    use crate::input::InputFrame;

    #[test]
    fn invisible_subtrees_emit_nothing() {
        let mut d = Desktop::new(Rect::new(0, 0, 100, 100));
        let panel = d.new_control(ControlKind::Panel);
        d.control_mut(panel)
            .set_background(Some(Color::u_rgb(0x20, 0x20, 0x20)))
            .set_visible(false);
        d.attach_root(panel);
        d.run_frame(&InputFrame::default(), 0.0);
        assert!(d.render_commands().is_empty());
    }

    #[test]
    fn scroll_viewer_clips_its_child() {
        let mut d = Desktop::new(Rect::new(0, 0, 200, 300));
        let viewer = d.new_control(ControlKind::Scroll(Default::default()));
        let content = d.new_control(ControlKind::Panel);
        d.control_mut(content)
            .set_width(Some(500))
            .set_height(Some(800))
            .set_background(Some(Color::u_rgb(0x40, 0x40, 0x40)));
        d.attach_root(viewer);
        d.attach_child(viewer, content);
        d.run_frame(&InputFrame::default(), 0.0);

        let commands = d.render_commands();
        let scissor = commands
            .iter()
            .position(|c| matches!(c, RenderCommand::PushScissor(_)));
        let child_rect = commands
            .iter()
            .position(|c| matches!(c, RenderCommand::Rectangle { .. }));
        let pop = commands
            .iter()
            .position(|c| matches!(c, RenderCommand::PopScissor));
        let (scissor, child_rect, pop) =
            (scissor.unwrap(), child_rect.unwrap(), pop.unwrap());
        assert!(scissor < child_rect && child_rect < pop);

        // Both bars plus thumbs are drawn after the clipped content.
        let bar_rects = commands[pop..]
            .iter()
            .filter(|c| matches!(c, RenderCommand::Rectangle { .. }))
            .count();
        assert_eq!(bar_rects, 4);
    }

    #[test]
    fn sub_unit_opacity_wraps_the_subtree() {
        let mut d = Desktop::new(Rect::new(0, 0, 100, 100));
        let panel = d.new_control(ControlKind::Panel);
        d.control_mut(panel)
            .set_opacity(0.5)
            .set_background(Some(Color::u_rgb(0x20, 0x20, 0x20)));
        d.attach_root(panel);
        d.run_frame(&InputFrame::default(), 0.0);

        let commands = d.render_commands();
        assert!(matches!(commands.first(), Some(RenderCommand::PushOpacity(o)) if *o == 0.5));
        assert!(matches!(commands.last(), Some(RenderCommand::PopOpacity)));
    }
}
