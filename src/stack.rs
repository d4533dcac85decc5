//! Sequential stacking container.

use crate::desktop::Desktop;
use crate::math::{Rect, Size};
use crate::tree::ControlId;

/// Budget handed to children when measuring without a constraint along the
/// stack axis. Large enough to be effectively unbounded, small enough that
/// indentation arithmetic cannot overflow.
pub(crate) const BOUNDLESS: i32 = i32::MAX / 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    Horizontal,
    #[default]
    Vertical,
}

#[derive(Debug, Clone, Default)]
pub struct StackState {
    pub orientation: Orientation,
    pub spacing: i32,
    /// Measure children without a budget along the stack axis, so content
    /// reports its natural extent (used inside scroll viewers).
    pub boundless: bool,
}

pub(crate) fn measure(desktop: &mut Desktop, id: ControlId, available: Size) -> Size {
    let (orientation, spacing, boundless) = params(desktop, id);
    let children = desktop.children_snapshot(id);

    let mut along = 0;
    let mut across = 0;
    let mut first = true;
    for child in children {
        if !desktop.control(child).visible() {
            continue;
        }
        if !first {
            along += spacing;
        }
        first = false;

        let child_available = match orientation {
            Orientation::Horizontal => Size::new(
                if boundless {
                    BOUNDLESS
                } else {
                    (available.width - along).max(0)
                },
                available.height,
            ),
            Orientation::Vertical => Size::new(
                available.width,
                if boundless {
                    BOUNDLESS
                } else {
                    (available.height - along).max(0)
                },
            ),
        };
        let desired = desktop.measure(child, child_available, true);
        match orientation {
            Orientation::Horizontal => {
                along += desired.width;
                across = across.max(desired.height);
            }
            Orientation::Vertical => {
                along += desired.height;
                across = across.max(desired.width);
            }
        }
    }

    match orientation {
        Orientation::Horizontal => Size::new(along, across),
        Orientation::Vertical => Size::new(across, along),
    }
}

pub(crate) fn arrange(desktop: &mut Desktop, id: ControlId, content: Rect) {
    let (orientation, spacing, _) = params(desktop, id);
    let children = desktop.children_snapshot(id);

    let mut cursor = 0;
    let mut first = true;
    for child in children {
        if !desktop.control(child).visible() {
            continue;
        }
        if !first {
            cursor += spacing;
        }
        first = false;

        let desired = desktop.control(child).desired_size();
        let slot = match orientation {
            Orientation::Horizontal => {
                Rect::new(content.x + cursor, content.y, desired.width, content.height)
            }
            Orientation::Vertical => {
                Rect::new(content.x, content.y + cursor, content.width, desired.height)
            }
        };
        desktop.arrange(child, slot);
        cursor += match orientation {
            Orientation::Horizontal => desired.width,
            Orientation::Vertical => desired.height,
        };
    }
}

fn params(desktop: &Desktop, id: ControlId) -> (Orientation, i32, bool) {
    match &desktop.control(id).kind {
        crate::control::ControlKind::Stack(state) => {
            (state.orientation, state.spacing, state.boundless)
        }
        _ => unreachable!("stack layout invoked on a non-stack control"),
    }
}
