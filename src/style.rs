//! Style application boundary.
//!
//! Style resolution is an explicitly passed context, not a process-wide
//! registry: two independent style sets can coexist in one process, which
//! keeps tests hermetic. The core only needs "does this style exist" and
//! "apply it to this control".

use rustc_hash::FxHashMap;

use crate::control::ControlMut;

pub trait StyleResolver {
    fn has_style(&self, name: &str) -> bool;

    /// Mutates the control's properties according to the named style.
    /// Unknown names are a no-op. Mutation goes through [`ControlMut`] so
    /// the usual layout invalidation applies.
    fn apply_style(&self, name: &str, control: &mut ControlMut<'_>);
}

/// Name → mutator map. The closures capture whatever the host's styling
/// system needs; the core never inspects them.
#[derive(Default)]
pub struct StyleSheet {
    styles: FxHashMap<String, Box<dyn Fn(&mut ControlMut<'_>)>>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        apply: impl Fn(&mut ControlMut<'_>) + 'static,
    ) {
        self.styles.insert(name.into(), Box::new(apply));
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

impl StyleResolver for StyleSheet {
    fn has_style(&self, name: &str) -> bool {
        self.styles.contains_key(name)
    }

    fn apply_style(&self, name: &str, control: &mut ControlMut<'_>) {
        if let Some(apply) = self.styles.get(name) {
            apply(control);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ControlKind;
    use crate::desktop::Desktop;
    use crate::math::{Rect, Thickness};

    #[test]
    fn independent_sheets_do_not_interfere() {
        let mut a = StyleSheet::new();
        a.insert("inset", |c: &mut ControlMut<'_>| {
            c.set_padding(Thickness::uniform(4));
        });
        let b = StyleSheet::new();

        assert!(a.has_style("inset"));
        assert!(!b.has_style("inset"));

        let mut d = Desktop::new(Rect::new(0, 0, 100, 100));
        let styled = d.new_control(ControlKind::Panel);
        a.apply_style("inset", &mut d.control_mut(styled));
        assert_eq!(d.control(styled).padding(), Thickness::uniform(4));

        // Unknown names are a no-op.
        let other = d.new_control(ControlKind::Panel);
        b.apply_style("inset", &mut d.control_mut(other));
        assert_eq!(d.control(other).padding(), Thickness::ZERO);
    }
}
