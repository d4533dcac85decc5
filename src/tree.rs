//! Slot arena backing the control tree.
//!
//! Controls are stored in a flat slot vector and addressed by `ControlId`
//! (index + generation). Parent/child links are ids, never owning
//! references, so detach clears back-pointers without touching lifetimes,
//! and a stale id from a freed slot is detected by its generation instead
//! of aliasing whatever control reused the slot.

use crate::control::Control;

/// Handle to a control slot. Invalidated (generation mismatch) once the
/// control is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

struct Slot {
    generation: u32,
    control: Option<Control>,
}

#[derive(Default)]
pub(crate) struct ControlArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl ControlArena {
    pub fn insert(&mut self, control: Control) -> ControlId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.control = Some(control);
            ControlId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                control: Some(control),
            });
            ControlId {
                index,
                generation: 0,
            }
        }
    }

    /// Frees the slot. The generation bump invalidates outstanding ids.
    pub fn remove(&mut self, id: ControlId) -> Option<Control> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation || slot.control.is_none() {
            return None;
        }
        let control = slot.control.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        control
    }

    pub fn contains(&self, id: ControlId) -> bool {
        self.slots
            .get(id.index as usize)
            .map(|s| s.generation == id.generation && s.control.is_some())
            .unwrap_or(false)
    }

    pub fn get(&self, id: ControlId) -> &Control {
        self.try_get(id).expect("stale or unknown control id")
    }

    pub fn get_mut(&mut self, id: ControlId) -> &mut Control {
        self.try_get_mut(id).expect("stale or unknown control id")
    }

    pub fn try_get(&self, id: ControlId) -> Option<&Control> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.control.as_ref()
    }

    pub fn try_get_mut(&mut self, id: ControlId) -> Option<&mut Control> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        self.slots[id.index as usize].control.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{Control, ControlKind};

    #[test]
    fn stale_id_is_detected_after_slot_reuse() {
        let mut arena = ControlArena::default();
        let a = arena.insert(Control::new(ControlKind::Panel));
        assert!(arena.contains(a));

        arena.remove(a).unwrap();
        assert!(!arena.contains(a));

        // Slot gets reused with a bumped generation.
        let b = arena.insert(Control::new(ControlKind::Panel));
        assert_eq!(a.index, b.index);
        assert_ne!(a.generation, b.generation);
        assert!(!arena.contains(a));
        assert!(arena.contains(b));
        assert!(arena.try_get(a).is_none());
    }

    #[test]
    fn double_remove_is_a_no_op() {
        let mut arena = ControlArena::default();
        let a = arena.insert(Control::new(ControlKind::Panel));
        assert!(arena.remove(a).is_some());
        assert!(arena.remove(a).is_none());
    }
}
