//! Deferred-action queue.
//!
//! Structural tree mutations requested from inside event handling are queued
//! here and flushed once per frame, after rendering, so no dispatch ever
//! observes a mutation it triggered itself. Cancellation is used on desktop
//! teardown: once cancelled, pending and future actions never run.

use crate::desktop::Desktop;

pub(crate) type DeferredAction = Box<dyn FnOnce(&mut Desktop)>;

#[derive(Default)]
pub(crate) struct DeferredQueue {
    pending: Vec<DeferredAction>,
    cancelled: bool,
}

impl DeferredQueue {
    pub fn schedule(&mut self, action: DeferredAction) {
        if self.cancelled {
            return;
        }
        self.pending.push(action);
    }

    /// Idempotent: repeated cancellation keeps the queue dead.
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.pending.clear();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn take_pending(&mut self) -> Vec<DeferredAction> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
