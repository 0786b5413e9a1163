//! Invocation policies, selected by the first type parameter of [`Signal`].

use tracing::trace;

use super::{Signal, fan_out};
use crate::error::{SlotError, SlotResult};

/// Emission returns one [`SlotResult`] per slot, in attachment order
#[derive(Debug, Clone, Copy, Default)]
pub struct Collect;

/// Emission returns nothing and discards slot failures
#[derive(Debug, Clone, Copy, Default)]
pub struct Ignore;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Collect {}
    impl Sealed for super::Ignore {}
}

pub trait Policy: sealed::Sealed + 'static {}
impl Policy for Collect {}
impl Policy for Ignore {}

/// A signal whose emission collects the result of every slot
pub type Collecting<R = (), A = ()> = Signal<Collect, R, A>;

/// A signal whose emission discards slot results and failures
pub type FireAndForget<R = (), A = ()> = Signal<Ignore, R, A>;

impl<R, A: Clone> Signal<Collect, R, A> {
    /// Call every slot with `args`. A slot that panics yields an error result in its
    /// position; the remaining slots are still called.
    pub fn emit(&self, args: A) -> Vec<SlotResult<R>> {
        let callbacks = self.snapshot();
        trace!(signal = %self.id(), slots = callbacks.len(), "emit");

        let mut results = Vec::with_capacity(callbacks.len());
        fan_out(self.id(), &callbacks, args, |result| results.push(result));
        results
    }
}

impl<R, A: Clone> Signal<Ignore, R, A> {
    /// Call every slot with `args`, ignoring results. Never panics because of a slot.
    pub fn emit(&self, args: A) {
        let callbacks = self.snapshot();
        trace!(signal = %self.id(), slots = callbacks.len(), "emit");

        fan_out(self.id(), &callbacks, args, |result| {
            if let Err(SlotError::Expired) = result {
                trace!("skipped slot whose listener was dropped during emit");
            }
        });
    }
}
