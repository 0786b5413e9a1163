use std::any::TypeId;
use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::error::{SlotError, SlotResult};
use crate::observer::{Observe, ObserverHandle, ObserverId};
use crate::signal::SignalId;

/// Type-erased call into a bound method. Shared only so that an emission can take a
/// snapshot of its slots and call them without holding a borrow of the signal.
pub(crate) type Callback<R, A> = Rc<dyn Fn(A) -> SlotResult<R>>;

/// A snapshot entry: the callback plus the flag its slot clears when the signal lets go of it
pub(crate) struct Bound<R, A> {
    callback: Callback<R, A>,
    attached: Rc<Cell<bool>>,
}

impl<R, A> Bound<R, A> {
    /// Invoke the callback, or return None if the slot was detached since the snapshot was taken
    pub(crate) fn call(&self, args: A) -> Option<SlotResult<R>> {
        if !self.attached.get() {
            return None;
        }
        Some((self.callback)(args))
    }
}

/// A single (listener, method) binding owned by a signal.
///
/// The listener is held weakly; a slot never keeps its listener alive. Two slots are
/// equal when they bind the same observer to the same method, where the method is
/// identified by its type. Every fn item and closure definition has a distinct type, so
/// `Listener::on_tick` and `Listener::on_tock` are distinct methods, but two closures
/// produced by the same expression count as the same method.
pub struct Slot<R, A> {
    observer: ObserverId,
    handle: ObserverHandle,
    method: TypeId,
    callback: Callback<R, A>,
    attached: Rc<Cell<bool>>,
}

impl<R: 'static, A: 'static> Slot<R, A> {
    pub fn new<L, M>(listener: &Rc<L>, method: M) -> Self
    where
        L: Observe,
        M: Fn(&L, A) -> R + 'static,
    {
        let observer = listener.observer();
        let weak: Weak<L> = Rc::downgrade(listener);
        Self {
            observer: observer.id(),
            handle: observer.handle(),
            method: TypeId::of::<M>(),
            callback: Rc::new(move |args| match weak.upgrade() {
                Some(listener) => Ok(method(&listener, args)),
                None => Err(SlotError::Expired),
            }),
            attached: Rc::new(Cell::new(true)),
        }
    }
}

impl<R, A> Slot<R, A> {
    /// Invoke the bound method. Panics raised by the method are not caught here.
    pub fn callback(&self, args: A) -> SlotResult<R> { (self.callback)(args) }

    pub fn observer_id(&self) -> ObserverId { self.observer }

    pub(crate) fn bound(&self) -> Bound<R, A> { Bound { callback: self.callback.clone(), attached: self.attached.clone() } }

    /// Tell the observer that `signal` no longer holds this slot
    pub(crate) fn release(self, signal: SignalId) { self.handle.signal_detach(signal) }
}

impl<R, A> Drop for Slot<R, A> {
    fn drop(&mut self) { self.attached.set(false); }
}

impl<R, A> PartialEq for Slot<R, A> {
    fn eq(&self, other: &Self) -> bool { self.observer == other.observer && self.method == other.method }
}
impl<R, A> Eq for Slot<R, A> {}

impl<R, A> std::fmt::Debug for Slot<R, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slot").field("observer", &self.observer).field("method", &self.method).finish()
    }
}
