pub mod policy;

pub use policy::*;

use std::cell::RefCell;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, trace, warn};

use crate::error::{SlotError, SlotResult};
use crate::observer::{Observe, ObserverId};
use crate::slot::{Bound, Slot};

/// A unique identifier for a signal. Never reused within a process.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SignalId(usize);

impl std::fmt::Display for SignalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

static NEXT_SIGNAL_ID: AtomicUsize = AtomicUsize::new(0);

/// Any signal, regardless of its policy, return type or argument type
pub trait AnySignal {
    fn signal_id(&self) -> SignalId;
}

/// The one operation an Observer may perform on a signal it does not know the type of.
/// Must not call back into the observer.
pub(crate) trait SignalAbstract {
    fn slot_detach(&self, observer: ObserverId);
}

/// A typed broadcast point.
///
/// `P` selects the invocation policy ([`Collect`] or [`Ignore`]), `R` is the return type of
/// the bound methods and `A` the argument they receive. Use a tuple for several arguments.
///
/// Slots are called in attachment order. Dropping the signal detaches every observer.
pub struct Signal<P, R, A> {
    inner: Rc<Inner<R, A>>,
    _policy: PhantomData<P>,
}

struct Inner<R, A> {
    id: SignalId,
    slots: RefCell<Vec<Slot<R, A>>>,
}

impl<R, A> SignalAbstract for Inner<R, A> {
    fn slot_detach(&self, observer: ObserverId) {
        // dropping a slot can drop another listener of this signal, so drop outside the borrow
        let removed: Vec<Slot<R, A>> = {
            let mut slots = self.slots.borrow_mut();
            let (removed, kept) = std::mem::take(&mut *slots).into_iter().partition(|slot| slot.observer_id() == observer);
            *slots = kept;
            removed
        };
        trace!(signal = %self.id, observer = %observer, removed = removed.len(), "slots detached by observer");
    }
}

impl<P: Policy, R: 'static, A: 'static> Signal<P, R, A> {
    pub fn new() -> Self {
        let id = SignalId(NEXT_SIGNAL_ID.fetch_add(1, Ordering::Relaxed));
        Self { inner: Rc::new(Inner { id, slots: RefCell::new(Vec::new()) }), _policy: PhantomData }
    }

    /// Bind `method` of `listener` to this signal.
    /// Attaching the same (listener, method) pair again does nothing.
    pub fn attach<L, M>(&self, listener: &Rc<L>, method: M)
    where
        L: Observe,
        M: Fn(&L, A) -> R + 'static,
    {
        let slot = Slot::new(listener, method);
        let observer = listener.observer();
        {
            let mut slots = self.inner.slots.borrow_mut();
            if slots.contains(&slot) {
                drop(slots);
                debug!(signal = %self.inner.id, observer = %observer.id(), "slot already attached");
                return;
            }
            slots.push(slot);
        }

        let weak: Weak<Inner<R, A>> = Rc::downgrade(&self.inner);
        let signal: Weak<dyn SignalAbstract> = weak;
        observer.signal_attach(self.inner.id, signal);
        trace!(signal = %self.inner.id, observer = %observer.id(), "slot attached");
    }
}

impl<P, R, A> Signal<P, R, A> {
    pub fn id(&self) -> SignalId { self.inner.id }

    /// Number of attached slots
    pub fn len(&self) -> usize { self.inner.slots.borrow().len() }

    pub fn is_empty(&self) -> bool { self.inner.slots.borrow().is_empty() }

    /// Whether any slot of this signal is bound to `listener`
    pub fn is_attached<L: Observe + ?Sized>(&self, listener: &L) -> bool {
        let id = listener.observer().id();
        self.inner.slots.borrow().iter().any(|slot| slot.observer_id() == id)
    }

    /// Remove the first slot bound to `listener`. Other slots of the same listener stay attached.
    pub fn detach<L: Observe + ?Sized>(&self, listener: &L) {
        let observer = listener.observer();
        let removed = {
            let mut slots = self.inner.slots.borrow_mut();
            slots.iter().position(|slot| slot.observer_id() == observer.id()).map(|index| slots.remove(index))
        };

        match removed {
            Some(_slot) => {
                observer.signal_detach(self.inner.id);
                trace!(signal = %self.inner.id, observer = %observer.id(), "slot detached");
            }
            None => debug!(signal = %self.inner.id, observer = %observer.id(), "detach of unattached observer"),
        }
    }

    /// Remove every slot and release every observer's back-reference to this signal
    pub fn detach_all(&self) {
        let slots = std::mem::take(&mut *self.inner.slots.borrow_mut());
        if slots.is_empty() {
            return;
        }
        trace!(signal = %self.inner.id, slots = slots.len(), "detaching all slots");
        for slot in slots {
            slot.release(self.inner.id);
        }
    }

    /// Take a copy of the callbacks so that slots may attach or detach during an emission
    fn snapshot(&self) -> Vec<Bound<R, A>> { self.inner.slots.borrow().iter().map(Slot::bound).collect() }
}

impl<P, R, A> AnySignal for Signal<P, R, A> {
    fn signal_id(&self) -> SignalId { self.inner.id }
}

impl<P: Policy, R: 'static, A: 'static> Default for Signal<P, R, A> {
    fn default() -> Self { Self::new() }
}

impl<P, R, A> std::fmt::Debug for Signal<P, R, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal").field("id", &self.inner.id).field("slots", &self.inner.slots.borrow().len()).finish()
    }
}

impl<P, R, A> Drop for Signal<P, R, A> {
    fn drop(&mut self) { self.detach_all(); }
}

/// Call every callback in order, handing each result to `sink`. Slots detached since the
/// snapshot was taken are skipped and produce no result.
/// The argument is cloned for every callback except the last one.
fn fan_out<R, A: Clone>(signal: SignalId, callbacks: &[Bound<R, A>], args: A, mut sink: impl FnMut(SlotResult<R>)) {
    if let Some((last, rest)) = callbacks.split_last() {
        for callback in rest {
            if let Some(result) = invoke(signal, callback, args.clone()) {
                sink(result);
            }
        }
        if let Some(result) = invoke(signal, last, args) {
            sink(result);
        }
    }
}

fn invoke<R, A>(signal: SignalId, callback: &Bound<R, A>, args: A) -> Option<SlotResult<R>> {
    match panic::catch_unwind(AssertUnwindSafe(|| callback.call(args))) {
        Ok(result) => result,
        Err(payload) => {
            let err = SlotError::from_panic(payload);
            warn!(signal = %signal, "{err}");
            Some(Err(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Observer;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        observer: Observer,
        calls: RefCell<Vec<&'static str>>,
    }
    impl Observe for Recorder {
        fn observer(&self) -> &Observer { &self.observer }
    }
    impl Recorder {
        fn first(&self, _: ()) { self.calls.borrow_mut().push("first") }
        fn second(&self, _: ()) { self.calls.borrow_mut().push("second") }
    }

    #[test]
    fn test_detach_removes_first_slot_only() {
        let signal: FireAndForget = Signal::new();
        let recorder = Rc::new(Recorder::default());
        signal.attach(&recorder, Recorder::first);
        signal.attach(&recorder, Recorder::second);
        assert_eq!(signal.len(), 2);

        signal.detach(&*recorder);
        assert_eq!(signal.len(), 1);
        // the remaining slot still counts as an attachment
        assert!(recorder.observer.is_attached_to(&signal));

        signal.emit(());
        assert_eq!(*recorder.calls.borrow(), ["second"]);

        signal.detach(&*recorder);
        assert!(signal.is_empty());
        assert!(!recorder.observer.is_attached_to(&signal));
    }

    #[test]
    fn test_detach_all_releases_observers() {
        let signal: FireAndForget = Signal::new();
        let a = Rc::new(Recorder::default());
        let b = Rc::new(Recorder::default());
        signal.attach(&a, Recorder::first);
        signal.attach(&a, Recorder::second);
        signal.attach(&b, Recorder::first);

        signal.detach_all();
        assert!(signal.is_empty());
        assert_eq!(a.observer.signal_count(), 0);
        assert_eq!(b.observer.signal_count(), 0);
    }

    #[test]
    fn test_slot_detach_removes_every_slot_of_observer() {
        let signal: FireAndForget = Signal::new();
        let a = Rc::new(Recorder::default());
        let b = Rc::new(Recorder::default());
        signal.attach(&a, Recorder::first);
        signal.attach(&b, Recorder::first);
        signal.attach(&a, Recorder::second);

        a.observer.detach_signal(&signal);
        assert_eq!(signal.len(), 1);
        assert!(!signal.is_attached(&*a));
        assert!(signal.is_attached(&*b));
    }

    #[test]
    fn test_ids_are_unique() {
        let a: Collecting = Signal::new();
        let b: Collecting = Signal::new();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.signal_id(), a.id());
    }
}
