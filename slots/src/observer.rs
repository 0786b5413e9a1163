use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::trace;

use crate::signal::{AnySignal, SignalAbstract, SignalId};

/// A unique identifier for an observer. Never reused within a process.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ObserverId(usize);

impl std::fmt::Display for ObserverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

static NEXT_OBSERVER_ID: AtomicUsize = AtomicUsize::new(0);

/// Listener types embed an [`Observer`] and expose it through this trait so that
/// signals can record their attachment on it.
pub trait Observe: 'static {
    fn observer(&self) -> &Observer;
}

/// Attachment bookkeeping for a listener.
///
/// An Observer records one back-reference per slot that a signal holds for it. The
/// back-references are weak, so an Observer never keeps a signal alive. Dropping the
/// Observer (usually as part of dropping the listener that embeds it) detaches it from
/// every signal it is still attached to.
pub struct Observer(Rc<Inner>);

struct Inner {
    id: ObserverId,
    signals: RefCell<Vec<SignalRef>>,
}

struct SignalRef {
    id: SignalId,
    signal: Weak<dyn SignalAbstract>,
}

/// Non-owning handle held by slots, used to drop back-references when a signal lets go of a slot
pub(crate) struct ObserverHandle(Weak<Inner>);

impl Observer {
    pub fn new() -> Self {
        let id = ObserverId(NEXT_OBSERVER_ID.fetch_add(1, Ordering::Relaxed));
        Self(Rc::new(Inner { id, signals: RefCell::new(Vec::new()) }))
    }

    pub fn id(&self) -> ObserverId { self.0.id }

    /// Detach from a single signal, removing every slot it holds for this observer.
    /// Does nothing if this observer is not attached to `signal`.
    pub fn detach_signal(&self, signal: &dyn AnySignal) {
        let id = signal.signal_id();
        let mut found = None;
        self.0.signals.borrow_mut().retain(|entry| {
            if entry.id != id {
                return true;
            }
            if found.is_none() {
                found = Some(entry.signal.clone());
            }
            false
        });

        if let Some(signal) = found.and_then(|signal| signal.upgrade()) {
            trace!(observer = %self.0.id, signal = %id, "observer detaching from signal");
            signal.slot_detach(self.0.id);
        }
    }

    /// Detach from every signal this observer is attached to
    pub fn detach(&self) {
        // take the list first so the borrow is not held while signals drop their slots
        let signals = std::mem::take(&mut *self.0.signals.borrow_mut());
        if signals.is_empty() {
            return;
        }
        trace!(observer = %self.0.id, slots = signals.len(), "observer detaching from all signals");

        let mut visited: Vec<SignalId> = Vec::with_capacity(signals.len());
        for entry in signals {
            if visited.contains(&entry.id) {
                continue;
            }
            visited.push(entry.id);
            if let Some(signal) = entry.signal.upgrade() {
                signal.slot_detach(self.0.id);
            }
        }
    }

    /// Number of distinct signals this observer is attached to
    pub fn signal_count(&self) -> usize {
        let signals = self.0.signals.borrow();
        let mut ids: Vec<SignalId> = signals.iter().map(|entry| entry.id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    pub fn is_attached_to(&self, signal: &dyn AnySignal) -> bool {
        let id = signal.signal_id();
        self.0.signals.borrow().iter().any(|entry| entry.id == id)
    }

    pub(crate) fn handle(&self) -> ObserverHandle { ObserverHandle(Rc::downgrade(&self.0)) }

    pub(crate) fn signal_attach(&self, id: SignalId, signal: Weak<dyn SignalAbstract>) {
        self.0.signals.borrow_mut().push(SignalRef { id, signal });
    }

    pub(crate) fn signal_detach(&self, id: SignalId) { self.0.signal_detach(id) }
}

impl Inner {
    /// Drop one back-reference to the given signal. One entry exists per slot, so a
    /// signal releasing a single slot only releases a single entry.
    fn signal_detach(&self, id: SignalId) {
        let mut signals = self.signals.borrow_mut();
        if let Some(index) = signals.iter().position(|entry| entry.id == id) {
            signals.remove(index);
        }
    }
}

impl ObserverHandle {
    pub(crate) fn signal_detach(&self, id: SignalId) {
        if let Some(inner) = self.0.upgrade() {
            inner.signal_detach(id);
        }
    }
}

impl Default for Observer {
    fn default() -> Self { Self::new() }
}

impl Observe for Observer {
    fn observer(&self) -> &Observer { self }
}

impl<L: Observe + ?Sized> Observe for Rc<L> {
    fn observer(&self) -> &Observer { (**self).observer() }
}

impl std::fmt::Debug for Observer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observer").field("id", &self.0.id).field("slots", &self.0.signals.borrow().len()).finish()
    }
}

impl Drop for Observer {
    fn drop(&mut self) { self.detach(); }
}
