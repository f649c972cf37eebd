//! Core Signal type and dispatch.

use crate::storage::{SlotId, SlotRegistry};
use crate::subscription::Subscription;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

/// Slot callback stored by a [`Signal`].
type Slot<A> = Rc<dyn Fn(&A)>;

type Registry<A> = RefCell<SlotRegistry<Slot<A>>>;

/// A typed, synchronous event source.
///
/// Slots connected to a signal are called, in connection order, every time
/// the signal is emitted. Several arguments are carried as a tuple; a signal
/// without arguments is a `Signal<()>`.
///
/// `Signal` is a handle: clones share the same slots. The slots are dropped
/// together with the last handle, without being notified.
///
/// # Re-entrancy
///
/// [`emit`](Self::emit) works on a snapshot of the slots taken when it
/// starts, and holds no borrow while a slot runs. A slot may therefore
/// connect, disconnect or emit on the very signal that called it:
///
/// - slots connected during a dispatch are first called on the next emit;
/// - slots disconnected during a dispatch are skipped if they have not run yet;
/// - a nested emit runs a full dispatch of its own before the outer one resumes.
///
/// # Examples
///
/// ```rust,no_run
/// use signal_slots::prelude::*;
///
/// let clicked = Signal::<(i32, i32)>::new();
/// let id = clicked.connect(|(x, y)| println!("clicked at {x},{y}"));
/// clicked.emit(&(10, 20));
/// clicked.disconnect(id);
/// ```
pub struct Signal<A = ()> {
    inner: Rc<Registry<A>>,
}

impl<A> Clone for Signal<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A> PartialEq for Signal<A> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<A> Eq for Signal<A> {}

impl<A: 'static> Signal<A> {
    /// Create a signal with no slots.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SlotRegistry::new())),
        }
    }

    /// Connect a slot and return the handle needed to disconnect it.
    pub fn connect(&self, slot: impl Fn(&A) + 'static) -> SlotId {
        let id = self.inner.borrow_mut().insert(Rc::new(slot));
        trace!(slot = %id, "slot connected");
        id
    }

    /// Forward every emission of this signal to `target`.
    ///
    /// The target is held weakly; once every handle to it is dropped the
    /// forwarding slot does nothing. Forwarding a signal to itself recurses
    /// without end.
    pub fn connect_signal(&self, target: &Signal<A>) -> SlotId {
        self.connect(target.emitter())
    }

    /// Connect a slot that stays connected only while the returned
    /// [`Subscription`] is alive.
    pub fn connect_scoped(&self, slot: impl Fn(&A) + 'static) -> Subscription {
        let id = self.connect(slot);
        let registry = Rc::downgrade(&self.inner);
        Subscription::new(id, move || {
            if let Some(signal) = upgrade(&registry) {
                signal.disconnect(id);
            }
        })
    }

    /// Disconnect a slot.
    ///
    /// Unknown or already removed handles are ignored. Returns whether a slot
    /// was actually removed.
    pub fn disconnect(&self, id: SlotId) -> bool {
        let removed = self.inner.borrow_mut().remove(id);
        trace!(slot = %id, removed, "slot disconnected");
        removed
    }

    /// Disconnect every slot. Issued handles stay retired.
    pub fn disconnect_all(&self) -> usize {
        let count = self.inner.borrow_mut().clear();
        trace!(count, "all slots disconnected");
        count
    }

    /// Call every connected slot with `args`, in ascending handle order.
    ///
    /// Does nothing while the signal is blocked. A panicking slot unwinds
    /// through `emit` and the remaining slots are not called.
    pub fn emit(&self, args: &A) {
        self.emit_while(args, || true);
    }

    /// Dispatch like [`emit`](Self::emit), but stop before the next slot
    /// once `current` returns `false`.
    pub(crate) fn emit_while(&self, args: &A, current: impl Fn() -> bool) {
        let Some(slots) = self.inner.borrow().snapshot() else {
            debug!("emission suppressed, signal is blocked");
            return;
        };
        trace!(slots = slots.len(), "emitting signal");
        for (id, slot) in slots {
            if !current() {
                trace!(slot = %id, "dispatch superseded");
                return;
            }
            if !self.inner.borrow().contains(id) {
                continue;
            }
            slot(args);
        }
    }

    /// A callable standing in for this signal: calling it emits.
    ///
    /// The closure holds the signal weakly and is a no-op once the signal
    /// is dropped.
    pub fn emitter(&self) -> impl Fn(&A) + 'static {
        let registry = Rc::downgrade(&self.inner);
        move |args: &A| {
            if let Some(signal) = upgrade(&registry) {
                signal.emit(args);
            }
        }
    }

    /// Suppress (`true`) or resume (`false`) emissions.
    ///
    /// Slots stay connected while blocked. Returns the previous state.
    pub fn block_signals(&self, block: bool) -> bool {
        let previous = self.inner.borrow_mut().set_blocked(block);
        trace!(block, previous, "signal blocking changed");
        previous
    }

    /// Whether emissions are currently suppressed.
    pub fn is_blocked(&self) -> bool {
        self.inner.borrow().is_blocked()
    }

    /// Block the signal until the returned guard is dropped.
    ///
    /// The previous blocking state is restored on drop, so blockers nest.
    pub fn blocker(&self) -> SignalBlocker<'_, A> {
        let previous = self.block_signals(true);
        SignalBlocker {
            signal: self,
            previous,
        }
    }

    /// Whether `id` still refers to a connected slot.
    pub fn is_connected(&self, id: SlotId) -> bool {
        self.inner.borrow().contains(id)
    }

    /// Number of connected slots.
    pub fn slot_count(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slot_count() == 0
    }
}

fn upgrade<A>(registry: &Weak<Registry<A>>) -> Option<Signal<A>> {
    registry.upgrade().map(|inner| Signal { inner })
}

impl<A: 'static> Default for Signal<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for Signal<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.inner.borrow();
        f.debug_struct("Signal")
            .field("slots", &registry.len())
            .field("blocked", &registry.is_blocked())
            .finish()
    }
}

/// Scoped suppression returned by [`Signal::blocker`].
#[must_use = "the signal is unblocked as soon as the blocker is dropped"]
pub struct SignalBlocker<'a, A: 'static> {
    signal: &'a Signal<A>,
    previous: bool,
}

impl<A: 'static> Drop for SignalBlocker<'_, A> {
    fn drop(&mut self) {
        self.signal.block_signals(self.previous);
    }
}
