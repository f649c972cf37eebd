//! Thread-safe signal flavour.
//!
//! [`SyncSignal`] offers the same operations as [`Signal`](crate::Signal)
//! for code that shares one signal between threads. Delivery is still
//! synchronous: slots run on whichever thread calls `emit`, one after the
//! other, before `emit` returns. The registry lock is released before any
//! slot runs, so slots may connect, disconnect or emit on the same signal
//! without deadlocking.

use crate::storage::{SlotId, SlotRegistry};
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

type SyncSlot<A> = Arc<dyn Fn(&A) + Send + Sync>;

type Registry<A> = Mutex<SlotRegistry<SyncSlot<A>>>;

/// A signal that can be shared across threads.
///
/// Clones share the same slots, like [`Signal`](crate::Signal).
pub struct SyncSignal<A = ()> {
    inner: Arc<Registry<A>>,
}

impl<A> Clone for SyncSignal<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A> PartialEq for SyncSignal<A> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<A> Eq for SyncSignal<A> {}

impl<A: 'static> SyncSignal<A> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SlotRegistry::new())),
        }
    }

    /// Connect a slot and return the handle needed to disconnect it.
    pub fn connect(&self, slot: impl Fn(&A) + Send + Sync + 'static) -> SlotId {
        let id = self.inner.lock().insert(Arc::new(slot));
        trace!(slot = %id, "sync slot connected");
        id
    }

    /// Forward every emission to `target`, which is held weakly.
    pub fn connect_signal(&self, target: &SyncSignal<A>) -> SlotId {
        self.connect(target.emitter())
    }

    /// A thread-safe callable that emits on this signal while it is alive.
    pub fn emitter(&self) -> impl Fn(&A) + Send + Sync + 'static {
        let registry = Arc::downgrade(&self.inner);
        move |args: &A| {
            if let Some(signal) = upgrade(&registry) {
                signal.emit(args);
            }
        }
    }

    /// Connect a slot for as long as the returned guard lives.
    pub fn connect_scoped(&self, slot: impl Fn(&A) + Send + Sync + 'static) -> SyncSubscription {
        let id = self.connect(slot);
        let registry = Arc::downgrade(&self.inner);
        SyncSubscription {
            id,
            unsubscribe: Some(Box::new(move || {
                if let Some(signal) = upgrade(&registry) {
                    signal.disconnect(id);
                }
            })),
        }
    }

    /// Disconnect a slot. Unknown handles are ignored.
    pub fn disconnect(&self, id: SlotId) -> bool {
        let removed = self.inner.lock().remove(id);
        trace!(slot = %id, removed, "sync slot disconnected");
        removed
    }

    pub fn disconnect_all(&self) -> usize {
        self.inner.lock().clear()
    }

    /// Call every connected slot with `args`, in ascending handle order.
    pub fn emit(&self, args: &A) {
        let Some(slots) = self.inner.lock().snapshot() else {
            debug!("emission suppressed, sync signal is blocked");
            return;
        };
        trace!(slots = slots.len(), "emitting sync signal");
        for (id, slot) in slots {
            if !self.inner.lock().contains(id) {
                continue;
            }
            slot(args);
        }
    }

    /// Suppress or resume emissions, returning the previous state.
    pub fn block_signals(&self, block: bool) -> bool {
        self.inner.lock().set_blocked(block)
    }

    pub fn is_blocked(&self) -> bool {
        self.inner.lock().is_blocked()
    }

    pub fn is_connected(&self, id: SlotId) -> bool {
        self.inner.lock().contains(id)
    }

    pub fn slot_count(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slot_count() == 0
    }
}

fn upgrade<A>(registry: &Weak<Registry<A>>) -> Option<SyncSignal<A>> {
    registry.upgrade().map(|inner| SyncSignal { inner })
}

impl<A: 'static> Default for SyncSignal<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for SyncSignal<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.inner.lock();
        f.debug_struct("SyncSignal")
            .field("slots", &registry.len())
            .field("blocked", &registry.is_blocked())
            .finish()
    }
}

/// [`Subscription`](crate::Subscription) counterpart for [`SyncSignal`].
///
/// Can be sent to and dropped on another thread.
#[must_use = "dropping a SyncSubscription disconnects its slot immediately"]
pub struct SyncSubscription {
    id: SlotId,
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl SyncSubscription {
    pub fn id(&self) -> SlotId {
        self.id
    }

    /// Leave the slot connected for the rest of the signal's life.
    pub fn detach(mut self) -> SlotId {
        self.unsubscribe.take();
        self.id
    }
}

impl Drop for SyncSubscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl fmt::Debug for SyncSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncSubscription")
            .field("id", &self.id)
            .field("attached", &self.unsubscribe.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_sync_signal_is_send_sync() {
        assert_send_sync::<SyncSignal<i32>>();
        assert_send_sync::<SyncSignal<String>>();
    }

    #[test]
    fn test_emit_log_scenario() {
        let signal = SyncSignal::<i32>::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = {
            let log = log.clone();
            signal.connect(move |n| log.lock().push(*n))
        };
        {
            let log = log.clone();
            signal.connect(move |n| log.lock().push(*n));
        }

        signal.emit(&5);
        assert_eq!(*log.lock(), [5, 5]);
        signal.disconnect(first);
        signal.emit(&7);
        assert_eq!(*log.lock(), [5, 5, 7]);
    }

    #[test]
    fn test_concurrent_connect_yields_unique_ids() {
        let signal = SyncSignal::<()>::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let signal = signal.clone();
                thread::spawn(move || (0..100).map(|_| signal.connect(|_| {})).collect::<Vec<_>>())
            })
            .collect();

        let mut ids: Vec<SlotId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 800);
        assert_eq!(signal.slot_count(), 800);
    }

    #[test]
    fn test_emit_from_many_threads() {
        let signal = SyncSignal::<usize>::new();
        let total = Arc::new(AtomicUsize::new(0));
        {
            let total = total.clone();
            signal.connect(move |n| {
                total.fetch_add(*n, Ordering::SeqCst);
            });
        }

        let handles: Vec<_> = (1..=4)
            .map(|n| {
                let signal = signal.clone();
                thread::spawn(move || signal.emit(&n))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(total.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_reentrant_connect_does_not_deadlock() {
        let signal = SyncSignal::<i32>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        {
            let handle = signal.clone();
            let hits = hits.clone();
            signal.connect(move |_| {
                let hits = hits.clone();
                handle.connect(move |_| {
                    hits.fetch_add(1, Ordering::SeqCst);
                });
            });
        }

        signal.emit(&1);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        signal.emit(&2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_blocking_and_forwarding() {
        let source = SyncSignal::<i32>::new();
        let target = SyncSignal::<i32>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        {
            let hits = hits.clone();
            target.connect(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }
        source.connect_signal(&target);

        assert!(!source.block_signals(true));
        source.emit(&1);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        source.block_signals(false);
        source.emit(&1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscription_dropped_on_other_thread() {
        let signal = SyncSignal::<()>::new();
        let subscription = signal.connect_scoped(|_| {});
        let id = subscription.id();

        thread::spawn(move || drop(subscription)).join().unwrap();
        assert!(!signal.is_connected(id));
    }
}
