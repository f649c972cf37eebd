//! Scoped connections that disconnect when dropped.

use crate::storage::SlotId;
use std::fmt;

/// Keeps a slot connected for as long as it is alive.
///
/// Returned by [`Signal::connect_scoped`](crate::Signal::connect_scoped).
/// Dropping the subscription disconnects the slot; if the signal is already
/// gone this does nothing.
#[must_use = "dropping a Subscription disconnects its slot immediately"]
pub struct Subscription {
    id: SlotId,
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(id: SlotId, unsubscribe: impl FnOnce() + 'static) -> Self {
        Self {
            id,
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Handle of the slot this subscription owns.
    pub fn id(&self) -> SlotId {
        self.id
    }

    /// Leave the slot connected for the rest of the signal's life.
    pub fn detach(mut self) -> SlotId {
        self.unsubscribe.take();
        self.id
    }

    /// Disconnect now. Same as dropping, but reads better at call sites.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("attached", &self.unsubscribe.is_some())
            .finish()
    }
}
