//! Ordered slot storage shared by every signal flavour.
//!
//! Slots are keyed by a monotonically increasing [`SlotId`], so iterating the
//! map yields subscribers in the order they were connected. Ids are never
//! handed out twice for the same registry, even after a slot is removed.

use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroU64;

/// Handle identifying one connected slot.
///
/// Ids are unique per signal, start at 1 and only ever grow. An id from one
/// signal means nothing to another signal.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SlotId(NonZeroU64);

impl SlotId {
    /// The raw numeric value of this handle.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Slots of a single signal plus its suppression flag.
///
/// `S` is the stored callback type (`Rc<dyn Fn(&A)>` for [`crate::Signal`],
/// an `Arc` for the sync flavour). The registry never calls slots itself;
/// callers take a [`snapshot`](Self::snapshot) and invoke it with no borrow
/// held.
pub(crate) struct SlotRegistry<S> {
    slots: BTreeMap<SlotId, S>,
    next_id: NonZeroU64,
    blocked: bool,
}

impl<S: Clone> SlotRegistry<S> {
    /// Create an empty registry whose first issued id is 1.
    pub fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
            next_id: NonZeroU64::MIN,
            blocked: false,
        }
    }

    /// Store a slot and return its freshly issued id.
    ///
    /// # Panics
    ///
    /// Panics once `u64::MAX - 1` ids have been issued, rather than hand out
    /// an id twice. The slot is not stored in that case.
    pub fn insert(&mut self, slot: S) -> SlotId {
        let id = SlotId(self.next_id);
        self.next_id = match self.next_id.checked_add(1) {
            Some(next) => next,
            None => panic!("slot ids exhausted for this signal"),
        };
        self.slots.insert(id, slot);
        id
    }

    /// Remove a slot. Returns `false` when the id is unknown.
    pub fn remove(&mut self, id: SlotId) -> bool {
        self.slots.remove(&id).is_some()
    }

    /// Remove every slot, returning how many were dropped.
    ///
    /// The id counter is left alone so earlier ids stay retired.
    pub fn clear(&mut self) -> usize {
        let count = self.slots.len();
        self.slots.clear();
        count
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Clone out the current slots in ascending id order.
    ///
    /// Returns `None` while the registry is blocked.
    pub fn snapshot(&self) -> Option<Vec<(SlotId, S)>> {
        if self.blocked {
            return None;
        }
        Some(
            self.slots
                .iter()
                .map(|(id, slot)| (*id, slot.clone()))
                .collect(),
        )
    }

    /// Set the suppression flag, returning its previous state.
    pub fn set_blocked(&mut self, blocked: bool) -> bool {
        std::mem::replace(&mut self.blocked, blocked)
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_first_id_is_one() {
        let mut registry = SlotRegistry::new();
        let id = registry.insert(());
        assert_eq!(id.get(), 1);
        assert_eq!(id.to_string(), "#1");
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut registry = SlotRegistry::new();
        let a = registry.insert('a');
        let b = registry.insert('b');
        assert!(registry.remove(b));
        let c = registry.insert('c');

        assert!(a < b && b < c);
        assert!(!registry.contains(b));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_remove_unknown_id() {
        let mut registry = SlotRegistry::new();
        let id = registry.insert(1u8);
        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert_eq!(registry.len(), 0);
    }

    #[test]
    #[should_panic(expected = "slot ids exhausted")]
    fn test_exhausted_ids_never_repeat() {
        let mut registry = SlotRegistry::new();
        registry.next_id = NonZeroU64::MAX;
        registry.insert(());
    }

    #[test]
    fn test_clear_keeps_counter() {
        let mut registry = SlotRegistry::new();
        registry.insert(1);
        let last = registry.insert(2);
        assert_eq!(registry.clear(), 2);
        assert!(registry.insert(3) > last);
    }

    #[test]
    fn test_snapshot_order_and_blocking() {
        let mut registry = SlotRegistry::new();
        for value in ["x", "y", "z"] {
            registry.insert(value);
        }
        let values: Vec<_> = registry
            .snapshot()
            .unwrap()
            .into_iter()
            .map(|(_, v)| v)
            .collect();
        assert_eq!(values, ["x", "y", "z"]);

        assert!(!registry.set_blocked(true));
        assert!(registry.snapshot().is_none());
        assert!(registry.set_blocked(false));
        assert_eq!(registry.snapshot().unwrap().len(), 3);
    }

    #[test]
    fn test_random_sequences_stay_monotonic() {
        let mut rng = rand::thread_rng();
        let mut registry = SlotRegistry::new();
        let mut live = Vec::new();
        let mut last: Option<SlotId> = None;

        for _ in 0..500 {
            if live.is_empty() || rng.gen_bool(0.6) {
                let id = registry.insert(());
                if let Some(prev) = last {
                    assert!(id > prev);
                }
                last = Some(id);
                live.push(id);
            } else {
                let index = rng.gen_range(0..live.len());
                let id = live.swap_remove(index);
                assert!(registry.remove(id));
            }
        }

        let order: Vec<_> = registry
            .snapshot()
            .unwrap()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        live.sort();
        assert_eq!(order, live);
    }
}
