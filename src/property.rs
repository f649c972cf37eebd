//! Observable values that notify on change.

use crate::signal::Signal;
use crate::storage::SlotId;
use std::cell::RefCell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::rc::{Rc, Weak};
use tracing::trace;

struct PropertyInner<T> {
    value: RefCell<T>,
    changed: Signal<T>,
}

/// A value holder that is also the signal of its own changes.
///
/// Setting a property compares the new value against the stored one with
/// `PartialEq` and only stores and emits when they differ. The property
/// derefs to its change [`Signal`], so slots are connected directly on it.
///
/// Like [`Signal`], a `Property` is a handle and clones share the same value.
///
/// # Examples
///
/// ```rust,no_run
/// use signal_slots::prelude::*;
///
/// let width = Property::new(10);
/// let mirrored = Property::new(0);
/// mirrored.bind(&width);
///
/// mirrored.connect(|w| println!("width is now {w}"));
/// width.set(12);
/// assert_eq!(mirrored.get(), 12);
/// ```
pub struct Property<T> {
    inner: Rc<PropertyInner<T>>,
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Deref for Property<T> {
    type Target = Signal<T>;

    fn deref(&self) -> &Self::Target {
        &self.inner.changed
    }
}

impl<T: Clone + PartialEq + 'static> Property<T> {
    /// Create a property holding `value`, with no slots.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(PropertyInner {
                value: RefCell::new(value),
                changed: Signal::new(),
            }),
        }
    }

    /// The change signal. Same as dereferencing the property.
    pub fn changed(&self) -> &Signal<T> {
        &self.inner.changed
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Read the current value with a closure.
    ///
    /// # Panics
    ///
    /// The value stays borrowed while `f` runs, so calling
    /// [`set`](Self::set), [`update`](Self::update) or committing a
    /// [`modify`](Self::modify) guard on the same property from inside `f`
    /// panics. Reading it again is fine.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.inner.value.borrow())
    }

    /// Store `value` and notify slots, unless it equals the current value.
    ///
    /// Returns the replaced value when a change happened, `None` otherwise.
    /// Slots run after the value is stored and may read or set the property.
    /// When a slot sets a different value, the dispatch of the outdated
    /// value stops and the remaining slots only see the newer one.
    pub fn set(&self, value: T) -> Option<T> {
        if *self.inner.value.borrow() == value {
            return None;
        }
        let previous = self.inner.value.replace(value.clone());
        trace!("property changed");
        self.inner
            .changed
            .emit_while(&value, || *self.inner.value.borrow() == value);
        Some(previous)
    }

    /// Copy the current value of `other` into this property.
    ///
    /// This is a one-off copy; use [`bind`](Self::bind) to follow later
    /// changes.
    pub fn assign(&self, other: &Property<T>) -> Option<T> {
        self.set(other.get())
    }

    /// Follow every future change of `source`.
    ///
    /// Each value emitted by `source` goes through [`set`](Self::set), so
    /// equal values are dropped and changes propagate to whatever is bound
    /// to this property in turn. The returned handle belongs to `source`;
    /// pass it to `source.disconnect` to unbind. The property is held weakly
    /// and the binding goes quiet once it is dropped.
    pub fn bind(&self, source: &Signal<T>) -> SlotId {
        let target = Rc::downgrade(&self.inner);
        let id = source.connect(move |value: &T| {
            if let Some(property) = upgrade(&target) {
                property.set(value.clone());
            }
        });
        trace!(slot = %id, "property bound");
        id
    }

    /// Mutate the value in place with a closure.
    ///
    /// The result is committed through [`set`](Self::set). Returns whether
    /// the value changed.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> bool {
        let mut value = self.get();
        f(&mut value);
        self.set(value).is_some()
    }

    /// Mutable access to a working copy of the value.
    ///
    /// Changes made through the guard are committed with
    /// [`set`](Self::set) when it is dropped, so nested fields can be edited
    /// without skipping change notification.
    pub fn modify(&self) -> PropertyGuard<'_, T> {
        PropertyGuard {
            property: self,
            value: Some(self.get()),
        }
    }
}

fn upgrade<T>(inner: &Weak<PropertyInner<T>>) -> Option<Property<T>> {
    inner.upgrade().map(|inner| Property { inner })
}

impl<T: Clone + PartialEq + Default + 'static> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> From<T> for Property<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &*self.inner.value.borrow())
            .field("changed", &self.inner.changed)
            .finish()
    }
}

impl<T: fmt::Display> fmt::Display for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.inner.value.borrow(), f)
    }
}

/// Pending edit of a [`Property`], committed on drop.
#[must_use = "edits are committed when the guard is dropped"]
pub struct PropertyGuard<'a, T: Clone + PartialEq + 'static> {
    property: &'a Property<T>,
    value: Option<T>,
}

impl<T: Clone + PartialEq + 'static> PropertyGuard<'_, T> {
    /// Throw away the pending edit without touching the property.
    pub fn discard(mut self) {
        self.value.take();
    }
}

impl<T: Clone + PartialEq + 'static> Deref for PropertyGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Only `discard` and `drop` take the value, and both consume the guard.
        self.value.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl<T: Clone + PartialEq + 'static> DerefMut for PropertyGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.value.as_mut().unwrap_or_else(|| unreachable!())
    }
}

impl<T: Clone + PartialEq + 'static> Drop for PropertyGuard<'_, T> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            self.property.set(value);
        }
    }
}
