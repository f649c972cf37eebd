//! # Signal Slots
//!
//! Typed, synchronous signals and observable properties.
//!
//! ## Features
//!
//! - **Ordered delivery**: slots run in the order they were connected
//! - **Stable handles**: every connection gets a [`SlotId`] that is never reused
//! - **Change-gated properties**: [`Property`] only notifies when its value
//!   actually changes, and can follow other properties with `bind`
//! - **Scoped connections**: [`Subscription`] disconnects on drop
//! - **Thread-safe flavour**: [`SyncSignal`] behind the `sync` feature
//!
//! Delivery is always synchronous. Slot panics propagate to the caller of
//! `emit` (or `set`) and stop the rest of that dispatch.
//!
//! ## Example
//!
//! ```rust,no_run
//! use signal_slots::prelude::*;
//!
//! let count: Signal<i32> = Signal::new();
//! let id = count.connect(|n| println!("count is {n}"));
//! count.emit(&256);
//! count.disconnect(id);
//!
//! let name = Property::new(String::from("untitled"));
//! let title: Property<String> = Property::default();
//! title.bind(&name);
//! name.set("report.txt".into());
//! assert_eq!(title.get(), "report.txt");
//! ```

mod property;
mod signal;
mod storage;
mod subscription;
#[cfg(feature = "sync")]
mod sync;

pub use property::{Property, PropertyGuard};
pub use signal::{Signal, SignalBlocker};
pub use storage::SlotId;
pub use subscription::Subscription;
#[cfg(feature = "sync")]
pub use sync::{SyncSignal, SyncSubscription};

// Re-export the prelude
pub mod prelude {
    pub use crate::{Property, Signal, SlotId, Subscription};
    #[cfg(feature = "sync")]
    pub use crate::{SyncSignal, SyncSubscription};
}
