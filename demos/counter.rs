//! Simple counter example demonstrating signal_slots.
//!
//! This example shows:
//! - Connecting and disconnecting slots
//! - Multi-argument signals
//! - Suppressing emissions while batching work
//!
//! Run with `RUST_LOG=trace` to see the dispatch events.

use signal_slots::prelude::*;
use std::cell::Cell;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

struct Counter {
    count: Cell<i32>,
    changed: Signal<(i32, i32)>,
}

impl Counter {
    fn new() -> Self {
        Self {
            count: Cell::new(0),
            changed: Signal::new(),
        }
    }

    fn change_by(&self, delta: i32) {
        let old = self.count.get();
        let new = old + delta;
        self.count.set(new);
        self.changed.emit(&(old, new));
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let counter = Counter::new();
    let updates = Rc::new(Cell::new(0));

    let printer = counter
        .changed
        .connect(|(old, new)| println!("count: {old} -> {new}"));
    {
        let updates = updates.clone();
        counter.changed.connect(move |_| updates.set(updates.get() + 1));
    }

    counter.change_by(1);
    counter.change_by(2);

    {
        let _blocker = counter.changed.blocker();
        for _ in 0..10 {
            counter.change_by(1);
        }
    }
    println!("count after silent batch: {}", counter.count.get());

    counter.changed.disconnect(printer);
    counter.change_by(-13);

    println!(
        "final count {} after {} notifications",
        counter.count.get(),
        updates.get()
    );
}
