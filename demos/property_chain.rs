//! Property binding example.
//!
//! A settings model whose `theme` property is mirrored into two views, one
//! of them through a chain. Also shows scoped edits of a struct property and
//! a `SyncSignal` shared with worker threads.

use signal_slots::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use tracing_subscriber::EnvFilter;

#[derive(Clone, PartialEq, Debug, Default)]
struct Window {
    width: u32,
    height: u32,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let theme = Property::new(String::from("light"));
    let sidebar = Property::<String>::default();
    let status_bar = Property::<String>::default();

    sidebar.bind(&theme);
    status_bar.bind(&sidebar);
    let _logger = status_bar.connect_scoped(|t| println!("status bar theme: {t}"));

    theme.set("dark".into());
    // Equal value: nothing downstream runs.
    theme.set("dark".into());

    let window = Property::new(Window::default());
    window.connect(|w| println!("window resized to {}x{}", w.width, w.height));
    {
        let mut w = window.modify();
        w.width = 800;
        w.height = 600;
    }

    let jobs = SyncSignal::<usize>::new();
    let done = Arc::new(AtomicUsize::new(0));
    {
        let done = done.clone();
        jobs.connect(move |n| {
            done.fetch_add(*n, Ordering::SeqCst);
        });
    }

    let workers: Vec<_> = (1..=3)
        .map(|n| {
            let jobs = jobs.clone();
            thread::spawn(move || jobs.emit(&n))
        })
        .collect();
    for worker in workers {
        if worker.join().is_err() {
            eprintln!("worker panicked");
        }
    }

    println!("jobs finished: {}", done.load(Ordering::SeqCst));
}
