use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use ratatui::layout::Rect;

mod intersection;

fn viewport() -> Rect {
    Rect::new(0, 0, 40, 20)
}

#[derive(Clone, Default)]
struct Counter(Arc<AtomicUsize>);

impl Counter {
    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Hands a value produced during render out to the test.
struct Exported<T>(Arc<Mutex<Option<T>>>);

impl<T> Clone for Exported<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: Clone> Exported<T> {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(None)))
    }

    fn put(&self, value: T) {
        *self.0.lock() = Some(value);
    }

    fn get(&self) -> T {
        self.0.lock().clone().expect("value exported by a render")
    }
}
