use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::dom::NodeId;
use crate::runtime::Dispatcher;

pub struct StateHandle<T: Send + 'static> {
    pub(crate) shared: Arc<Mutex<T>>,
    dispatcher: Dispatcher,
}

impl<T: Send + 'static> StateHandle<T> {
    pub(crate) fn new(shared: Arc<Mutex<T>>, dispatcher: Dispatcher) -> Self {
        Self { shared, dispatcher }
    }

    pub fn set(&self, next: T) {
        *self.shared.lock() = next;
        self.dispatcher.request_render();
    }

    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        f(&mut *self.shared.lock());
        self.dispatcher.request_render();
    }

    /// Current value, which may be newer than the one returned at render.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.shared.lock().clone()
    }
}

pub struct RefHandle<T: Send + 'static> {
    shared: Arc<Mutex<T>>,
}

impl<T: Send + 'static> Clone for StateHandle<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl<T: Send + 'static> Clone for RefHandle<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Send + 'static> RefHandle<T> {
    pub(crate) fn new(shared: Arc<Mutex<T>>) -> Self {
        Self { shared }
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let value = self.shared.lock();
        f(&value)
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut value = self.shared.lock();
        f(&mut value)
    }

    /// Stores `next` and returns the previous value, dropped by the caller
    /// outside the lock.
    pub fn replace(&self, next: T) -> T {
        std::mem::replace(&mut *self.shared.lock(), next)
    }

    pub fn set(&self, next: T) {
        drop(self.replace(next));
    }
}

/// Stable cell holding the value supplied on the most recent render.
///
/// Subscriptions capture a `Latest` once and read it when they fire, so the
/// logic they run can change every render without re-subscribing.
pub struct Latest<T: Send + 'static> {
    cell: RefHandle<T>,
}

impl<T: Send + 'static> Latest<T> {
    pub(crate) fn new(cell: RefHandle<T>) -> Self {
        Self { cell }
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.cell.with(T::clone)
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.cell.with(f)
    }
}

impl<T: Send + 'static> Clone for Latest<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

/// Handle to the element a component binds with
/// [`NodeElement::bind`](crate::runtime::NodeElement::bind).
///
/// The runtime fills it in at commit and clears it when the element leaves
/// the tree. Two `NodeRef`s are equal only if they are the same cell.
#[derive(Clone, Default)]
pub struct NodeRef {
    shared: Arc<Mutex<Option<NodeId>>>,
}

impl NodeRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<NodeId> {
        *self.shared.lock()
    }

    /// Returns whether the stored node changed.
    pub(crate) fn set(&self, node: Option<NodeId>) -> bool {
        let mut current = self.shared.lock();
        if *current == node {
            return false;
        }
        *current = node;
        true
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Eq for NodeRef {}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeRef").field(&self.get()).finish()
    }
}
