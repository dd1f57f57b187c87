use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use tracing::trace;

use crate::dom::NodeId;
use crate::events::ClickEvent;

use super::{Platform, PlatformInner};

pub type ClickHandler = dyn Fn(&ClickEvent) + Send + Sync + 'static;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// Document-level click listeners in registration order.
#[derive(Default)]
pub(crate) struct ClickListeners {
    next_id: u64,
    listeners: BTreeMap<ListenerId, Arc<ClickHandler>>,
}

impl ClickListeners {
    fn add(&mut self, handler: Arc<ClickHandler>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, handler);
        id
    }

    fn remove(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    fn get(&self, id: ListenerId) -> Option<Arc<ClickHandler>> {
        self.listeners.get(&id).cloned()
    }

    fn ids(&self) -> Vec<ListenerId> {
        self.listeners.keys().copied().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }
}

/// Keeps a click listener registered until dropped.
pub struct ClickListenerGuard {
    id: ListenerId,
    inner: Weak<PlatformInner>,
}

impl ClickListenerGuard {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| inner.clicks.lock().get(self.id).is_some())
    }
}

impl Drop for ClickListenerGuard {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            if inner.clicks.lock().remove(self.id) {
                trace!(listener = %self.id, "click listener removed");
            }
        }
    }
}

impl fmt::Debug for ClickListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClickListenerGuard")
            .field("id", &self.id)
            .finish()
    }
}

impl Platform {
    pub fn add_click_listener<F>(&self, handler: F) -> ClickListenerGuard
    where
        F: Fn(&ClickEvent) + Send + Sync + 'static,
    {
        let id = self.inner.clicks.lock().add(Arc::new(handler));
        trace!(listener = %id, "click listener added");
        ClickListenerGuard {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn click_listener_count(&self) -> usize {
        self.inner.clicks.lock().len()
    }

    /// Delivers `event` to every listener registered when dispatch began.
    /// A listener removed by an earlier handler in the same dispatch is
    /// skipped. Returns the number of handlers invoked.
    pub fn dispatch_click(&self, event: &ClickEvent) -> usize {
        let ids = self.inner.clicks.lock().ids();
        let mut delivered = 0;
        for id in ids {
            let Some(handler) = self.inner.clicks.lock().get(id) else {
                trace!(listener = %id, "skipping listener removed during dispatch");
                continue;
            };
            handler(event);
            delivered += 1;
        }
        trace!(click_target = ?event.target, delivered, "click dispatched");
        delivered
    }

    /// Hit-tests the cell against the document and dispatches a click there.
    pub fn click_at(&self, column: u16, row: u16) -> usize {
        let target = self.inner.document.read().hit_test(column, row);
        self.dispatch_click(&ClickEvent::at(target, column, row))
    }

    pub fn click_node(&self, target: NodeId) -> usize {
        self.dispatch_click(&ClickEvent::synthetic(target))
    }
}
