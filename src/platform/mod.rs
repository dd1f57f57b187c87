//! Host capabilities the hooks subscribe to: document-level clicks,
//! intersection observers and one-shot timers, all over a shared
//! [`Document`].
//!
//! Every registration hands back a guard that releases it on drop. Callbacks
//! are always invoked with no platform lock held, so a callback may freely
//! register, cancel or dispatch again.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use ratatui::layout::Rect;

use crate::dom::{CommitSummary, Document, NodeId, NodeSpec};

mod click;
mod intersection;
mod timers;
#[cfg(test)]
mod tests;

pub use click::{ClickHandler, ClickListenerGuard, ListenerId};
pub use intersection::{
    IntersectionEntry, IntersectionHandler, MarginValue, ObservationGuard, ObserverGuard,
    ObserverId, ObserverOptions, RootMargin,
};
pub use timers::{Clock, ManualClock, SystemClock, TimerGuard, TimerId};

pub(crate) use intersection::validate_threshold;

use click::ClickListeners;
use intersection::ObserverRegistry;
use timers::TimerQueue;

pub(crate) struct PlatformInner {
    document: RwLock<Document>,
    clicks: Mutex<ClickListeners>,
    observers: Mutex<ObserverRegistry>,
    timers: Mutex<TimerQueue>,
    clock: Arc<dyn Clock>,
}

#[derive(Clone)]
pub struct Platform {
    inner: Arc<PlatformInner>,
}

/// Non-owning platform handle for callbacks the platform itself stores.
#[derive(Clone)]
pub struct WeakPlatform {
    inner: Weak<PlatformInner>,
}

impl WeakPlatform {
    pub fn upgrade(&self) -> Option<Platform> {
        self.inner.upgrade().map(|inner| Platform { inner })
    }
}

impl Platform {
    pub fn new(viewport: Rect) -> Self {
        Self::with_clock(viewport, Arc::new(SystemClock::default()))
    }

    pub fn with_clock(viewport: Rect, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(PlatformInner {
                document: RwLock::new(Document::new(viewport)),
                clicks: Mutex::new(ClickListeners::default()),
                observers: Mutex::new(ObserverRegistry::default()),
                timers: Mutex::new(TimerQueue::default()),
                clock,
            }),
        }
    }

    pub fn downgrade(&self) -> WeakPlatform {
        WeakPlatform {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Read access to the document. Do not hold the guard across a dispatch.
    pub fn document(&self) -> RwLockReadGuard<'_, Document> {
        self.inner.document.read()
    }

    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.inner.document.read().contains(ancestor, node)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.inner.document.read().is_element(id)
    }

    pub fn body(&self) -> NodeId {
        self.inner.document.read().body()
    }

    pub(crate) fn commit(&self, children: Vec<NodeSpec>) -> CommitSummary {
        self.inner.document.write().commit(children)
    }

    pub fn resize(&self, viewport: Rect) {
        self.inner.document.write().set_viewport(viewport);
    }

    pub fn now(&self) -> Duration {
        self.inner.clock.now()
    }
}
