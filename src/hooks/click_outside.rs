use std::sync::Arc;

use tracing::trace;

use crate::events::ClickEvent;

use super::handles::{Latest, NodeRef};
use super::scope::Scope;

pub type ClickCallback = Arc<dyn Fn(&ClickEvent) + Send + Sync>;

impl Scope {
    /// Calls `on_outside_click` for every document click whose target is an
    /// element outside the one bound to `target`. Clicks on the element
    /// itself or any descendant are ignored, as are clicks on text nodes or
    /// on no node at all.
    ///
    /// One listener is registered while `target` is bound and replaced only
    /// when it is bound to a different node.
    pub fn use_click_outside<F>(&mut self, target: &NodeRef, on_outside_click: F)
    where
        F: Fn(&ClickEvent) + Send + Sync + 'static,
    {
        let callback: Latest<ClickCallback> = self.use_latest(Arc::new(on_outside_click));
        let platform = self.platform().clone();
        let watched = target.get();
        self.use_effect(watched, move |_| {
            let node = watched?;
            let document = platform.downgrade();
            let listener = platform.add_click_listener(move |event| {
                let Some(clicked) = event.target_node() else {
                    return;
                };
                let Some(platform) = document.upgrade() else {
                    return;
                };
                if !platform.is_element(clicked) || platform.contains(node, clicked) {
                    return;
                }
                trace!(watched = %node, %clicked, "outside click");
                let callback = callback.get();
                callback(event);
            });
            Some(Box::new(move || drop(listener)))
        });
    }
}
