use std::sync::Arc;

use anyhow::Result;
use tracing::trace;

use crate::platform::{ObserverGuard, ObserverOptions, RootMargin, validate_threshold};

use super::handles::{Latest, NodeRef};
use super::scope::Scope;

pub type VisibilityCallback = Arc<dyn Fn(bool) + Send + Sync>;

/// Options for [`Scope::use_intersection_with`]. The default observes against
/// the document body with a zero threshold and margin.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IntersectionConfig {
    threshold: f64,
    root_margin: RootMargin,
    root: Option<NodeRef>,
}

impl IntersectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of the target, in `[0, 1]`, that must be visible to count as
    /// intersecting.
    pub fn threshold(mut self, threshold: f64) -> Result<Self> {
        self.threshold = validate_threshold(threshold)?;
        Ok(self)
    }

    /// CSS margin shorthand such as `"4px"` or `"0px 10%"`.
    pub fn root_margin(mut self, margin: &str) -> Result<Self> {
        self.root_margin = RootMargin::parse(margin)?;
        Ok(self)
    }

    pub fn with_root_margin(mut self, margin: RootMargin) -> Self {
        self.root_margin = margin;
        self
    }

    pub fn root(mut self, root: &NodeRef) -> Self {
        self.root = Some(root.clone());
        self
    }

    fn resolve(&self) -> ObserverOptions {
        ObserverOptions::from_validated(
            self.threshold,
            self.root_margin,
            self.root.as_ref().and_then(NodeRef::get),
        )
    }
}

impl Scope {
    /// [`Scope::use_intersection_with`] with the default configuration.
    pub fn use_intersection<F>(&mut self, target: &NodeRef, on_change: F)
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.use_intersection_with(target, on_change, IntersectionConfig::default());
    }

    /// Reports whether the element bound to `target` intersects the root.
    ///
    /// The notification delivered right after observation starts describes
    /// the state the component rendered with and is dropped; every later
    /// change is forwarded. Changing the resolved threshold, margin or root
    /// disconnects the observer and creates a new one.
    pub fn use_intersection_with<F>(&mut self, target: &NodeRef, on_change: F, config: IntersectionConfig)
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let callback: Latest<VisibilityCallback> = self.use_latest(Arc::new(on_change));
        let primed = self.use_ref(|| false);
        let (observer, set_observer) = self.use_state(|| None::<Arc<ObserverGuard>>);
        let options = config.resolve();
        let platform = self.platform().clone();

        let notified = primed.clone();
        self.use_effect(options.clone(), move |_| {
            let guard = Arc::new(platform.create_observer(options, move |entries| {
                for entry in entries {
                    if !notified.replace(true) {
                        trace!(node = %entry.target, "dropping initial intersection report");
                        continue;
                    }
                    let callback = callback.get();
                    callback(entry.is_intersecting);
                }
            }));
            set_observer.set(Some(guard.clone()));
            Some(Box::new(move || guard.disconnect()))
        });

        let observed = observer.as_ref().map(|guard| guard.id());
        let node = target.get();
        self.use_effect((observed, node), move |_| {
            let observer = observer?;
            let node = node?;
            primed.set(false);
            let observation = observer.observe(node);
            Some(Box::new(move || drop(observation)))
        });
    }
}
