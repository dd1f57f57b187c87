use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Weak};

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, trace};

use crate::dom::{Bounds, Document, NodeId};

use super::{Platform, PlatformInner};

pub type IntersectionHandler = dyn Fn(&[IntersectionEntry]) + Send + Sync + 'static;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer#{}", self.0)
    }
}

/// One side of a root margin: whole cells, or a percentage of the root's
/// width (left/right) or height (top/bottom).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarginValue {
    Cells(i32),
    Percent(f64),
}

/// Largest margin accepted, in cells.
const MAX_MARGIN_CELLS: f64 = i16::MAX as f64;
/// Largest margin accepted, in percent of the root's extent.
const MAX_MARGIN_PERCENT: f64 = 1000.0;

impl MarginValue {
    fn resolve(&self, extent: u16) -> i32 {
        match self {
            MarginValue::Cells(cells) => *cells,
            MarginValue::Percent(percent) => (f64::from(extent) * percent / 100.0).round() as i32,
        }
    }

    fn parse(token: &str) -> Result<Self> {
        if let Some(number) = token.strip_suffix("px") {
            let value: f64 = number
                .parse()
                .with_context(|| format!("invalid pixel length `{token}`"))?;
            let value = bounded(value, MAX_MARGIN_CELLS, token)?;
            return Ok(MarginValue::Cells(value.round() as i32));
        }
        if let Some(number) = token.strip_suffix('%') {
            let value: f64 = number
                .parse()
                .with_context(|| format!("invalid percentage `{token}`"))?;
            return Ok(MarginValue::Percent(bounded(value, MAX_MARGIN_PERCENT, token)?));
        }
        if token.parse::<f64>().is_ok_and(|value| value == 0.0) {
            return Ok(MarginValue::Cells(0));
        }
        Err(anyhow!(
            "root margin must be specified in pixels or percent, got `{token}`"
        ))
    }
}

fn bounded(value: f64, limit: f64, token: &str) -> Result<f64> {
    if !value.is_finite() || value.abs() > limit {
        bail!("root margin `{token}` must be a finite value within ±{limit}");
    }
    Ok(value)
}

impl fmt::Display for MarginValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarginValue::Cells(cells) => write!(f, "{cells}px"),
            MarginValue::Percent(percent) => write!(f, "{percent}%"),
        }
    }
}

/// CSS-style margin that grows (or, when negative, shrinks) the root before
/// intersections are computed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootMargin {
    pub top: MarginValue,
    pub right: MarginValue,
    pub bottom: MarginValue,
    pub left: MarginValue,
}

impl RootMargin {
    pub const ZERO: RootMargin = RootMargin::uniform(0);

    pub const fn uniform(cells: i32) -> Self {
        Self {
            top: MarginValue::Cells(cells),
            right: MarginValue::Cells(cells),
            bottom: MarginValue::Cells(cells),
            left: MarginValue::Cells(cells),
        }
    }

    /// Parses the one-to-four value shorthand, e.g. `"0px"`, `"10px 20%"`.
    pub fn parse(input: &str) -> Result<Self> {
        let values = input
            .split_whitespace()
            .map(MarginValue::parse)
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("parse root margin `{input}`"))?;
        let (top, right, bottom, left) = match values.as_slice() {
            [all] => (*all, *all, *all, *all),
            [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
            [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
            [top, right, bottom, left] => (*top, *right, *bottom, *left),
            [] => bail!("root margin is empty"),
            _ => bail!("root margin `{input}` has more than four values"),
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }

    pub fn apply(&self, root: Bounds) -> Bounds {
        root.inset(
            self.top.resolve(root.height).saturating_neg(),
            self.right.resolve(root.width).saturating_neg(),
            self.bottom.resolve(root.height).saturating_neg(),
            self.left.resolve(root.width).saturating_neg(),
        )
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        RootMargin::ZERO
    }
}

impl FromStr for RootMargin {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        RootMargin::parse(s)
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObserverOptions {
    threshold: f64,
    root_margin: RootMargin,
    root: Option<NodeId>,
}

impl ObserverOptions {
    /// `root` of `None` observes against the document body.
    pub fn new(threshold: f64, root_margin: RootMargin, root: Option<NodeId>) -> Result<Self> {
        Ok(Self {
            threshold: validate_threshold(threshold)?,
            root_margin,
            root,
        })
    }

    /// For values already checked with [`validate_threshold`].
    pub(crate) fn from_validated(
        threshold: f64,
        root_margin: RootMargin,
        root: Option<NodeId>,
    ) -> Self {
        Self {
            threshold,
            root_margin,
            root,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn root_margin(&self) -> RootMargin {
        self.root_margin
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            root_margin: RootMargin::ZERO,
            root: None,
        }
    }
}

pub(crate) fn validate_threshold(threshold: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&threshold) {
        bail!("threshold {threshold} must be between 0 and 1");
    }
    Ok(threshold)
}

#[derive(Clone, Debug, PartialEq)]
pub struct IntersectionEntry {
    pub target: NodeId,
    pub is_intersecting: bool,
    pub ratio: f64,
    pub bounds: Option<Bounds>,
    pub root_bounds: Option<Bounds>,
}

struct ObservedTarget {
    node: NodeId,
    last: Option<bool>,
}

struct ObserverEntry {
    options: ObserverOptions,
    handler: Arc<IntersectionHandler>,
    targets: Vec<ObservedTarget>,
}

type Batch = (ObserverId, Arc<IntersectionHandler>, Vec<IntersectionEntry>);

#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_id: u64,
    observers: BTreeMap<ObserverId, ObserverEntry>,
}

impl ObserverRegistry {
    fn create(&mut self, options: ObserverOptions, handler: Arc<IntersectionHandler>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.insert(
            id,
            ObserverEntry {
                options,
                handler,
                targets: Vec::new(),
            },
        );
        id
    }

    fn disconnect(&mut self, id: ObserverId) -> bool {
        self.observers.remove(&id).is_some()
    }

    fn is_connected(&self, id: ObserverId) -> bool {
        self.observers.contains_key(&id)
    }

    fn observe(&mut self, id: ObserverId, node: NodeId) -> bool {
        let Some(observer) = self.observers.get_mut(&id) else {
            return false;
        };
        if !observer.targets.iter().any(|target| target.node == node) {
            observer.targets.push(ObservedTarget { node, last: None });
        }
        true
    }

    fn unobserve(&mut self, id: ObserverId, node: NodeId) -> bool {
        let Some(observer) = self.observers.get_mut(&id) else {
            return false;
        };
        let before = observer.targets.len();
        observer.targets.retain(|target| target.node != node);
        observer.targets.len() != before
    }

    fn observation_count(&self) -> usize {
        self.observers
            .values()
            .map(|observer| observer.targets.len())
            .sum()
    }

    /// Entries for targets that are new or whose state flipped since the
    /// previous evaluation.
    fn collect(&mut self, document: &Document) -> Vec<Batch> {
        let mut batches = Vec::new();
        for (id, observer) in self.observers.iter_mut() {
            let root = observer.options.root.unwrap_or(document.body());
            let root_bounds = document
                .bounds(root)
                .map(|bounds| observer.options.root_margin.apply(bounds));
            let mut entries = Vec::new();
            for observed in &mut observer.targets {
                let bounds = document.bounds(observed.node);
                let (is_intersecting, ratio) = if document.contains(root, observed.node) {
                    measure(bounds, root_bounds, observer.options.threshold)
                } else {
                    (false, 0.0)
                };
                if observed.last == Some(is_intersecting) {
                    continue;
                }
                observed.last = Some(is_intersecting);
                entries.push(IntersectionEntry {
                    target: observed.node,
                    is_intersecting,
                    ratio,
                    bounds,
                    root_bounds,
                });
            }
            if !entries.is_empty() {
                batches.push((*id, observer.handler.clone(), entries));
            }
        }
        batches
    }
}

/// Visible ratio of `target` inside `root` and whether it meets `threshold`.
pub(crate) fn measure(target: Option<Bounds>, root: Option<Bounds>, threshold: f64) -> (bool, f64) {
    let (Some(target), Some(root)) = (target, root) else {
        return (false, 0.0);
    };
    if target.is_empty() {
        let inside = root.contains_point(target.x, target.y);
        return (inside, if inside { 1.0 } else { 0.0 });
    }
    match target.intersection(&root) {
        Some(overlap) => {
            let ratio = f64::from(overlap.area()) / f64::from(target.area());
            (ratio >= threshold, ratio)
        }
        None => (false, 0.0),
    }
}

/// Keeps an intersection observer connected until dropped or disconnected.
pub struct ObserverGuard {
    id: ObserverId,
    inner: Weak<PlatformInner>,
}

impl ObserverGuard {
    pub fn id(&self) -> ObserverId {
        self.id
    }

    pub fn is_connected(&self) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| inner.observers.lock().is_connected(self.id))
    }

    /// Starts observing `node`. The first evaluation afterwards always
    /// reports it.
    pub fn observe(&self, node: NodeId) -> ObservationGuard {
        if let Some(inner) = self.inner.upgrade() {
            if inner.observers.lock().observe(self.id, node) {
                trace!(observer = %self.id, %node, "observing node");
            }
        }
        ObservationGuard {
            observer: self.id,
            node,
            inner: self.inner.clone(),
        }
    }

    /// Drops every observation and the callback. Safe to call repeatedly.
    pub fn disconnect(&self) {
        if let Some(inner) = self.inner.upgrade() {
            if inner.observers.lock().disconnect(self.id) {
                debug!(observer = %self.id, "intersection observer disconnected");
            }
        }
    }
}

impl Drop for ObserverGuard {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl fmt::Debug for ObserverGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverGuard").field("id", &self.id).finish()
    }
}

/// Keeps one node observed until dropped.
pub struct ObservationGuard {
    observer: ObserverId,
    node: NodeId,
    inner: Weak<PlatformInner>,
}

impl ObservationGuard {
    pub fn node(&self) -> NodeId {
        self.node
    }
}

impl Drop for ObservationGuard {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            if inner.observers.lock().unobserve(self.observer, self.node) {
                trace!(observer = %self.observer, node = %self.node, "stopped observing node");
            }
        }
    }
}

impl Platform {
    pub fn create_observer<F>(&self, options: ObserverOptions, handler: F) -> ObserverGuard
    where
        F: Fn(&[IntersectionEntry]) + Send + Sync + 'static,
    {
        let id = self.inner.observers.lock().create(options, Arc::new(handler));
        debug!(observer = %id, "intersection observer created");
        ObserverGuard {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn observation_count(&self) -> usize {
        self.inner.observers.lock().observation_count()
    }

    /// Recomputes every observation against the current layout and delivers
    /// the resulting entries. Returns the number of entries delivered.
    pub fn evaluate_intersections(&self) -> usize {
        let batches = {
            let document = self.inner.document.read();
            self.inner.observers.lock().collect(&document)
        };
        let mut delivered = 0;
        for (id, handler, entries) in batches {
            if !self.inner.observers.lock().is_connected(id) {
                trace!(observer = %id, "skipping observer disconnected during delivery");
                continue;
            }
            handler(&entries);
            delivered += entries.len();
        }
        delivered
    }
}
