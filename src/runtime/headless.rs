use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use ratatui::layout::Rect;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, trace};

use crate::dom::NodeId;
use crate::events::EventBus;
use crate::platform::{ManualClock, Platform};

use super::component::ComponentElement;
use super::dispatcher::{AppMessage, Dispatcher};
use super::reconciler::{Reconciler, RenderPass};

const MAX_SETTLE_PASSES: usize = 32;

/// Runs a component tree without a terminal. Time only moves through
/// [`advance`](Headless::advance), and every interaction settles the tree
/// before returning.
pub struct Headless {
    reconciler: Reconciler,
    platform: Platform,
    clock: Arc<ManualClock>,
    dispatcher: Dispatcher,
    event_bus: EventBus,
    rx: mpsc::Receiver<AppMessage>,
    mounted: bool,
}

impl Headless {
    pub fn new(root: ComponentElement, viewport: Rect) -> Self {
        let clock = Arc::new(ManualClock::new());
        let platform = Platform::with_clock(viewport, clock.clone());
        let event_bus = EventBus::new(64);
        let (tx, rx) = mpsc::channel(64);
        let dispatcher = Dispatcher::new(tx, event_bus.clone());
        let reconciler = Reconciler::new(root, platform.clone(), dispatcher.clone());
        Self {
            reconciler,
            platform,
            clock,
            dispatcher,
            event_bus,
            rx,
            mounted: true,
        }
    }

    /// Creates the harness and settles the first render.
    pub fn mount(root: ComponentElement, viewport: Rect) -> Result<Self> {
        let mut headless = Self::new(root, viewport);
        headless.settle().context("initial render")?;
        Ok(headless)
    }

    /// One render pass, regardless of pending requests.
    pub fn render(&mut self) -> Result<RenderPass> {
        if !self.mounted {
            bail!("render after unmount");
        }
        self.reconciler.render()
    }

    /// Renders until no further render is requested. Returns the number of
    /// passes.
    pub fn settle(&mut self) -> Result<usize> {
        if !self.mounted {
            return Ok(0);
        }
        let mut passes = 0;
        loop {
            self.render()?;
            passes += 1;
            if !self.drain_messages() {
                trace!(passes, "tree settled");
                return Ok(passes);
            }
            if passes >= MAX_SETTLE_PASSES {
                bail!("tree did not settle after {passes} render passes");
            }
        }
    }

    /// Clicks the cell, as a terminal left-button press would. Returns how
    /// many listeners ran.
    pub fn click_at(&mut self, column: u16, row: u16) -> Result<usize> {
        let delivered = self.platform.click_at(column, row);
        self.settle()?;
        Ok(delivered)
    }

    pub fn click_node(&mut self, node: NodeId) -> Result<usize> {
        let delivered = self.platform.click_node(node);
        self.settle()?;
        Ok(delivered)
    }

    /// Clicks the element that directly holds `text`.
    pub fn click_text(&mut self, text: &str) -> Result<usize> {
        let node = self
            .find_text(text)
            .with_context(|| format!("no element holds text {text:?}"))?;
        self.click_node(node)
    }

    pub fn find_text(&self, text: &str) -> Option<NodeId> {
        self.platform.document().find_by_text(text)
    }

    /// Moves the clock forward and fires every timer that came due. Returns
    /// the number fired.
    pub fn advance(&mut self, by: Duration) -> Result<usize> {
        let now = self.clock.advance(by);
        let fired = self.platform.run_due_timers();
        debug!(now = ?now, fired, "clock advanced");
        self.settle()?;
        Ok(fired)
    }

    pub fn resize(&mut self, viewport: Rect) -> Result<usize> {
        self.platform.resize(viewport);
        self.settle()
    }

    /// Unmounts the tree, running every cleanup. Later calls do nothing.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.reconciler.unmount();
        self.drain_messages();
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn component_count(&self) -> usize {
        self.reconciler.hooks().component_count()
    }

    /// Returns whether a render was requested.
    fn drain_messages(&mut self) -> bool {
        let mut render = false;
        loop {
            match self.rx.try_recv() {
                Ok(AppMessage::RequestRender) => render = true,
                Ok(AppMessage::ExternalEvent(event)) => self.event_bus.publish(event),
                Ok(AppMessage::Shutdown) => trace!("shutdown ignored by headless runtime"),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return render,
            }
        }
    }
}

impl Drop for Headless {
    fn drop(&mut self) {
        self.unmount();
    }
}
