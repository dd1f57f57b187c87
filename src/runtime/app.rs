use std::env;
use std::future::{Future, pending};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use ratatui::layout::Rect;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{info, trace, warn};

use crate::events::{DEFAULT_TICK_RATE, EventBus, FrameworkEvent, click_position};
use crate::platform::{Clock, Platform, SystemClock};
use crate::renderer::Renderer;

use super::component::ComponentElement;
use super::dispatcher::{AppMessage, Dispatcher};
use super::reconciler::Reconciler;
use super::tasks::{DefaultRuntimeDriver, RuntimeDriver};

pub const TICK_RATE_ENV: &str = "RUSTACT_TICK_MS";
pub const EVENT_BUFFER_ENV: &str = "RUSTACT_EVENT_BUFFER";

const DEFAULT_EVENT_BUFFER: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub tick_rate: Duration,
    pub event_buffer: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `RUSTACT_TICK_MS` and `RUSTACT_EVENT_BUFFER`.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| env::var(name).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(millis) = parse_var::<u64>(&lookup, TICK_RATE_ENV)? {
            config.tick_rate = Duration::from_millis(millis.max(1));
        }
        if let Some(buffer) = parse_var::<usize>(&lookup, EVENT_BUFFER_ENV)? {
            config.event_buffer = buffer.max(1);
        }
        Ok(config)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let value = raw
        .trim()
        .parse()
        .with_context(|| format!("invalid {name}={raw:?}"))?;
    Ok(Some(value))
}

/// Terminal host: renders the tree with ratatui and feeds it crossterm
/// input, due timers and intersection updates.
#[derive(Clone)]
pub struct App {
    name: &'static str,
    root: ComponentElement,
    config: AppConfig,
    driver: Arc<dyn RuntimeDriver>,
    clock: Arc<dyn Clock>,
}

impl App {
    pub fn new(name: &'static str, root: ComponentElement) -> Self {
        Self {
            name,
            root,
            config: AppConfig::default(),
            driver: Arc::new(DefaultRuntimeDriver),
            clock: Arc::new(SystemClock::default()),
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_driver<D>(mut self, driver: D) -> Self
    where
        D: RuntimeDriver + 'static,
    {
        self.driver = Arc::new(driver);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> AppConfig {
        self.config
    }

    pub async fn run(self) -> Result<()> {
        info!(app = self.name, "starting runtime");
        let (tx, mut rx) = mpsc::channel(128);
        let event_bus = EventBus::new(self.config.event_buffer);
        let dispatcher = Dispatcher::new(tx.clone(), event_bus.clone());
        let mut renderer = Renderer::new(self.name).context("initialize renderer")?;
        let viewport = renderer.size().context("query terminal size")?;
        let platform = Platform::with_clock(viewport, self.clock.clone());
        let mut reconciler = Reconciler::new(self.root.clone(), platform.clone(), dispatcher.clone());

        let input_task = self.driver.spawn_input(tx.clone());
        let tick_task = self.driver.spawn_ticker(tx.clone(), self.config.tick_rate);
        let shutdown_task = self.driver.spawn_shutdown_watcher(tx);

        dispatcher.request_render();
        let result = loop {
            let timer = sleep_until_due(&platform);
            tokio::select! {
                message = rx.recv() => {
                    let Some(message) = message else {
                        break Ok(());
                    };
                    trace!(app = self.name, message = ?message, "processing app message");
                    match message {
                        AppMessage::RequestRender => {
                            if let Err(err) = reconciler.render() {
                                break Err(err);
                            }
                            if let Err(err) = renderer.draw(&platform.document()) {
                                warn!(app = self.name, error = ?err, "renderer draw failed");
                                break Err(err);
                            }
                            trace!(app = self.name, "frame drawn");
                        }
                        AppMessage::ExternalEvent(event) => {
                            self.handle_event(event, &platform, &event_bus, &dispatcher);
                        }
                        AppMessage::Shutdown => {
                            info!(app = self.name, "shutdown requested");
                            break Ok(());
                        }
                    }
                }
                () = timer => {
                    let fired = platform.run_due_timers();
                    trace!(app = self.name, fired, "timers fired");
                }
            }
        };

        reconciler.unmount();
        drop(renderer);
        trace!(app = self.name, "tearing down runtime tasks");
        abort_and_log("terminal_input", input_task).await;
        abort_and_log("ticker", tick_task).await;
        abort_and_log("shutdown_watcher", shutdown_task).await;
        info!(app = self.name, "runtime stopped");
        result
    }

    fn handle_event(
        &self,
        event: FrameworkEvent,
        platform: &Platform,
        event_bus: &EventBus,
        dispatcher: &Dispatcher,
    ) {
        trace!(app = self.name, event = ?event, "dispatching external event");
        if let FrameworkEvent::Resize(width, height) = event {
            platform.resize(Rect::new(0, 0, width, height));
            platform.evaluate_intersections();
            dispatcher.request_render();
        }
        if let Some((column, row)) = click_position(&event) {
            let delivered = platform.click_at(column, row);
            trace!(app = self.name, column, row, delivered, "click dispatched");
        }
        event_bus.publish(event);
    }
}

fn sleep_until_due(platform: &Platform) -> impl Future<Output = ()> + use<> {
    let delay = platform
        .next_deadline()
        .map(|deadline| deadline.saturating_sub(platform.now()));
    async move {
        match delay {
            Some(delay) => sleep(delay).await,
            None => pending().await,
        }
    }
}

async fn abort_and_log(label: &str, handle: JoinHandle<()>) {
    handle.abort();
    match handle.await {
        Ok(_) => trace!(task = label, "task aborted cleanly"),
        Err(err) if err.is_cancelled() => trace!(task = label, "task cancellation confirmed"),
        Err(err) => warn!(task = label, error = ?err, "task join failed"),
    }
}
