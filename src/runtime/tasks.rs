use std::time::Duration;

use crossterm::event::EventStream;
use futures::StreamExt;
use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::events::{FrameworkEvent, is_ctrl_c, map_terminal_event};

use super::dispatcher::AppMessage;

/// Spawns the background tasks that feed [`App::run`](super::App::run).
pub trait RuntimeDriver: Send + Sync {
    fn spawn_input(&self, tx: mpsc::Sender<AppMessage>) -> JoinHandle<()>;
    fn spawn_ticker(&self, tx: mpsc::Sender<AppMessage>, rate: Duration) -> JoinHandle<()>;
    fn spawn_shutdown_watcher(&self, tx: mpsc::Sender<AppMessage>) -> JoinHandle<()>;
}

#[derive(Default)]
pub struct DefaultRuntimeDriver;

impl RuntimeDriver for DefaultRuntimeDriver {
    fn spawn_input(&self, tx: mpsc::Sender<AppMessage>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut events = EventStream::new();
            while let Some(event) = events.next().await {
                let event = match event {
                    Ok(event) => event,
                    Err(err) => {
                        warn!(error = %err, "terminal event stream failed");
                        break;
                    }
                };
                let Some(mapped) = map_terminal_event(event) else {
                    continue;
                };
                let shutdown = is_ctrl_c(&mapped);
                if tx.send(AppMessage::ExternalEvent(mapped)).await.is_err() {
                    break;
                }
                if shutdown {
                    let _ = tx.send(AppMessage::Shutdown).await;
                    break;
                }
            }
            debug!("terminal input task finished");
        })
    }

    fn spawn_ticker(&self, tx: mpsc::Sender<AppMessage>, rate: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(rate);
            loop {
                ticker.tick().await;
                if tx
                    .send(AppMessage::ExternalEvent(FrameworkEvent::Tick))
                    .await
                    .is_err()
                {
                    break;
                }
            }
        })
    }

    fn spawn_shutdown_watcher(&self, tx: mpsc::Sender<AppMessage>) -> JoinHandle<()> {
        tokio::spawn(async move {
            if signal::ctrl_c().await.is_ok() {
                let _ = tx.send(AppMessage::Shutdown).await;
            }
        })
    }
}
