use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

use crate::platform::{Platform, TimerGuard};

use super::handles::{Latest, RefHandle, StateHandle};
use super::scope::Scope;

pub type TimeoutCallback = Arc<dyn Fn() + Send + Sync>;

/// The pending timer plus whether the owning component is still mounted.
/// Nothing is scheduled while `live` is false.
#[derive(Default)]
struct TimerSlot {
    live: bool,
    guard: Option<TimerGuard>,
}

/// Controls for the timer started by [`Scope::use_timeout`].
#[derive(Clone)]
pub struct TimeoutHandle {
    delay: Duration,
    fired_at_render: bool,
    fired: StateHandle<bool>,
    pending: RefHandle<TimerSlot>,
    callback: Latest<TimeoutCallback>,
    platform: Platform,
}

impl TimeoutHandle {
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// True once the timer fired, until the next [`reset`](Self::reset).
    pub fn has_fired(&self) -> bool {
        self.fired.get()
    }

    /// `has_fired` as it was when the component rendered.
    pub fn fired_at_render(&self) -> bool {
        self.fired_at_render
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .with(|slot| slot.guard.as_ref().is_some_and(TimerGuard::is_pending))
    }

    /// Cancels the pending run, if any. `has_fired` is left alone.
    pub fn stop(&self) {
        let guard = self.pending.with_mut(|slot| slot.guard.take());
        if let Some(guard) = guard {
            trace!(timer = %guard.id(), "timeout stopped");
            guard.cancel();
        }
    }

    /// Cancels the pending run, clears `has_fired` and waits the full delay
    /// again from now. Does nothing once the component has unmounted.
    pub fn reset(&self) {
        if !self.pending.with(|slot| slot.live) {
            trace!("reset ignored after unmount");
            return;
        }
        self.stop();
        if self.fired.get() {
            self.fired.set(false);
        }
        self.schedule();
    }

    fn activate(&self) {
        self.pending.with_mut(|slot| slot.live = true);
        self.schedule();
    }

    fn retire(&self) {
        self.pending.with_mut(|slot| slot.live = false);
        self.stop();
    }

    fn schedule(&self) {
        if !self.pending.with(|slot| slot.live) {
            return;
        }
        let fired = self.fired.clone();
        let callback = self.callback.clone();
        let guard = self.platform.set_timeout(self.delay, move || {
            fired.set(true);
            let callback = callback.get();
            callback();
        });
        let stale = self.pending.with_mut(|slot| {
            if slot.live {
                slot.guard.replace(guard)
            } else {
                Some(guard)
            }
        });
        drop(stale);
    }
}

impl fmt::Debug for TimeoutHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeoutHandle")
            .field("delay", &self.delay)
            .field("has_fired", &self.has_fired())
            .field("pending", &self.is_pending())
            .finish()
    }
}

impl Scope {
    /// Runs `callback` once, `delay` after mount. Changing `delay` restarts
    /// the timer; changing `callback` does not.
    pub fn use_timeout<F>(&mut self, callback: F, delay: Duration) -> TimeoutHandle
    where
        F: Fn() + Send + Sync + 'static,
    {
        let callback: Latest<TimeoutCallback> = self.use_latest(Arc::new(callback));
        let (fired_at_render, fired) = self.use_state(|| false);
        let pending = self.use_ref(TimerSlot::default);
        let handle = TimeoutHandle {
            delay,
            fired_at_render,
            fired,
            pending,
            callback,
            platform: self.platform().clone(),
        };

        let timer = handle.clone();
        self.use_effect(delay, move |_| {
            timer.activate();
            Some(Box::new(move || timer.retire()))
        });
        handle
    }
}
