use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::trace;

use super::{Platform, PlatformInner};

/// Monotonic time source for the timer queue, measured from an arbitrary
/// origin.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to.
#[derive(Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) -> Duration {
        let mut now = self.now.lock();
        *now += by;
        *now
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

type TimerTask = Box<dyn FnOnce() + Send + 'static>;

/// Pending one-shot timers ordered by deadline, ties broken by creation.
#[derive(Default)]
pub(crate) struct TimerQueue {
    next_id: u64,
    queue: BTreeMap<(Duration, TimerId), TimerTask>,
    deadlines: HashMap<TimerId, Duration>,
}

impl TimerQueue {
    fn schedule(&mut self, deadline: Duration, task: TimerTask) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.queue.insert((deadline, id), task);
        self.deadlines.insert(id, deadline);
        id
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id) {
            Some(deadline) => self.queue.remove(&(deadline, id)).is_some(),
            None => false,
        }
    }

    fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    /// Next timer due at `now` that was created before `watermark`.
    fn pop_due(&mut self, now: Duration, watermark: u64) -> Option<(TimerId, TimerTask)> {
        let key = self
            .queue
            .keys()
            .find(|(deadline, id)| *deadline <= now && id.0 < watermark)
            .copied()?;
        let task = self.queue.remove(&key)?;
        self.deadlines.remove(&key.1);
        Some((key.1, task))
    }

    fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}

/// Cancels its timer when dropped unless the timer already fired.
pub struct TimerGuard {
    id: TimerId,
    inner: Weak<PlatformInner>,
}

impl TimerGuard {
    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn is_pending(&self) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| inner.timers.lock().is_pending(self.id))
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            if inner.timers.lock().cancel(self.id) {
                trace!(timer = %self.id, "timer cancelled");
            }
        }
    }
}

impl fmt::Debug for TimerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerGuard").field("id", &self.id).finish()
    }
}

impl Platform {
    pub fn set_timeout<F>(&self, delay: Duration, task: F) -> TimerGuard
    where
        F: FnOnce() + Send + 'static,
    {
        let deadline = self.inner.clock.now() + delay;
        let id = self.inner.timers.lock().schedule(deadline, Box::new(task));
        trace!(timer = %id, delay_ms = delay.as_millis() as u64, "timer scheduled");
        TimerGuard {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Fires every timer whose deadline has passed. Timers scheduled by a
    /// firing callback wait for the next call, even with a zero delay.
    pub fn run_due_timers(&self) -> usize {
        let now = self.inner.clock.now();
        let watermark = self.inner.timers.lock().next_id;
        let mut fired = 0;
        loop {
            let Some((id, task)) = self.inner.timers.lock().pop_due(now, watermark) else {
                break;
            };
            trace!(timer = %id, "timer fired");
            task();
            fired += 1;
        }
        fired
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.inner.timers.lock().next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.inner.timers.lock().len()
    }
}
