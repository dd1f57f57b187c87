use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::platform::{ManualClock, Platform, TimerGuard};

use super::viewport;

fn manual_platform() -> (Platform, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    (Platform::with_clock(viewport(), clock.clone()), clock)
}

#[test]
fn timers_fire_in_deadline_order_once_due() {
    let (platform, clock) = manual_platform();
    let fired = Arc::new(Mutex::new(Vec::new()));
    let _late = {
        let fired = fired.clone();
        platform.set_timeout(Duration::from_millis(30), move || fired.lock().push("late"))
    };
    let _early = {
        let fired = fired.clone();
        platform.set_timeout(Duration::from_millis(10), move || fired.lock().push("early"))
    };

    assert_eq!(platform.next_deadline(), Some(Duration::from_millis(10)));
    assert_eq!(platform.run_due_timers(), 0);

    clock.advance(Duration::from_millis(10));
    assert_eq!(platform.run_due_timers(), 1);
    clock.advance(Duration::from_millis(50));
    assert_eq!(platform.run_due_timers(), 1);

    assert_eq!(*fired.lock(), vec!["early", "late"]);
    assert_eq!(platform.pending_timers(), 0);
}

#[test]
fn dropping_guard_cancels_pending_timer() {
    let (platform, clock) = manual_platform();
    let fired = Arc::new(Mutex::new(0usize));
    let guard = {
        let fired = fired.clone();
        platform.set_timeout(Duration::from_millis(5), move || *fired.lock() += 1)
    };
    assert!(guard.is_pending());

    guard.cancel();
    clock.advance(Duration::from_millis(5));

    assert_eq!(platform.run_due_timers(), 0);
    assert_eq!(*fired.lock(), 0);
}

#[test]
fn zero_delay_timer_scheduled_while_firing_waits_for_next_run() {
    let (platform, clock) = manual_platform();
    let chained: Arc<Mutex<Option<TimerGuard>>> = Arc::new(Mutex::new(None));
    let _first = {
        let platform_handle = platform.clone();
        let chained = chained.clone();
        platform.set_timeout(Duration::from_millis(1), move || {
            let next = platform_handle.set_timeout(Duration::ZERO, || {});
            *chained.lock() = Some(next);
        })
    };

    clock.advance(Duration::from_millis(1));
    assert_eq!(platform.run_due_timers(), 1);
    assert_eq!(platform.pending_timers(), 1);
    assert_eq!(platform.run_due_timers(), 1);
    assert!(!chained.lock().as_ref().expect("chained timer").is_pending());
}
