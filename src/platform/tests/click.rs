use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::events::{ClickEvent, EventTarget};
use crate::platform::{ClickListenerGuard, Platform};

use super::{block, label, viewport};

#[test]
fn listeners_run_in_registration_order_until_dropped() {
    let platform = Platform::new(viewport());
    let order = Arc::new(Mutex::new(Vec::new()));

    let first = {
        let order = order.clone();
        platform.add_click_listener(move |_| order.lock().push("first"))
    };
    let _second = {
        let order = order.clone();
        platform.add_click_listener(move |_| order.lock().push("second"))
    };

    assert_eq!(platform.click_node(platform.body()), 2);
    assert_eq!(*order.lock(), vec!["first", "second"]);

    drop(first);
    assert_eq!(platform.click_listener_count(), 1);
    assert_eq!(platform.click_node(platform.body()), 1);
    assert_eq!(*order.lock(), vec!["first", "second", "second"]);
}

#[test]
fn listener_removed_mid_dispatch_is_not_invoked() {
    let platform = Platform::new(viewport());
    let victim_calls = Arc::new(AtomicUsize::new(0));
    let slot: Arc<Mutex<Option<ClickListenerGuard>>> = Arc::new(Mutex::new(None));

    let _remover = {
        let slot = slot.clone();
        platform.add_click_listener(move |_| {
            slot.lock().take();
        })
    };
    let victim = {
        let calls = victim_calls.clone();
        platform.add_click_listener(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
        })
    };
    *slot.lock() = Some(victim);

    assert_eq!(platform.click_node(platform.body()), 1);
    assert_eq!(victim_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn click_at_hit_tests_the_document() {
    let platform = Platform::new(viewport());
    platform.commit(vec![block(
        "0",
        None,
        vec![
            block("0.0", Some(2), vec![label("0.0.0", "header")]),
            block("0.1", None, vec![label("0.1.0", "body text")]),
        ],
    )]);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let _guard = {
        let seen = seen.clone();
        platform.add_click_listener(move |event: &ClickEvent| seen.lock().push(event.clone()))
    };

    platform.click_at(1, 1);
    platform.click_at(40, 40);

    let header = platform.document().find_by_text("header").expect("header");
    let seen = seen.lock();
    assert_eq!(seen[0].target, EventTarget::Node(header));
    assert_eq!(seen[0].position, Some((1, 1)));
    assert_eq!(seen[1].target, EventTarget::Document);
}

#[test]
fn guard_reports_activity_and_tolerates_dropped_platform() {
    let platform = Platform::new(viewport());
    let guard = platform.add_click_listener(|_| {});
    assert!(guard.is_active());

    drop(platform);
    assert!(!guard.is_active());
    drop(guard);
}
