use std::sync::Arc;

use parking_lot::Mutex;

use crate::dom::Bounds;
use crate::platform::intersection::measure;
use crate::platform::{IntersectionEntry, MarginValue, ObserverOptions, Platform, RootMargin};

use super::{block, viewport};

fn recorder() -> (
    Arc<Mutex<Vec<IntersectionEntry>>>,
    impl Fn(&[IntersectionEntry]) + Send + Sync + 'static,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    (seen, move |entries: &[IntersectionEntry]| {
        sink.lock().extend_from_slice(entries)
    })
}

fn scrolled_list(offset: u16) -> Vec<crate::dom::NodeSpec> {
    let mut list = block(
        "0",
        None,
        (0..6)
            .map(|index| block(&format!("0.{index}"), Some(4), Vec::new()))
            .collect(),
    );
    if let crate::dom::NodeKind::Element(data) = &mut list.kind {
        data.layout.scroll = Some(offset);
    }
    vec![list]
}

#[test]
fn parses_css_margin_shorthand() {
    let margin = RootMargin::parse("10px 20%").expect("valid margin");
    assert_eq!(margin.top, MarginValue::Cells(10));
    assert_eq!(margin.right, MarginValue::Percent(20.0));
    assert_eq!(margin.bottom, MarginValue::Cells(10));
    assert_eq!(margin.left, MarginValue::Percent(20.0));

    let three = RootMargin::parse("1px 2px -3px").expect("valid margin");
    assert_eq!(three.bottom, MarginValue::Cells(-3));
    assert_eq!(three.left, MarginValue::Cells(2));

    assert_eq!(RootMargin::parse("0").expect("unitless zero"), RootMargin::ZERO);
    assert_eq!("0px".parse::<RootMargin>().expect("zero"), RootMargin::default());
}

#[test]
fn rejects_malformed_margins_and_thresholds() {
    assert!(RootMargin::parse("").is_err());
    assert!(RootMargin::parse("10em").is_err());
    assert!(RootMargin::parse("1px 2px 3px 4px 5px").is_err());
    let err = ObserverOptions::new(1.5, RootMargin::ZERO, None).expect_err("out of range");
    assert!(err.to_string().contains("between 0 and 1"));
}

#[test]
fn rejects_non_finite_and_oversized_margins() {
    for input in ["-1e12px", "1e12px", "infpx", "NaNpx", "NaN%", "inf%", "-inf%", "1e9%"] {
        assert!(RootMargin::parse(input).is_err(), "{input} should be rejected");
    }
    let widest = RootMargin::parse("32767px -1000%").expect("limits are inclusive");
    assert_eq!(widest.top, MarginValue::Cells(32767));
    assert_eq!(widest.left, MarginValue::Percent(-1000.0));
}

#[test]
fn extreme_margins_saturate_instead_of_overflowing() {
    let root = Bounds::new(0, 0, 40, 20);

    let shrunk = RootMargin::uniform(i32::MIN).apply(root);
    assert!(shrunk.is_empty());

    let grown = RootMargin::uniform(i32::MAX).apply(root);
    assert!(grown.contains_point(0, 0));
    assert!(grown.contains_point(39, 19));
    assert_eq!(grown.width, u16::MAX);
}

#[test]
fn margin_grows_root_by_cells_and_percent() {
    let margin = RootMargin::parse("2px 10%").expect("valid margin");
    let grown = margin.apply(Bounds::new(0, 0, 20, 10));
    assert_eq!(grown, Bounds::new(-2, -2, 24, 14));
}

#[test]
fn measure_applies_threshold_to_visible_ratio() {
    let root = Some(Bounds::new(0, 0, 10, 10));
    let half = Some(Bounds::new(0, 8, 10, 4));

    assert_eq!(measure(half, root, 0.0), (true, 0.5));
    assert_eq!(measure(half, root, 0.75), (false, 0.5));
    assert_eq!(measure(Some(Bounds::new(0, 12, 4, 4)), root, 0.0), (false, 0.0));
    assert_eq!(measure(None, root, 0.0), (false, 0.0));
}

#[test]
fn first_evaluation_reports_then_only_changes_are_delivered() {
    let platform = Platform::new(viewport());
    platform.commit(scrolled_list(0));
    let (seen, handler) = recorder();
    let observer = platform.create_observer(ObserverOptions::default(), handler);
    let fourth = platform.document().node_for_key("0.3").expect("fourth row");
    let _observation = observer.observe(fourth);

    assert_eq!(platform.evaluate_intersections(), 1);
    assert!(!seen.lock()[0].is_intersecting);

    assert_eq!(platform.evaluate_intersections(), 0);

    platform.commit(scrolled_list(6));
    assert_eq!(platform.evaluate_intersections(), 1);
    let entry = seen.lock()[1].clone();
    assert!(entry.is_intersecting);
    assert_eq!(entry.target, fourth);
    assert_eq!(entry.bounds, Some(Bounds::new(0, 6, 20, 4)));
}

#[test]
fn dropping_guards_stops_delivery() {
    let platform = Platform::new(viewport());
    platform.commit(scrolled_list(0));
    let (seen, handler) = recorder();
    let observer = platform.create_observer(ObserverOptions::default(), handler);
    let first = platform.document().node_for_key("0.0").expect("first row");

    let observation = observer.observe(first);
    assert_eq!(platform.observation_count(), 1);
    drop(observation);
    assert_eq!(platform.observation_count(), 0);
    assert_eq!(platform.evaluate_intersections(), 0);

    let _again = observer.observe(first);
    observer.disconnect();
    observer.disconnect();
    assert!(!observer.is_connected());
    assert_eq!(platform.evaluate_intersections(), 0);
    assert!(seen.lock().is_empty());
}

#[test]
fn targets_outside_custom_root_never_intersect() {
    let platform = Platform::new(viewport());
    platform.commit(vec![
        block("0", Some(5), Vec::new()),
        block("1", Some(5), Vec::new()),
    ]);
    let root = platform.document().node_for_key("0");
    let other = platform.document().node_for_key("1").expect("second block");
    let (seen, handler) = recorder();
    let options = ObserverOptions::new(0.0, RootMargin::uniform(10), root).expect("options");
    let observer = platform.create_observer(options, handler);
    let _observation = observer.observe(other);

    platform.evaluate_intersections();

    assert!(!seen.lock()[0].is_intersecting);
}
