use crate::hooks::{IntersectionConfig, StateHandle};
use crate::runtime::{ComponentElement, Element, Headless, component};

use super::{Exported, viewport};

struct Feed {
    reports: Exported<Vec<bool>>,
    offset: Exported<StateHandle<u16>>,
    threshold: Exported<StateHandle<f64>>,
}

impl Feed {
    fn new() -> Self {
        let reports = Exported::new();
        reports.put(Vec::new());
        Self {
            reports,
            offset: Exported::new(),
            threshold: Exported::new(),
        }
    }

    /// Six rows of height four in a scroll container filling the 20-row
    /// viewport; the last row is observed.
    fn component(&self, initial_offset: u16) -> ComponentElement {
        let reports = self.reports.clone();
        let offset_out = self.offset.clone();
        let threshold_out = self.threshold.clone();
        component("Feed", move |scope| {
            let (offset, set_offset) = scope.use_state(|| initial_offset);
            let (threshold, set_threshold) = scope.use_state(|| 0.0f64);
            offset_out.put(set_offset);
            threshold_out.put(set_threshold);

            let target = scope.use_node_ref();
            let reports = reports.clone();
            let config = IntersectionConfig::new().threshold(threshold).unwrap();
            scope.use_intersection_with(
                &target,
                move |visible| reports.0.lock().get_or_insert_with(Vec::new).push(visible),
                config,
            );

            let rows = (0..6).map(|index| {
                let row = Element::node("row").size(4).child(format!("row {index}"));
                if index == 5 { row.bind(&target) } else { row }
            });
            Element::node("list").scroll(offset).children(rows).into()
        })
    }

    fn reports(&self) -> Vec<bool> {
        self.reports.get()
    }

    fn scroll_to(&self, app: &mut Headless, offset: u16) {
        self.offset.get().set(offset);
        app.settle().unwrap();
    }
}

#[test]
fn first_notification_is_dropped_and_changes_are_forwarded() {
    let feed = Feed::new();
    let mut app = Headless::mount(feed.component(0), viewport()).unwrap();
    assert_eq!(app.platform().observation_count(), 1);
    assert!(feed.reports().is_empty());

    feed.scroll_to(&mut app, 8);
    assert_eq!(feed.reports(), vec![true]);

    feed.scroll_to(&mut app, 6);
    assert_eq!(feed.reports(), vec![true]);

    feed.scroll_to(&mut app, 0);
    assert_eq!(feed.reports(), vec![true, false]);
}

#[test]
fn initially_visible_target_is_not_reported() {
    let feed = Feed::new();
    let mut app = Headless::mount(feed.component(8), viewport()).unwrap();
    assert!(feed.reports().is_empty());

    feed.scroll_to(&mut app, 0);
    assert_eq!(feed.reports(), vec![false]);
}

#[test]
fn option_change_recreates_the_observer() {
    let feed = Feed::new();
    let mut app = Headless::mount(feed.component(2), viewport()).unwrap();

    feed.threshold.get().set(1.0);
    app.settle().unwrap();
    assert_eq!(app.platform().observation_count(), 1);
    assert!(feed.reports().is_empty());

    feed.scroll_to(&mut app, 8);
    assert_eq!(feed.reports(), vec![true]);
}

#[test]
fn unmount_stops_observing() {
    let feed = Feed::new();
    let mut app = Headless::mount(feed.component(0), viewport()).unwrap();

    app.unmount();
    assert_eq!(app.platform().observation_count(), 0);
    assert_eq!(app.platform().evaluate_intersections(), 0);
    assert!(feed.reports().is_empty());
}

#[test]
fn config_validates_its_inputs() {
    assert!(IntersectionConfig::new().threshold(1.5).is_err());
    assert!(IntersectionConfig::new().threshold(-0.1).is_err());
    assert!(IntersectionConfig::new().root_margin("4px 2em").is_err());
    assert!(IntersectionConfig::new().root_margin("4px 10%").is_ok());
    assert!(IntersectionConfig::new().root_margin("NaN%").is_err());
    assert!(IntersectionConfig::new().root_margin("inf%").is_err());
    assert!(IntersectionConfig::new().root_margin("-1e12px").is_err());
}

/// Same rows as [`Feed`], but the bound row is chosen by state.
fn switchable(
    reports: Exported<Vec<bool>>,
    offset_out: Exported<StateHandle<u16>>,
    bound_out: Exported<StateHandle<usize>>,
) -> ComponentElement {
    component("Switchable", move |scope| {
        let (offset, set_offset) = scope.use_state(|| 0u16);
        let (bound, set_bound) = scope.use_state(|| 5usize);
        offset_out.put(set_offset);
        bound_out.put(set_bound);

        let target = scope.use_node_ref();
        let reports = reports.clone();
        scope.use_intersection(&target, move |visible| {
            reports.0.lock().get_or_insert_with(Vec::new).push(visible)
        });

        let rows = (0..6).map(|index| {
            let row = Element::node("row").size(4).child(format!("row {index}"));
            if index == bound { row.bind(&target) } else { row }
        });
        Element::node("list").scroll(offset).children(rows).into()
    })
}

#[test]
fn new_target_drops_its_first_notification() {
    let reports = Exported::new();
    reports.put(Vec::new());
    let offset = Exported::new();
    let bound = Exported::new();
    let mut app = Headless::mount(
        switchable(reports.clone(), offset.clone(), bound.clone()),
        viewport(),
    )
    .unwrap();
    assert!(reports.get().is_empty());

    bound.get().set(0);
    app.settle().unwrap();
    assert_eq!(app.platform().observation_count(), 1);
    assert!(reports.get().is_empty());

    offset.get().set(4);
    app.settle().unwrap();
    assert_eq!(reports.get(), vec![false]);
}

/// A scroll window of eight rows inside the body, used as the observer
/// root. Row 2 starts just below the window.
fn windowed(
    reports: Exported<Vec<bool>>,
    offset_out: Exported<StateHandle<u16>>,
) -> ComponentElement {
    component("Windowed", move |scope| {
        let (offset, set_offset) = scope.use_state(|| 0u16);
        offset_out.put(set_offset);

        let window = scope.use_node_ref();
        let target = scope.use_node_ref();
        let reports = reports.clone();
        scope.use_intersection_with(
            &target,
            move |visible| reports.0.lock().get_or_insert_with(Vec::new).push(visible),
            IntersectionConfig::new().root(&window),
        );

        let rows = (0..4).map(|index| {
            let row = Element::node("row").size(4).child(format!("row {index}"));
            if index == 2 { row.bind(&target) } else { row }
        });
        Element::node("page")
            .child(
                Element::node("window")
                    .size(8)
                    .scroll(offset)
                    .children(rows)
                    .bind(&window),
            )
            .into()
    })
}

#[test]
fn custom_root_bound_after_mount_recreates_and_reprimes() {
    let reports = Exported::new();
    reports.put(Vec::new());
    let offset = Exported::new();
    let mut app = Headless::mount(windowed(reports.clone(), offset.clone()), viewport()).unwrap();
    assert_eq!(app.platform().observation_count(), 1);
    assert!(reports.get().is_empty());

    offset.get().set(4);
    app.settle().unwrap();
    assert_eq!(reports.get(), vec![true]);

    offset.get().set(0);
    app.settle().unwrap();
    assert_eq!(reports.get(), vec![true, false]);
    assert_eq!(app.platform().observation_count(), 1);
}
