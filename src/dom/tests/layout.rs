use crate::dom::layout::arrange;
use crate::dom::{Bounds, FlexDirection, LayoutSpec};

#[test]
fn unsized_children_share_remaining_space() {
    let spec = LayoutSpec::default();
    let placed = arrange(Bounds::new(0, 0, 10, 11), &spec, &[Some(3), None, None]);

    assert_eq!(placed[0], Bounds::new(0, 0, 10, 3));
    assert_eq!(placed[1], Bounds::new(0, 3, 10, 4));
    assert_eq!(placed[2], Bounds::new(0, 7, 10, 4));
}

#[test]
fn remainder_goes_to_last_flexible_child() {
    let spec = LayoutSpec {
        direction: FlexDirection::Row,
        ..LayoutSpec::default()
    };
    let placed = arrange(Bounds::new(2, 1, 11, 3), &spec, &[None, None, Some(2)]);

    assert_eq!(placed[0], Bounds::new(2, 1, 4, 3));
    assert_eq!(placed[1], Bounds::new(6, 1, 5, 3));
    assert_eq!(placed[2], Bounds::new(11, 1, 2, 3));
}

#[test]
fn scroll_container_stacks_from_negative_offset() {
    let spec = LayoutSpec {
        scroll: Some(4),
        ..LayoutSpec::default()
    };
    let placed = arrange(Bounds::new(0, 0, 8, 3), &spec, &[Some(2), None, Some(3)]);

    assert_eq!(placed[0], Bounds::new(0, -4, 8, 2));
    assert_eq!(placed[1], Bounds::new(0, -2, 8, 1));
    assert_eq!(placed[2], Bounds::new(0, -1, 8, 3));
}
