use ratatui::layout::Rect;

use crate::dom::{ElementData, NodeKind, NodeSpec};

mod click;
mod intersection;
mod timers;

pub(super) fn viewport() -> Rect {
    Rect::new(0, 0, 20, 10)
}

pub(super) fn block(key: &str, size: Option<u16>, children: Vec<NodeSpec>) -> NodeSpec {
    let mut data = ElementData::new("div");
    data.layout.size = size;
    NodeSpec {
        key: key.to_string(),
        kind: NodeKind::Element(data),
        children,
    }
}

pub(super) fn label(key: &str, content: &str) -> NodeSpec {
    NodeSpec {
        key: key.to_string(),
        kind: NodeKind::Text(content.to_string()),
        children: Vec::new(),
    }
}
