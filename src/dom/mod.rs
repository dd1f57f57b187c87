use std::collections::HashMap;
use std::fmt;

use ratatui::layout::Rect;
use ratatui::style::Color;
use unicode_width::UnicodeWidthStr;

mod bounds;
mod layout;
#[cfg(test)]
mod tests;

pub use bounds::Bounds;
pub use layout::{FlexDirection, LayoutSpec};

const BODY_KEY: &str = "body";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Element(ElementData),
    Text(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ElementData {
    pub tag: &'static str,
    pub title: Option<String>,
    pub color: Option<Color>,
    pub layout: LayoutSpec,
}

impl ElementData {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            title: None,
            color: None,
            layout: LayoutSpec::default(),
        }
    }
}

impl NodeKind {
    fn same_type(&self, other: &NodeKind) -> bool {
        match (self, other) {
            (NodeKind::Element(a), NodeKind::Element(b)) => a.tag == b.tag,
            (NodeKind::Text(_), NodeKind::Text(_)) => true,
            _ => false,
        }
    }
}

/// Description of one node produced by a render pass. `key` identifies the
/// node across passes so that unchanged positions keep their [`NodeId`].
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSpec {
    pub key: String,
    pub kind: NodeKind,
    pub children: Vec<NodeSpec>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitSummary {
    pub created: usize,
    pub retained: usize,
    pub removed: Vec<NodeId>,
}

struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    bounds: Bounds,
}

/// The laid-out node tree hooks observe. The body element always exists and
/// covers the viewport.
pub struct Document {
    nodes: HashMap<NodeId, NodeData>,
    keys: HashMap<String, NodeId>,
    body: NodeId,
    next_id: u64,
    viewport: Rect,
}

impl Document {
    pub fn new(viewport: Rect) -> Self {
        let body = NodeId(0);
        let mut body_data = ElementData::new("body");
        body_data.layout.direction = FlexDirection::Column;
        let mut nodes = HashMap::new();
        nodes.insert(
            body,
            NodeData {
                kind: NodeKind::Element(body_data),
                parent: None,
                children: Vec::new(),
                bounds: Bounds::from(viewport),
            },
        );
        let mut keys = HashMap::new();
        keys.insert(BODY_KEY.to_string(), body);
        Self {
            nodes,
            keys,
            body,
            next_id: 1,
            viewport,
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
        self.layout();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(&id).map(|node| &node.kind)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::Element(_)))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn bounds(&self, id: NodeId) -> Option<Bounds> {
        self.nodes.get(&id).map(|node| node.bounds)
    }

    pub fn node_for_key(&self, key: &str) -> Option<NodeId> {
        self.keys.get(key).copied()
    }

    /// Inclusive containment: a node contains itself and every descendant.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if !self.nodes.contains_key(&ancestor) {
            return false;
        }
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.nodes.get(&current).and_then(|data| data.parent);
        }
        false
    }

    /// Deepest element under the cell, or `None` when the point lies outside
    /// the body. Text nodes are never hit; their element is.
    pub fn hit_test(&self, column: u16, row: u16) -> Option<NodeId> {
        let (column, row) = (i32::from(column), i32::from(row));
        let body = self.nodes.get(&self.body)?;
        if !body.bounds.contains_point(column, row) {
            return None;
        }
        let mut current = self.body;
        loop {
            let next = self.children(current).iter().rev().copied().find(|child| {
                self.nodes.get(child).is_some_and(|data| {
                    matches!(data.kind, NodeKind::Element(_))
                        && data.bounds.contains_point(column, row)
                })
            });
            match next {
                Some(child) => current = child,
                None => return Some(current),
            }
        }
    }

    /// First element, in document order, with a text child equal to `text`.
    pub fn find_by_text(&self, text: &str) -> Option<NodeId> {
        let mut stack = vec![self.body];
        while let Some(id) = stack.pop() {
            let node = self.nodes.get(&id)?;
            if let NodeKind::Text(content) = &node.kind {
                if content.trim() == text {
                    return node.parent;
                }
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// Replaces the body's subtree with `children`, keeping node ids for keys
    /// that survive with the same node type, then lays the tree out again.
    pub fn commit(&mut self, children: Vec<NodeSpec>) -> CommitSummary {
        let mut summary = CommitSummary::default();
        let mut seen = HashMap::new();
        seen.insert(BODY_KEY.to_string(), self.body);
        let body = self.body;
        let child_ids = children
            .into_iter()
            .map(|spec| self.commit_node(spec, body, &mut seen, &mut summary))
            .collect();
        if let Some(body_data) = self.nodes.get_mut(&body) {
            body_data.children = child_ids;
        }

        let stale: Vec<NodeId> = self
            .keys
            .iter()
            .filter(|(key, id)| seen.get(key.as_str()) != Some(*id))
            .map(|(_, id)| *id)
            .collect();
        for id in stale {
            self.nodes.remove(&id);
            summary.removed.push(id);
        }
        self.keys = seen;
        self.layout();
        summary
    }

    fn commit_node(
        &mut self,
        spec: NodeSpec,
        parent: NodeId,
        seen: &mut HashMap<String, NodeId>,
        summary: &mut CommitSummary,
    ) -> NodeId {
        let NodeSpec {
            key,
            kind,
            children,
        } = spec;
        let reused = self
            .keys
            .get(&key)
            .copied()
            .filter(|id| !seen.values().any(|taken| taken == id))
            .filter(|id| {
                self.nodes
                    .get(id)
                    .is_some_and(|existing| existing.kind.same_type(&kind))
            });
        let id = match reused {
            Some(id) => {
                summary.retained += 1;
                id
            }
            None => {
                summary.created += 1;
                self.allocate()
            }
        };
        seen.insert(key, id);
        self.nodes.insert(
            id,
            NodeData {
                kind,
                parent: Some(parent),
                children: Vec::new(),
                bounds: Bounds::default(),
            },
        );
        let child_ids = children
            .into_iter()
            .map(|child| self.commit_node(child, id, seen, summary))
            .collect();
        if let Some(data) = self.nodes.get_mut(&id) {
            data.children = child_ids;
        }
        id
    }

    fn allocate(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn layout(&mut self) {
        let body = self.body;
        if let Some(data) = self.nodes.get_mut(&body) {
            data.bounds = Bounds::from(self.viewport);
        }
        self.layout_children(body);
    }

    fn layout_children(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let NodeKind::Element(element) = &node.kind else {
            return;
        };
        let spec = element.layout;
        let area = spec.content_area(node.bounds);
        let children = node.children.clone();
        let lengths: Vec<Option<u16>> = children
            .iter()
            .map(|child| self.main_length(*child, spec.direction))
            .collect();
        let placed = layout::arrange(area, &spec, &lengths);
        for (child, bounds) in children.iter().zip(placed) {
            if let Some(data) = self.nodes.get_mut(child) {
                data.bounds = bounds;
            }
            self.layout_children(*child);
        }
    }

    fn main_length(&self, id: NodeId, direction: FlexDirection) -> Option<u16> {
        match self.kind(id)? {
            NodeKind::Element(element) => element.layout.size,
            NodeKind::Text(content) => match direction {
                FlexDirection::Column => Some(1),
                FlexDirection::Row => Some(content.width().min(usize::from(u16::MAX)) as u16),
            },
        }
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("viewport", &self.viewport)
            .finish()
    }
}
