use ratatui::style::Color;

use crate::dom::{ElementData, FlexDirection};
use crate::hooks::NodeRef;

use super::component::ComponentElement;

#[derive(Clone, Debug)]
pub enum Element {
    Empty,
    Text(TextNode),
    Node(NodeElement),
    Fragment(Vec<Element>),
    Component(ComponentElement),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextNode {
    pub content: String,
}

/// An element node: a laid-out box with optional border, title and children.
#[derive(Clone, Debug)]
pub struct NodeElement {
    pub(crate) data: ElementData,
    pub(crate) binding: Option<NodeRef>,
    pub(crate) children: Vec<Element>,
}

impl NodeElement {
    pub fn new(tag: &'static str) -> Self {
        Self {
            data: ElementData::new(tag),
            binding: None,
            children: Vec::new(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.data.title = Some(title.into());
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.data.color = Some(color);
        self
    }

    pub fn direction(mut self, direction: FlexDirection) -> Self {
        self.data.layout.direction = direction;
        self
    }

    pub fn row(self) -> Self {
        self.direction(FlexDirection::Row)
    }

    pub fn column(self) -> Self {
        self.direction(FlexDirection::Column)
    }

    /// Fixed length along the parent's direction.
    pub fn size(mut self, size: u16) -> Self {
        self.data.layout.size = Some(size);
        self
    }

    pub fn bordered(mut self) -> Self {
        self.data.layout.border = true;
        self
    }

    /// Makes this a scroll container with its content shifted up by `offset`.
    pub fn scroll(mut self, offset: u16) -> Self {
        self.data.layout.scroll = Some(offset);
        self
    }

    /// Fills `node_ref` with this element's node once it is committed.
    pub fn bind(mut self, node_ref: &NodeRef) -> Self {
        self.binding = Some(node_ref.clone());
        self
    }

    pub fn child(mut self, child: impl Into<Element>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I, E>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Element>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }
}

impl Element {
    pub fn text(content: impl Into<String>) -> Self {
        Element::Text(TextNode {
            content: content.into(),
        })
    }

    pub fn node(tag: &'static str) -> NodeElement {
        NodeElement::new(tag)
    }

    pub fn block(title: impl Into<String>) -> NodeElement {
        NodeElement::new("block").bordered().title(title)
    }

    pub fn vstack<I, E>(children: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Element>,
    {
        NodeElement::new("div").column().children(children).into()
    }

    pub fn hstack<I, E>(children: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Element>,
    {
        NodeElement::new("div").row().children(children).into()
    }

    pub fn fragment<I, E>(children: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Element>,
    {
        Element::Fragment(children.into_iter().map(Into::into).collect())
    }
}

impl From<NodeElement> for Element {
    fn from(value: NodeElement) -> Self {
        Element::Node(value)
    }
}

impl From<TextNode> for Element {
    fn from(value: TextNode) -> Self {
        Element::Text(value)
    }
}

impl From<&str> for Element {
    fn from(value: &str) -> Self {
        Element::text(value)
    }
}

impl From<String> for Element {
    fn from(value: String) -> Self {
        Element::text(value)
    }
}

impl<T: Into<Element>> From<Option<T>> for Element {
    fn from(value: Option<T>) -> Self {
        value.map_or(Element::Empty, Into::into)
    }
}
