use std::time::Duration;

use crossterm::event::{
    Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use tokio::sync::broadcast;

use crate::dom::NodeId;


#[derive(Clone, Debug)]
pub enum FrameworkEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    Tick,
}

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<FrameworkEvent>,
}

impl EventBus {
    pub fn new(buffer: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer.max(1));
        Self { tx }
    }

    pub fn publish(&self, event: FrameworkEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FrameworkEvent> {
        self.tx.subscribe()
    }
}

/// Where a click landed. `Document` covers clicks that hit no node at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventTarget {
    Node(NodeId),
    Document,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClickEvent {
    pub target: EventTarget,
    pub position: Option<(u16, u16)>,
    pub button: MouseButton,
}

impl ClickEvent {
    /// A left click on `target` that did not come from the terminal.
    pub fn synthetic(target: NodeId) -> Self {
        Self {
            target: EventTarget::Node(target),
            position: None,
            button: MouseButton::Left,
        }
    }

    pub fn at(target: Option<NodeId>, column: u16, row: u16) -> Self {
        Self {
            target: target.map_or(EventTarget::Document, EventTarget::Node),
            position: Some((column, row)),
            button: MouseButton::Left,
        }
    }

    pub fn target_node(&self) -> Option<NodeId> {
        match self.target {
            EventTarget::Node(id) => Some(id),
            EventTarget::Document => None,
        }
    }
}

pub fn map_terminal_event(event: CrosstermEvent) -> Option<FrameworkEvent> {
    match event {
        CrosstermEvent::Key(key) => Some(FrameworkEvent::Key(key)),
        CrosstermEvent::Mouse(mouse) => Some(FrameworkEvent::Mouse(mouse)),
        CrosstermEvent::Resize(cols, rows) => Some(FrameworkEvent::Resize(cols, rows)),
        CrosstermEvent::FocusGained | CrosstermEvent::FocusLost | CrosstermEvent::Paste(_) => None,
    }
}

pub fn is_ctrl_c(event: &FrameworkEvent) -> bool {
    match event {
        FrameworkEvent::Key(key) => match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => {
                key.modifiers.contains(KeyModifiers::CONTROL)
            }
            _ => false,
        },
        _ => false,
    }
}

pub fn is_key(event: &FrameworkEvent, code: KeyCode) -> bool {
    matches!(event, FrameworkEvent::Key(key) if key.code == code)
}

pub fn is_mouse_click(event: &FrameworkEvent, button: MouseButton) -> bool {
    matches!(
        event,
        FrameworkEvent::Mouse(mouse)
            if matches!(mouse.kind, MouseEventKind::Down(btn) if btn == button)
    )
}

pub fn mouse_scroll_delta(event: &FrameworkEvent) -> i32 {
    if let FrameworkEvent::Mouse(mouse) = event {
        match mouse.kind {
            MouseEventKind::ScrollUp => 1,
            MouseEventKind::ScrollDown => -1,
            _ => 0,
        }
    } else {
        0
    }
}

pub fn mouse_position(event: &FrameworkEvent) -> Option<(u16, u16)> {
    if let FrameworkEvent::Mouse(mouse) = event {
        Some((mouse.column, mouse.row))
    } else {
        None
    }
}

/// Cell of a left-button press, the terminal's equivalent of a DOM click.
pub fn click_position(event: &FrameworkEvent) -> Option<(u16, u16)> {
    if is_mouse_click(event, MouseButton::Left) {
        mouse_position(event)
    } else {
        None
    }
}

pub const DEFAULT_TICK_RATE: Duration = Duration::from_millis(250);
