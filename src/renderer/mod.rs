use std::io::{Stdout, stdout};

use anyhow::Context;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::{Frame, Terminal};

use crate::dom::{Document, NodeId, NodeKind};

mod widgets;

use widgets::{render_element, render_text};

pub struct Renderer {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Renderer {
    pub fn new(title: &str) -> anyhow::Result<Self> {
        enable_raw_mode().context("enable raw mode")?;
        let mut stdout = stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            Hide,
            SetTitle(title)
        )
        .context("prepare terminal")?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).context("build terminal")?;
        Ok(Self { terminal })
    }

    pub fn size(&self) -> anyhow::Result<Rect> {
        self.terminal.size().context("read terminal size")
    }

    pub fn draw(&mut self, document: &Document) -> anyhow::Result<()> {
        self.terminal.draw(|frame| {
            let viewport = frame.size();
            render_node(frame, viewport, document, document.body());
        })?;
        Ok(())
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = stdout();
        let _ = execute!(
            stdout,
            Show,
            DisableMouseCapture,
            LeaveAlternateScreen,
            SetTitle("Terminal")
        );
    }
}

/// Paints `id` and its subtree, clipped to `clip` and to each ancestor's
/// content area.
fn render_node(frame: &mut Frame<'_>, clip: Rect, document: &Document, id: NodeId) {
    let (Some(kind), Some(bounds)) = (document.kind(id), document.bounds(id)) else {
        return;
    };
    let Some(area) = bounds.visible_in(clip) else {
        return;
    };
    match kind {
        NodeKind::Element(data) => {
            render_element(frame, area, data);
            let Some(inner) = data.layout.content_area(bounds).visible_in(clip) else {
                return;
            };
            for child in document.children(id) {
                render_node(frame, inner, document, *child);
            }
        }
        NodeKind::Text(content) => render_text(frame, area, content),
    }
}
