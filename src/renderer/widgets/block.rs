use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders};

use crate::dom::ElementData;

pub fn render_element(frame: &mut Frame<'_>, area: Rect, data: &ElementData) {
    if !data.layout.border && data.title.is_none() {
        return;
    }
    let mut widget = Block::default();
    if data.layout.border {
        widget = widget.borders(Borders::ALL);
    }
    if let Some(color) = data.color {
        widget = widget.border_style(Style::default().fg(color));
    }
    if let Some(title) = &data.title {
        widget = widget.title(title.as_str());
    }
    frame.render_widget(widget, area);
}
