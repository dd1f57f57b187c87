use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

pub fn render_text(frame: &mut Frame<'_>, area: Rect, content: &str) {
    let style = Style::default().fg(Color::White);
    let widget = Paragraph::new(Line::from(content.to_string())).style(style);
    frame.render_widget(widget, area);
}
