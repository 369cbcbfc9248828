use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, message: Option<&(String, bool)>) {
    if let Some((text, is_error)) = message {
        let style = if *is_error { theme::red() } else { theme::green() };
        let paragraph = Paragraph::new(Line::from(Span::styled(text.as_str(), style)))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let hints = [
        ("[↑↓]", " select  "),
        ("[m]", " mark done  "),
        ("[n]", " reminders  "),
        ("[r]", " refresh  "),
        ("[?]", " help  "),
        ("[Esc]", " quit"),
    ];

    let mut spans = Vec::new();
    for (key, label) in &hints {
        spans.push(Span::styled(*key, theme::gold()));
        spans.push(Span::styled(*label, theme::dim()));
    }

    let paragraph = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
