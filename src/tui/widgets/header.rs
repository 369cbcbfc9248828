use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use tui_big_text::{BigText, PixelSize};

use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, clock: &str, hijri: Option<&str>, gregorian: &str) {
    let block = Block::default()
        .title(Span::styled(
            "  مِيقَات · miqat  ",
            theme::gold().add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold().add_modifier(Modifier::BOLD))
        .style(theme::base());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Length(1)])
        .split(inner);

    let big_clock = BigText::builder()
        .pixel_size(PixelSize::Quadrant)
        .style(theme::gold())
        .lines(vec![clock.into()])
        .alignment(Alignment::Center)
        .build();
    frame.render_widget(big_clock, rows[0]);

    let mut date_spans = Vec::new();
    if let Some(hijri) = hijri {
        date_spans.push(Span::styled(hijri, theme::amber()));
        date_spans.push(Span::styled("  ·  ", theme::dim()));
    }
    date_spans.push(Span::styled(gregorian, theme::dim()));

    let dates = Paragraph::new(Line::from(date_spans)).alignment(Alignment::Center);
    frame.render_widget(dates, rows[1]);
}
