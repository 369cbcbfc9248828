use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::{NextPrayer, Occurrence};
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, next: Option<&NextPrayer>, reminders_on: bool) {
    let block = Block::default()
        .title(Span::styled(" Next Prayer ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(ratatui::style::Style::default().fg(theme::BORDER))
        .style(theme::surface());

    let mut content: Vec<Line> = match next {
        None => vec![
            Line::from(""),
            Line::from(Span::styled("  No data", theme::dim())),
        ],
        Some(next) => {
            let when = match next.day {
                Occurrence::Today => format!("  at {}", next.time),
                Occurrence::Tomorrow => format!("  at {} tomorrow", next.time),
            };
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("  {}", next.name.display_name().to_uppercase()),
                    theme::gold().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(when, theme::dim())),
                Line::from(""),
                Line::from(vec![
                    Span::styled("  in  ", theme::dim()),
                    Span::styled(
                        next.countdown(),
                        theme::amber().add_modifier(Modifier::BOLD),
                    ),
                ]),
            ]
        }
    };

    content.push(Line::from(""));
    content.push(if reminders_on {
        Line::from(Span::styled("  🔔 reminders on", theme::green()))
    } else {
        Line::from(Span::styled("  🔕 reminders off", theme::dim()))
    });

    let paragraph = Paragraph::new(content)
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}
