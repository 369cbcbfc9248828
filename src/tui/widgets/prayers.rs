use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::models::{DailyPrayerTimes, NextPrayer, Occurrence, PrayerName};
use crate::tui::theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    times: Option<&DailyPrayerTimes>,
    next: Option<&NextPrayer>,
    selected: usize,
    error: Option<&str>,
) {
    let block = Block::default()
        .title(Span::styled(" Prayer Times ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold())
        .style(theme::surface());

    let Some(times) = times else {
        let message = error.unwrap_or("Loading prayer times...");
        let style = if error.is_some() { theme::red() } else { theme::dim() };
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(format!("  {}", message), style)),
            Line::from(""),
            Line::from(Span::styled("  [r] retry", theme::dim())),
        ])
        .wrap(Wrap { trim: false })
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    let upcoming = next
        .filter(|n| n.day == Occurrence::Today)
        .map(|n| n.name);

    let mut items: Vec<ListItem> = PrayerName::all()
        .iter()
        .enumerate()
        .map(|(i, &name)| {
            let is_selected = i == selected;
            let is_next = upcoming == Some(name);

            let marker = if is_next { "▸ " } else { "  " };
            let name_style = if is_selected {
                theme::gold().add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else if is_next {
                theme::amber().add_modifier(Modifier::BOLD)
            } else if !name.is_tracked() {
                theme::dim()
            } else {
                theme::bold()
            };

            ListItem::new(Line::from(vec![
                Span::styled(marker, theme::amber()),
                Span::styled(format!("{:<9}", name.display_name()), name_style),
                Span::styled(times.get(name).to_string(), theme::dim()),
            ]))
        })
        .collect();

    // A failed refresh keeps the last good times on screen.
    if let Some(err) = error {
        items.push(ListItem::new(Line::from("")));
        items.push(ListItem::new(Line::from(Span::styled(
            format!("  ✗ {}", err),
            theme::red(),
        ))));
    }

    frame.render_widget(List::new(items).block(block), area);
}
