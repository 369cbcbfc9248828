use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::{PrayerName, PrayerProgress};
use crate::tui::theme;
use crate::utils::format::progress_bar;

pub fn render(frame: &mut Frame, area: Rect, progress: Option<&PrayerProgress>, signed_in: bool) {
    let block = Block::default()
        .title(Span::styled(" Qadaa ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(ratatui::style::Style::default().fg(theme::BORDER))
        .style(theme::surface());

    let mut lines = vec![Line::from("")];

    match progress {
        _ if !signed_in => {
            lines.push(Line::from(Span::styled(
                "  Sign in with `miqat profile login <email>`",
                theme::dim(),
            )));
        }
        None => {
            lines.push(Line::from(Span::styled(
                "  No qadaa schedule. Run `miqat qadaa <start> <end>`",
                theme::dim(),
            )));
        }
        Some(progress) => {
            let bar_width = (area.width as usize).saturating_sub(30).clamp(5, 24);
            for prayer in PrayerName::tracked() {
                let count = progress.get(prayer).unwrap_or_default();
                let bar_style = if count.is_complete() {
                    theme::green()
                } else {
                    theme::amber()
                };
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:<8}", prayer.display_name()), theme::bold()),
                    Span::styled(progress_bar(count.done, count.total, bar_width), bar_style),
                    Span::styled(
                        format!(" {:>3}/{:<3} {:>3}%", count.done, count.total, count.percent()),
                        theme::dim(),
                    ),
                ]));
            }
        }
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
