//! Fixed night palette for the dashboard.

use ratatui::style::{Color, Modifier, Style};

pub const NIGHT: Color = Color::Rgb(14, 17, 24);
pub const PANEL: Color = Color::Rgb(22, 27, 38);
pub const BORDER: Color = Color::Rgb(52, 62, 84);
pub const INK: Color = Color::Rgb(226, 222, 210);
pub const MUTED: Color = Color::Rgb(122, 130, 148);
pub const GOLD: Color = Color::Rgb(212, 175, 85);
pub const MINT: Color = Color::Rgb(98, 170, 130);
pub const DUSK: Color = Color::Rgb(222, 140, 72);
pub const ALERT: Color = Color::Rgb(200, 88, 80);

pub fn base() -> Style {
    Style::default().fg(INK).bg(NIGHT)
}

pub fn surface() -> Style {
    Style::default().fg(INK).bg(PANEL)
}

pub fn dim() -> Style {
    Style::default().fg(MUTED)
}

pub fn bold() -> Style {
    Style::default().fg(INK).add_modifier(Modifier::BOLD)
}

pub fn gold() -> Style {
    Style::default().fg(GOLD)
}

/// Completed counters and positive confirmations.
pub fn green() -> Style {
    Style::default().fg(MINT)
}

/// The upcoming prayer and pending counters.
pub fn amber() -> Style {
    Style::default().fg(DUSK)
}

pub fn red() -> Style {
    Style::default().fg(ALERT)
}
