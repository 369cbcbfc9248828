use anyhow::Result;
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use log::{error, info, warn};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use rusqlite::Connection;
use std::collections::VecDeque;

use crate::config::AppConfig;
use crate::db::repository::{MetaRepo, SqliteProfileStore};
use crate::error::AppError;
use crate::models::{
    DailyPrayerTimes, MarkSource, NextPrayer, NotificationResponse, PrayerName, PrayerProgress,
    ScheduledNotification, MARK_AS_DONE,
};
use crate::notifications::{handle_response, scheduler, SqliteNotificationCenter};
use crate::prayer_times::{resolve_next, AladhanClient, TimingsSource};
use crate::progress::ProgressLedger;
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{header, next_prayer, prayers, progress, statusbar};
use crate::utils::time::{seconds_until_midnight, WallClock};

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Dashboard,
    Help,
}

pub struct App<'a> {
    pub view: View,
    pub config: AppConfig,
    source: &'a dyn TimingsSource,
    pub should_quit: bool,

    pub user_id: Option<String>,
    pub times: Option<DailyPrayerTimes>,
    pub fetch_error: Option<String>,
    pub next: Option<NextPrayer>,
    pub progress: Option<PrayerProgress>,
    pub reminders_enabled: bool,

    /// Index into `PrayerName::all()`.
    pub selected: usize,
    /// Status line text; the flag marks errors.
    pub message: Option<(String, bool)>,
    /// Reminders that came due and have not been answered yet.
    pub due: VecDeque<ScheduledNotification>,

    pub now: NaiveDateTime,
    last_due_check: NaiveDateTime,
    next_midnight: NaiveDateTime,
}

fn midnight_after(now: NaiveDateTime) -> NaiveDateTime {
    now + Duration::seconds(seconds_until_midnight(now))
}

impl<'a> App<'a> {
    pub fn new(
        config: AppConfig,
        source: &'a dyn TimingsSource,
        conn: &Connection,
        now: NaiveDateTime,
    ) -> Self {
        let user_id = MetaRepo::current_user(conn).unwrap_or_else(|e| {
            warn!("Could not read session: {}", e);
            None
        });
        let reminders_enabled = MetaRepo::notifications_enabled(conn).unwrap_or(false);

        App {
            view: View::Dashboard,
            config,
            source,
            should_quit: false,
            user_id,
            times: None,
            fetch_error: None,
            next: None,
            progress: None,
            reminders_enabled,
            selected: 0,
            message: None,
            due: VecDeque::new(),
            now,
            last_due_check: now,
            next_midnight: midnight_after(now),
        }
    }

    /// Initial fill. `prefetched` is today's day when startup already
    /// fetched it for the reminder refresh.
    pub fn load(&mut self, conn: &Connection, prefetched: Option<DailyPrayerTimes>) {
        match prefetched {
            Some(times) => self.set_times(times),
            None => self.refresh_times(conn),
        }
        self.reload_progress(conn);
    }

    fn set_times(&mut self, times: DailyPrayerTimes) {
        self.next = Some(resolve_next(&times, self.now));
        self.times = Some(times);
        self.fetch_error = None;
        self.next_midnight = midnight_after(self.now);
    }

    /// Fetch the current day. A failure keeps whatever was shown before and
    /// surfaces the error inline.
    pub fn refresh_times(&mut self, conn: &Connection) {
        let today = self.now.date();
        match self.source.fetch_daily_times(today, &self.config.location) {
            Ok(times) => {
                if self.reminders_enabled {
                    let mut center = SqliteNotificationCenter::new(conn);
                    if let Err(e) = scheduler::reschedule(&mut center, &times) {
                        warn!("Could not refresh reminders: {}", e);
                    }
                }
                self.set_times(times);
            }
            Err(e) => {
                warn!("Prayer times fetch for {} failed: {}", today, e);
                self.fetch_error = Some(e.to_string());
                self.next_midnight = midnight_after(self.now);
            }
        }
    }

    fn show_error(&mut self, e: AppError) {
        error!("{}", e);
        self.message = Some((e.to_string(), true));
    }

    fn reload_progress(&mut self, conn: &Connection) {
        let Some(user_id) = &self.user_id else {
            self.progress = None;
            return;
        };
        let store = SqliteProfileStore::new(conn);
        match ProgressLedger::new(&store).progress(user_id) {
            Ok(progress) => self.progress = progress,
            Err(e) => self.show_error(e),
        }
    }

    pub fn tick(&mut self, conn: &Connection) {
        self.tick_at(conn, Local::now().naive_local());
    }

    pub fn tick_at(&mut self, conn: &Connection, now: NaiveDateTime) {
        self.advance(now);
        if now >= self.next_midnight {
            info!("Day changed, refetching prayer times");
            self.refresh_times(conn);
        }
        self.collect_due(conn);
    }

    /// Move the clock. The countdown always follows it.
    fn advance(&mut self, now: NaiveDateTime) {
        self.now = now;
        self.next = self.times.as_ref().map(|t| resolve_next(t, now));
    }

    fn collect_due(&mut self, conn: &Connection) {
        let since = self.last_due_check;
        self.last_due_check = self.now;
        if !self.reminders_enabled || self.now <= since {
            return;
        }

        let center = SqliteNotificationCenter::new(conn);
        let after = WallClock::from_naive_time(since.time());
        let until = WallClock::from_naive_time(self.now.time());
        match center.due_between(after, until) {
            Ok(due) => self.due.extend(due),
            Err(e) => warn!("Could not check due reminders: {}", e),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, conn: &Connection) {
        self.handle_key_at(key, conn, Local::now().naive_local());
    }

    pub fn handle_key_at(&mut self, key: KeyEvent, conn: &Connection, now: NaiveDateTime) {
        // Some terminals report release and repeat events too.
        if key.kind != KeyEventKind::Press {
            return;
        }
        self.advance(now);

        if !self.due.is_empty() {
            match key.code {
                KeyCode::Char('m') => self.answer_due(conn),
                _ => {
                    self.due.pop_front();
                }
            }
            return;
        }

        match self.view {
            View::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                    self.view = View::Dashboard;
                }
            }
            View::Dashboard => self.handle_dashboard_key(key, conn),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent, conn: &Connection) {
        self.message = None;
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('?') => self.view = View::Help,
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                if self.selected + 1 < PrayerName::all().len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char('m') | KeyCode::Enter => self.mark_selected(conn),
            KeyCode::Char('n') => self.toggle_reminders(conn),
            KeyCode::Char('r') => {
                self.refresh_times(conn);
                self.reload_progress(conn);
            }
            _ => {}
        }
    }

    fn mark_selected(&mut self, conn: &Connection) {
        let prayer = PrayerName::all()[self.selected];
        let Some(user_id) = self.user_id.clone() else {
            self.show_error(AppError::NotSignedIn);
            return;
        };

        let store = SqliteProfileStore::new(conn);
        self.message = Some(
            match ProgressLedger::new(&store).mark_done(&user_id, prayer, MarkSource::Manual) {
                Ok(outcome) => (outcome.confirmation(), false),
                Err(e) => {
                    error!("Mark done failed: {}", e);
                    (e.to_string(), true)
                }
            },
        );
        self.reload_progress(conn);
    }

    fn answer_due(&mut self, conn: &Connection) {
        let Some(notification) = self.due.pop_front() else {
            return;
        };
        let Some(user_id) = self.user_id.clone() else {
            self.show_error(AppError::NotSignedIn);
            return;
        };

        let store = SqliteProfileStore::new(conn);
        let response = NotificationResponse {
            action_identifier: MARK_AS_DONE.to_string(),
            prayer: notification.request.prayer.as_str().to_string(),
        };
        match handle_response(&store, &user_id, &response) {
            Ok(Some(outcome)) => self.message = Some((outcome.confirmation(), false)),
            Ok(None) => {}
            Err(e) => self.show_error(e),
        }
        self.reload_progress(conn);
    }

    fn toggle_reminders(&mut self, conn: &Connection) {
        let enable = !self.reminders_enabled;
        let mut center = SqliteNotificationCenter::new(conn);
        let today: NaiveDate = self.now.date();

        match scheduler::set_reminders_enabled(
            conn,
            &mut center,
            self.source,
            &self.config.location,
            today,
            enable,
        ) {
            Ok(()) => {
                self.reminders_enabled = enable;
                self.last_due_check = self.now;
                let text = if enable {
                    "Prayer reminders enabled"
                } else {
                    "Prayer reminders disabled"
                };
                self.message = Some((text.to_string(), false));
            }
            Err(e) => self.show_error(e),
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        self.draw_dashboard(frame);

        if self.view == View::Help {
            self.draw_help_overlay(frame);
        }
        if let Some(notification) = self.due.front() {
            self.draw_due_overlay(frame, notification);
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(7), // clock + dates
                Constraint::Min(0),
                Constraint::Length(1), // status bar
            ])
            .split(area);

        let clock = self.now.format("%H:%M").to_string();
        let gregorian = self.now.format("%A, %b %d, %Y").to_string();
        let hijri = self.times.as_ref().map(|t| t.hijri.formatted());
        header::render(frame, outer[0], &clock, hijri.as_deref(), &gregorian);

        statusbar::render(frame, outer[2], self.message.as_ref());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(outer[1]);

        prayers::render(
            frame,
            columns[0],
            self.times.as_ref(),
            self.next.as_ref(),
            self.selected,
            self.fetch_error.as_deref(),
        );

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(9), Constraint::Min(0)])
            .split(columns[1]);

        next_prayer::render(frame, right[0], self.next.as_ref(), self.reminders_enabled);
        progress::render(
            frame,
            right[1],
            self.progress.as_ref(),
            self.user_id.is_some(),
        );
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let popup_area = centered(frame.area(), 50, 14);
        frame.render_widget(Clear, popup_area);

        let bindings = [
            ("[↑ ↓]", "Select prayer"),
            ("[m] / Enter", "Mark selected prayer done"),
            ("[n]", "Toggle prayer reminders"),
            ("[r]", "Refetch prayer times"),
            ("[?]", "Toggle help"),
            ("[Esc]", "Quit"),
        ];

        let mut lines = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::gold().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, label) in bindings {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<13}", key), theme::gold()),
                Span::styled(label, theme::dim()),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(
                "  {}, {} · method {}",
                self.config.location.city, self.config.location.country, self.config.location.method
            ),
            theme::dim(),
        )));

        let block = Block::default()
            .title(Span::styled(" Help ", theme::gold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::gold())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(lines).block(block), popup_area);
    }

    fn draw_due_overlay(&self, frame: &mut Frame, notification: &ScheduledNotification) {
        let popup_area = centered(frame.area(), 50, 9);
        frame.render_widget(Clear, popup_area);

        let request = &notification.request;
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("  {}", request.title),
                theme::gold().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(format!("  {}", request.body), theme::bold())),
            Line::from(""),
            Line::from(vec![
                Span::styled("  [m] ", theme::gold()),
                Span::styled("Mark as Done", theme::green()),
                Span::styled("   [any key] dismiss", theme::dim()),
            ]),
        ];

        let title = if self.due.len() > 1 {
            format!(" Reminder (1 of {}) ", self.due.len())
        } else {
            " Reminder ".to_string()
        };
        let block = Block::default()
            .title(Span::styled(title, theme::gold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::amber())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(lines).block(block), popup_area);
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Run the dashboard until the user quits.
pub fn run(conn: Connection, config: AppConfig) -> Result<()> {
    let client = AladhanClient::new(&config.api.base_url)?;
    let now = Local::now().naive_local();

    let mut center = SqliteNotificationCenter::new(&conn);
    let restored =
        scheduler::restore_on_startup(&conn, &mut center, &client, &config.location, now.date());

    let tick_rate = std::time::Duration::from_secs(config.display.tick_secs.max(1));
    let mut app = App::new(config, &client, &conn, now);
    app.load(&conn, restored);

    let mut terminal = ratatui::init();
    let events = EventHandler::new(tick_rate);

    let outcome = (|| -> Result<()> {
        loop {
            terminal.draw(|frame| app.draw(frame))?;

            match events.next()? {
                Event::Key(key) => {
                    app.handle_key(key, &conn);
                    if app.should_quit {
                        return Ok(());
                    }
                }
                Event::Resize => {}
                Event::Tick => app.tick(&conn),
            }
        }
    })();

    ratatui::restore();
    outcome
}
