use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate, Utc};
use rusqlite::Connection;
use std::str::FromStr;

use crate::cli::args::{NotifyCommands, ProfileCommands, ProgressCommands};
use crate::config::AppConfig;
use crate::db::repository::{MetaRepo, SqliteProfileStore};
use crate::error::AppError;
use crate::models::{MarkSource, NotificationResponse, Occurrence, PrayerName, UserProfile};
use crate::notifications::{handle_response, scheduler, NotificationCenter, SqliteNotificationCenter};
use crate::prayer_times::{resolve_next, AladhanClient, TimingsSource};
use crate::progress::{ProfileStore, ProgressLedger};
use crate::utils::format::{format_duration_mins, progress_bar};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

// ─── Session ─────────────────────────────────────────────────────────────────

/// The signed-in user, or `NotSignedIn`.
pub fn current_user(conn: &Connection) -> Result<String> {
    Ok(MetaRepo::current_user(conn)?.ok_or(AppError::NotSignedIn)?)
}

/// Profiles are keyed by the normalised email.
pub fn user_id_for(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(AppError::ValidationError(format!(
            "'{}' is not a valid email address",
            email
        ))),
    }
}

// ─── Times ───────────────────────────────────────────────────────────────────

pub fn handle_times(config: &AppConfig, date: Option<NaiveDate>) -> Result<()> {
    let now = Local::now().naive_local();
    let date = date.unwrap_or(now.date());

    let client = AladhanClient::new(&config.api.base_url)?;
    let times = client.fetch_daily_times(date, &config.location)?;

    println!();
    println_colored!(
        GOLD,
        "  Prayer Times — {}, {} ({})",
        config.location.city,
        config.location.country,
        times.readable
    );
    println_colored!(DIM, "  {}", times.hijri.formatted());
    println!();

    let is_today = date == now.date();
    let next = is_today.then(|| resolve_next(&times, now));

    for (name, time) in times.entries() {
        let highlighted = next
            .as_ref()
            .map(|n| n.day == Occurrence::Today && n.name == name)
            .unwrap_or(false);
        if highlighted {
            println_colored!(AMBER, "▸ {:<10}  {}", name.display_name(), time);
        } else if is_today && time.to_naive_time() <= now.time() {
            println_colored!(DIM, "  {:<10}  {}", name.display_name(), time);
        } else {
            println_colored!(BOLD, "  {:<10}  {}", name.display_name(), time);
        }
    }

    if let Some(next) = next {
        println!();
        println_colored!(
            AMBER,
            "  Next: {} in {}",
            next.name.display_name(),
            format_duration_mins(next.minutes_until)
        );
    }
    println!();
    Ok(())
}

pub fn handle_next(config: &AppConfig) -> Result<()> {
    let now = Local::now().naive_local();
    let client = AladhanClient::new(&config.api.base_url)?;
    let times = client.fetch_daily_times(now.date(), &config.location)?;
    let next = resolve_next(&times, now);

    let when = match next.day {
        Occurrence::Today => "",
        Occurrence::Tomorrow => " tomorrow",
    };
    println_colored!(
        AMBER,
        "  {} at {}{}  ({})",
        next.name.display_name(),
        next.time,
        when,
        next.countdown()
    );
    Ok(())
}

// ─── Notifications ───────────────────────────────────────────────────────────

pub fn handle_notify(conn: &Connection, config: &AppConfig, action: &NotifyCommands) -> Result<()> {
    let mut center = SqliteNotificationCenter::new(conn);
    let today = Local::now().date_naive();

    match action {
        NotifyCommands::On => {
            let client = AladhanClient::new(&config.api.base_url)?;
            scheduler::set_reminders_enabled(
                conn,
                &mut center,
                &client,
                &config.location,
                today,
                true,
            )?;
            println_colored!(GREEN, "  ✓ Prayer reminders enabled");
            print_scheduled(&center)?;
        }
        NotifyCommands::Off => {
            scheduler::disable_reminders(conn, &mut center)?;
            println_colored!(DIM, "  Prayer reminders disabled");
        }
        NotifyCommands::Status => {
            if MetaRepo::notifications_enabled(conn)? {
                println_colored!(GREEN, "  Reminders: on");
            } else {
                println_colored!(DIM, "  Reminders: off");
            }
        }
        NotifyCommands::List => print_scheduled(&center)?,
        NotifyCommands::Respond { prayer, action } => {
            let user_id = current_user(conn)?;
            let store = SqliteProfileStore::new(conn);
            let response = NotificationResponse {
                action_identifier: action.clone(),
                prayer: prayer.clone(),
            };
            match handle_response(&store, &user_id, &response)? {
                Some(outcome) => println_colored!(GREEN, "  ✓ {}", outcome.confirmation()),
                None => println_colored!(DIM, "  No action taken for '{}'", action),
            }
        }
    }
    Ok(())
}

fn print_scheduled(center: &SqliteNotificationCenter) -> Result<()> {
    let scheduled = center.scheduled()?;
    if scheduled.is_empty() {
        println_colored!(DIM, "  No reminders scheduled");
        return Ok(());
    }
    println!();
    for n in &scheduled {
        println!(
            "  #{:<3} {}  {:<10}  {}",
            n.id,
            n.request.trigger,
            n.request.prayer.display_name(),
            n.request.title
        );
    }
    println!();
    Ok(())
}

// ─── Progress ────────────────────────────────────────────────────────────────

pub fn handle_progress(conn: &Connection, action: &ProgressCommands) -> Result<()> {
    let user_id = current_user(conn)?;
    let store = SqliteProfileStore::new(conn);
    let ledger = ProgressLedger::new(&store);

    match action {
        ProgressCommands::Show => {
            let Some(progress) = ledger.progress(&user_id)? else {
                println_colored!(DIM, "  No qadaa schedule yet. Create one with `miqat qadaa <start> <end>`");
                return Ok(());
            };

            println!();
            if let Some(info) = ledger.qadaa_info(&user_id)? {
                println_colored!(
                    GOLD,
                    "  Qadaa {} → {} ({} days, {} prayers)",
                    info.start_date,
                    info.end_date,
                    info.total_days,
                    info.total_prayers
                );
            } else {
                println_colored!(GOLD, "  Qadaa progress");
            }
            println!();

            for prayer in PrayerName::tracked() {
                let Some(count) = progress.get(prayer) else {
                    println_colored!(DIM, "  {:<10}  not started", prayer.display_name());
                    continue;
                };
                let color = if count.is_complete() { GREEN } else { BOLD };
                println_colored!(
                    color,
                    "  {:<10}  {}  {}/{}  {}%  ({} left)",
                    prayer.display_name(),
                    progress_bar(count.done, count.total, 20),
                    count.done,
                    count.total,
                    count.percent(),
                    count.remaining()
                );
            }
            println!();
        }
        ProgressCommands::Done { prayer } => {
            let prayer = PrayerName::from_str(prayer)?;
            let outcome = ledger.mark_done(&user_id, prayer, MarkSource::Manual)?;
            println_colored!(
                GREEN,
                "  ✓ {} marked as done ({}/{})",
                prayer.display_name(),
                outcome.count.done,
                outcome.count.total
            );
        }
        ProgressCommands::Reset { yes } => {
            if !yes {
                println_colored!(
                    RED,
                    "  This deletes all qadaa progress and history. Re-run with --yes to confirm."
                );
                return Ok(());
            }
            let removed = ledger.reset(&user_id)?;
            println_colored!(AMBER, "  Progress reset ({} history entries removed)", removed);
        }
        ProgressCommands::Log { limit } => {
            let entries = ledger.history(&user_id, *limit)?;
            if entries.is_empty() {
                println_colored!(DIM, "  No completions recorded");
                return Ok(());
            }
            println!();
            for entry in &entries {
                let when = entry.timestamp.with_timezone(&Local);
                println!(
                    "  {}  {:<10}  {}",
                    when.format("%Y-%m-%d %H:%M"),
                    entry.prayer.display_name(),
                    entry.source.as_str()
                );
            }
            println!();
        }
    }
    Ok(())
}

// ─── Qadaa ───────────────────────────────────────────────────────────────────

pub fn handle_qadaa(conn: &Connection, start: NaiveDate, end: NaiveDate) -> Result<()> {
    let user_id = current_user(conn)?;
    let store = SqliteProfileStore::new(conn);
    let plan = ProgressLedger::new(&store).create_schedule(&user_id, start, end)?;

    println_colored!(
        GREEN,
        "  ✓ Qadaa schedule created: {} days, {} prayers",
        plan.info.total_days,
        plan.info.total_prayers
    );
    println_colored!(DIM, "  Each prayer starts at 0/{}", plan.info.total_days);
    Ok(())
}

// ─── Profile ─────────────────────────────────────────────────────────────────

pub fn handle_profile(conn: &Connection, action: &ProfileCommands) -> Result<()> {
    let store = SqliteProfileStore::new(conn);

    match action {
        ProfileCommands::Login { email, name } => {
            validate_email(email)?;
            let user_id = user_id_for(email);
            let name = name
                .clone()
                .unwrap_or_else(|| user_id.split('@').next().unwrap_or_default().to_string());

            if store.get_profile(&user_id)?.is_none() {
                store.create_profile(&UserProfile {
                    user_id: user_id.clone(),
                    email: email.trim().to_string(),
                    name,
                    created_at: Utc::now(),
                    photo_url: None,
                    progress: None,
                    qadaa_info: None,
                })?;
                println_colored!(GREEN, "  ✓ Profile created for {}", user_id);
            }
            MetaRepo::set_current_user(conn, &user_id)?;
            println_colored!(GREEN, "  ✓ Signed in as {}", user_id);
        }
        ProfileCommands::Logout => {
            MetaRepo::clear_current_user(conn)?;
            println_colored!(DIM, "  Signed out");
        }
        ProfileCommands::Show => {
            let user_id = current_user(conn)?;
            let profile = store
                .get_profile(&user_id)?
                .ok_or_else(|| anyhow!("Profile for '{}' is missing", user_id))?;
            println!();
            println_colored!(GOLD, "  {}", profile.name);
            println!("  Email:    {}", profile.email);
            println!(
                "  Joined:   {}",
                profile.created_at.with_timezone(&Local).format("%Y-%m-%d")
            );
            println!(
                "  Photo:    {}",
                profile.photo_url.as_deref().unwrap_or("(none)")
            );
            match &profile.qadaa_info {
                Some(info) => println!(
                    "  Qadaa:    {} → {} ({} prayers)",
                    info.start_date, info.end_date, info.total_prayers
                ),
                None => println!("  Qadaa:    (no schedule)"),
            }
            if let Some(progress) = &profile.progress {
                for (prayer, count) in &progress.counts {
                    println_colored!(
                        DIM,
                        "    {:<10} {}/{}",
                        prayer.display_name(),
                        count.done,
                        count.total
                    );
                }
            }
            println!();
        }
        ProfileCommands::Photo { url } => {
            let user_id = current_user(conn)?;
            let parsed = reqwest::Url::parse(url)
                .map_err(|e| AppError::ValidationError(format!("Invalid photo URL: {}", e)))?;
            store.set_photo_url(&user_id, parsed.as_str())?;
            println_colored!(GREEN, "  ✓ Profile photo updated");
        }
    }
    Ok(())
}
