use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "miqat", version, author, about = "Daily prayer times, reminders and qadaa tracking in the terminal")]
pub struct Cli {
    /// Use this database file instead of the default data directory
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the day's prayer times, hijri date and next prayer
    Times {
        /// Day to fetch (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show the next prayer and a countdown
    Next,
    /// Daily prayer reminders
    Notify {
        #[command(subcommand)]
        action: NotifyCommands,
    },
    /// Qadaa progress for the signed-in user
    Progress {
        #[command(subcommand)]
        action: ProgressCommands,
    },
    /// Create a qadaa schedule covering missed days (inclusive)
    Qadaa {
        /// First missed day (YYYY-MM-DD)
        start: NaiveDate,
        /// Last missed day (YYYY-MM-DD)
        end: NaiveDate,
    },
    /// Sign in, sign out, and manage the local profile
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum NotifyCommands {
    /// Enable reminders and schedule today's five prayers
    On,
    /// Disable reminders and cancel everything scheduled
    Off,
    /// Show whether reminders are enabled
    Status,
    /// List scheduled reminders
    List,
    /// Answer a delivered reminder
    Respond {
        /// Prayer the reminder was for
        prayer: String,
        /// Action identifier
        #[arg(long, default_value = crate::models::MARK_AS_DONE)]
        action: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProgressCommands {
    /// Show done/total per prayer
    Show,
    /// Mark one prayer as made up
    Done {
        /// Prayer name (fajr, dhuhr, asr, maghrib, isha)
        prayer: String,
    },
    /// Delete all progress, qadaa info and history
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
    /// Show recent completions
    Log {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Sign in, creating the profile on first use
    Login {
        email: String,
        /// Display name (defaults to the part before '@')
        #[arg(long)]
        name: Option<String>,
    },
    /// Sign out
    Logout,
    /// Show the signed-in profile
    Show,
    /// Set the profile photo URL
    Photo { url: String },
}
