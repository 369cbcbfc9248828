mod cli;
mod config;
mod db;
mod error;
mod models;
mod notifications;
mod prayer_times;
mod progress;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::Connection;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use db::migrations::run_migrations;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    let db_path = match &cli.db {
        Some(path) => path.clone(),
        None => {
            AppConfig::ensure_data_dir()?;
            AppConfig::db_path()?
        }
    };
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;

    // The dashboard and one-shot commands may share the file.
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    run_migrations(&conn)?;

    match cli.command {
        Some(Commands::Times { date }) => handlers::handle_times(&config, date)?,
        Some(Commands::Next) => handlers::handle_next(&config)?,
        Some(Commands::Notify { action }) => handlers::handle_notify(&conn, &config, &action)?,
        Some(Commands::Progress { action }) => handlers::handle_progress(&conn, &action)?,
        Some(Commands::Qadaa { start, end }) => handlers::handle_qadaa(&conn, start, end)?,
        Some(Commands::Profile { action }) => handlers::handle_profile(&conn, &action)?,
        None => tui::app::run(conn, config)?,
    }

    Ok(())
}
