use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS profiles (
            user_id     TEXT PRIMARY KEY,
            email       TEXT NOT NULL,
            name        TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            photo_url   TEXT
        );

        CREATE TABLE IF NOT EXISTS prayer_progress (
            user_id  TEXT NOT NULL REFERENCES profiles(user_id) ON DELETE CASCADE,
            prayer   TEXT NOT NULL CHECK(prayer IN ('fajr','dhuhr','asr','maghrib','isha')),
            done     INTEGER NOT NULL DEFAULT 0,
            total    INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY(user_id, prayer)
        );

        CREATE TABLE IF NOT EXISTS qadaa_info (
            user_id        TEXT PRIMARY KEY REFERENCES profiles(user_id) ON DELETE CASCADE,
            start_date     TEXT NOT NULL,
            end_date       TEXT NOT NULL,
            total_days     INTEGER NOT NULL,
            total_prayers  INTEGER NOT NULL,
            created_at     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS progress_logs (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id    TEXT NOT NULL,
            prayer     TEXT NOT NULL,
            action     TEXT NOT NULL,
            source     TEXT NOT NULL CHECK(source IN ('notification','manual')),
            timestamp  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_progress_logs_user ON progress_logs(user_id, id);

        CREATE TABLE IF NOT EXISTS scheduled_notifications (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            prayer      TEXT NOT NULL,
            hour        INTEGER NOT NULL CHECK(hour BETWEEN 0 AND 23),
            minute      INTEGER NOT NULL CHECK(minute BETWEEN 0 AND 59),
            title       TEXT NOT NULL,
            body        TEXT NOT NULL,
            category    TEXT NOT NULL,
            created_at  TEXT DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS notification_categories (
            identifier        TEXT NOT NULL,
            action_id         TEXT NOT NULL,
            button_title      TEXT NOT NULL,
            is_destructive    INTEGER DEFAULT 0,
            is_auth_required  INTEGER DEFAULT 0,
            position          INTEGER DEFAULT 0,
            PRIMARY KEY(identifier, action_id)
        );

        CREATE TABLE IF NOT EXISTS app_meta (
            key    TEXT PRIMARY KEY,
            value  TEXT
        );
    ")?;

    Ok(())
}
