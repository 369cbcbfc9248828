use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;

use crate::error::{AppError, Result};
use crate::models::{
    MarkSource, NotificationAction, NotificationCategory, NotificationRequest, PrayerCount,
    PrayerName, PrayerProgress, ProgressLogEntry, QadaaInfo, ScheduledNotification, UserProfile,
};
use crate::progress::store::ProfileStore;
use crate::utils::time::WallClock;

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::StoreError(format!("Bad timestamp '{}': {}", s, e)))
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| AppError::StoreError(format!("Bad date '{}': {}", s, e)))
}

fn parse_prayer(s: &str) -> Result<PrayerName> {
    PrayerName::from_str(s).map_err(|e| AppError::StoreError(e.to_string()))
}

// ─── Profile store ───────────────────────────────────────────────────────────

pub struct SqliteProfileStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteProfileStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn load_progress(&self, user_id: &str) -> Result<Option<PrayerProgress>> {
        let mut stmt = self.conn.prepare(
            "SELECT prayer, done, total FROM prayer_progress WHERE user_id = ?1",
        )?;

        let rows = stmt.query_map(params![user_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, u32>(2)?,
            ))
        })?;

        let mut progress = PrayerProgress::default();
        for r in rows {
            let (prayer, done, total) = r?;
            progress
                .counts
                .insert(parse_prayer(&prayer)?, PrayerCount { done, total });
        }

        Ok(if progress.is_empty() { None } else { Some(progress) })
    }

    fn load_qadaa_info(&self, user_id: &str) -> Result<Option<QadaaInfo>> {
        let row = self
            .conn
            .query_row(
                "SELECT start_date, end_date, total_days, total_prayers, created_at
                 FROM qadaa_info WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, u32>(2)?,
                        row.get::<_, u32>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some((start, end, total_days, total_prayers, created_at)) => Ok(Some(QadaaInfo {
                start_date: parse_date(&start)?,
                end_date: parse_date(&end)?,
                total_days,
                total_prayers,
                created_at: parse_timestamp(&created_at)?,
            })),
        }
    }
}

impl ProfileStore for SqliteProfileStore<'_> {
    fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let row = self
            .conn
            .query_row(
                "SELECT user_id, email, name, created_at, photo_url FROM profiles WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Option<String>>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((user_id, email, name, created_at, photo_url)) = row else {
            return Ok(None);
        };

        Ok(Some(UserProfile {
            progress: self.load_progress(&user_id)?,
            qadaa_info: self.load_qadaa_info(&user_id)?,
            created_at: parse_timestamp(&created_at)?,
            user_id,
            email,
            name,
            photo_url,
        }))
    }

    fn create_profile(&self, profile: &UserProfile) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO profiles (user_id, email, name, created_at, photo_url)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                profile.user_id,
                profile.email,
                profile.name,
                profile.created_at.to_rfc3339(),
                profile.photo_url,
            ],
        )?;
        Ok(())
    }

    fn set_photo_url(&self, user_id: &str, url: &str) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE profiles SET photo_url = ?1 WHERE user_id = ?2",
            params![url, user_id],
        )?;
        if changed == 0 {
            return Err(AppError::StoreError(format!("No profile for '{}'", user_id)));
        }
        Ok(())
    }

    fn init_prayer_count(
        &self,
        user_id: &str,
        prayer: PrayerName,
        count: PrayerCount,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO prayer_progress (user_id, prayer, done, total)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, prayer) DO UPDATE SET done = ?3, total = ?4",
            params![user_id, prayer.as_str(), count.done, count.total],
        )?;
        Ok(())
    }

    fn increment_done(&self, user_id: &str, prayer: PrayerName, by: u32) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE prayer_progress SET done = done + ?1 WHERE user_id = ?2 AND prayer = ?3",
            params![by, user_id, prayer.as_str()],
        )?;
        if changed == 0 {
            return Err(AppError::StoreError(format!(
                "No {} progress record for '{}'",
                prayer.as_str(),
                user_id
            )));
        }
        Ok(())
    }

    fn replace_progress(
        &self,
        user_id: &str,
        progress: &PrayerProgress,
        info: &QadaaInfo,
    ) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM prayer_progress WHERE user_id = ?1",
            params![user_id],
        )?;
        for (prayer, count) in &progress.counts {
            tx.execute(
                "INSERT INTO prayer_progress (user_id, prayer, done, total) VALUES (?1, ?2, ?3, ?4)",
                params![user_id, prayer.as_str(), count.done, count.total],
            )?;
        }
        tx.execute(
            "INSERT INTO qadaa_info (user_id, start_date, end_date, total_days, total_prayers, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(user_id) DO UPDATE SET
               start_date = ?2, end_date = ?3, total_days = ?4, total_prayers = ?5, created_at = ?6",
            params![
                user_id,
                info.start_date.format("%Y-%m-%d").to_string(),
                info.end_date.format("%Y-%m-%d").to_string(),
                info.total_days,
                info.total_prayers,
                info.created_at.to_rfc3339(),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn clear_progress(&self, user_id: &str) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM prayer_progress WHERE user_id = ?1",
            params![user_id],
        )?;
        tx.execute("DELETE FROM qadaa_info WHERE user_id = ?1", params![user_id])?;
        tx.commit()?;
        Ok(())
    }

    fn append_log(&self, user_id: &str, entry: &ProgressLogEntry) -> Result<()> {
        self.conn.execute(
            "INSERT INTO progress_logs (user_id, prayer, action, source, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user_id,
                entry.prayer.as_str(),
                entry.action,
                entry.source.as_str(),
                entry.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn logs(&self, user_id: &str, limit: usize) -> Result<Vec<ProgressLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, prayer, action, source, timestamp FROM progress_logs
             WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![user_id, limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut result = Vec::new();
        for r in rows {
            let (id, prayer, action, source, timestamp) = r?;
            result.push(ProgressLogEntry {
                id: Some(id),
                prayer: parse_prayer(&prayer)?,
                action,
                source: MarkSource::from_str(&source)?,
                timestamp: parse_timestamp(&timestamp)?,
            });
        }
        Ok(result)
    }

    fn delete_logs(&self, user_id: &str) -> Result<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM progress_logs WHERE user_id = ?1",
            params![user_id],
        )?;
        Ok(deleted)
    }
}

// ─── Notification host storage ───────────────────────────────────────────────

pub struct NotificationRepo;

impl NotificationRepo {
    pub fn insert(conn: &Connection, request: &NotificationRequest) -> Result<i64> {
        conn.execute(
            "INSERT INTO scheduled_notifications (prayer, hour, minute, title, body, category)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                request.prayer.as_str(),
                request.trigger.hour,
                request.trigger.minute,
                request.title,
                request.body,
                request.category,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn delete_all(conn: &Connection) -> Result<usize> {
        Ok(conn.execute("DELETE FROM scheduled_notifications", [])?)
    }

    pub fn all(conn: &Connection) -> Result<Vec<ScheduledNotification>> {
        let mut stmt = conn.prepare(
            "SELECT id, prayer, hour, minute, title, body, category
             FROM scheduled_notifications ORDER BY hour, minute, id",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut result = Vec::new();
        for r in rows {
            let (id, prayer, hour, minute, title, body, category) = r?;
            result.push(ScheduledNotification {
                id: id.to_string(),
                request: NotificationRequest {
                    title,
                    body,
                    prayer: parse_prayer(&prayer)?,
                    category,
                    trigger: WallClock::new(hour, minute)
                        .map_err(|e| AppError::StoreError(e.to_string()))?,
                },
            });
        }
        Ok(result)
    }

    pub fn upsert_category(conn: &Connection, category: &NotificationCategory) -> Result<()> {
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM notification_categories WHERE identifier = ?1",
            params![category.identifier],
        )?;
        for (position, action) in category.actions.iter().enumerate() {
            tx.execute(
                "INSERT INTO notification_categories
                   (identifier, action_id, button_title, is_destructive, is_auth_required, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    category.identifier,
                    action.identifier,
                    action.button_title,
                    action.is_destructive as i32,
                    action.is_authentication_required as i32,
                    position as i64,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn category(conn: &Connection, identifier: &str) -> Result<Option<NotificationCategory>> {
        let mut stmt = conn.prepare(
            "SELECT action_id, button_title, is_destructive, is_auth_required
             FROM notification_categories WHERE identifier = ?1 ORDER BY position",
        )?;

        let actions = stmt
            .query_map(params![identifier], |row| {
                Ok(NotificationAction {
                    identifier: row.get(0)?,
                    button_title: row.get(1)?,
                    is_destructive: row.get::<_, i32>(2)? != 0,
                    is_authentication_required: row.get::<_, i32>(3)? != 0,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        if actions.is_empty() {
            return Ok(None);
        }
        Ok(Some(NotificationCategory {
            identifier: identifier.to_string(),
            actions,
        }))
    }
}

// ─── App meta ────────────────────────────────────────────────────────────────

pub const NOTIFICATIONS_ENABLED_KEY: &str = "prayerNotificationsEnabled";
const CURRENT_USER_KEY: &str = "current_user";

pub struct MetaRepo;

impl MetaRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        Ok(conn
            .query_row(
                "SELECT value FROM app_meta WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn delete(conn: &Connection, key: &str) -> Result<()> {
        conn.execute("DELETE FROM app_meta WHERE key = ?1", params![key])?;
        Ok(())
    }

    pub fn notifications_enabled(conn: &Connection) -> Result<bool> {
        Ok(Self::get(conn, NOTIFICATIONS_ENABLED_KEY)?.as_deref() == Some("true"))
    }

    pub fn set_notifications_enabled(conn: &Connection, enabled: bool) -> Result<()> {
        Self::set(conn, NOTIFICATIONS_ENABLED_KEY, &enabled.to_string())
    }

    pub fn current_user(conn: &Connection) -> Result<Option<String>> {
        Self::get(conn, CURRENT_USER_KEY)
    }

    pub fn set_current_user(conn: &Connection, user_id: &str) -> Result<()> {
        Self::set(conn, CURRENT_USER_KEY, user_id)
    }

    pub fn clear_current_user(conn: &Connection) -> Result<()> {
        Self::delete(conn, CURRENT_USER_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn profile(user_id: &str) -> UserProfile {
        UserProfile {
            user_id: user_id.to_string(),
            email: format!("{}@example.com", user_id),
            name: "Amina".to_string(),
            created_at: Utc::now(),
            photo_url: None,
            progress: None,
            qadaa_info: None,
        }
    }

    #[test]
    fn profile_without_progress_reads_as_none() {
        let conn = conn();
        let store = SqliteProfileStore::new(&conn);
        store.create_profile(&profile("amina")).unwrap();

        let loaded = store.get_profile("amina").unwrap().unwrap();
        assert_eq!(loaded.name, "Amina");
        assert!(loaded.progress.is_none());
        assert!(loaded.qadaa_info.is_none());
        assert!(store.get_profile("nobody").unwrap().is_none());
    }

    #[test]
    fn create_profile_keeps_existing_document() {
        let conn = conn();
        let store = SqliteProfileStore::new(&conn);
        store.create_profile(&profile("amina")).unwrap();
        store.set_photo_url("amina", "https://img.example/a.png").unwrap();

        let mut again = profile("amina");
        again.name = "Someone Else".to_string();
        store.create_profile(&again).unwrap();

        let loaded = store.get_profile("amina").unwrap().unwrap();
        assert_eq!(loaded.name, "Amina");
        assert_eq!(loaded.photo_url.as_deref(), Some("https://img.example/a.png"));
    }

    #[test]
    fn increment_requires_existing_record() {
        let conn = conn();
        let store = SqliteProfileStore::new(&conn);
        store.create_profile(&profile("amina")).unwrap();

        let err = store.increment_done("amina", PrayerName::Asr, 1).unwrap_err();
        assert!(matches!(err, AppError::StoreError(_)));

        store
            .init_prayer_count("amina", PrayerName::Asr, PrayerCount { done: 2, total: 4 })
            .unwrap();
        store.increment_done("amina", PrayerName::Asr, 1).unwrap();
        let progress = store.get_profile("amina").unwrap().unwrap().progress.unwrap();
        assert_eq!(progress.get(PrayerName::Asr), Some(PrayerCount { done: 3, total: 4 }));
    }

    #[test]
    fn logs_are_newest_first_and_deletable() {
        let conn = conn();
        let store = SqliteProfileStore::new(&conn);
        for prayer in [PrayerName::Fajr, PrayerName::Isha] {
            store
                .append_log(
                    "amina",
                    &ProgressLogEntry {
                        id: None,
                        prayer,
                        action: "mark_done".to_string(),
                        source: MarkSource::Manual,
                        timestamp: Utc::now(),
                    },
                )
                .unwrap();
        }

        let logs = store.logs("amina", 10).unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].prayer, PrayerName::Isha);
        assert_eq!(store.logs("amina", 1).unwrap().len(), 1);

        assert_eq!(store.delete_logs("amina").unwrap(), 2);
        assert!(store.logs("amina", 10).unwrap().is_empty());
    }

    #[test]
    fn category_round_trip_preserves_action_flags() {
        let conn = conn();
        NotificationRepo::upsert_category(&conn, &NotificationCategory::prayers()).unwrap();
        NotificationRepo::upsert_category(&conn, &NotificationCategory::prayers()).unwrap();

        let category = NotificationRepo::category(&conn, "prayers").unwrap().unwrap();
        assert_eq!(category, NotificationCategory::prayers());
        assert!(NotificationRepo::category(&conn, "other").unwrap().is_none());
    }

    #[test]
    fn meta_flags() {
        let conn = conn();
        assert!(!MetaRepo::notifications_enabled(&conn).unwrap());
        MetaRepo::set_notifications_enabled(&conn, true).unwrap();
        assert!(MetaRepo::notifications_enabled(&conn).unwrap());
        assert_eq!(
            MetaRepo::get(&conn, NOTIFICATIONS_ENABLED_KEY).unwrap().as_deref(),
            Some("true")
        );

        MetaRepo::set_current_user(&conn, "amina").unwrap();
        assert_eq!(MetaRepo::current_user(&conn).unwrap().as_deref(), Some("amina"));
        MetaRepo::clear_current_user(&conn).unwrap();
        assert!(MetaRepo::current_user(&conn).unwrap().is_none());
    }
}
