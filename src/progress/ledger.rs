use chrono::{DateTime, NaiveDate, Utc};
use log::info;

use crate::error::{AppError, Result};
use crate::models::{
    MarkSource, PrayerCount, PrayerName, PrayerProgress, ProgressLogEntry, QadaaInfo,
};
use crate::progress::qadaa;
use crate::progress::store::ProfileStore;

/// Total used when a prayer is marked before any schedule set it up.
/// Deliberately independent of the qadaa range total.
pub const FALLBACK_TOTAL: u32 = 30;

const MARK_DONE_ACTION: &str = "mark_done";

#[derive(Debug, Clone, PartialEq)]
pub struct MarkOutcome {
    pub prayer: PrayerName,
    pub count: PrayerCount,
}

impl MarkOutcome {
    pub fn confirmation(&self) -> String {
        format!(
            "{} prayer has been marked as completed ({}/{}). May Allah accept your prayers.",
            self.prayer.display_name(),
            self.count.done,
            self.count.total
        )
    }
}

/// Per-user prayer counters living in the profile store.
///
/// Increments are single store-side updates with no read-modify-write guard,
/// so simultaneous marks from two call sites each land but nothing checks
/// `done` against `total`.
pub struct ProgressLedger<'a> {
    store: &'a dyn ProfileStore,
}

impl<'a> ProgressLedger<'a> {
    pub fn new(store: &'a dyn ProfileStore) -> Self {
        Self { store }
    }

    pub fn progress(&self, user_id: &str) -> Result<Option<PrayerProgress>> {
        Ok(self.profile_progress(user_id)?.0)
    }

    pub fn qadaa_info(&self, user_id: &str) -> Result<Option<QadaaInfo>> {
        Ok(self.profile_progress(user_id)?.1)
    }

    fn profile_progress(
        &self,
        user_id: &str,
    ) -> Result<(Option<PrayerProgress>, Option<QadaaInfo>)> {
        let profile = self
            .store
            .get_profile(user_id)?
            .ok_or_else(|| AppError::StoreError(format!("No profile for '{}'", user_id)))?;
        Ok((profile.progress, profile.qadaa_info))
    }

    /// Add one completed prayer. Used by both the notification action and
    /// the dashboard; the two behave identically.
    pub fn mark_done(
        &self,
        user_id: &str,
        prayer: PrayerName,
        source: MarkSource,
    ) -> Result<MarkOutcome> {
        self.mark_done_at(user_id, prayer, source, Utc::now())
    }

    pub fn mark_done_at(
        &self,
        user_id: &str,
        prayer: PrayerName,
        source: MarkSource,
        now: DateTime<Utc>,
    ) -> Result<MarkOutcome> {
        if !prayer.is_tracked() {
            return Err(AppError::ValidationError(format!(
                "{} is not a tracked prayer",
                prayer.display_name()
            )));
        }

        let (progress, _) = self.profile_progress(user_id)?;
        let existing = progress.as_ref().and_then(|p| p.get(prayer));
        if existing.is_none() {
            self.store.init_prayer_count(
                user_id,
                prayer,
                PrayerCount {
                    done: 0,
                    total: FALLBACK_TOTAL,
                },
            )?;
        }

        self.store.increment_done(user_id, prayer, 1)?;
        self.store.append_log(
            user_id,
            &ProgressLogEntry {
                id: None,
                prayer,
                action: MARK_DONE_ACTION.to_string(),
                source,
                timestamp: now,
            },
        )?;

        let count = self
            .progress(user_id)?
            .and_then(|p| p.get(prayer))
            .ok_or_else(|| {
                AppError::StoreError(format!("{} progress vanished after update", prayer))
            })?;

        info!(
            "Marked {} done for {} via {} ({}/{})",
            prayer.as_str(),
            user_id,
            source.as_str(),
            count.done,
            count.total
        );
        Ok(MarkOutcome { prayer, count })
    }

    /// Validate the range, then replace any previous progress with a fresh
    /// schedule. Nothing is written when validation fails.
    pub fn create_schedule(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<qadaa::QadaaPlan> {
        let plan = qadaa::plan(start, end, Utc::now())?;
        if self.store.get_profile(user_id)?.is_none() {
            return Err(AppError::StoreError(format!("No profile for '{}'", user_id)));
        }
        self.store
            .replace_progress(user_id, &plan.progress, &plan.info)?;
        info!(
            "Created qadaa schedule for {}: {} days from {} to {}",
            user_id, plan.info.total_days, start, end
        );
        Ok(plan)
    }

    /// Drop the history log, then the progress and qadaa info.
    pub fn reset(&self, user_id: &str) -> Result<usize> {
        let removed = self.store.delete_logs(user_id)?;
        self.store.clear_progress(user_id)?;
        info!("Reset prayer data for {} ({} log entries removed)", user_id, removed);
        Ok(removed)
    }

    pub fn history(&self, user_id: &str, limit: usize) -> Result<Vec<ProgressLogEntry>> {
        self.store.logs(user_id, limit)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use rusqlite::Connection;

    use crate::db::migrations::run_migrations;
    use crate::db::repository::SqliteProfileStore;
    use crate::models::UserProfile;
    use crate::progress::store::ProfileStore;

    pub const USER: &str = "amina@example.com";

    pub fn conn_with_user() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        SqliteProfileStore::new(&conn)
            .create_profile(&UserProfile {
                user_id: USER.to_string(),
                email: USER.to_string(),
                name: "Amina".to_string(),
                created_at: chrono::Utc::now(),
                photo_url: None,
                progress: None,
                qadaa_info: None,
            })
            .unwrap();
        conn
    }
}
