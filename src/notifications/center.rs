use log::debug;
use rusqlite::Connection;

use crate::db::repository::NotificationRepo;
use crate::error::{AppError, Result};
use crate::models::{
    NotificationCategory, NotificationRequest, PermissionStatus, ScheduledNotification,
};
use crate::utils::time::{minutes_until, WallClock};

/// The host's local-notification facility.
pub trait NotificationCenter {
    fn request_permission(&mut self) -> Result<PermissionStatus>;

    fn cancel_all_scheduled(&mut self) -> Result<()>;

    /// Registers a daily repeating notification and returns its id.
    fn schedule(&mut self, request: &NotificationRequest) -> Result<String>;

    fn set_category(&mut self, category: &NotificationCategory) -> Result<()>;

    fn scheduled(&self) -> Result<Vec<ScheduledNotification>>;

    fn category(&self, identifier: &str) -> Result<Option<NotificationCategory>>;
}

/// Notification host for the terminal: schedules live in the local database
/// and the dashboard delivers them when they come due.
pub struct SqliteNotificationCenter<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteNotificationCenter<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Schedules whose daily trigger lies in `(after, until]`, wrapping past
    /// midnight. An empty window yields nothing.
    pub fn due_between(
        &self,
        after: WallClock,
        until: WallClock,
    ) -> Result<Vec<ScheduledNotification>> {
        let window = minutes_until(after, until);
        Ok(self
            .scheduled()?
            .into_iter()
            .filter(|n| {
                let offset = minutes_until(after, n.request.trigger);
                offset > 0 && offset <= window
            })
            .collect())
    }
}

fn host_error(e: AppError) -> AppError {
    match e {
        AppError::StoreError(msg) => AppError::SchedulingFailed(msg),
        other => other,
    }
}

impl NotificationCenter for SqliteNotificationCenter<'_> {
    fn request_permission(&mut self) -> Result<PermissionStatus> {
        Ok(PermissionStatus::Granted)
    }

    fn cancel_all_scheduled(&mut self) -> Result<()> {
        let removed = NotificationRepo::delete_all(self.conn).map_err(host_error)?;
        debug!("Cancelled {} scheduled notifications", removed);
        Ok(())
    }

    fn schedule(&mut self, request: &NotificationRequest) -> Result<String> {
        NotificationRepo::insert(self.conn, request)
            .map(|id| id.to_string())
            .map_err(host_error)
    }

    fn set_category(&mut self, category: &NotificationCategory) -> Result<()> {
        NotificationRepo::upsert_category(self.conn, category).map_err(host_error)
    }

    fn scheduled(&self) -> Result<Vec<ScheduledNotification>> {
        NotificationRepo::all(self.conn).map_err(host_error)
    }

    fn category(&self, identifier: &str) -> Result<Option<NotificationCategory>> {
        NotificationRepo::category(self.conn, identifier).map_err(host_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::PrayerName;

    fn clock(s: &str) -> WallClock {
        s.parse().unwrap()
    }

    #[test]
    fn due_window_is_half_open_and_wraps() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let mut center = SqliteNotificationCenter::new(&conn);
        center
            .schedule(&NotificationRequest::for_prayer(PrayerName::Fajr, clock("05:17")))
            .unwrap();
        center
            .schedule(&NotificationRequest::for_prayer(PrayerName::Isha, clock("23:59")))
            .unwrap();

        let due = center.due_between(clock("05:16"), clock("05:17")).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].request.prayer, PrayerName::Fajr);

        assert!(center.due_between(clock("05:17"), clock("05:30")).unwrap().is_empty());
        assert!(center.due_between(clock("05:17"), clock("05:17")).unwrap().is_empty());

        let overnight = center.due_between(clock("23:00"), clock("06:00")).unwrap();
        assert_eq!(overnight.len(), 2);
    }

    #[test]
    fn permission_is_granted_locally() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let mut center = SqliteNotificationCenter::new(&conn);
        assert_eq!(center.request_permission().unwrap(), PermissionStatus::Granted);
    }

    #[test]
    fn storage_failures_surface_as_scheduling_errors() {
        // No migrations: every host call hits a missing table.
        let conn = Connection::open_in_memory().unwrap();
        let mut center = SqliteNotificationCenter::new(&conn);
        let err = center.cancel_all_scheduled().unwrap_err();
        assert!(matches!(err, AppError::SchedulingFailed(_)));
    }
}
