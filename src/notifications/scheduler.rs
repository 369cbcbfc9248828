use chrono::NaiveDate;
use log::{info, warn};
use rusqlite::Connection;

use crate::config::LocationConfig;
use crate::db::repository::MetaRepo;
use crate::error::{AppError, Result};
use crate::models::{DailyPrayerTimes, NotificationCategory, NotificationRequest, PermissionStatus};
use crate::notifications::center::NotificationCenter;
use crate::prayer_times::TimingsSource;

fn scheduling(e: AppError) -> AppError {
    match e {
        AppError::SchedulingFailed(_) => e,
        other => AppError::SchedulingFailed(other.to_string()),
    }
}

/// Replace every scheduled reminder with one daily reminder per tracked
/// prayer. Cancelling first keeps repeated calls from stacking duplicates.
pub fn reschedule(
    center: &mut dyn NotificationCenter,
    times: &DailyPrayerTimes,
) -> Result<Vec<String>> {
    center.cancel_all_scheduled().map_err(scheduling)?;

    let mut ids = Vec::new();
    for (prayer, at) in times.tracked_entries() {
        let id = center
            .schedule(&NotificationRequest::for_prayer(prayer, at))
            .map_err(scheduling)?;
        info!("Scheduled {} notification for {}", prayer.as_str(), at);
        ids.push(id);
    }

    center
        .set_category(&NotificationCategory::prayers())
        .map_err(scheduling)?;
    Ok(ids)
}

pub fn disable(center: &mut dyn NotificationCenter) -> Result<()> {
    center.cancel_all_scheduled().map_err(scheduling)?;
    info!("Cancelled all prayer notifications");
    Ok(())
}

/// Turn reminders on or off. The stored preference changes only after the
/// host has accepted the new state.
pub fn set_reminders_enabled(
    conn: &Connection,
    center: &mut dyn NotificationCenter,
    source: &dyn TimingsSource,
    location: &LocationConfig,
    today: NaiveDate,
    enabled: bool,
) -> Result<()> {
    if !enabled {
        return disable_reminders(conn, center);
    }
    if center.request_permission()? != PermissionStatus::Granted {
        return Err(AppError::PermissionDenied);
    }
    let times = source.fetch_daily_times(today, location)?;
    reschedule(center, &times)?;
    MetaRepo::set_notifications_enabled(conn, true)?;
    Ok(())
}

/// Turn reminders off. Needs no timings, so callers need no client.
pub fn disable_reminders(conn: &Connection, center: &mut dyn NotificationCenter) -> Result<()> {
    disable(center)?;
    MetaRepo::set_notifications_enabled(conn, false)?;
    Ok(())
}

/// On launch, refresh the schedule if reminders were left on. Failures are
/// logged and otherwise ignored so startup always proceeds.
pub fn restore_on_startup(
    conn: &Connection,
    center: &mut dyn NotificationCenter,
    source: &dyn TimingsSource,
    location: &LocationConfig,
    today: NaiveDate,
) -> Option<DailyPrayerTimes> {
    match MetaRepo::notifications_enabled(conn) {
        Ok(true) => {}
        Ok(false) => return None,
        Err(e) => {
            warn!("Could not read notification preference: {}", e);
            return None;
        }
    }

    let times = match source.fetch_daily_times(today, location) {
        Ok(times) => times,
        Err(e) => {
            warn!("Skipping reminder refresh: {}", e);
            return None;
        }
    };
    if let Err(e) = reschedule(center, &times) {
        warn!("Reminder refresh failed: {}", e);
    }
    Some(times)
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use crate::models::ScheduledNotification;
    use std::cell::Cell;

    /// In-memory host that mimics the platform API, including the option to
    /// fail after a number of successful schedule calls.
    #[derive(Default)]
    pub struct FakeCenter {
        pub scheduled: Vec<ScheduledNotification>,
        pub categories: Vec<NotificationCategory>,
        pub deny_permission: bool,
        pub fail_after: Option<usize>,
        next_id: usize,
    }

    impl FakeCenter {
        /// Accepts `n` schedule calls, then rejects the rest.
        pub fn failing_after(n: usize) -> Self {
            Self {
                fail_after: Some(n),
                ..Self::default()
            }
        }

        pub fn denying() -> Self {
            Self {
                deny_permission: true,
                ..Self::default()
            }
        }
    }

    impl NotificationCenter for FakeCenter {
        fn request_permission(&mut self) -> Result<PermissionStatus> {
            Ok(if self.deny_permission {
                PermissionStatus::Denied
            } else {
                PermissionStatus::Granted
            })
        }

        fn cancel_all_scheduled(&mut self) -> Result<()> {
            self.scheduled.clear();
            Ok(())
        }

        fn schedule(&mut self, request: &NotificationRequest) -> Result<String> {
            if self.fail_after == Some(self.scheduled.len()) {
                return Err(AppError::SchedulingFailed("permission revoked".to_string()));
            }
            self.next_id += 1;
            let id = format!("n{}", self.next_id);
            self.scheduled.push(ScheduledNotification {
                id: id.clone(),
                request: request.clone(),
            });
            Ok(id)
        }

        fn set_category(&mut self, category: &NotificationCategory) -> Result<()> {
            self.categories.retain(|c| c.identifier != category.identifier);
            self.categories.push(category.clone());
            Ok(())
        }

        fn scheduled(&self) -> Result<Vec<ScheduledNotification>> {
            Ok(self.scheduled.clone())
        }

        fn category(&self, identifier: &str) -> Result<Option<NotificationCategory>> {
            Ok(self
                .categories
                .iter()
                .find(|c| c.identifier == identifier)
                .cloned())
        }
    }

    /// Timings source that returns a fixed day or a fixed failure.
    pub struct FakeSource {
        pub times: Option<DailyPrayerTimes>,
        pub calls: Cell<usize>,
    }

    impl FakeSource {
        pub fn ok(times: DailyPrayerTimes) -> Self {
            Self {
                times: Some(times),
                calls: Cell::new(0),
            }
        }

        pub fn failing() -> Self {
            Self {
                times: None,
                calls: Cell::new(0),
            }
        }
    }

    impl TimingsSource for FakeSource {
        fn fetch_daily_times(
            &self,
            _date: NaiveDate,
            _location: &LocationConfig,
        ) -> Result<DailyPrayerTimes> {
            self.calls.set(self.calls.get() + 1);
            self.times
                .clone()
                .ok_or_else(|| AppError::FetchFailed("Prayer times API returned status 503".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fakes::{FakeCenter, FakeSource};
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::prayer::sample_times;
    use crate::models::{PrayerName, MARK_AS_DONE};
    use crate::notifications::center::SqliteNotificationCenter;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn reschedule_registers_five_daily_reminders() {
        let mut center = FakeCenter::default();
        let ids = reschedule(&mut center, &sample_times()).unwrap();
        assert_eq!(ids.len(), 5);

        let prayers: Vec<_> = center.scheduled.iter().map(|n| n.request.prayer).collect();
        assert_eq!(prayers, PrayerName::tracked().to_vec());

        let dhuhr = &center.scheduled[1].request;
        assert_eq!(dhuhr.trigger.to_string(), "12:45");
        assert_eq!(dhuhr.title, "🕌 Time for Dhuhr Prayer");
        assert_eq!(dhuhr.body, "It's time to pray Dhuhr.");
        assert_eq!(dhuhr.category, "prayers");

        let category = center.category("prayers").unwrap().unwrap();
        assert_eq!(category.actions.len(), 1);
        assert_eq!(category.actions[0].identifier, MARK_AS_DONE);
        assert!(!category.actions[0].is_destructive);
    }

    #[test]
    fn reschedule_twice_yields_five_not_ten() {
        let conn = conn();
        let mut center = SqliteNotificationCenter::new(&conn);
        reschedule(&mut center, &sample_times()).unwrap();
        reschedule(&mut center, &sample_times()).unwrap();
        assert_eq!(center.scheduled().unwrap().len(), 5);
    }

    #[test]
    fn host_rejection_is_scheduling_failure() {
        let mut center = FakeCenter::failing_after(2);
        let err = reschedule(&mut center, &sample_times()).unwrap_err();
        assert!(matches!(err, AppError::SchedulingFailed(_)));
        assert_eq!(center.scheduled.len(), 2);
    }

    #[test]
    fn enabling_schedules_and_persists_flag() {
        let conn = conn();
        let mut center = FakeCenter::default();
        let source = FakeSource::ok(sample_times());
        let location = LocationConfig::default();

        set_reminders_enabled(&conn, &mut center, &source, &location, today(), true).unwrap();
        assert_eq!(center.scheduled.len(), 5);
        assert!(MetaRepo::notifications_enabled(&conn).unwrap());

        set_reminders_enabled(&conn, &mut center, &source, &location, today(), false).unwrap();
        assert!(center.scheduled.is_empty());
        assert!(!MetaRepo::notifications_enabled(&conn).unwrap());
    }

    #[test]
    fn disabling_needs_no_timings_source() {
        let conn = conn();
        let mut center = SqliteNotificationCenter::new(&conn);
        reschedule(&mut center, &sample_times()).unwrap();
        MetaRepo::set_notifications_enabled(&conn, true).unwrap();

        disable_reminders(&conn, &mut center).unwrap();
        assert!(center.scheduled().unwrap().is_empty());
        assert!(!MetaRepo::notifications_enabled(&conn).unwrap());
    }

    #[test]
    fn disabling_through_toggle_never_fetches() {
        let conn = conn();
        let mut center = FakeCenter::default();
        let source = FakeSource::failing();
        set_reminders_enabled(&conn, &mut center, &source, &LocationConfig::default(), today(), false)
            .unwrap();
        assert_eq!(source.calls.get(), 0);
    }

    #[test]
    fn denied_permission_leaves_flag_untouched() {
        let conn = conn();
        let mut center = FakeCenter::denying();
        let source = FakeSource::ok(sample_times());
        let err = set_reminders_enabled(
            &conn,
            &mut center,
            &source,
            &LocationConfig::default(),
            today(),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied));
        assert_eq!(source.calls.get(), 0);
        assert!(!MetaRepo::notifications_enabled(&conn).unwrap());
    }

    #[test]
    fn fetch_failure_while_enabling_keeps_reminders_off() {
        let conn = conn();
        let mut center = FakeCenter::default();
        let err = set_reminders_enabled(
            &conn,
            &mut center,
            &FakeSource::failing(),
            &LocationConfig::default(),
            today(),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::FetchFailed(_)));
        assert!(!MetaRepo::notifications_enabled(&conn).unwrap());
    }

    #[test]
    fn startup_refresh_only_when_enabled() {
        let conn = conn();
        let mut center = FakeCenter::default();
        let source = FakeSource::ok(sample_times());
        let location = LocationConfig::default();

        assert!(restore_on_startup(&conn, &mut center, &source, &location, today()).is_none());
        assert_eq!(source.calls.get(), 0);

        MetaRepo::set_notifications_enabled(&conn, true).unwrap();
        assert!(restore_on_startup(&conn, &mut center, &source, &location, today()).is_some());
        assert_eq!(center.scheduled.len(), 5);

        let failing = FakeSource::failing();
        assert!(restore_on_startup(&conn, &mut center, &failing, &location, today()).is_none());
    }
}
