pub mod notification;
pub mod prayer;
pub mod profile;
pub mod progress;

pub use notification::{
    NotificationAction, NotificationCategory, NotificationRequest, NotificationResponse,
    PermissionStatus, ScheduledNotification, MARK_AS_DONE,
};
pub use prayer::{DailyPrayerTimes, HijriDate, NextPrayer, Occurrence, PrayerName};
pub use profile::UserProfile;
pub use progress::{MarkSource, PrayerCount, PrayerProgress, ProgressLogEntry, QadaaInfo};
