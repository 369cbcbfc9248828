use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{AppError, Result};
use crate::models::{PrayerName, PrayerProgress, QadaaInfo};

/// A validated make-up schedule, ready to be written to the profile.
#[derive(Debug, Clone, PartialEq)]
pub struct QadaaPlan {
    pub progress: PrayerProgress,
    pub info: QadaaInfo,
}

/// Both ends of the range count, so a single day yields one day.
pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> u32 {
    (end - start).num_days().unsigned_abs() as u32 + 1
}

pub fn plan(start: NaiveDate, end: NaiveDate, now: DateTime<Utc>) -> Result<QadaaPlan> {
    if end < start {
        return Err(AppError::ValidationError(
            "End date cannot be before start date".to_string(),
        ));
    }

    let days = days_in_range(start, end);
    Ok(QadaaPlan {
        progress: PrayerProgress::uniform(days),
        info: QadaaInfo {
            start_date: start,
            end_date: end,
            total_days: days,
            total_prayers: days * PrayerName::tracked().len() as u32,
            created_at: now,
        },
    })
}
