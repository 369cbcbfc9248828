use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::AppError;
use crate::models::PrayerName;

/// Counter for one prayer. `done <= total` is a convention only; nothing
/// enforces it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerCount {
    pub done: u32,
    pub total: u32,
}

impl PrayerCount {
    pub fn remaining(&self) -> u32 {
        self.total.saturating_sub(self.done)
    }

    pub fn is_complete(&self) -> bool {
        self.done >= self.total
    }

    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            0
        } else {
            ((self.done as f64 / self.total as f64) * 100.0).round() as u32
        }
    }
}

/// Per-prayer counters for one user. Missing keys mean "no sub-record yet".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrayerProgress {
    pub counts: BTreeMap<PrayerName, PrayerCount>,
}

impl PrayerProgress {
    pub fn uniform(total: u32) -> Self {
        let counts = PrayerName::tracked()
            .into_iter()
            .map(|p| (p, PrayerCount { done: 0, total }))
            .collect();
        Self { counts }
    }

    pub fn get(&self, prayer: PrayerName) -> Option<PrayerCount> {
        self.counts.get(&prayer).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QadaaInfo {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: u32,
    pub total_prayers: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkSource {
    Notification,
    Manual,
}

impl MarkSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkSource::Notification => "notification",
            MarkSource::Manual => "manual",
        }
    }
}

impl FromStr for MarkSource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notification" => Ok(MarkSource::Notification),
            "manual" => Ok(MarkSource::Manual),
            _ => Err(AppError::StoreError(format!("Unknown mark source: {}", s))),
        }
    }
}

/// One line of the per-user history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressLogEntry {
    pub id: Option<i64>,
    pub prayer: PrayerName,
    pub action: String,
    pub source: MarkSource,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_covers_tracked_prayers_only() {
        let progress = PrayerProgress::uniform(10);
        assert_eq!(progress.counts.len(), 5);
        assert!(progress.get(PrayerName::Sunrise).is_none());
        assert_eq!(
            progress.get(PrayerName::Isha),
            Some(PrayerCount { done: 0, total: 10 })
        );
    }

    #[test]
    fn percent_and_remaining() {
        let c = PrayerCount { done: 3, total: 8 };
        assert_eq!(c.remaining(), 5);
        assert_eq!(c.percent(), 38);
        assert!(!c.is_complete());

        let over = PrayerCount { done: 31, total: 30 };
        assert_eq!(over.remaining(), 0);
        assert!(over.is_complete());
        assert_eq!(PrayerCount { done: 0, total: 0 }.percent(), 0);
    }
}
