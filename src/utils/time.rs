use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::AppError;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// A time of day with minute precision, as the API reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WallClock {
    pub hour: u32,
    pub minute: u32,
}

impl WallClock {
    pub fn new(hour: u32, minute: u32) -> Result<Self, AppError> {
        if hour > 23 || minute > 59 {
            return Err(AppError::ValidationError(format!(
                "Invalid time of day {}:{}",
                hour, minute
            )));
        }
        Ok(Self { hour, minute })
    }

    pub fn minutes_since_midnight(&self) -> u32 {
        self.hour * 60 + self.minute
    }

    pub fn from_naive_time(t: NaiveTime) -> Self {
        Self {
            hour: t.hour(),
            minute: t.minute(),
        }
    }

    pub fn to_naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl std::fmt::Display for WallClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for WallClock {
    type Err = AppError;

    /// Accepts `HH:MM`, ignoring a trailing annotation such as `05:17 (GMT)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || AppError::ValidationError(format!("Bad time '{}', expected HH:MM", s));
        let clock = s.split_whitespace().next().ok_or_else(bad)?;
        let (h, m) = clock.split_once(':').ok_or_else(bad)?;
        if h.is_empty() || m.len() != 2 {
            return Err(bad());
        }
        let hour: u32 = h.parse().map_err(|_| bad())?;
        let minute: u32 = m.parse().map_err(|_| bad())?;
        WallClock::new(hour, minute)
    }
}

/// Minutes from `from` forward to `to`, wrapping past midnight. Always in `0..1440`.
pub fn minutes_until(from: WallClock, to: WallClock) -> u32 {
    let from = from.minutes_since_midnight();
    let to = to.minutes_since_midnight();
    (to + MINUTES_PER_DAY - from) % MINUTES_PER_DAY
}

/// Whole seconds left before the next local midnight.
pub fn seconds_until_midnight(now: NaiveDateTime) -> i64 {
    let elapsed = now.time().num_seconds_from_midnight() as i64;
    (MINUTES_PER_DAY as i64 * 60) - elapsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn round_trips_zero_padded() {
        let t: WallClock = "05:17".parse().unwrap();
        assert_eq!(t, WallClock { hour: 5, minute: 17 });
        assert_eq!(t.to_string(), "05:17");
    }

    #[test]
    fn ignores_zone_annotation() {
        let t: WallClock = "18:42 (GMT)".parse().unwrap();
        assert_eq!(t.to_string(), "18:42");
    }

    #[test]
    fn rejects_malformed_times() {
        for s in ["", "5", "24:00", "12:60", "ab:cd", "12:5", ":30"] {
            assert!(s.parse::<WallClock>().is_err(), "{} should fail", s);
        }
    }

    #[test]
    fn minutes_until_wraps_midnight() {
        let isha = WallClock::new(22, 30).unwrap();
        let fajr = WallClock::new(5, 0).unwrap();
        assert_eq!(minutes_until(isha, fajr), 390);
        assert_eq!(minutes_until(fajr, isha), 1050);
        assert_eq!(minutes_until(fajr, fajr), 0);
    }

    #[test]
    fn seconds_to_midnight() {
        let now = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(23, 59, 30)
            .unwrap();
        assert_eq!(seconds_until_midnight(now), 30);
    }
}
