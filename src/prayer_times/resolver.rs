use chrono::{Duration, NaiveDateTime, Timelike};

use crate::models::{DailyPrayerTimes, NextPrayer, Occurrence};

/// Pick the first tracked prayer strictly later than `now` (minute precision),
/// wrapping to tomorrow's Fajr once Isha has passed.
///
/// A prayer whose time equals the current minute has already begun and is
/// not reported as next.
pub fn resolve_next(times: &DailyPrayerTimes, now: NaiveDateTime) -> NextPrayer {
    let now_minutes = now.hour() * 60 + now.minute();
    let tracked = times.tracked_entries();

    let (name, time, day) = tracked
        .iter()
        .find(|(_, t)| t.minutes_since_midnight() > now_minutes)
        .map(|(name, t)| (*name, *t, Occurrence::Today))
        .unwrap_or_else(|| {
            let (name, t) = tracked[0];
            (name, t, Occurrence::Tomorrow)
        });

    let target_date = match day {
        Occurrence::Today => now.date(),
        Occurrence::Tomorrow => now.date() + Duration::days(1),
    };
    let target = target_date.and_time(time.to_naive_time());
    let minutes_until = (target - now).num_seconds().div_euclid(60);

    NextPrayer {
        name,
        time,
        day,
        minutes_until,
    }
}
