use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::AppError;
use crate::utils::time::WallClock;

/// Prayer names in canonical daily order. Sunrise is shown but never tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrayerName {
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerName {
    pub fn all() -> [PrayerName; 6] {
        [
            PrayerName::Fajr,
            PrayerName::Sunrise,
            PrayerName::Dhuhr,
            PrayerName::Asr,
            PrayerName::Maghrib,
            PrayerName::Isha,
        ]
    }

    /// The five prayers that carry progress counters and reminders.
    pub fn tracked() -> [PrayerName; 5] {
        [
            PrayerName::Fajr,
            PrayerName::Dhuhr,
            PrayerName::Asr,
            PrayerName::Maghrib,
            PrayerName::Isha,
        ]
    }

    pub fn is_tracked(&self) -> bool {
        *self != PrayerName::Sunrise
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "fajr",
            PrayerName::Sunrise => "sunrise",
            PrayerName::Dhuhr => "dhuhr",
            PrayerName::Asr => "asr",
            PrayerName::Maghrib => "maghrib",
            PrayerName::Isha => "isha",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "Fajr",
            PrayerName::Sunrise => "Sunrise",
            PrayerName::Dhuhr => "Dhuhr",
            PrayerName::Asr => "Asr",
            PrayerName::Maghrib => "Maghrib",
            PrayerName::Isha => "Isha",
        }
    }
}

impl std::fmt::Display for PrayerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PrayerName {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fajr" => Ok(PrayerName::Fajr),
            "sunrise" => Ok(PrayerName::Sunrise),
            "dhuhr" | "zuhr" | "dhuhur" => Ok(PrayerName::Dhuhr),
            "asr" => Ok(PrayerName::Asr),
            "maghrib" => Ok(PrayerName::Maghrib),
            "isha" => Ok(PrayerName::Isha),
            _ => Err(AppError::ValidationError(format!(
                "Unknown prayer '{}'. Use: fajr, dhuhr, asr, maghrib, isha",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HijriDate {
    /// `DD-MM-YYYY` as returned by the API.
    pub date: String,
    pub month_en: String,
    pub year: String,
}

impl HijriDate {
    pub fn formatted(&self) -> String {
        format!("{} {}, {} H", self.date, self.month_en, self.year)
    }
}

/// One day's timings for the configured location. Fetched fresh every day
/// and replaced wholesale, never merged.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyPrayerTimes {
    pub date: NaiveDate,
    pub readable: String,
    pub hijri: HijriDate,
    pub fajr: WallClock,
    pub sunrise: WallClock,
    pub dhuhr: WallClock,
    pub asr: WallClock,
    pub maghrib: WallClock,
    pub isha: WallClock,
}

impl DailyPrayerTimes {
    pub fn get(&self, name: PrayerName) -> WallClock {
        match name {
            PrayerName::Fajr => self.fajr,
            PrayerName::Sunrise => self.sunrise,
            PrayerName::Dhuhr => self.dhuhr,
            PrayerName::Asr => self.asr,
            PrayerName::Maghrib => self.maghrib,
            PrayerName::Isha => self.isha,
        }
    }

    /// All six entries in canonical order.
    pub fn entries(&self) -> Vec<(PrayerName, WallClock)> {
        PrayerName::all().into_iter().map(|p| (p, self.get(p))).collect()
    }

    pub fn tracked_entries(&self) -> Vec<(PrayerName, WallClock)> {
        PrayerName::tracked()
            .into_iter()
            .map(|p| (p, self.get(p)))
            .collect()
    }

    /// True when the tracked times never go backwards from Fajr to Isha,
    /// allowing only Isha itself to fall after midnight.
    pub fn is_canonically_ordered(&self) -> bool {
        let entries = self.tracked_entries();
        entries.windows(2).enumerate().all(|(i, pair)| {
            let (prev, next) = (pair[0].1, pair[1].1);
            let last_pair = i == entries.len() - 2;
            next >= prev || (last_pair && next < self.fajr)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    Today,
    Tomorrow,
}

/// Derived on every tick, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NextPrayer {
    pub name: PrayerName,
    pub time: WallClock,
    pub day: Occurrence,
    pub minutes_until: i64,
}

impl NextPrayer {
    pub fn countdown(&self) -> String {
        crate::utils::format::format_countdown(self.minutes_until)
    }
}

/// Fixture shared by tests across modules.
#[cfg(test)]
pub(crate) fn sample_times() -> DailyPrayerTimes {
    let t = |s: &str| s.parse::<WallClock>().unwrap();
    DailyPrayerTimes {
        date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        readable: "15 Mar 2024".to_string(),
        hijri: HijriDate {
            date: "05-09-1445".to_string(),
            month_en: "Ramaḍān".to_string(),
            year: "1445".to_string(),
        },
        fajr: t("05:17"),
        sunrise: t("06:40"),
        dhuhr: t("12:45"),
        asr: t("16:05"),
        maghrib: t("18:50"),
        isha: t("20:05"),
    }
}
