use chrono::NaiveDate;
use log::{debug, warn};
use reqwest::Url;
use serde::Deserialize;

use crate::config::LocationConfig;
use crate::error::{AppError, Result};
use crate::models::{DailyPrayerTimes, HijriDate};
use crate::utils::time::WallClock;

/// Anything that can produce a day's timings for a location.
pub trait TimingsSource {
    fn fetch_daily_times(
        &self,
        date: NaiveDate,
        location: &LocationConfig,
    ) -> Result<DailyPrayerTimes>;
}

#[derive(Debug, Deserialize)]
struct TimingsEnvelope {
    code: u16,
    status: String,
    data: TimingsData,
}

#[derive(Debug, Deserialize)]
struct TimingsData {
    timings: RawTimings,
    date: RawDate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawTimings {
    fajr: String,
    sunrise: String,
    dhuhr: String,
    asr: String,
    maghrib: String,
    isha: String,
}

#[derive(Debug, Deserialize)]
struct RawDate {
    readable: String,
    hijri: RawHijri,
}

#[derive(Debug, Deserialize)]
struct RawHijri {
    date: String,
    month: RawHijriMonth,
    year: String,
}

#[derive(Debug, Deserialize)]
struct RawHijriMonth {
    en: String,
}

/// Client for the aladhan.com `timingsByCity` endpoint. One request per call,
/// no retries.
pub struct AladhanClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl AladhanClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("miqat/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn timings_url(&self, date: NaiveDate, location: &LocationConfig) -> Result<Url> {
        let endpoint = format!(
            "{}/timingsByCity/{}",
            self.base_url,
            date.format("%d-%m-%Y")
        );
        let method = location.method.to_string();
        Url::parse_with_params(
            &endpoint,
            &[
                ("city", location.city.as_str()),
                ("country", location.country.as_str()),
                ("method", method.as_str()),
            ],
        )
        .map_err(|e| AppError::FetchFailed(format!("Bad endpoint '{}': {}", endpoint, e)))
    }
}

impl TimingsSource for AladhanClient {
    fn fetch_daily_times(
        &self,
        date: NaiveDate,
        location: &LocationConfig,
    ) -> Result<DailyPrayerTimes> {
        let url = self.timings_url(date, location)?;
        debug!("Fetching prayer times from: {}", url);

        let response = self.http.get(url).send()?;
        if !response.status().is_success() {
            warn!("Prayer times API returned status {}", response.status());
            return Err(AppError::FetchFailed(format!(
                "Prayer times API returned status {}",
                response.status()
            )));
        }

        let body = response.text()?;
        parse_timings(date, &body)
    }
}

fn parse_clock(label: &str, raw: &str) -> Result<WallClock> {
    raw.parse::<WallClock>()
        .map_err(|_| AppError::FetchFailed(format!("Invalid {} time '{}'", label, raw)))
}

/// Decode a `timingsByCity` response body. All six timings must be present
/// and well-formed; a partial record is an error.
pub fn parse_timings(date: NaiveDate, body: &str) -> Result<DailyPrayerTimes> {
    let envelope: TimingsEnvelope = serde_json::from_str(body)?;
    if envelope.code != 200 {
        return Err(AppError::FetchFailed(format!(
            "Prayer times API answered {} {}",
            envelope.code, envelope.status
        )));
    }

    let TimingsData { timings, date: day } = envelope.data;
    let times = DailyPrayerTimes {
        date,
        readable: day.readable,
        hijri: HijriDate {
            date: day.hijri.date,
            month_en: day.hijri.month.en,
            year: day.hijri.year,
        },
        fajr: parse_clock("Fajr", &timings.fajr)?,
        sunrise: parse_clock("Sunrise", &timings.sunrise)?,
        dhuhr: parse_clock("Dhuhr", &timings.dhuhr)?,
        asr: parse_clock("Asr", &timings.asr)?,
        maghrib: parse_clock("Maghrib", &timings.maghrib)?,
        isha: parse_clock("Isha", &timings.isha)?,
    };

    if !times.is_canonically_ordered() {
        warn!("Prayer times for {} are out of canonical order", date);
    }
    Ok(times)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Answer a single HTTP request with `status` and `body`, returning the
    /// base URL to point the client at.
    fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 {
                if line == "\r\n" {
                    break;
                }
                line.clear();
            }
            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            )
            .unwrap();
        });
        format!("http://{}/v1", addr)
    }

    fn local_client(base_url: String) -> AladhanClient {
        AladhanClient {
            base_url,
            http: reqwest::blocking::Client::builder().no_proxy().build().unwrap(),
        }
    }

    const BODY: &str = r#"{
        "code": 200,
        "status": "OK",
        "data": {
            "timings": {
                "Fajr": "05:56", "Sunrise": "07:12", "Dhuhr": "13:13",
                "Asr": "16:31", "Sunset": "19:13", "Maghrib": "19:13",
                "Isha": "20:29", "Imsak": "05:46", "Midnight": "01:13"
            },
            "date": {
                "readable": "15 Mar 2024",
                "timestamp": "1710489600",
                "hijri": {
                    "date": "05-09-1445",
                    "month": { "number": 9, "en": "Ramaḍān", "ar": "رَمَضان" },
                    "year": "1445"
                }
            },
            "meta": { "timezone": "Africa/Nouakchott" }
        }
    }"#;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn parses_envelope() {
        let times = parse_timings(date(), BODY).unwrap();
        assert_eq!(times.fajr.to_string(), "05:56");
        assert_eq!(times.sunrise.to_string(), "07:12");
        assert_eq!(times.isha.to_string(), "20:29");
        assert_eq!(times.readable, "15 Mar 2024");
        assert_eq!(times.hijri.formatted(), "05-09-1445 Ramaḍān, 1445 H");
    }

    #[test]
    fn missing_timing_is_fetch_failure() {
        let body = BODY.replace(r#""Asr": "16:31","#, "");
        let err = parse_timings(date(), &body).unwrap_err();
        assert!(matches!(err, AppError::FetchFailed(_)));
    }

    #[test]
    fn malformed_timing_is_fetch_failure() {
        let body = BODY.replace("20:29", "late");
        let err = parse_timings(date(), &body).unwrap_err();
        assert!(matches!(err, AppError::FetchFailed(msg) if msg.contains("Isha")));
    }

    #[test]
    fn error_envelope_is_fetch_failure() {
        let body = r#"{"code": 400, "status": "BAD_REQUEST", "data": "Unable to find city"}"#;
        assert!(matches!(
            parse_timings(date(), body),
            Err(AppError::FetchFailed(_))
        ));
        assert!(matches!(
            parse_timings(date(), "<html>"),
            Err(AppError::FetchFailed(_))
        ));
    }

    #[test]
    fn server_error_status_is_fetch_failure() {
        let client = local_client(serve_once("503 Service Unavailable", ""));
        let err = client
            .fetch_daily_times(date(), &LocationConfig::default())
            .unwrap_err();
        assert!(matches!(err, AppError::FetchFailed(msg) if msg.contains("503")));
    }

    #[test]
    fn fetches_and_decodes_a_day() {
        let client = local_client(serve_once("200 OK", BODY));
        let times = client
            .fetch_daily_times(date(), &LocationConfig::default())
            .unwrap();
        assert_eq!(times.date, date());
        assert_eq!(times.dhuhr.to_string(), "13:13");
    }

    #[test]
    fn url_carries_date_and_location() {
        let client = AladhanClient::new("https://api.aladhan.com/v1/").unwrap();
        let location = LocationConfig {
            city: "Nouakchott".to_string(),
            country: "Mauritania".to_string(),
            method: 3,
        };
        let url = client.timings_url(date(), &location).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.aladhan.com/v1/timingsByCity/15-03-2024?city=Nouakchott&country=Mauritania&method=3"
        );
    }

    #[test]
    fn url_encodes_city_names() {
        let client = AladhanClient::new("https://api.aladhan.com/v1").unwrap();
        let location = LocationConfig {
            city: "New York".to_string(),
            country: "USA".to_string(),
            method: 2,
        };
        let url = client.timings_url(date(), &location).unwrap();
        assert!(url.as_str().contains("city=New+York"));
    }
}
