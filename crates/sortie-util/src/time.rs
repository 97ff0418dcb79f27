//! Time utilities for sortie
//!
//! All schedule dates and times are interpreted as UTC wall-clock values.
//! Display helpers format them back out with the Russian conventions used on
//! dispatcher screens (`DD.MM.YYYY`, `10 марта 2025 г.`, 24-hour `HH:MM`).
//!
//! # Mock Time for Development
//!
//! In debug builds, the `SORTIE_MOCK_TIME` environment variable can be set
//! to override the clock returned by [`now`]. This is useful for checking how
//! a schedule renders at a particular moment.
//!
//! Format: `YYYY-MM-DD HH:MM:SS`, read as UTC (e.g., `2025-03-10 08:45:00`)
//!
//! Example:
//! ```bash
//! SORTIE_MOCK_TIME="2025-03-10 08:45:00" sortie status
//! ```

use chrono::{DateTime, Datelike, DurationRound, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::sync::OnceLock;

use crate::{Result, SortieError};

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "SORTIE_MOCK_TIME";

/// Format accepted by [`MOCK_TIME_ENV_VAR`]
pub const MOCK_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Countdown text once the target instant has been reached
pub const STARTED_MARKER: &str = "Началась";

const MONTHS_GENITIVE: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

/// Cached mock time offset from the real time when the process started.
/// This allows mock time to advance naturally.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

#[allow(clippy::disallowed_methods)] // This is the internal implementation that wraps Utc::now()
fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_time_str) = std::env::var(MOCK_TIME_ENV_VAR) {
                match NaiveDateTime::parse_from_str(&mock_time_str, MOCK_TIME_FORMAT) {
                    Ok(naive_dt) => {
                        let offset = naive_dt.and_utc().signed_duration_since(Utc::now());
                        tracing::info!(
                            mock_time = %mock_time_str,
                            offset_secs = offset.num_seconds(),
                            "Mock time enabled"
                        );
                        return Some(offset);
                    }
                    Err(_) => {
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            expected_format = MOCK_TIME_FORMAT,
                            "Invalid mock time format"
                        );
                    }
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Get the current UTC time, respecting mock time settings in debug builds.
///
/// Status evaluation never calls this itself; callers take a snapshot and
/// pass it in.
#[allow(clippy::disallowed_methods)] // This is the wrapper that provides mock time support
pub fn now() -> DateTime<Utc> {
    let real_now = Utc::now();

    match get_mock_time_offset() {
        Some(offset) => real_now + offset,
        None => real_now,
    }
}

/// Parse a `YYYY-MM-DD` calendar date
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| SortieError::invalid_date(s, e.to_string()))
}

/// Parse an `HH:MM` time of day
pub fn parse_clock(s: &str) -> Result<NaiveTime> {
    let parts: Vec<&str> = s.trim().split(':').collect();
    if parts.len() != 2 {
        return Err(SortieError::invalid_time(s, "Expected HH:MM format"));
    }

    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    if !(1..=2).contains(&parts[0].len()) || !all_digits(parts[0]) {
        return Err(SortieError::invalid_time(s, "Invalid hour"));
    }
    if parts[1].len() != 2 || !all_digits(parts[1]) {
        return Err(SortieError::invalid_time(s, "Invalid minute"));
    }

    let hour: u32 = parts[0]
        .parse()
        .map_err(|_| SortieError::invalid_time(s, "Invalid hour"))?;
    let minute: u32 = parts[1]
        .parse()
        .map_err(|_| SortieError::invalid_time(s, "Invalid minute"))?;

    if hour >= 24 {
        return Err(SortieError::invalid_time(s, "Hour must be 0-23"));
    }
    if minute >= 60 {
        return Err(SortieError::invalid_time(s, "Minute must be 0-59"));
    }

    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| SortieError::invalid_time(s, "Out of range"))
}

/// Combine a schedule date and time of day into a UTC instant
pub fn at_utc(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    date.and_time(time).and_utc()
}

/// Drop seconds and below, for per-minute bucketing
pub fn truncate_to_minute(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.duration_trunc(chrono::Duration::minutes(1)).unwrap_or(dt)
}

/// `HH:MM`, 24-hour
pub fn format_clock_time(dt: &DateTime<Utc>) -> String {
    dt.format("%H:%M").to_string()
}

/// `HH:MM` for a bare time of day
pub fn format_time_of_day(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// `DD.MM.YYYY`
pub fn format_date_short(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Long Russian date, e.g. `10 марта 2025 г.`
pub fn format_date_long(date: NaiveDate) -> String {
    let month = MONTHS_GENITIVE[date.month0() as usize];
    format!("{} {} {} г.", date.day(), month, date.year())
}

/// Countdown text for a positive remaining duration.
///
/// Whole units are truncated, never rounded: `{d}д {h}ч` when at least a
/// day remains, `{h}ч {m}м` when at least an hour remains, else `{m}м`.
/// Zero or negative durations yield [`STARTED_MARKER`].
pub fn format_countdown(remaining: chrono::Duration) -> String {
    if remaining <= chrono::Duration::zero() {
        return STARTED_MARKER.to_string();
    }

    let days = remaining.num_days();
    let hours = remaining.num_hours() % 24;
    let minutes = remaining.num_minutes() % 60;

    if days > 0 {
        format!("{}д {}ч", days, hours)
    } else if hours > 0 {
        format!("{}ч {}м", hours, minutes)
    } else {
        format!("{}м", minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-03-10").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
        );
        assert!(parse_date("2025-02-30").is_err());
        assert!(parse_date("10.03.2025").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("14:30").unwrap(), NaiveTime::from_hms_opt(14, 30, 0).unwrap());
        assert_eq!(parse_clock("00:00").unwrap(), NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        assert_eq!(parse_clock("9:05").unwrap(), NaiveTime::from_hms_opt(9, 5, 0).unwrap());

        assert!(parse_clock("24:00").is_err());
        assert!(parse_clock("12:60").is_err());
        assert!(parse_clock("12:00:00").is_err());
        assert!(parse_clock("invalid").is_err());
    }

    #[test]
    fn test_parse_clock_rejects_signs_and_odd_widths() {
        assert!(parse_clock("+9:+5").is_err());
        assert!(parse_clock("09:5").is_err());
        assert!(parse_clock("009:05").is_err());
        assert!(parse_clock(" 9:05 ").is_ok());
        assert!(parse_clock("-1:00").is_err());
        assert!(parse_clock("٠٩:٠٥").is_err());
    }

    #[test]
    fn test_parse_clock_error_carries_value() {
        let err = parse_clock("25:00").unwrap_err();
        assert!(matches!(err, SortieError::InvalidTime { ref value, .. } if value == "25:00"));
    }

    #[test]
    fn test_at_utc() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let time = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        assert_eq!(at_utc(date, time), Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_truncate_to_minute() {
        let dt = Utc.with_ymd_and_hms(2025, 6, 1, 10, 7, 42).unwrap();
        assert_eq!(
            truncate_to_minute(dt),
            Utc.with_ymd_and_hms(2025, 6, 1, 10, 7, 0).unwrap()
        );
    }

    #[test]
    fn test_format_clock_time() {
        let dt = Utc.with_ymd_and_hms(2025, 12, 25, 14, 30, 45).unwrap();
        assert_eq!(format_clock_time(&dt), "14:30");
        assert_eq!(format_time_of_day(NaiveTime::from_hms_opt(7, 5, 0).unwrap()), "07:05");
    }

    #[test]
    fn test_format_dates() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert_eq!(format_date_short(date), "10.03.2025");
        assert_eq!(format_date_long(date), "10 марта 2025 г.");

        let date = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        assert_eq!(format_date_long(date), "1 декабря 2024 г.");
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(chrono::Duration::zero()), STARTED_MARKER);
        assert_eq!(format_countdown(chrono::Duration::minutes(-5)), STARTED_MARKER);
        assert_eq!(format_countdown(chrono::Duration::seconds(59)), "0м");
        assert_eq!(format_countdown(chrono::Duration::minutes(45)), "45м");
        assert_eq!(format_countdown(chrono::Duration::minutes(125)), "2ч 5м");
        assert_eq!(
            format_countdown(chrono::Duration::minutes(3 * 24 * 60 + 4 * 60 + 59)),
            "3д 4ч"
        );
    }

    #[test]
    fn test_format_countdown_truncates_minutes() {
        // 1h 29m 59s is still "1ч 29м"
        let d = chrono::Duration::seconds(3600 + 29 * 60 + 59);
        assert_eq!(format_countdown(d), "1ч 29м");
    }

    #[test]
    fn test_now_returns_time() {
        let t = now();
        assert!(t.year() >= 2020);
        assert!(t.year() <= 2100);
    }

    #[test]
    fn test_parse_mock_time_format() {
        for s in ["2025-12-25 14:30:00", "2025-01-01 00:00:00", "2025-12-31 23:59:59"] {
            assert!(
                NaiveDateTime::parse_from_str(s, MOCK_TIME_FORMAT).is_ok(),
                "Expected '{}' to parse",
                s
            );
        }

        for s in ["2025-12-25", "14:30:00", "2025-12-25T14:30:00", ""] {
            assert!(
                NaiveDateTime::parse_from_str(s, MOCK_TIME_FORMAT).is_err(),
                "Expected '{}' to be rejected",
                s
            );
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    fn test_is_mock_time_active_in_debug() {
        // OnceLock makes the env var impossible to toggle here; just make sure it doesn't panic
        let _ = is_mock_time_active();
    }
}
