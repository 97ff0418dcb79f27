//! Shared types for the sortie API

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sortie_util::{SessionCode, SessionId, SortieError};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a session.
///
/// Variants are declared in lifecycle order, so `Ord` follows the order a
/// fixed session moves through as time advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Registration window not open yet
    Upcoming,
    /// Registration open
    Open,
    /// Registration open, closes within the warning threshold
    Closing,
    /// Registration over; session not finished
    Closed,
    /// Session finished
    Completed,
}

impl SessionStatus {
    pub const ALL: [SessionStatus; 5] = [
        SessionStatus::Upcoming,
        SessionStatus::Open,
        SessionStatus::Closing,
        SessionStatus::Closed,
        SessionStatus::Completed,
    ];

    /// Badge text shown next to a session
    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::Upcoming => "Скоро откроется",
            SessionStatus::Open => "Открыта",
            SessionStatus::Closing => "Скоро закрывается",
            SessionStatus::Closed => "Закрыта",
            SessionStatus::Completed => "Завершена",
        }
    }

    /// Whether pilots may register right now
    pub fn can_register(&self) -> bool {
        matches!(self, SessionStatus::Open | SessionStatus::Closing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Upcoming => "upcoming",
            SessionStatus::Open => "open",
            SessionStatus::Closing => "closing",
            SessionStatus::Closed => "closed",
            SessionStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Normalized session record.
///
/// Legacy shapes are resolved before a `Session` exists, so every time field
/// the engine reads here is already concrete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub code: Option<SessionCode>,
    /// Free-form display name carried over from legacy records. Not a code.
    #[serde(default)]
    pub title: Option<String>,
    pub date: NaiveDate,
    pub registration_start_time: NaiveTime,
    pub start_time: NaiveTime,
    /// None means the default session length applies
    pub end_time: Option<NaiveTime>,
    /// Registration closes this many minutes before start.
    /// Expected non-negative; not special-cased when it isn't.
    pub closing_minutes: i64,
    pub comments: Option<String>,
}

/// Time-of-day fields as they may appear across record generations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegacyTimes {
    pub registration_start: Option<NaiveTime>,
    pub start: Option<NaiveTime>,
    /// Oldest shape: a single `time` used for both registration and start
    pub time: Option<NaiveTime>,
}

impl LegacyTimes {
    /// Resolve to `(registration_start, start)`.
    ///
    /// registration start: registration start, start, legacy time, 00:00.
    /// start: start, legacy time, 00:00.
    pub fn resolve(self) -> (NaiveTime, NaiveTime) {
        let midnight = NaiveTime::from_hms_opt(0, 0, 0).unwrap_or_default();
        let start = self.start.or(self.time).unwrap_or(midnight);
        let registration_start = self
            .registration_start
            .or(self.start)
            .or(self.time)
            .unwrap_or(midnight);
        (registration_start, start)
    }
}

/// Row band for tabular listings, by proximity of the flight window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProximityBand {
    /// Session end has passed
    Finished,
    /// Between start and end
    InProgress,
    /// Starts within two hours
    StartingSoon,
    Later,
}

/// Filter tabs on the pilot-facing list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    /// Open for registration, including closing-soon
    Open,
    Closing,
    Upcoming,
}

impl StatusFilter {
    pub fn matches(&self, status: SessionStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Open => status.can_register(),
            StatusFilter::Closing => status == SessionStatus::Closing,
            StatusFilter::Upcoming => status == SessionStatus::Upcoming,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "Все",
            StatusFilter::Open => "Открытые",
            StatusFilter::Closing => "Скоро закрываются",
            StatusFilter::Upcoming => "Скоро откроются",
        }
    }
}

impl FromStr for StatusFilter {
    type Err = SortieError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "open" => Ok(StatusFilter::Open),
            "closing" => Ok(StatusFilter::Closing),
            "upcoming" => Ok(StatusFilter::Upcoming),
            other => Err(SortieError::validation(format!("Unknown filter: {}", other))),
        }
    }
}

/// Per-tab counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCounts {
    pub all: usize,
    pub open: usize,
    pub closing: usize,
    pub upcoming: usize,
}

impl FilterCounts {
    pub fn get(&self, filter: StatusFilter) -> usize {
        match filter {
            StatusFilter::All => self.all,
            StatusFilter::Open => self.open,
            StatusFilter::Closing => self.closing,
            StatusFilter::Upcoming => self.upcoming,
        }
    }
}

/// Everything a list row needs, evaluated at one instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub code: Option<SessionCode>,
    pub title: Option<String>,
    pub status: SessionStatus,
    pub status_label: String,
    pub can_register: bool,
    pub band: ProximityBand,
    /// e.g. `10 марта 2025 г., 10:00 - 12:00`
    pub schedule: String,
    pub registration_window: String,
    /// Countdown to session start
    pub starts_in: String,
    pub comments: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn status_order_follows_lifecycle() {
        let mut shuffled = vec![
            SessionStatus::Completed,
            SessionStatus::Open,
            SessionStatus::Upcoming,
            SessionStatus::Closed,
            SessionStatus::Closing,
        ];
        shuffled.sort();
        assert_eq!(shuffled, SessionStatus::ALL.to_vec());
    }

    #[test]
    fn only_open_and_closing_accept_registrations() {
        let open: Vec<_> = SessionStatus::ALL
            .iter()
            .filter(|s| s.can_register())
            .collect();
        assert_eq!(open, vec![&SessionStatus::Open, &SessionStatus::Closing]);
    }

    #[test]
    fn legacy_time_fills_both_fields() {
        let times = LegacyTimes {
            registration_start: None,
            start: None,
            time: Some(t(14, 0)),
        };
        assert_eq!(times.resolve(), (t(14, 0), t(14, 0)));
    }

    #[test]
    fn registration_start_falls_back_to_start() {
        let times = LegacyTimes {
            registration_start: None,
            start: Some(t(10, 0)),
            time: Some(t(9, 0)),
        };
        assert_eq!(times.resolve(), (t(10, 0), t(10, 0)));
    }

    #[test]
    fn all_missing_resolves_to_midnight() {
        assert_eq!(LegacyTimes::default().resolve(), (t(0, 0), t(0, 0)));
    }

    #[test]
    fn explicit_fields_win() {
        let times = LegacyTimes {
            registration_start: Some(t(8, 0)),
            start: Some(t(10, 0)),
            time: Some(t(6, 0)),
        };
        assert_eq!(times.resolve(), (t(8, 0), t(10, 0)));
    }

    #[test]
    fn open_filter_includes_closing() {
        assert!(StatusFilter::Open.matches(SessionStatus::Closing));
        assert!(StatusFilter::Open.matches(SessionStatus::Open));
        assert!(!StatusFilter::Open.matches(SessionStatus::Upcoming));
        assert!(!StatusFilter::Closing.matches(SessionStatus::Open));
        assert!(StatusFilter::All.matches(SessionStatus::Completed));
    }

    #[test]
    fn filter_from_str() {
        assert_eq!("Closing".parse::<StatusFilter>().unwrap(), StatusFilter::Closing);
        assert!("archived".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn status_serialization() {
        let json = serde_json::to_string(&SessionStatus::Closing).unwrap();
        assert_eq!(json, "\"closing\"");
        let parsed: SessionStatus = serde_json::from_str("\"upcoming\"").unwrap();
        assert_eq!(parsed, SessionStatus::Upcoming);
    }
}
