//! Validated schedule structures

use crate::schema::{RawBoardConfig, RawConfig, RawSession, non_empty};
use sortie_api::{LegacyTimes, Session};
use sortie_util::{
    SessionCode, SessionId, SortieError, at_utc, format_time_of_day, parse_clock, parse_date,
};
use std::time::Duration;
use tracing::{debug, warn};

/// Default seconds between status refreshes
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Default minutes before start at which registration closes
pub const DEFAULT_CLOSING_MINUTES: i64 = 60;

/// Validated schedule ready for use by the status engine
#[derive(Debug, Clone)]
pub struct Schedule {
    /// Board configuration
    pub board: BoardConfig,

    /// Normalized sessions, in file order
    pub sessions: Vec<Session>,
}

impl Schedule {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Result<Self, SortieError> {
        let board = BoardConfig::from_raw(&raw.board);

        let sessions = raw
            .sessions
            .iter()
            .map(|s| session_from_raw(s, board.default_closing_minutes))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { board, sessions })
    }

    /// Get session by ID
    pub fn get_session(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| &s.id == id)
    }

    /// Session codes already in use
    pub fn taken_codes(&self) -> Vec<SessionCode> {
        self.sessions.iter().filter_map(|s| s.code.clone()).collect()
    }
}

/// Board configuration
#[derive(Debug, Clone)]
pub struct BoardConfig {
    pub poll_interval: Duration,
    pub default_closing_minutes: i64,
}

impl BoardConfig {
    fn from_raw(raw: &RawBoardConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(
                raw.poll_interval_seconds.unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
            ),
            default_closing_minutes: raw
                .default_closing_minutes
                .unwrap_or(DEFAULT_CLOSING_MINUTES),
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            default_closing_minutes: DEFAULT_CLOSING_MINUTES,
        }
    }
}

/// Normalize one raw record into a [`Session`].
///
/// Applies the time fallback chain and fails fast on any date or time that
/// doesn't parse.
pub fn session_from_raw(raw: &RawSession, default_closing_minutes: i64) -> Result<Session, SortieError> {
    let date = parse_date(&raw.date)?;
    let times = LegacyTimes {
        registration_start: parse_optional_clock(&raw.registration_start_time)?,
        start: parse_optional_clock(&raw.start_time)?,
        time: parse_optional_clock(&raw.time)?,
    };
    let (registration_start_time, start_time) = times.resolve();
    let end_time = parse_optional_clock(&raw.end_time)?;

    if raw.status.is_some() {
        debug!(session_id = %raw.id, "Ignoring cached status on session record");
    }

    let session = Session {
        id: SessionId::new(raw.id.trim()),
        code: raw.code().map(SessionCode::new),
        title: raw.title().map(str::to_string),
        date,
        registration_start_time,
        start_time,
        end_time,
        closing_minutes: raw.closing_minutes.unwrap_or(default_closing_minutes),
        comments: non_empty(&raw.comments).map(str::to_string),
    };

    warn_on_disordered_times(&session);

    Ok(session)
}

/// Normalize a single JSON session record, as served by the session store
pub fn session_from_json(json: &str, default_closing_minutes: i64) -> Result<Session, SortieError> {
    let raw: RawSession = serde_json::from_str(json)
        .map_err(|e| SortieError::validation(format!("Malformed session record: {}", e)))?;
    session_from_raw(&raw, default_closing_minutes)
}

/// Inverse of [`session_from_raw`]: the current record shape for `session`
pub fn session_to_raw(session: &Session) -> RawSession {
    RawSession {
        id: session.id.to_string(),
        session_code: session.code.as_ref().map(|c| c.to_string()),
        name: session.title.clone(),
        date: session.date.format("%Y-%m-%d").to_string(),
        registration_start_time: Some(format_time_of_day(session.registration_start_time)),
        start_time: Some(format_time_of_day(session.start_time)),
        end_time: session.end_time.map(format_time_of_day),
        closing_minutes: Some(session.closing_minutes),
        comments: session.comments.clone(),
        ..Default::default()
    }
}

fn parse_optional_clock(value: &Option<String>) -> Result<Option<chrono::NaiveTime>, SortieError> {
    non_empty(value).map(parse_clock).transpose()
}

fn warn_on_disordered_times(session: &Session) {
    let registration_start = at_utc(session.date, session.registration_start_time);
    let start = at_utc(session.date, session.start_time);

    if registration_start > start {
        warn!(
            session_id = %session.id,
            registration_start = %session.registration_start_time,
            start = %session.start_time,
            "Registration opens after the session starts"
        );
    }

    if let Some(end_time) = session.end_time
        && at_utc(session.date, end_time) < start
    {
        warn!(
            session_id = %session.id,
            start = %session.start_time,
            end = %end_time,
            "Session ends before it starts"
        );
    }
}
