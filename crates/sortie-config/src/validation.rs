//! Schedule validation

use crate::schema::{RawConfig, RawSession, non_empty};
use sortie_util::{SortieError, parse_clock, parse_date};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Poll interval bounds, in seconds
pub const MIN_POLL_INTERVAL_SECS: u64 = 10;
pub const MAX_POLL_INTERVAL_SECS: u64 = 60;

/// Longest session code a schedule may carry
pub const MAX_CODE_CHARS: usize = 16;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Session '{session_id}': {message}")]
    SessionError { session_id: String, message: String },

    #[error("Duplicate session ID: {0}")]
    DuplicateSessionId(String),

    #[error("Session code '{code}' used by both '{first}' and '{second}'")]
    DuplicateSessionCode {
        code: String,
        first: String,
        second: String,
    },

    #[error("Session '{session_id}': invalid date '{value}': {message}")]
    InvalidDate {
        session_id: String,
        value: String,
        message: String,
    },

    #[error("Session '{session_id}': invalid {field} '{value}': {message}")]
    InvalidTimeFormat {
        session_id: String,
        field: &'static str,
        value: String,
        message: String,
    },

    #[error("Session '{session_id}': closing_minutes cannot be negative (got {value})")]
    NegativeClosingMinutes { session_id: String, value: i64 },

    #[error(
        "poll_interval_seconds must be between {min} and {max} (got {0})",
        min = MIN_POLL_INTERVAL_SECS,
        max = MAX_POLL_INTERVAL_SECS
    )]
    InvalidPollInterval(u64),

    #[error("Global config error: {0}")]
    GlobalError(String),
}

/// Validate a raw schedule, collecting every problem found
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(secs) = config.board.poll_interval_seconds
        && !(MIN_POLL_INTERVAL_SECS..=MAX_POLL_INTERVAL_SECS).contains(&secs)
    {
        errors.push(ValidationError::InvalidPollInterval(secs));
    }

    if let Some(minutes) = config.board.default_closing_minutes
        && minutes < 0
    {
        errors.push(ValidationError::GlobalError(format!(
            "default_closing_minutes cannot be negative (got {})",
            minutes
        )));
    }

    // Ids are compared the way they are stored: trimmed
    let mut seen_ids = HashSet::new();
    for session in &config.sessions {
        if !seen_ids.insert(session.id.trim()) {
            errors.push(ValidationError::DuplicateSessionId(session.id.trim().to_string()));
        }
    }

    // Session codes are unique, case-insensitively. Titles may repeat.
    let mut seen_codes: HashMap<String, &str> = HashMap::new();
    for session in &config.sessions {
        let Some(code) = session.code() else {
            continue;
        };
        let key = code.to_uppercase();
        match seen_codes.get(&key) {
            Some(first) => errors.push(ValidationError::DuplicateSessionCode {
                code: key.clone(),
                first: first.to_string(),
                second: session.id.clone(),
            }),
            None => {
                seen_codes.insert(key, &session.id);
            }
        }
    }

    for session in &config.sessions {
        errors.extend(validate_session(session));
    }

    errors
}

/// Validate a single session record
pub fn validate_session(session: &RawSession) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if session.id.trim().is_empty() {
        errors.push(ValidationError::SessionError {
            session_id: session.id.clone(),
            message: "id cannot be empty".into(),
        });
    }

    if let Err(SortieError::InvalidDate { value, message }) = parse_date(&session.date) {
        errors.push(ValidationError::InvalidDate {
            session_id: session.id.clone(),
            value,
            message,
        });
    }

    let time_fields = [
        ("registration_start_time", &session.registration_start_time),
        ("start_time", &session.start_time),
        ("end_time", &session.end_time),
        ("time", &session.time),
    ];
    for (field, value) in time_fields {
        if let Some(raw) = non_empty(value)
            && let Err(SortieError::InvalidTime { value, message }) = parse_clock(raw)
        {
            errors.push(ValidationError::InvalidTimeFormat {
                session_id: session.id.clone(),
                field,
                value,
                message,
            });
        }
    }

    if let Some(minutes) = session.closing_minutes
        && minutes < 0
    {
        errors.push(ValidationError::NegativeClosingMinutes {
            session_id: session.id.clone(),
            value: minutes,
        });
    }

    if let Some(code) = session.code()
        && code.chars().count() > MAX_CODE_CHARS
    {
        errors.push(ValidationError::SessionError {
            session_id: session.id.clone(),
            message: format!(
                "session code '{}' is longer than {} characters",
                code, MAX_CODE_CHARS
            ),
        });
    }

    errors
}
