//! Session status derivation

use chrono::{DateTime, Duration, Utc};
use sortie_api::{Session, SessionStatus};
use sortie_util::at_utc;

/// Registration is "closing" when it closes within this many minutes
pub const CLOSING_SOON_MINUTES: i64 = 30;

/// Session length assumed when no end time is set
pub const DEFAULT_SESSION_MINUTES: i64 = 120;

/// Instants derived from a session's schedule fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionWindows {
    pub registration_start: DateTime<Utc>,
    pub registration_close: DateTime<Utc>,
    pub session_start: DateTime<Utc>,
    pub session_end: DateTime<Utc>,
}

impl SessionWindows {
    pub fn for_session(session: &Session) -> Self {
        let registration_start = at_utc(session.date, session.registration_start_time);
        let session_start = at_utc(session.date, session.start_time);
        let session_end = match session.end_time {
            Some(end) => at_utc(session.date, end),
            None => offset_minutes(session_start, DEFAULT_SESSION_MINUTES),
        };
        let registration_close = offset_minutes(session_start, -session.closing_minutes);

        Self {
            registration_start,
            registration_close,
            session_start,
            session_end,
        }
    }

    /// Status at `now`. First matching rule wins.
    pub fn status_at(&self, now: DateTime<Utc>) -> SessionStatus {
        if now >= self.session_end {
            return SessionStatus::Completed;
        }

        // Session has begun; closing minutes no longer matter
        if now >= self.session_start {
            return SessionStatus::Closed;
        }

        if now < self.registration_start {
            return SessionStatus::Upcoming;
        }

        let until_close = self.registration_close - now;
        if until_close <= Duration::zero() {
            SessionStatus::Closed
        } else if until_close <= Duration::minutes(CLOSING_SOON_MINUTES) {
            SessionStatus::Closing
        } else {
            SessionStatus::Open
        }
    }
}

/// Lifecycle status of `session` at `now`
pub fn compute_status(session: &Session, now: DateTime<Utc>) -> SessionStatus {
    SessionWindows::for_session(session).status_at(now)
}

/// `base + minutes`, saturating at the representable range
fn offset_minutes(base: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    Duration::try_minutes(minutes)
        .and_then(|d| base.checked_add_signed(d))
        .unwrap_or(if minutes < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}
