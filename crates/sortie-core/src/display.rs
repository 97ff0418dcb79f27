//! Human-readable text derived from a session at a given instant.
//!
//! Everything here goes through [`SessionWindows`], so a countdown or window
//! message can never disagree with the status badge next to it.

use crate::status::SessionWindows;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use sortie_api::{ProximityBand, Session, SessionStatus, SessionView};
use sortie_util::{format_clock_time, format_countdown, format_date_long, format_date_short, format_time_of_day};

/// Rows starting within this window are flagged as starting soon
pub const STARTING_SOON_MINUTES: i64 = 120;

/// Countdown from `now` to `target`
pub fn time_until(target: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format_countdown(target - now)
}

/// Registration window sentence for the session card
pub fn format_registration_window(session: &Session, now: DateTime<Utc>) -> String {
    let windows = SessionWindows::for_session(session);

    match windows.status_at(now) {
        SessionStatus::Upcoming => format!(
            "Регистрация откроется в {}, через {}",
            format_clock_time(&windows.registration_start),
            time_until(windows.registration_start, now)
        ),
        SessionStatus::Open | SessionStatus::Closing => {
            let close = &windows.registration_close;
            let close_text = if close.date_naive() == session.date {
                format_clock_time(close)
            } else {
                format!("{} {}", format_date_short(close.date_naive()), format_clock_time(close))
            };
            format!(
                "Регистрация открыта с {}, закроется в {}",
                format_clock_time(&windows.registration_start),
                close_text
            )
        }
        SessionStatus::Closed | SessionStatus::Completed => "Регистрация закрыта".to_string(),
    }
}

pub fn proximity_band(session: &Session, now: DateTime<Utc>) -> ProximityBand {
    let windows = SessionWindows::for_session(session);

    if now >= windows.session_end {
        ProximityBand::Finished
    } else if now >= windows.session_start {
        ProximityBand::InProgress
    } else if windows.session_start - now <= Duration::minutes(STARTING_SOON_MINUTES) {
        ProximityBand::StartingSoon
    } else {
        ProximityBand::Later
    }
}

/// Length of the flight window, e.g. `2ч 0м`. Wraps past midnight.
pub fn format_session_length(start: NaiveTime, end: Option<NaiveTime>) -> String {
    let Some(end) = end else {
        return "—".to_string();
    };

    let mut length = end - start;
    if length < Duration::zero() {
        length += Duration::days(1);
    }

    format!("{}ч {}м", length.num_hours(), length.num_minutes() % 60)
}

/// `10 марта 2025 г., 10:00 - 12:00`
pub fn format_schedule(session: &Session) -> String {
    let date = format_date_long(session.date);
    let start = format_time_of_day(session.start_time);

    match session.end_time {
        Some(end) => format!("{}, {} - {}", date, start, format_time_of_day(end)),
        None => format!("{}, {}", date, start),
    }
}

/// Build the full list row for `session` at `now`
pub fn session_view(session: &Session, now: DateTime<Utc>) -> SessionView {
    let windows = SessionWindows::for_session(session);
    let status = windows.status_at(now);

    SessionView {
        session_id: session.id.clone(),
        code: session.code.clone(),
        title: session.title.clone(),
        status,
        status_label: status.label().to_string(),
        can_register: status.can_register(),
        band: proximity_band(session, now),
        schedule: format_schedule(session),
        registration_window: format_registration_window(session, now),
        starts_in: time_until(windows.session_start, now),
        comments: session.comments.clone(),
    }
}
