//! Session board: evaluates every scheduled session at a given instant

use chrono::{DateTime, Utc};
use sortie_api::{FilterCounts, Session, SessionStatus, SessionView, StatusFilter};
use sortie_config::Schedule;
use sortie_util::{SessionCode, SessionId, SortieError};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::{BoardEvent, SessionWindows, StatusCache, compute_status, session_view};

/// The session board
pub struct Board {
    schedule: Schedule,
    last_statuses: HashMap<SessionId, SessionStatus>,
    cache: StatusCache,
}

impl Board {
    pub fn new(schedule: Schedule) -> Self {
        info!(session_count = schedule.sessions.len(), "Board initialized");

        Self {
            schedule,
            last_statuses: HashMap::new(),
            cache: StatusCache::new(),
        }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Replace the schedule.
    ///
    /// Previously seen statuses are kept for sessions that still exist, so
    /// the next tick only reports real changes.
    pub fn reload(&mut self, schedule: Schedule) -> BoardEvent {
        let session_count = schedule.sessions.len();
        self.last_statuses
            .retain(|id, _| schedule.get_session(id).is_some());
        self.schedule = schedule;
        self.cache.clear();

        info!(session_count, "Schedule reloaded");

        BoardEvent::ScheduleReloaded { session_count }
    }

    pub fn status_of(&self, id: &SessionId, now: DateTime<Utc>) -> Option<SessionStatus> {
        self.schedule
            .get_session(id)
            .map(|session| compute_status(session, now))
    }

    /// Look a session up by id, or by code ignoring case
    pub fn find(&self, key: &str) -> Result<&Session, SortieError> {
        let key = key.trim();
        let code = SessionCode::new(key);

        self.schedule
            .sessions
            .iter()
            .find(|s| s.id.as_str() == key)
            .or_else(|| self.schedule.sessions.iter().find(|s| s.code.as_ref() == Some(&code)))
            .ok_or_else(|| SortieError::SessionNotFound(key.to_string()))
    }

    /// Every session, ordered by start
    pub fn list(&self, now: DateTime<Utc>) -> Vec<SessionView> {
        sorted_by_start(&self.schedule.sessions)
            .into_iter()
            .map(|session| session_view(session, now))
            .collect()
    }

    /// Same as [`Board::list`], but evaluated at the start of the current
    /// minute and memoized until the minute changes
    pub fn list_cached(&mut self, now: DateTime<Utc>) -> Vec<SessionView> {
        let views: Vec<SessionView> = sorted_by_start(&self.schedule.sessions)
            .into_iter()
            .map(|session| self.cache.get_or_compute(session, now))
            .collect();

        let (hits, misses) = self.cache.stats();
        debug!(hits, misses, "Status cache");

        views
    }

    /// Sessions that haven't completed, soonest first
    pub fn upcoming(&self, now: DateTime<Utc>) -> Vec<SessionView> {
        self.list(now)
            .into_iter()
            .filter(|view| view.status != SessionStatus::Completed)
            .collect()
    }

    /// Completed sessions, most recent first
    pub fn archive(&self, now: DateTime<Utc>) -> Vec<SessionView> {
        let mut views: Vec<SessionView> = self
            .list(now)
            .into_iter()
            .filter(|view| view.status == SessionStatus::Completed)
            .collect();
        views.reverse();
        views
    }

    /// Upcoming sessions matching a filter tab
    pub fn filter(&self, now: DateTime<Utc>, filter: StatusFilter) -> Vec<SessionView> {
        self.upcoming(now)
            .into_iter()
            .filter(|view| filter.matches(view.status))
            .collect()
    }

    /// Counts for every filter tab, over upcoming sessions
    pub fn counts(&self, now: DateTime<Utc>) -> FilterCounts {
        let mut counts = FilterCounts::default();

        for session in &self.schedule.sessions {
            let status = compute_status(session, now);
            if status == SessionStatus::Completed {
                continue;
            }
            counts.all += 1;
            if StatusFilter::Open.matches(status) {
                counts.open += 1;
            }
            if StatusFilter::Closing.matches(status) {
                counts.closing += 1;
            }
            if StatusFilter::Upcoming.matches(status) {
                counts.upcoming += 1;
            }
        }

        counts
    }

    /// Recompute every status and report what changed since the last tick
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<BoardEvent> {
        let mut events = Vec::new();

        for session in &self.schedule.sessions {
            let status = compute_status(session, now);
            let previous = self.last_statuses.insert(session.id.clone(), status);

            if previous == Some(status) {
                continue;
            }

            info!(
                session_id = %session.id,
                from = ?previous,
                to = %status,
                "Session status changed"
            );

            events.push(BoardEvent::StatusChanged {
                session_id: session.id.clone(),
                code: session.code.clone(),
                from: previous,
                to: status,
            });
        }

        debug!(event_count = events.len(), "Board tick");

        events
    }

    /// Session codes already in use on this board
    pub fn taken_codes(&self) -> Vec<SessionCode> {
        self.schedule.taken_codes()
    }
}

/// Ascending by session start; ties broken by id
fn sorted_by_start(sessions: &[Session]) -> Vec<&Session> {
    let mut sorted: Vec<&Session> = sessions.iter().collect();
    sorted.sort_by_cached_key(|s| (SessionWindows::for_session(s).session_start, s.id.clone()));
    sorted
}
