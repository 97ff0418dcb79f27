//! Per-minute memo of session views

use crate::display::session_view;
use chrono::{DateTime, Utc};
use sortie_api::{Session, SessionView};
use sortie_util::{SessionId, truncate_to_minute};
use std::collections::HashMap;

/// Views keyed by `(session id, minute bucket)`.
///
/// Only one bucket is held at a time: seeing a newer minute drops everything
/// cached under the old one. Each view is evaluated at the bucket instant,
/// so a cached answer is the same one a fresh evaluation at that instant
/// would give.
#[derive(Debug, Default)]
pub struct StatusCache {
    bucket: Option<DateTime<Utc>>,
    views: HashMap<SessionId, SessionView>,
    hits: u64,
    misses: u64,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// View for `session` in the minute containing `now`
    pub fn get_or_compute(&mut self, session: &Session, now: DateTime<Utc>) -> SessionView {
        let bucket = truncate_to_minute(now);
        if self.bucket != Some(bucket) {
            self.views.clear();
            self.bucket = Some(bucket);
        }

        if let Some(view) = self.views.get(&session.id) {
            self.hits += 1;
            return view.clone();
        }

        self.misses += 1;
        let view = session_view(session, bucket);
        self.views.insert(session.id.clone(), view.clone());
        view
    }

    pub fn clear(&mut self) {
        self.bucket = None;
        self.views.clear();
    }

    /// Minute the cached entries belong to
    pub fn bucket(&self) -> Option<DateTime<Utc>> {
        self.bucket
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// `(hits, misses)` since creation
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
