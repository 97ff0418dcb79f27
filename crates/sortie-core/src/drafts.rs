//! Drafting new sessions for the schedule

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rand::Rng;
use sortie_api::Session;
use sortie_util::{SessionCode, SessionId, at_utc};
use thiserror::Error;
use tracing::debug;

use crate::{CODE_LENGTH, generate_unique_session_code};

/// Why a draft was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Session must start in the future (start {start}, now {now})")]
    StartNotInFuture {
        start: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    #[error("closing minutes cannot be negative (got {0})")]
    NegativeClosingMinutes(i64),

    #[error("registration opens at {registration_start}, after the session starts at {start}")]
    RegistrationAfterStart {
        registration_start: NaiveTime,
        start: NaiveTime,
    },

    #[error("session ends at {end}, before it starts at {start}")]
    EndBeforeStart { start: NaiveTime, end: NaiveTime },

    #[error("Session code '{0}' must be exactly {len} Latin letters", len = CODE_LENGTH)]
    InvalidCode(String),

    #[error("Session code '{0}' is already taken")]
    CodeTaken(String),
}

/// Input for a new session
#[derive(Debug, Clone)]
pub struct SessionDraft {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    /// Defaults to the start time
    pub registration_start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub closing_minutes: i64,
    /// Generated when absent
    pub code: Option<SessionCode>,
    pub comments: Option<String>,
}

impl SessionDraft {
    /// Check the draft at `now` and turn it into a session with a fresh id.
    ///
    /// `taken` holds the codes already on the schedule.
    pub fn build<R: Rng + ?Sized>(
        self,
        now: DateTime<Utc>,
        rng: &mut R,
        taken: &[SessionCode],
    ) -> Result<Session, DraftError> {
        let start = at_utc(self.date, self.start_time);
        if start <= now {
            return Err(DraftError::StartNotInFuture { start, now });
        }

        if self.closing_minutes < 0 {
            return Err(DraftError::NegativeClosingMinutes(self.closing_minutes));
        }

        let registration_start_time = self.registration_start_time.unwrap_or(self.start_time);
        if registration_start_time > self.start_time {
            return Err(DraftError::RegistrationAfterStart {
                registration_start: registration_start_time,
                start: self.start_time,
            });
        }

        if let Some(end) = self.end_time
            && end < self.start_time
        {
            return Err(DraftError::EndBeforeStart {
                start: self.start_time,
                end,
            });
        }

        let code = match self.code {
            Some(code) if !is_code_shaped(code.as_str()) => {
                return Err(DraftError::InvalidCode(code.to_string()));
            }
            Some(code) if taken.contains(&code) => {
                return Err(DraftError::CodeTaken(code.to_string()));
            }
            Some(code) => code,
            None => generate_unique_session_code(rng, taken),
        };

        let session = Session {
            id: SessionId::generate(),
            code: Some(code),
            title: None,
            date: self.date,
            registration_start_time,
            start_time: self.start_time,
            end_time: self.end_time,
            closing_minutes: self.closing_minutes,
            comments: self
                .comments
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        };

        debug!(session_id = %session.id, code = ?session.code, "Drafted session");

        Ok(session)
    }
}

fn is_code_shaped(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn draft() -> SessionDraft {
        SessionDraft {
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            start_time: t(10, 0),
            registration_start_time: None,
            end_time: Some(t(12, 0)),
            closing_minutes: 60,
            code: None,
            comments: Some("  ".into()),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 9, 18, 0, 0).unwrap()
    }

    #[test]
    fn test_build_generates_id_and_code() {
        let mut rng = StdRng::seed_from_u64(9);
        let taken = vec![SessionCode::new("ABC")];
        let session = draft().build(now(), &mut rng, &taken).unwrap();

        assert_eq!(session.id.as_str().len(), 32);
        assert_eq!(session.registration_start_time, t(10, 0));
        assert!(session.comments.is_none());

        let code = session.code.unwrap();
        assert_eq!(code.as_str().len(), 3);
        assert!(!taken.contains(&code));
    }

    #[test]
    fn test_start_must_be_in_future() {
        let mut rng = StdRng::seed_from_u64(9);
        let at_start = Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap();
        assert!(matches!(
            draft().build(at_start, &mut rng, &[]),
            Err(DraftError::StartNotInFuture { .. })
        ));
    }

    #[test]
    fn test_negative_closing_rejected() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut d = draft();
        d.closing_minutes = -1;
        assert_eq!(
            d.build(now(), &mut rng, &[]).unwrap_err(),
            DraftError::NegativeClosingMinutes(-1)
        );
    }

    #[test]
    fn test_registration_after_start_rejected() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut d = draft();
        d.registration_start_time = Some(t(11, 0));
        assert!(matches!(
            d.build(now(), &mut rng, &[]),
            Err(DraftError::RegistrationAfterStart { .. })
        ));
    }

    #[test]
    fn test_explicit_code_must_be_free() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut d = draft();
        d.code = Some(SessionCode::new("abc"));
        assert_eq!(
            d.build(now(), &mut rng, &[SessionCode::new("ABC")]).unwrap_err(),
            DraftError::CodeTaken("ABC".into())
        );
    }

    #[test]
    fn test_explicit_code_must_be_three_latin_letters() {
        let mut rng = StdRng::seed_from_u64(9);
        for bad in ["ab", "abcd", "a1c", "АБВ", ""] {
            let mut d = draft();
            d.code = Some(SessionCode::new(bad));
            assert_eq!(
                d.build(now(), &mut rng, &[]).unwrap_err(),
                DraftError::InvalidCode(bad.to_uppercase()),
                "code {:?}",
                bad
            );
        }

        let mut d = draft();
        d.code = Some(SessionCode::new(" xyz "));
        let session = d.build(now(), &mut rng, &[]).unwrap();
        assert_eq!(session.code, Some(SessionCode::new("XYZ")));
    }

    #[test]
    fn test_end_before_start_rejected() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut d = draft();
        d.end_time = Some(t(9, 59));
        assert_eq!(
            d.build(now(), &mut rng, &[]).unwrap_err(),
            DraftError::EndBeforeStart {
                start: t(10, 0),
                end: t(9, 59),
            }
        );

        let mut d = draft();
        d.end_time = Some(t(10, 0));
        assert!(d.build(now(), &mut rng, &[]).is_ok());
    }
}
