//! Pilot registration for a session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sortie_api::{Session, SessionStatus};
use sortie_util::{ParticipantId, SessionId};
use thiserror::Error;
use tracing::{debug, info};

use crate::{CODE_LENGTH, KeyCheck, ValidKeys, compute_status};

/// Why a registration was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("Registration is not open (session is {status})")]
    RegistrationClosed { status: SessionStatus },

    #[error("Pilot name cannot be empty")]
    EmptyName,

    #[error("Pilot code '{0}' must be exactly {len} Latin letters", len = CODE_LENGTH)]
    InvalidCode(String),
}

/// A pilot registered for a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub session_id: SessionId,
    pub name: String,
    /// Three Latin letters, uppercased
    pub code: String,
    /// `None` until a dispatcher checks the code
    pub is_valid: Option<bool>,
    pub registered_at: DateTime<Utc>,
}

impl Participant {
    /// Check the pilot's code against the accepted keys and record the verdict.
    ///
    /// An empty key set can't confirm anything, so validity stays unset.
    pub fn verify(&mut self, keys: &ValidKeys) -> Option<bool> {
        self.is_valid = match keys.check(&self.code) {
            _ if keys.is_empty() => None,
            KeyCheck::Valid => Some(true),
            KeyCheck::Invalid | KeyCheck::Empty => Some(false),
        };

        debug!(
            participant_id = %self.id,
            session_id = %self.session_id,
            is_valid = ?self.is_valid,
            "Participant verified"
        );

        self.is_valid
    }

    /// Manual override by a dispatcher; `None` clears the verdict
    pub fn set_validity(&mut self, is_valid: Option<bool>) {
        self.is_valid = is_valid;
    }
}

/// Register a pilot for `session` at `now`.
///
/// Only allowed while registration is open or closing. The code is taken
/// as typed: exactly three Latin letters, nothing stripped or cut.
pub fn register(
    session: &Session,
    now: DateTime<Utc>,
    name: &str,
    code: &str,
) -> Result<Participant, RegistrationError> {
    let status = compute_status(session, now);
    if !status.can_register() {
        return Err(RegistrationError::RegistrationClosed { status });
    }

    let name = name.trim();
    if name.is_empty() {
        return Err(RegistrationError::EmptyName);
    }

    if code.len() != CODE_LENGTH || !code.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(RegistrationError::InvalidCode(code.to_string()));
    }

    let participant = Participant {
        id: ParticipantId::generate(),
        session_id: session.id.clone(),
        name: name.to_string(),
        code: code.to_ascii_uppercase(),
        is_valid: None,
        registered_at: now,
    };

    info!(
        session_id = %session.id,
        participant_id = %participant.id,
        %status,
        "Pilot registered"
    );

    Ok(participant)
}
