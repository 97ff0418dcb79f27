//! Events emitted by the board

use sortie_api::SessionStatus;
use sortie_util::{SessionCode, SessionId};

/// Events emitted by the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    /// A session's status differs from the previous tick.
    /// `from` is `None` the first time a session is seen.
    StatusChanged {
        session_id: SessionId,
        code: Option<SessionCode>,
        from: Option<SessionStatus>,
        to: SessionStatus,
    },

    /// Schedule was reloaded
    ScheduleReloaded {
        session_count: usize,
    },
}
