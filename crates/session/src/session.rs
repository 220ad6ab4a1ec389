//! Session records and the events the tracker fans out

use serde::{Deserialize, Serialize};

/// One play session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    /// Milliseconds since the Unix epoch
    pub start_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<u64>,
    pub game_count: u32,
    pub is_active: bool,
}

impl Session {
    pub fn new(id: String, start_time: u64) -> Self {
        Self {
            id,
            start_time,
            end_time: None,
            game_count: 0,
            is_active: true,
        }
    }

    /// Length of a finished session
    pub fn duration_ms(&self) -> Option<u64> {
        self.end_time.map(|end| end.saturating_sub(self.start_time))
    }
}

/// Why a session left the Active state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// `end_current_session` was called
    Manual,
    /// A new session was started over it
    Replaced,
    /// The host context is going away
    Unload,
    /// The inactivity deadline passed
    Timeout,
    /// Found past its deadline when restored from storage
    Recovered,
}

impl EndReason {
    /// Timed out rather than ended by the caller
    pub fn is_expiry(&self) -> bool {
        matches!(self, EndReason::Timeout | EndReason::Recovered)
    }
}

/// Transition notification delivered to every subscriber
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Started(Session),
    GameStarted(Session),
    Ended { session: Session, reason: EndReason },
    /// State was re-read from storage
    Synced(Option<Session>),
}

/// Aggregate over history plus the active session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStats {
    pub total_sessions: usize,
    pub total_games: u64,
    pub total_play_time_ms: u64,
    pub average_session_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_session_json_omits_end_time() {
        let session = Session::new("s1".into(), 42);
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "s1", "startTime": 42, "gameCount": 0, "isActive": true})
        );
    }

    #[test]
    fn finished_session_duration() {
        let mut session = Session::new("s1".into(), 1_000);
        assert_eq!(session.duration_ms(), None);
        session.end_time = Some(4_000);
        assert_eq!(session.duration_ms(), Some(3_000));
        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("\"endTime\":4000"));
    }
}
