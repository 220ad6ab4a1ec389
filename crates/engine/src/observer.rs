//! Hooks the game calls into
//!
//! Sound playback, session bookkeeping and anything else outside the engine
//! hang off [`GameObserver`]. Every hook is fire-and-forget.

use tracing::debug;

use tetris_sim_core::ScoreUpdate;
use tetris_sim_session::SharedTracker;

use crate::types::SoundKind;

/// Final totals of a finished (or running) game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameSummary {
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    pub pieces_locked: u32,
}

pub trait GameObserver: Send {
    fn play_sound(&mut self, _sound: SoundKind) {}

    fn on_game_start(&mut self) {}

    /// Called once per lock that cleared rows, with the updated totals
    fn on_lines_cleared(&mut self, _lines: usize, _totals: &ScoreUpdate) {}

    fn on_game_over(&mut self, _summary: &GameSummary) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl GameObserver for NoopObserver {}

/// Forwards game starts to a shared session tracker
#[derive(Debug, Clone)]
pub struct SessionLink {
    tracker: SharedTracker,
}

impl SessionLink {
    pub fn new(tracker: SharedTracker) -> Self {
        Self { tracker }
    }

    pub fn tracker(&self) -> &SharedTracker {
        &self.tracker
    }
}

impl GameObserver for SessionLink {
    fn on_game_start(&mut self) {
        let session = self.tracker.lock().on_game_start();
        debug!(session = %session.id, games = session.game_count, "game linked to session");
    }

    fn on_game_over(&mut self, summary: &GameSummary) {
        if let Some(session) = self.tracker.lock().get_current_session() {
            debug!(session = %session.id, score = summary.score, "game finished");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tetris_sim_session::{ManualClock, MemoryStore, SessionConfig, SessionTracker};

    use super::*;

    #[test]
    fn session_link_counts_games() {
        let tracker = Arc::new(Mutex::new(SessionTracker::new(
            Arc::new(MemoryStore::new()),
            Arc::new(ManualClock::new(0)),
            SessionConfig::default(),
        )));
        let mut link = SessionLink::new(tracker.clone());
        link.on_game_start();
        link.on_game_start();
        link.on_game_over(&GameSummary::default());

        let session = tracker.lock().get_current_session().unwrap();
        assert_eq!(session.game_count, 2);
    }
}
