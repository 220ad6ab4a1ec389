//! Persisted leaderboard
//!
//! Wraps the ranking rules in [`tetris_sim_core::high_score`] with loading and
//! saving under the `high-scores` key. Storage failures are logged and the
//! board keeps working in memory.

use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, warn};
use uuid::Uuid;

use tetris_sim_core::high_score::{self, HighScore};
use tetris_sim_core::Clock;
use tetris_sim_session::KeyValueStore;

use crate::observer::GameSummary;

/// Storage key holding the leaderboard
pub const HIGH_SCORES_KEY: &str = "high-scores";

pub struct HighScoreBoard {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    max: usize,
    scores: Vec<HighScore>,
}

impl HighScoreBoard {
    /// Load the stored list, normalizing its order and length
    pub fn load(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, max: usize) -> Self {
        let mut board = Self {
            store,
            clock,
            max,
            scores: Vec::new(),
        };
        match board.read() {
            Ok(mut scores) => {
                high_score::finalize(&mut scores, max);
                board.scores = scores;
            }
            Err(e) => warn!(error = %e, "ignoring unreadable high scores"),
        }
        board
    }

    fn read(&self) -> anyhow::Result<Vec<HighScore>> {
        let raw = self
            .store
            .get(HIGH_SCORES_KEY)
            .context("failed to read high scores")?;
        match raw {
            Some(json) => serde_json::from_str(&json).context("failed to parse high scores"),
            None => Ok(Vec::new()),
        }
    }

    /// Write the current list to storage
    pub fn save(&self) -> anyhow::Result<()> {
        let json = serde_json::to_string(&self.scores).context("failed to encode high scores")?;
        self.store
            .set(HIGH_SCORES_KEY, &json)
            .context("failed to write high scores")?;
        Ok(())
    }

    /// Entries, best first
    pub fn scores(&self) -> &[HighScore] {
        &self.scores
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn is_high_score(&self, score: u32) -> bool {
        high_score::is_high_score(score, &self.scores, self.max)
    }

    pub fn rank(&self, score: u32) -> Option<usize> {
        high_score::rank(score, &self.scores, self.max)
    }

    /// Record a finished game if it qualifies.
    ///
    /// Returns the entry's 1-based position after insertion, or `None` when
    /// the score does not make the board.
    pub fn submit(&mut self, summary: &GameSummary, player_name: Option<String>) -> Option<usize> {
        if !self.is_high_score(summary.score) {
            return None;
        }
        let id = Uuid::new_v4().to_string();
        let player_name = player_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        self.scores.push(HighScore {
            id: id.clone(),
            score: summary.score,
            level: summary.level,
            lines: summary.lines,
            date: self.clock.now_ms(),
            player_name,
        });
        high_score::finalize(&mut self.scores, self.max);

        if let Err(e) = self.save() {
            warn!(error = %e, "high score kept in memory only");
        }
        let position = self.scores.iter().position(|e| e.id == id).map(|i| i + 1);
        debug!(score = summary.score, ?position, "high score recorded");
        position
    }
}

impl std::fmt::Debug for HighScoreBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighScoreBoard")
            .field("max", &self.max)
            .field("scores", &self.scores)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use tetris_sim_core::ManualClock;
    use tetris_sim_session::MemoryStore;

    use super::*;

    fn summary(score: u32) -> GameSummary {
        GameSummary {
            score,
            lines: score / 100,
            level: 1,
            pieces_locked: 0,
        }
    }

    fn board(store: Arc<MemoryStore>, clock: Arc<ManualClock>, max: usize) -> HighScoreBoard {
        HighScoreBoard::load(store, clock, max)
    }

    #[test]
    fn fills_then_requires_beating_the_minimum() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(1_000));
        let mut scores = board(store, clock.clone(), 3);

        assert_eq!(scores.submit(&summary(300), None), Some(1));
        clock.advance(1);
        assert_eq!(scores.submit(&summary(100), None), Some(2));
        clock.advance(1);
        assert_eq!(scores.submit(&summary(200), None), Some(2));

        assert_eq!(scores.submit(&summary(100), None), None);
        clock.advance(1);
        assert_eq!(scores.submit(&summary(150), None), Some(3));
        let values: Vec<u32> = scores.scores().iter().map(|e| e.score).collect();
        assert_eq!(values, vec![300, 200, 150]);
    }

    #[test]
    fn persists_across_loads() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(5));
        let mut scores = board(store.clone(), clock.clone(), 10);
        scores.submit(&summary(800), Some("  ada ".into()));
        scores.submit(&summary(400), Some("   ".into()));

        let reloaded = board(store.clone(), clock, 10);
        assert_eq!(reloaded.scores(), scores.scores());
        assert_eq!(reloaded.scores()[0].player_name.as_deref(), Some("ada"));
        assert_eq!(reloaded.scores()[1].player_name, None);

        let json: serde_json::Value =
            serde_json::from_str(&store.get(HIGH_SCORES_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(json[0]["score"], 800);
        assert_eq!(json[0]["playerName"], "ada");
        assert_eq!(json[0]["date"], 5);
    }

    #[test]
    fn load_normalizes_stored_list() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                HIGH_SCORES_KEY,
                r#"[{"id":"a","score":10,"level":1,"lines":0,"date":1},
                    {"id":"b","score":30,"level":1,"lines":0,"date":2},
                    {"id":"c","score":20,"level":1,"lines":0,"date":3}]"#,
            )
            .unwrap();
        let scores = board(store, Arc::new(ManualClock::new(0)), 2);
        let ids: Vec<&str> = scores.scores().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn corrupt_list_starts_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(HIGH_SCORES_KEY, "oops").unwrap();
        let scores = board(store, Arc::new(ManualClock::new(0)), 10);
        assert!(scores.scores().is_empty());
        assert_eq!(scores.rank(1), Some(1));
    }

    #[test]
    fn storage_failure_keeps_entry_in_memory() {
        let store = Arc::new(MemoryStore::with_quota(8));
        let mut scores = board(store.clone(), Arc::new(ManualClock::new(0)), 10);
        assert_eq!(scores.submit(&summary(500), None), Some(1));
        assert_eq!(scores.scores().len(), 1);
        assert!(store.is_empty());
        assert!(scores.save().is_err());
    }
}
