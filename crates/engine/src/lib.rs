//! Game flow on top of the pure engine
//!
//! [`Game`] drives one board: active and next piece, gravity, the lock
//! pipeline and the particle effects of line clears. Sounds and session
//! bookkeeping go out through a [`GameObserver`]; the leaderboard lives in a
//! [`HighScoreBoard`] persisted to the same key-value store as sessions.
//! [`place`] drives whole-piece placements for automated play.
//!
//! ```
//! use tetris_sim_engine::{EngineConfig, Game, GameStatus};
//!
//! let mut game = Game::with_seed(EngineConfig::default(), 7);
//! game.start();
//! while game.status() == GameStatus::Playing {
//!     game.hard_drop();
//! }
//! assert!(game.summary().pieces_locked > 0);
//! ```

pub mod config;
pub mod game;
pub mod high_scores;
pub mod observer;
pub mod place;

pub use tetris_sim_types as types;

pub use config::EngineConfig;
pub use game::{Game, GameStatus, LockOutcome};
pub use high_scores::{HighScoreBoard, HIGH_SCORES_KEY};
pub use observer::{GameObserver, GameSummary, NoopObserver, SessionLink};
pub use place::{apply_place, best_placement, PlaceError, Placement};
