//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the board/piece engine and the pure rule functions the
//! game is built from. It has **no dependencies** on rendering, audio or
//! storage:
//!
//! - **Pure**: boards are never mutated in place; every operation returns a new value
//! - **Shared**: boards share untouched rows, so a placement copies only the rows it spans
//! - **Deterministic**: randomness and time come from injected [`RandomSource`] and [`Clock`]
//!
//! # Module Structure
//!
//! - [`board`]: 10x20 grid, legality checks, placement, line clearing, drop projection
//! - [`pieces`]: tetromino shape matrices, spawning and clockwise rotation
//! - [`scoring`]: line-clear points, derived level, drop bonuses, gravity table
//! - [`game_over`]: next-spawn game-over predicate and its injected hook
//! - [`high_score`]: ranking, validation and ordering of the leaderboard
//! - [`rng`]: substitutable uniform random source
//! - [`clock`]: substitutable wall clock
//!
//! # Example
//!
//! ```
//! use tetris_sim_core::{board, pieces, Board, Piece};
//! use tetris_sim_core::types::{PieceKind, Position};
//!
//! let board = Board::new();
//! let piece = Piece::new(PieceKind::I);
//! assert_eq!(piece.position, Position::new(3, 0));
//!
//! // Rotate, then test the result before committing it.
//! let rotated = pieces::rotate(&piece);
//! assert!(board::is_legal(&board, &rotated, rotated.position));
//!
//! // Hard drop: project to the floor and burn the piece in.
//! let landing = board::drop_position(&board, &piece);
//! let placed = board::place(&board, &piece.at(Position::new(3, landing)));
//! assert_eq!(placed.filled_count(), 4);
//! ```

pub mod board;
pub mod clock;
pub mod error;
pub mod game_over;
pub mod high_score;
pub mod pieces;
pub mod rng;
pub mod scoring;

pub use tetris_sim_types as types;

// Re-export commonly used types for convenience
pub use board::{clear_lines, drop_position, is_legal, place, Board, LineClear};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::EngineError;
pub use game_over::{check_game_over, is_game_over, GameOverHook};
pub use high_score::{finalize, is_high_score, rank, sort_scores, HighScore};
pub use pieces::{rotate, spawn_piece, Piece, Shape};
pub use rng::{RandomSource, ScriptedRng, SimpleRng};
pub use scoring::{score, ScoreUpdate};
