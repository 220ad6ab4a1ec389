//! Error types for the board/piece engine

use thiserror::Error;

/// Errors raised by engine constructors.
///
/// Gameplay operations never fail for legal inputs; these only surface when a
/// caller builds shapes or boards from raw data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("malformed shape: {0}")]
    MalformedShape(&'static str),

    #[error("board must have {expected} rows, got {got}")]
    BoardHeight { expected: usize, got: usize },

    #[error("row {row} must have {expected} cells, got {got}")]
    RowWidth {
        row: usize,
        expected: usize,
        got: usize,
    },
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
