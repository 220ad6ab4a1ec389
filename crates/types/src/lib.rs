//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are plain data with no behavior beyond parsing and formatting, making
//! them usable from the engine, the particle pool, and the session tracker alike.
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19)
//! - Pieces spawn horizontally centered on row 0 and may project above the board (`y < 0`)
//!
//! # Scoring
//!
//! | Lines | Base points |
//! |-------|-------------|
//! | 1 | 100 |
//! | 2 | 300 |
//! | 3 | 500 |
//! | 4 | 800 |
//!
//! Base points are multiplied by the level derived from total lines
//! (`lines / 10 + 1`).
//!
//! # Examples
//!
//! ```
//! use tetris_sim_types::{Color, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! let kind = PieceKind::from_str("t").unwrap();
//! assert_eq!(kind, PieceKind::T);
//! assert_eq!(kind.color(), Color::rgb(0xa0, 0x00, 0xf0));
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: usize = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: usize = 20;

/// Lines needed to advance one level
pub const LINES_PER_LEVEL: u32 = 10;

/// Base points per simultaneous line clear, indexed by line count
pub const LINE_SCORES: [u32; 5] = [0, 100, 300, 500, 800];

/// Gravity interval per level (milliseconds per row), index 0 = level 1
pub const DROP_INTERVALS: [u32; 9] = [1000, 800, 650, 500, 400, 320, 250, 200, 160];

/// Gravity floor once the table above is exhausted
pub const DROP_INTERVAL_FLOOR_MS: u32 = 120;

/// Inactivity window after which a play session expires (30 minutes)
pub const SESSION_TIMEOUT_MS: u64 = 30 * 60 * 1000;

/// Maximum number of completed sessions kept in history
pub const SESSION_HISTORY_LIMIT: usize = 100;

/// Default number of free particles retained by the pool
pub const DEFAULT_MAX_POOL_SIZE: usize = 150;

/// Default length of the high-score table
pub const DEFAULT_MAX_HIGH_SCORES: usize = 10;

/// The seven tetromino piece kinds
///
/// Each piece has a distinct shape and color:
/// - **I**: Cyan, horizontal bar
/// - **O**: Yellow, 2x2 square
/// - **T**: Purple, T-shaped
/// - **S**: Green, S-shaped
/// - **Z**: Red, Z-shaped (mirror of S)
/// - **J**: Blue, J-shaped
/// - **L**: Orange, L-shaped (mirror of J)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// All kinds in table order (the order used for uniform random selection)
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tetris_sim_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("O"), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            _ => None,
        }
    }

    /// Convert to uppercase tag
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "I",
            PieceKind::O => "O",
            PieceKind::T => "T",
            PieceKind::S => "S",
            PieceKind::Z => "Z",
            PieceKind::J => "J",
            PieceKind::L => "L",
        }
    }

    /// Display color burned into the board when this piece locks
    pub fn color(&self) -> Color {
        match self {
            PieceKind::I => Color::rgb(0x00, 0xf0, 0xf0),
            PieceKind::O => Color::rgb(0xf0, 0xf0, 0x00),
            PieceKind::T => Color::rgb(0xa0, 0x00, 0xf0),
            PieceKind::S => Color::rgb(0x00, 0xf0, 0x00),
            PieceKind::Z => Color::rgb(0xf0, 0x00, 0x00),
            PieceKind::J => Color::rgb(0x00, 0x00, 0xf0),
            PieceKind::L => Color::rgb(0xf0, 0xa0, 0x00),
        }
    }
}

/// 24-bit RGB color, serialized as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xff_ff_ff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub fn r(&self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn g(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn b(&self) -> u8 {
        self.0 as u8
    }

    /// Parse `#rrggbb` (the leading `#` is optional)
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 {
            return None;
        }
        u32::from_str_radix(hex, 16).ok().map(Color)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0 & 0xff_ff_ff)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color: {s}")))
    }
}

/// Cell on the board (None = empty, Some = occupant color)
pub type Cell = Option<Color>;

/// Board-relative position of a piece's top-left corner
///
/// `y` may be negative while a piece projects above the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset by (dx, dy)
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Sound cues emitted by the engine (fire-and-forget)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SoundKind {
    Single,
    Double,
    Triple,
    Tetris,
    GameOver,
}

impl SoundKind {
    /// Sound cue for a simultaneous clear of `lines` rows
    pub fn for_lines(lines: usize) -> Option<Self> {
        match lines {
            1 => Some(SoundKind::Single),
            2 => Some(SoundKind::Double),
            3 => Some(SoundKind::Triple),
            4 => Some(SoundKind::Tetris),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SoundKind::Single => "single",
            SoundKind::Double => "double",
            SoundKind::Triple => "triple",
            SoundKind::Tetris => "tetris",
            SoundKind::GameOver => "gameOver",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits() {
        assert_eq!(SESSION_TIMEOUT_MS, 1_800_000);
        assert_eq!(SESSION_HISTORY_LIMIT, 100);
        assert_eq!(DEFAULT_MAX_POOL_SIZE, 150);
        assert_eq!(DEFAULT_MAX_HIGH_SCORES, 10);
        assert_eq!(LINE_SCORES[4], 800);
    }

    #[test]
    fn color_hex_formatting() {
        let c = Color::rgb(0x00, 0xf0, 0xa0);
        assert_eq!(c.to_string(), "#00f0a0");
        assert_eq!(Color::from_hex("#00f0a0"), Some(c));
        assert_eq!(Color::from_hex("00f0a0"), Some(c));
        assert_eq!(Color::from_hex("#fff"), None);
        assert_eq!((c.r(), c.g(), c.b()), (0x00, 0xf0, 0xa0));
    }

    #[test]
    fn color_serializes_as_string() {
        let json = serde_json::to_string(&PieceKind::Z.color()).unwrap();
        assert_eq!(json, "\"#f00000\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PieceKind::Z.color());
    }

    #[test]
    fn sound_for_line_counts() {
        assert_eq!(SoundKind::for_lines(0), None);
        assert_eq!(SoundKind::for_lines(1), Some(SoundKind::Single));
        assert_eq!(SoundKind::for_lines(4), Some(SoundKind::Tetris));
        assert_eq!(SoundKind::for_lines(5), None);
    }
}
