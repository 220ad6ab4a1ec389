//! Whole-piece placement for automated play
//!
//! [`apply_place`] turns a target (rotation count, column) into the same
//! rotate/move/hard-drop calls a player would make. [`best_placement`] rates
//! every reachable target with a board heuristic; the headless simulation
//! uses the two together.

use std::fmt;

use tetris_sim_core::board::{self, Board};
use tetris_sim_core::pieces::{self, Piece};

use crate::game::{Game, GameStatus, LockOutcome};
use crate::types::{Position, BOARD_HEIGHT, BOARD_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceError {
    RotationBlocked,
    XOutOfBounds,
    XBlocked,
    NotPlayable,
    NoActive,
}

impl PlaceError {
    pub fn code(self) -> &'static str {
        match self {
            PlaceError::NotPlayable | PlaceError::NoActive => "not_playable",
            PlaceError::RotationBlocked | PlaceError::XOutOfBounds | PlaceError::XBlocked => {
                "invalid_place"
            }
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            PlaceError::RotationBlocked => "could not rotate to target rotation",
            PlaceError::XOutOfBounds => "target x would place piece out of bounds",
            PlaceError::XBlocked => "could not move to target x due to collision",
            PlaceError::NotPlayable => "game is not playable",
            PlaceError::NoActive => "no active piece",
        }
    }
}

impl fmt::Display for PlaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for PlaceError {}

/// A rated landing spot for the active piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Clockwise quarter turns from the current orientation
    pub rotations: u8,
    /// Target column of the piece's top-left corner
    pub x: i32,
    /// Row the piece lands on
    pub landing_y: i32,
    pub rating: i32,
}

/// Rotate then shift the piece without touching the game. Mirrors the order
/// [`apply_place`] performs the moves in.
fn plan(board: &Board, piece: &Piece, rotations: u8, target_x: i32) -> Result<Piece, PlaceError> {
    let mut current = *piece;
    for _ in 0..rotations {
        let rotated = pieces::rotate(&current);
        if !board::is_legal(board, &rotated, rotated.position) {
            return Err(PlaceError::RotationBlocked);
        }
        current = rotated;
    }

    let right = target_x + current.shape.width() as i32;
    if target_x < 0 || right > BOARD_WIDTH as i32 {
        return Err(PlaceError::XOutOfBounds);
    }

    let step = (target_x - current.position.x).signum();
    while current.position.x != target_x {
        current = board::try_move(board, &current, step, 0).ok_or(PlaceError::XBlocked)?;
    }
    Ok(current)
}

/// Rotate `rotations` times, move to `target_x` and hard drop.
///
/// The whole plan is checked before the first move, so a rejected placement
/// leaves the game untouched.
pub fn apply_place(game: &mut Game, target_x: i32, rotations: u8) -> Result<LockOutcome, PlaceError> {
    if game.status() != GameStatus::Playing {
        return Err(PlaceError::NotPlayable);
    }
    let Some(&active) = game.active() else {
        return Err(PlaceError::NoActive);
    };
    let rotations = rotations % 4;
    plan(game.board(), &active, rotations, target_x)?;

    for _ in 0..rotations {
        game.rotate();
    }
    while let Some(piece) = game.active() {
        let dx = target_x - piece.position.x;
        let moved = match dx.signum() {
            1 => game.move_right(),
            -1 => game.move_left(),
            _ => break,
        };
        if !moved {
            return Err(PlaceError::XBlocked);
        }
    }
    game.hard_drop().ok_or(PlaceError::NoActive)
}

/// Highest-rated reachable placement for `piece`, or `None` if it cannot move
pub fn best_placement(board: &Board, piece: &Piece) -> Option<Placement> {
    let mut best: Option<Placement> = None;
    for rotations in 0..4u8 {
        for x in 0..BOARD_WIDTH as i32 {
            let Ok(moved) = plan(board, piece, rotations, x) else {
                continue;
            };
            let landing_y = board::drop_position(board, &moved);
            let landed = moved.at(Position::new(x, landing_y));
            let rating = rate(board, &landed);
            if best.map_or(true, |b| rating > b.rating) {
                best = Some(Placement {
                    rotations,
                    x,
                    landing_y,
                    rating,
                });
            }
        }
    }
    best
}

/// Heuristic value of locking `piece` where it is: rewards clears and
/// penalizes height, holes and surface bumpiness.
pub fn rate(board: &Board, piece: &Piece) -> i32 {
    let placed = board::place(board, piece);
    let clear = board::clear_lines(&placed);
    let lines = clear.lines_cleared as i32;
    let after = clear.into_board();

    let mut heights = [0i32; BOARD_WIDTH];
    let mut holes = 0;
    for (x, height) in heights.iter_mut().enumerate() {
        let mut seen_block = false;
        for y in 0..BOARD_HEIGHT {
            let filled = after.is_occupied(x as i32, y as i32);
            if filled && !seen_block {
                seen_block = true;
                *height = (BOARD_HEIGHT - y) as i32;
            } else if !filled && seen_block {
                holes += 1;
            }
        }
    }
    let aggregate: i32 = heights.iter().sum();
    let bumpiness: i32 = heights.windows(2).map(|w| (w[0] - w[1]).abs()).sum();

    lines * 760 - aggregate * 510 - holes * 356 - bumpiness * 184
}
