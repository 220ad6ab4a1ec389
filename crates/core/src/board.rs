//! Board module - manages the game grid
//!
//! The board is a 10x20 grid where each cell is empty or holds an occupant color.
//! Rows are reference-counted slices: every mutation copies only the rows it
//! touches and shares the rest with the previous board, so placing a piece
//! costs O(piece height × width) regardless of board size.
//!
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..19 (top to bottom).
//! Pieces may project above the board (`y < 0`).

use std::borrow::Cow;
use std::sync::Arc;

use arrayvec::ArrayVec;

use crate::error::{EngineError, Result};
use crate::pieces::Piece;
use crate::types::{Cell, Position, BOARD_HEIGHT, BOARD_WIDTH};

/// One board row; always exactly `BOARD_WIDTH` cells
pub type Row = Arc<[Cell]>;

fn empty_row() -> Row {
    Arc::from(vec![None; BOARD_WIDTH])
}

/// The game board - 10 columns x 20 rows of structurally shared rows
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    rows: Vec<Row>,
}

impl Board {
    /// Create a new empty board; all rows share one empty row
    pub fn new() -> Self {
        let empty = empty_row();
        Self {
            rows: vec![empty; BOARD_HEIGHT],
        }
    }

    /// Build a board from explicit rows (fixtures, restored state)
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self> {
        if rows.len() != BOARD_HEIGHT {
            return Err(EngineError::BoardHeight {
                expected: BOARD_HEIGHT,
                got: rows.len(),
            });
        }
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(y, row)| {
                if row.len() == BOARD_WIDTH {
                    Ok(Row::from(row))
                } else {
                    Err(EngineError::RowWidth {
                        row: y,
                        expected: BOARD_WIDTH,
                        got: row.len(),
                    })
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rows })
    }

    pub fn width(&self) -> usize {
        BOARD_WIDTH
    }

    pub fn height(&self) -> usize {
        BOARD_HEIGHT
    }

    #[inline]
    fn index(x: i32, y: i32) -> Option<(usize, usize)> {
        if x < 0 || x >= BOARD_WIDTH as i32 || y < 0 || y >= BOARD_HEIGHT as i32 {
            return None;
        }
        Some((x as usize, y as usize))
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        Self::index(x, y).map(|(x, y)| self.rows[y][x])
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Cells of row `y`
    pub fn row(&self, y: usize) -> &[Cell] {
        &self.rows[y]
    }

    /// Iterate rows top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(|r| &r[..])
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows
            .get(y)
            .is_some_and(|row| row.iter().all(Option::is_some))
    }

    /// Number of rows physically shared (same allocation) with `other`
    pub fn rows_shared_with(&self, other: &Board) -> usize {
        self.rows
            .iter()
            .zip(&other.rows)
            .filter(|(a, b)| Arc::ptr_eq(a, b))
            .count()
    }

    /// Copy of this board with one cell replaced (copies only that row)
    pub fn with_cell(&self, x: i32, y: i32, cell: Cell) -> Self {
        let mut next = self.clone();
        if let Some((x, y)) = Self::index(x, y) {
            let mut row = next.rows[y].to_vec();
            row[x] = cell;
            next.rows[y] = Row::from(row);
        }
        next
    }

    /// Number of occupied cells
    pub fn filled_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|c| c.is_some()).count())
            .sum()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Check whether `piece` may sit at `position`.
///
/// Every filled cell must be inside `[0, width)` horizontally and above the
/// floor; cells with `y < 0` are allowed and never collide. Stops at the first
/// violation.
pub fn is_legal(board: &Board, piece: &Piece, position: Position) -> bool {
    let width = board.width() as i32;
    let height = board.height() as i32;
    piece.cells_at(position).all(|(x, y)| {
        if x < 0 || x >= width || y >= height {
            return false;
        }
        y < 0 || !board.is_occupied(x, y)
    })
}

/// Burn `piece` into a new board.
///
/// Only the rows the piece spans are copied; all other rows stay shared with
/// `board`. Cells outside the grid are skipped, so callers should check
/// [`is_legal`] first.
pub fn place(board: &Board, piece: &Piece) -> Board {
    let mut next = board.clone();
    let shape = &piece.shape;
    for dy in 0..shape.height() {
        let y = piece.position.y + dy as i32;
        if y < 0 || y >= BOARD_HEIGHT as i32 || !shape.row_has_cells(dy) {
            continue;
        }
        let y = y as usize;
        let mut cells = next.rows[y].to_vec();
        for dx in 0..shape.width() {
            let x = piece.position.x + dx as i32;
            if shape.is_filled(dx, dy) && (0..BOARD_WIDTH as i32).contains(&x) {
                cells[x as usize] = Some(piece.color);
            }
        }
        next.rows[y] = Row::from(cells);
    }
    next
}

/// Outcome of [`clear_lines`]
#[derive(Debug, Clone, PartialEq)]
pub struct LineClear<'a> {
    /// Borrowed (the input board itself) when nothing was cleared
    pub board: Cow<'a, Board>,
    pub lines_cleared: usize,
    /// Indices of the cleared rows in the input board, top to bottom
    pub lines_to_clear: ArrayVec<usize, BOARD_HEIGHT>,
}

impl LineClear<'_> {
    /// Take ownership of the resulting board
    pub fn into_board(self) -> Board {
        self.board.into_owned()
    }
}

/// Remove every full row and prepend as many empty rows at the top.
///
/// Board height never changes. When no row is full the input board is
/// returned by reference with no allocation.
pub fn clear_lines(board: &Board) -> LineClear<'_> {
    let full: ArrayVec<usize, BOARD_HEIGHT> =
        (0..board.height()).filter(|&y| board.is_row_full(y)).collect();

    if full.is_empty() {
        return LineClear {
            board: Cow::Borrowed(board),
            lines_cleared: 0,
            lines_to_clear: full,
        };
    }

    let empty = empty_row();
    let mut rows = Vec::with_capacity(BOARD_HEIGHT);
    rows.extend(std::iter::repeat(empty).take(full.len()));
    rows.extend(
        board
            .rows
            .iter()
            .enumerate()
            .filter(|(y, _)| !full.contains(y))
            .map(|(_, row)| Arc::clone(row)),
    );

    LineClear {
        board: Cow::Owned(Board { rows }),
        lines_cleared: full.len(),
        lines_to_clear: full,
    }
}

/// Lowest legal row for `piece` falling straight down from its current position
pub fn drop_position(board: &Board, piece: &Piece) -> i32 {
    let mut y = piece.position.y;
    while is_legal(board, piece, Position::new(piece.position.x, y + 1)) {
        y += 1;
    }
    y
}

/// Move `piece` by (dx, dy) if the destination is legal
pub fn try_move(board: &Board, piece: &Piece, dx: i32, dy: i32) -> Option<Piece> {
    let target = piece.position.offset(dx, dy);
    is_legal(board, piece, target).then(|| piece.at(target))
}
