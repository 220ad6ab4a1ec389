//! Pieces module - tetromino shape matrices, spawning and rotation
//!
//! Shapes are small 0/1 matrices (at most 4x4) packed into a bitmask. Rotation
//! is a pure transpose-and-reverse that returns a new shape; it performs no
//! legality check. Callers rotate first, then test the result with
//! [`is_legal`](crate::board::is_legal), so a blocked rotation can be attempted
//! and discarded without side effects.

use crate::error::{EngineError, Result};
use crate::rng::RandomSource;
use crate::types::{Color, PieceKind, Position, BOARD_WIDTH};

/// Largest supported shape dimension
pub const MAX_SHAPE_DIM: usize = 4;

/// Shape matrix of a piece, row-major, at most 4x4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    width: u8,
    height: u8,
    /// Bit `row * 4 + col` is set for filled cells
    bits: u16,
}

const fn pack(width: u8, height: u8, rows: [[u8; 4]; 4]) -> Shape {
    let mut bits = 0u16;
    let mut r = 0;
    while r < 4 {
        let mut c = 0;
        while c < 4 {
            if rows[r][c] != 0 {
                bits |= 1u16 << ((r * 4 + c) as u32);
            }
            c += 1;
        }
        r += 1;
    }
    Shape {
        width,
        height,
        bits,
    }
}

const I_SHAPE: Shape = pack(4, 1, [[1, 1, 1, 1], [0; 4], [0; 4], [0; 4]]);
const O_SHAPE: Shape = pack(2, 2, [[1, 1, 0, 0], [1, 1, 0, 0], [0; 4], [0; 4]]);
const T_SHAPE: Shape = pack(3, 2, [[0, 1, 0, 0], [1, 1, 1, 0], [0; 4], [0; 4]]);
const S_SHAPE: Shape = pack(3, 2, [[0, 1, 1, 0], [1, 1, 0, 0], [0; 4], [0; 4]]);
const Z_SHAPE: Shape = pack(3, 2, [[1, 1, 0, 0], [0, 1, 1, 0], [0; 4], [0; 4]]);
const J_SHAPE: Shape = pack(3, 2, [[1, 0, 0, 0], [1, 1, 1, 0], [0; 4], [0; 4]]);
const L_SHAPE: Shape = pack(3, 2, [[0, 0, 1, 0], [1, 1, 1, 0], [0; 4], [0; 4]]);

/// Get the spawn-orientation shape for a piece kind
pub fn get_shape(kind: PieceKind) -> Shape {
    match kind {
        PieceKind::I => I_SHAPE,
        PieceKind::O => O_SHAPE,
        PieceKind::T => T_SHAPE,
        PieceKind::S => S_SHAPE,
        PieceKind::Z => Z_SHAPE,
        PieceKind::J => J_SHAPE,
        PieceKind::L => L_SHAPE,
    }
}

impl Shape {
    /// Build a shape from a 0/1 matrix.
    ///
    /// Rejects empty, ragged, oversized or cell-less matrices.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self> {
        let height = rows.len();
        if height == 0 {
            return Err(EngineError::MalformedShape("no rows"));
        }
        let width = rows[0].as_ref().len();
        if width == 0 {
            return Err(EngineError::MalformedShape("empty row"));
        }
        if width > MAX_SHAPE_DIM || height > MAX_SHAPE_DIM {
            return Err(EngineError::MalformedShape("larger than 4x4"));
        }

        let mut bits = 0u16;
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(EngineError::MalformedShape("ragged rows"));
            }
            for (c, &cell) in row.iter().enumerate() {
                if cell != 0 {
                    bits |= 1 << (r * 4 + c);
                }
            }
        }
        if bits == 0 {
            return Err(EngineError::MalformedShape("no filled cells"));
        }

        Ok(Self {
            width: width as u8,
            height: height as u8,
            bits,
        })
    }

    pub fn width(&self) -> usize {
        self.width as usize
    }

    pub fn height(&self) -> usize {
        self.height as usize
    }

    /// Whether the cell at (col, row) is filled; out-of-range is empty
    #[inline]
    pub fn is_filled(&self, col: usize, row: usize) -> bool {
        col < self.width() && row < self.height() && self.bits & (1 << (row * 4 + col)) != 0
    }

    /// Whether any cell of `row` is filled
    pub fn row_has_cells(&self, row: usize) -> bool {
        (0..self.width()).any(|col| self.is_filled(col, row))
    }

    /// Offsets (col, row) of filled cells, top-to-bottom, left-to-right
    pub fn filled_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.height()).flat_map(move |row| {
            (0..self.width())
                .filter(move |&col| self.is_filled(col, row))
                .map(move |col| (col as i32, row as i32))
        })
    }

    pub fn cell_count(&self) -> u32 {
        self.bits.count_ones()
    }

    /// Rotate 90° clockwise: transpose, then reverse each row
    pub fn rotate_cw(&self) -> Self {
        let (w, h) = (self.width(), self.height());
        let mut bits = 0u16;
        // new[r][c] = old[h - 1 - c][r]; new dims are h x w
        for r in 0..w {
            for c in 0..h {
                if self.is_filled(r, h - 1 - c) {
                    bits |= 1 << (r * 4 + c);
                }
            }
        }
        Self {
            width: self.height,
            height: self.width,
            bits,
        }
    }

    /// Expand into a 0/1 matrix
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        (0..self.height())
            .map(|row| {
                (0..self.width())
                    .map(|col| u8::from(self.is_filled(col, row)))
                    .collect()
            })
            .collect()
    }
}

/// An immutable tetromino placed relative to the board's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub shape: Shape,
    pub position: Position,
    pub color: Color,
}

impl Piece {
    /// Create a piece of `kind` at its spawn position
    pub fn new(kind: PieceKind) -> Self {
        let shape = get_shape(kind);
        Self {
            kind,
            shape,
            position: spawn_position(&shape),
            color: kind.color(),
        }
    }

    /// Same piece moved to `position`
    pub fn at(&self, position: Position) -> Self {
        Self { position, ..*self }
    }

    /// Same piece offset by (dx, dy)
    pub fn shifted(&self, dx: i32, dy: i32) -> Self {
        self.at(self.position.offset(dx, dy))
    }

    /// Absolute board coordinates of the filled cells at `position`
    pub fn cells_at(&self, position: Position) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .filled_cells()
            .map(move |(dx, dy)| (position.x + dx, position.y + dy))
    }

    /// Absolute board coordinates of the filled cells
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.cells_at(self.position)
    }
}

/// Horizontally centered on row 0
pub fn spawn_position(shape: &Shape) -> Position {
    Position::new(
        (BOARD_WIDTH / 2) as i32 - (shape.width() / 2) as i32,
        0,
    )
}

/// Spawn a piece of uniformly random kind
pub fn spawn_piece(rng: &mut dyn RandomSource) -> Piece {
    let idx = rng.index(PieceKind::ALL.len());
    Piece::new(PieceKind::ALL[idx])
}

/// Rotate a piece 90° clockwise in place of its current position.
///
/// No legality check: test the result before committing it.
pub fn rotate(piece: &Piece) -> Piece {
    Piece {
        shape: piece.shape.rotate_cw(),
        ..*piece
    }
}
