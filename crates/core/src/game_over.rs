//! Game-over detection
//!
//! The game ends the moment the next piece cannot occupy its spawn position.
//! Evaluate this on the board *after* line clearing: a clear can free the
//! spawn cells that would otherwise end the game.

use crate::board::{is_legal, Board};
use crate::pieces::Piece;

/// Terminal notification, injected by whoever owns the game
pub trait GameOverHook {
    fn game_over(&mut self, board: &Board, blocked: &Piece);
}

impl<F: FnMut(&Board, &Piece)> GameOverHook for F {
    fn game_over(&mut self, board: &Board, blocked: &Piece) {
        self(board, blocked)
    }
}

/// True when `next` cannot legally sit at its own position on `board`
pub fn is_game_over(board: &Board, next: &Piece) -> bool {
    !is_legal(board, next, next.position)
}

/// Evaluate [`is_game_over`] and fire `hook` when it holds
pub fn check_game_over(board: &Board, next: &Piece, hook: &mut dyn GameOverHook) -> bool {
    let over = is_game_over(board, next);
    if over {
        hook.game_over(board, next);
    }
    over
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{clear_lines, place};
    use crate::types::{Color, PieceKind, Position, BOARD_WIDTH};

    #[test]
    fn empty_board_is_playable() {
        assert!(!is_game_over(&Board::new(), &Piece::new(PieceKind::I)));
    }

    #[test]
    fn blocked_spawn_ends_game() {
        let board = Board::new().with_cell(4, 0, Some(Color::WHITE));
        let mut fired = 0;
        let mut hook = |_: &Board, p: &Piece| {
            assert_eq!(p.kind, PieceKind::O);
            fired += 1;
        };
        assert!(check_game_over(&board, &Piece::new(PieceKind::O), &mut hook));
        assert_eq!(fired, 1);
    }

    #[test]
    fn spawn_clear_of_blocks_does_not_fire() {
        let board = Board::new().with_cell(0, 0, Some(Color::WHITE));
        let mut fired = false;
        let mut hook = |_: &Board, _: &Piece| fired = true;
        assert!(!check_game_over(&board, &Piece::new(PieceKind::O), &mut hook));
        assert!(!fired);
    }

    #[test]
    fn line_clear_frees_spawn_cells() {
        // Row 0 is full except where the I piece lands; the clear empties the spawn row.
        let mut board = Board::new();
        for x in 0..BOARD_WIDTH as i32 {
            if !(3..7).contains(&x) {
                board = board.with_cell(x, 0, Some(Color::WHITE));
            }
        }
        for x in 0..BOARD_WIDTH as i32 {
            board = board.with_cell(x, 1, Some(Color::WHITE));
        }
        let board = board.with_cell(3, 1, None);
        let placed = place(&board, &Piece::new(PieceKind::I).at(Position::new(3, 0)));

        let next = Piece::new(PieceKind::I);
        assert!(is_game_over(&placed, &next));
        let cleared = clear_lines(&placed);
        assert_eq!(cleared.lines_cleared, 1);
        assert!(!is_game_over(&cleared.board, &next));
    }
}
