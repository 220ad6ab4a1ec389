//! Scoring, game-over and high-score ranking rules

use tetris_sim::core::board::{clear_lines, place};
use tetris_sim::core::high_score::{finalize, is_high_score, rank, sort_scores, HighScore};
use tetris_sim::core::scoring::{drop_interval_ms, score};
use tetris_sim::core::{is_game_over, Board, Piece};
use tetris_sim::types::{Color, PieceKind, Position, BOARD_WIDTH};

#[test]
fn test_score_levels_up_on_tenth_line() {
    let single = score(0, 9, 1, 0);
    assert_eq!((single.score, single.lines, single.level), (200, 10, 2));

    let tetris = score(0, 9, 4, 0);
    assert_eq!((tetris.score, tetris.lines, tetris.level), (1600, 13, 2));
}

#[test]
fn test_score_bonus_without_clear() {
    let update = score(500, 3, 0, 12);
    assert_eq!(update.score, 512);
    assert_eq!(update.lines, 3);
    assert_eq!(update.level, 1);
}

#[test]
fn test_score_is_monotonic() {
    let mut current = score(0, 0, 0, 0);
    for step in 0..200u32 {
        let cleared = step % 5;
        let next = score(current.score, current.lines, cleared, step % 3);
        assert!(next.score >= current.score);
        assert!(next.lines >= current.lines);
        assert!(next.level >= current.level);
        assert_eq!(next.level, next.lines / 10 + 1);
        current = next;
    }
}

#[test]
fn test_gravity_speeds_up_with_level() {
    assert_eq!(drop_interval_ms(1), 1000);
    assert!(drop_interval_ms(5) < drop_interval_ms(4));
    assert_eq!(drop_interval_ms(50), drop_interval_ms(60));
}

#[test]
fn test_game_over_evaluated_after_clear() {
    // Row 1 is one I piece short of full, right under the O spawn cells.
    let mut board = Board::new();
    for x in 0..BOARD_WIDTH as i32 {
        if !(3..7).contains(&x) {
            board = board.with_cell(x, 1, Some(Color::WHITE));
        }
    }
    let filler = Piece::new(PieceKind::I).at(Position::new(3, 1));
    let placed = place(&board, &filler);
    let next = Piece::new(PieceKind::O);

    assert!(is_game_over(&placed, &next));
    let cleared = clear_lines(&placed).into_board();
    assert!(!is_game_over(&cleared, &next));
}

fn entry(score: u32, date: u64) -> HighScore {
    HighScore {
        id: format!("{score}@{date}"),
        score,
        level: 1,
        lines: 0,
        date,
        player_name: None,
    }
}

#[test]
fn test_rank_agrees_with_is_high_score() {
    let mut list: Vec<HighScore> = [900, 700, 700, 400, 100]
        .iter()
        .enumerate()
        .map(|(i, &s)| entry(s, i as u64))
        .collect();
    sort_scores(&mut list);

    for max in [3, 5, 8] {
        for candidate in [0, 50, 100, 101, 400, 650, 700, 701, 1_000] {
            assert_eq!(
                rank(candidate, &list, max).is_some(),
                is_high_score(candidate, &list, max),
                "score {candidate} max {max}"
            );
        }
    }
    assert_eq!(rank(1_000, &list, 5), Some(1));
    assert_eq!(rank(700, &list, 5), Some(4));
    assert_eq!(rank(100, &list, 5), None);
    assert_eq!(rank(100, &list, 6), Some(6));
}

#[test]
fn test_finalize_orders_and_truncates() {
    let mut list = vec![entry(100, 1), entry(300, 2), entry(300, 5), entry(200, 3)];
    finalize(&mut list, 3);
    let order: Vec<(u32, u64)> = list.iter().map(|e| (e.score, e.date)).collect();
    assert_eq!(order, vec![(300, 5), (300, 2), (200, 3)]);
}
