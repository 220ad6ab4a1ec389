//! Scoring module - line-clear points, derived level, drop bonuses and gravity
//!
//! Level is never stored on its own: it is always derived from the running line
//! total (`lines / 10 + 1`), so score, lines and level cannot drift apart.

use crate::types::{DROP_INTERVALS, DROP_INTERVAL_FLOOR_MS, LINES_PER_LEVEL, LINE_SCORES};

/// Result of applying one lock to the running totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreUpdate {
    pub score: u32,
    pub lines: u32,
    pub level: u32,
}

/// Level for a running line total (1-based)
pub fn level_for_lines(total_lines: u32) -> u32 {
    total_lines / LINES_PER_LEVEL + 1
}

/// Base points for a simultaneous clear; counts outside 1..=4 score nothing
pub fn line_points(lines_cleared: u32) -> u32 {
    LINE_SCORES
        .get(lines_cleared as usize)
        .copied()
        .unwrap_or(0)
}

/// Fold a lock into the running totals.
///
/// The multiplier is the level *after* adding this clear, so the clear that
/// reaches 10 lines already scores at level 2. `bonus` (drop awards) is added
/// even when nothing was cleared.
pub fn score(current_score: u32, current_lines: u32, lines_cleared: u32, bonus: u32) -> ScoreUpdate {
    let lines = current_lines.saturating_add(lines_cleared);
    let level = level_for_lines(lines);
    let points = line_points(lines_cleared).saturating_mul(level);
    ScoreUpdate {
        score: current_score.saturating_add(points).saturating_add(bonus),
        lines,
        level,
    }
}

/// Calculate drop score
/// soft_drop: +1 per cell
/// hard_drop: +2 per cell
pub fn drop_bonus(cells: u32, is_hard_drop: bool) -> u32 {
    if is_hard_drop {
        cells * 2
    } else {
        cells
    }
}

/// Gravity interval (ms per row) for a 1-based level, clamped at the floor
pub fn drop_interval_ms(level: u32) -> u32 {
    let idx = level.saturating_sub(1) as usize;
    DROP_INTERVALS
        .get(idx)
        .copied()
        .unwrap_or(DROP_INTERVAL_FLOOR_MS)
}
