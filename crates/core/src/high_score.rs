//! High-score ranking over a bounded, descending list
//!
//! This module only ranks, validates and re-sorts. Inserting an entry is the
//! caller's job; call [`finalize`] afterwards to restore order and length.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// One finished game on the leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighScore {
    pub id: String,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    /// Milliseconds since the Unix epoch
    pub date: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
}

/// True if `score` would earn a place in a list capped at `max`
pub fn is_high_score(score: u32, list: &[HighScore], max: usize) -> bool {
    if list.len() < max {
        return true;
    }
    list.iter().map(|e| e.score).min().is_some_and(|min| score > min)
}

/// 1-based insertion position of `score` in the sorted `list`, or `None`
/// if it does not qualify.
///
/// Ties rank below existing entries: the scan stops at the first entry the
/// new score strictly beats.
pub fn rank(score: u32, list: &[HighScore], max: usize) -> Option<usize> {
    match list.iter().position(|e| score > e.score) {
        Some(idx) => Some(idx + 1),
        None if list.len() < max => Some(list.len() + 1),
        None => None,
    }
}

fn by_rank(a: &HighScore, b: &HighScore) -> Ordering {
    b.score.cmp(&a.score).then_with(|| b.date.cmp(&a.date))
}

/// Sort descending by score; ties put the newer entry first
pub fn sort_scores(list: &mut [HighScore]) {
    list.sort_by(by_rank);
}

/// Re-sort after an insertion and drop everything past `max`
pub fn finalize(list: &mut Vec<HighScore>, max: usize) {
    sort_scores(list);
    list.truncate(max);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(score: u32, date: u64) -> HighScore {
        HighScore {
            id: format!("{score}-{date}"),
            score,
            level: 1,
            lines: 0,
            date,
            player_name: None,
        }
    }

    fn sorted(scores: &[u32]) -> Vec<HighScore> {
        let mut list: Vec<_> = scores.iter().map(|&s| entry(s, 0)).collect();
        sort_scores(&mut list);
        list
    }

    #[test]
    fn short_list_always_qualifies() {
        let list = sorted(&[500, 400]);
        assert!(is_high_score(0, &list, 10));
        assert_eq!(rank(0, &list, 10), Some(3));
        assert_eq!(rank(450, &list, 10), Some(2));
        assert_eq!(rank(900, &list, 10), Some(1));
    }

    #[test]
    fn full_list_requires_beating_minimum() {
        let list = sorted(&[500, 400, 300]);
        assert!(!is_high_score(300, &list, 3));
        assert_eq!(rank(300, &list, 3), None);
        assert!(is_high_score(301, &list, 3));
        assert_eq!(rank(301, &list, 3), Some(3));
    }

    #[test]
    fn zero_capacity_never_qualifies() {
        assert!(!is_high_score(1_000, &[], 0));
        assert_eq!(rank(1_000, &[], 0), None);
    }

    #[test]
    fn rank_agrees_with_is_high_score() {
        let lists = [
            sorted(&[]),
            sorted(&[100]),
            sorted(&[900, 500, 500, 100]),
            sorted(&[50, 40, 30, 20, 10]),
        ];
        for list in &lists {
            for max in 0..7 {
                for score in [0u32, 10, 11, 100, 499, 500, 501, 10_000] {
                    assert_eq!(
                        rank(score, list, max).is_some(),
                        is_high_score(score, list, max),
                        "score={score} max={max} len={}",
                        list.len()
                    );
                }
            }
        }
    }

    #[test]
    fn ties_prefer_newer_date() {
        let mut list = vec![entry(100, 1), entry(200, 5), entry(100, 9)];
        sort_scores(&mut list);
        let order: Vec<_> = list.iter().map(|e| (e.score, e.date)).collect();
        assert_eq!(order, vec![(200, 5), (100, 9), (100, 1)]);
    }

    #[test]
    fn finalize_truncates_after_insert() {
        let mut list = sorted(&[300, 200, 100]);
        list.push(entry(250, 7));
        finalize(&mut list, 3);
        let scores: Vec<_> = list.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![300, 250, 200]);
    }

    #[test]
    fn serializes_camel_case() {
        let mut e = entry(10, 2);
        e.player_name = Some("ada".into());
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["playerName"], "ada");
        assert!(serde_json::to_value(entry(1, 1)).unwrap().get("playerName").is_none());
    }
}
