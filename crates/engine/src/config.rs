//! Engine configuration

use std::path::PathBuf;

use crate::types::{DEFAULT_MAX_HIGH_SCORES, DEFAULT_MAX_POOL_SIZE};

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Free particles retained by the pool
    pub max_pool_size: usize,
    /// Particles emitted over each cleared cell
    pub particles_per_cell: usize,
    /// Cell edge length used to place particles in pixel space
    pub cell_size_px: f32,
    /// Leaderboard length
    pub max_high_scores: usize,
    /// Directory for the file-backed store; in-memory when unset
    pub store_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_pool_size: DEFAULT_MAX_POOL_SIZE,
            particles_per_cell: 3,
            cell_size_px: 30.0,
            max_high_scores: DEFAULT_MAX_HIGH_SCORES,
            store_dir: None,
        }
    }
}

impl EngineConfig {
    /// Create from environment variables
    ///
    /// Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let max_pool_size = env::var("TETRIS_MAX_POOL_SIZE")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_pool_size);
        let particles_per_cell = env::var("TETRIS_PARTICLES_PER_CELL")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.particles_per_cell);
        let cell_size_px = env::var("TETRIS_CELL_SIZE_PX")
            .ok()
            .and_then(|s| s.trim().parse::<f32>().ok())
            .filter(|px| px.is_finite() && *px > 0.0)
            .unwrap_or(defaults.cell_size_px);
        let max_high_scores = env::var("TETRIS_MAX_HIGH_SCORES")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .filter(|&n| n > 0)
            .unwrap_or(defaults.max_high_scores);
        let store_dir = env::var("TETRIS_STORE_DIR")
            .ok()
            .map(|s| s.trim().to_string())
            .and_then(|s| if s.is_empty() { None } else { Some(PathBuf::from(s)) });

        Self {
            max_pool_size,
            particles_per_cell,
            cell_size_px,
            max_high_scores,
            store_dir,
        }
    }
}
