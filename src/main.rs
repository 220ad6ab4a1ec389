//! Headless Tetris simulation (default binary).
//!
//! Plays a number of seeded games with the placement heuristic, records them
//! against a play session and the leaderboard, then prints a summary.
//!
//! Usage: `tetris-sim [GAMES] [SEED]`
//!
//! Storage is in memory unless `TETRIS_STORE_DIR` is set; log verbosity comes
//! from `RUST_LOG`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tetris_sim::core::rng::SimpleRng;
use tetris_sim::engine::{
    apply_place, best_placement, EngineConfig, Game, GameSummary, HighScoreBoard, PlaceError,
    SessionLink,
};
use tetris_sim::session::{
    Clock, ExpiryWatcher, FileStore, KeyValueStore, MemoryStore, SessionConfig, SessionTracker,
    SharedTracker, SystemClock,
};

/// Frame step used to advance gravity and particles between placements
const FRAME_MS: u32 = 16;

/// Placements per game before the simulation calls it
const MAX_PIECES_PER_GAME: u32 = 1_000;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let games: u32 = match args.next() {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("invalid game count: {raw:?}"))?,
        None => 3,
    };
    let seed: u32 = match args.next() {
        Some(raw) => raw.parse().with_context(|| format!("invalid seed: {raw:?}"))?,
        None => SimpleRng::from_time().seed(),
    };

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(run(games, seed))
}

async fn run(games: u32, seed: u32) -> Result<()> {
    let config = EngineConfig::from_env();
    let session_config = SessionConfig::from_env();

    let store: Arc<dyn KeyValueStore> = match &config.store_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create store dir {}", dir.display()))?;
            Arc::new(FileStore::new(dir))
        }
        None => Arc::new(MemoryStore::new()),
    };
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let tracker: SharedTracker = Arc::new(Mutex::new(SessionTracker::new(
        store.clone(),
        clock.clone(),
        session_config.clone(),
    )));
    let watcher = ExpiryWatcher::spawn(
        tracker.clone(),
        session_config.timeout().min(Duration::from_secs(30)),
    );
    let mut high_scores = HighScoreBoard::load(store, clock, config.max_high_scores);

    info!(games, seed, "starting simulation");
    let mut game =
        Game::with_seed(config, seed).with_observer(SessionLink::new(tracker.clone()));

    for round in 1..=games {
        if round == 1 {
            game.start();
        } else {
            game.restart();
        }
        let summary = play(&mut game);
        let rank = high_scores.submit(&summary, None);
        println!(
            "game {round}: score {} lines {} level {} pieces {}{}",
            summary.score,
            summary.lines,
            summary.level,
            summary.pieces_locked,
            match rank {
                Some(rank) => format!(" (high score #{rank})"),
                None => String::new(),
            }
        );
    }

    let stats = tracker.lock().stats();
    let ended = tracker.lock().handle_unload();
    watcher.stop();

    let pool = game.pool_statistics();
    println!();
    println!(
        "session: {} games in {} ({} total sessions, {} ms average)",
        stats.total_games,
        ended.map(|s| s.id).unwrap_or_else(|| "-".to_string()),
        stats.total_sessions,
        stats.average_session_ms
    );
    println!(
        "particles: {} allocated, {} reused ({:.0}% reuse), {} pooled of {}",
        pool.allocated_count,
        pool.reuse_count,
        pool.reuse_ratio * 100.0,
        pool.pool_size,
        pool.max_pool_size
    );
    println!("leaderboard:");
    for (i, entry) in high_scores.scores().iter().enumerate() {
        println!(
            "  {:>2}. {:>7}  lines {:>4}  level {:>2}",
            i + 1,
            entry.score,
            entry.lines,
            entry.level
        );
    }
    Ok(())
}

/// Play until game over or the piece cap
fn play(game: &mut Game) -> GameSummary {
    let dt = FRAME_MS as f32 / 1000.0;
    while !game.is_over() && game.summary().pieces_locked < MAX_PIECES_PER_GAME {
        let Some(piece) = game.active().copied() else {
            break;
        };
        let placed = match best_placement(game.board(), &piece) {
            Some(target) => apply_place(game, target.x, target.rotations),
            None => game.hard_drop().ok_or(PlaceError::NoActive),
        };
        if let Err(e) = placed {
            warn!(error = %e, code = e.code(), "placement rejected");
            break;
        }
        game.tick(FRAME_MS);
        game.step_particles(dt);
    }
    // Let the last effects run out so their particles return to the pool.
    while !game.particles().is_empty() {
        game.step_particles(dt);
    }
    game.summary()
}
