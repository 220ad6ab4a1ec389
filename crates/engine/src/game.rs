//! Game flow - the active piece, gravity and the lock pipeline
//!
//! `Game` owns one board at a time and replaces it wholesale on every lock.
//! A lock is computed from a single board snapshot, in order:
//!
//! 1. burn the piece in
//! 2. clear full rows
//! 3. fold the clear and drop bonus into the score
//! 4. emit particles over the cleared cells
//! 5. play the clear sound
//! 6. promote the next piece and test it against the new board
//! 7. notify the observer

use arrayvec::ArrayVec;
use tracing::{debug, info};

use tetris_sim_core::board::{self, Board};
use tetris_sim_core::game_over::check_game_over;
use tetris_sim_core::pieces::{self, Piece};
use tetris_sim_core::rng::{RandomSource, SimpleRng};
use tetris_sim_core::scoring::{self, ScoreUpdate};
use tetris_sim_particles::{BurstRequest, ParticleHandle, ParticlePool, PoolStatistics};

use crate::config::EngineConfig;
use crate::observer::{GameObserver, GameSummary, NoopObserver};
use crate::types::{Position, SoundKind, BOARD_HEIGHT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// Created or restarted, waiting for `start`
    Ready,
    Playing,
    Over,
}

/// What a single lock did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockOutcome {
    pub lines_cleared: usize,
    /// Cleared row indices on the board the piece was burned into
    pub cleared_rows: ArrayVec<usize, BOARD_HEIGHT>,
    pub totals: ScoreUpdate,
    pub particles_spawned: usize,
    pub game_over: bool,
}

pub struct Game {
    config: EngineConfig,
    board: Board,
    active: Option<Piece>,
    next: Piece,
    totals: ScoreUpdate,
    pieces_locked: u32,
    drop_timer_ms: u32,
    status: GameStatus,
    rng: Box<dyn RandomSource + Send>,
    pool: ParticlePool,
    particles: Vec<ParticleHandle>,
    observer: Box<dyn GameObserver>,
}

impl Game {
    pub fn new(config: EngineConfig, mut rng: Box<dyn RandomSource + Send>) -> Self {
        let next = pieces::spawn_piece(rng.as_mut());
        let pool = ParticlePool::with_seed(config.max_pool_size, 0x5EED_F00D);
        Self {
            config,
            board: Board::new(),
            active: None,
            next,
            totals: ScoreUpdate {
                score: 0,
                lines: 0,
                level: 1,
            },
            pieces_locked: 0,
            drop_timer_ms: 0,
            status: GameStatus::Ready,
            rng,
            pool,
            particles: Vec::new(),
            observer: Box::new(NoopObserver),
        }
    }

    /// Game driven by a seeded [`SimpleRng`]
    pub fn with_seed(config: EngineConfig, seed: u32) -> Self {
        let pool = ParticlePool::with_seed(config.max_pool_size, seed.wrapping_add(1));
        Self::new(config, Box::new(SimpleRng::new(seed))).with_pool(pool)
    }

    pub fn with_observer(mut self, observer: impl GameObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn with_pool(mut self, pool: ParticlePool) -> Self {
        self.pool = pool;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active(&self) -> Option<&Piece> {
        self.active.as_ref()
    }

    pub fn next_piece(&self) -> &Piece {
        &self.next
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status == GameStatus::Over
    }

    pub fn score(&self) -> u32 {
        self.totals.score
    }

    pub fn lines(&self) -> u32 {
        self.totals.lines
    }

    pub fn level(&self) -> u32 {
        self.totals.level
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            score: self.totals.score,
            lines: self.totals.lines,
            level: self.totals.level,
            pieces_locked: self.pieces_locked,
        }
    }

    /// Gravity interval at the current level
    pub fn drop_interval_ms(&self) -> u32 {
        scoring::drop_interval_ms(self.totals.level)
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn pool_statistics(&self) -> PoolStatistics {
        self.pool.statistics()
    }

    /// Handles of particles still animating
    pub fn particles(&self) -> &[ParticleHandle] {
        &self.particles
    }

    /// Start the game and spawn the first piece
    pub fn start(&mut self) {
        if self.status != GameStatus::Ready {
            return;
        }
        self.status = GameStatus::Playing;
        self.observer.on_game_start();
        info!("game started");
        self.promote_next();
    }

    /// Reset everything but the collaborators and start again
    pub fn restart(&mut self) {
        let live = std::mem::take(&mut self.particles);
        self.pool.release_particles(live);
        self.board = Board::new();
        self.active = None;
        self.next = pieces::spawn_piece(self.rng.as_mut());
        self.totals = ScoreUpdate {
            score: 0,
            lines: 0,
            level: 1,
        };
        self.pieces_locked = 0;
        self.drop_timer_ms = 0;
        self.status = GameStatus::Ready;
        self.start();
    }

    pub fn move_left(&mut self) -> bool {
        self.shift(-1)
    }

    pub fn move_right(&mut self) -> bool {
        self.shift(1)
    }

    fn shift(&mut self, dx: i32) -> bool {
        let Some(piece) = self.playable() else {
            return false;
        };
        match board::try_move(&self.board, &piece, dx, 0) {
            Some(moved) => {
                self.active = Some(moved);
                true
            }
            None => false,
        }
    }

    /// Rotate clockwise in place; refused when the result is illegal
    pub fn rotate(&mut self) -> bool {
        let Some(piece) = self.playable() else {
            return false;
        };
        let rotated = pieces::rotate(&piece);
        if !board::is_legal(&self.board, &rotated, rotated.position) {
            return false;
        }
        self.active = Some(rotated);
        true
    }

    /// Move down one row, awarding the soft-drop bonus. Never locks.
    pub fn soft_drop(&mut self) -> bool {
        let Some(piece) = self.playable() else {
            return false;
        };
        match board::try_move(&self.board, &piece, 0, 1) {
            Some(moved) => {
                self.active = Some(moved);
                self.totals.score = self
                    .totals
                    .score
                    .saturating_add(scoring::drop_bonus(1, false));
                self.drop_timer_ms = 0;
                true
            }
            None => false,
        }
    }

    /// Drop to the landing row and lock immediately
    pub fn hard_drop(&mut self) -> Option<LockOutcome> {
        let piece = self.playable()?;
        let landing = board::drop_position(&self.board, &piece);
        let distance = (landing - piece.position.y).max(0) as u32;
        let dropped = piece.at(Position::new(piece.position.x, landing));
        Some(self.lock(dropped, scoring::drop_bonus(distance, true)))
    }

    /// Where the active piece would land
    pub fn ghost_position(&self) -> Option<Position> {
        let piece = self.active.as_ref()?;
        let y = board::drop_position(&self.board, piece);
        Some(Position::new(piece.position.x, y))
    }

    /// Advance gravity by `elapsed_ms`. A piece that cannot fall locks.
    pub fn tick(&mut self, elapsed_ms: u32) -> Option<LockOutcome> {
        self.playable()?;
        self.drop_timer_ms = self.drop_timer_ms.saturating_add(elapsed_ms);

        loop {
            let interval = self.drop_interval_ms();
            if self.drop_timer_ms < interval {
                return None;
            }
            self.drop_timer_ms -= interval;

            let piece = self.active?;
            match board::try_move(&self.board, &piece, 0, 1) {
                Some(moved) => self.active = Some(moved),
                None => {
                    self.drop_timer_ms = 0;
                    return Some(self.lock(piece, 0));
                }
            }
        }
    }

    /// Advance live particles by `dt` seconds. Returns how many expired.
    pub fn step_particles(&mut self, dt: f32) -> usize {
        self.pool.step(&mut self.particles, dt)
    }

    fn playable(&self) -> Option<Piece> {
        if self.status != GameStatus::Playing {
            return None;
        }
        self.active
    }

    fn promote_next(&mut self) -> bool {
        let incoming = std::mem::replace(&mut self.next, pieces::spawn_piece(self.rng.as_mut()));

        let observer = &mut self.observer;
        let over = check_game_over(&self.board, &incoming, &mut |_: &Board, blocked: &Piece| {
            debug!(kind = blocked.kind.as_str(), "spawn blocked");
            observer.play_sound(SoundKind::GameOver);
        });

        if over {
            self.active = None;
            self.status = GameStatus::Over;
            let summary = self.summary();
            info!(
                score = summary.score,
                lines = summary.lines,
                level = summary.level,
                "game over"
            );
            self.observer.on_game_over(&summary);
        } else {
            self.active = Some(incoming);
        }
        over
    }

    fn lock(&mut self, piece: Piece, bonus: u32) -> LockOutcome {
        self.active = None;
        self.pieces_locked += 1;

        let placed = board::place(&self.board, &piece);
        let clear = board::clear_lines(&placed);
        let lines_cleared = clear.lines_cleared;
        let cleared_rows = clear.lines_to_clear.clone();
        let next_board = clear.into_board();

        self.totals = scoring::score(
            self.totals.score,
            self.totals.lines,
            lines_cleared as u32,
            bonus,
        );

        let particles_spawned = self.emit_particles(&placed, &cleared_rows);

        if let Some(sound) = SoundKind::for_lines(lines_cleared) {
            self.observer.play_sound(sound);
        }
        if lines_cleared > 0 {
            debug!(
                lines = lines_cleared,
                score = self.totals.score,
                level = self.totals.level,
                "lines cleared"
            );
            self.observer.on_lines_cleared(lines_cleared, &self.totals);
        }

        self.board = next_board;
        let game_over = self.promote_next();

        LockOutcome {
            lines_cleared,
            cleared_rows,
            totals: self.totals,
            particles_spawned,
            game_over,
        }
    }

    /// One burst per occupied cell of every cleared row
    fn emit_particles(&mut self, placed: &Board, rows: &[usize]) -> usize {
        let per_cell = self.config.particles_per_cell;
        if per_cell == 0 {
            return 0;
        }
        let size = self.config.cell_size_px;
        let mut spawned = 0;
        for &y in rows {
            for (x, cell) in placed.row(y).iter().enumerate() {
                let Some(color) = *cell else {
                    continue;
                };
                let request = BurstRequest::new(
                    per_cell,
                    (x as f32 + 0.5) * size,
                    (y as f32 + 0.5) * size,
                    color,
                );
                let handles = self.pool.get_particles(&request);
                spawned += handles.len();
                self.particles.extend(handles);
            }
        }
        spawned
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("status", &self.status)
            .field("active", &self.active)
            .field("next", &self.next.kind)
            .field("totals", &self.totals)
            .field("pieces_locked", &self.pieces_locked)
            .field("particles", &self.particles.len())
            .finish()
    }
}
