//! Particle pool for line-clear effects
//!
//! Line clears request bursts of short-lived particles several times a minute.
//! Allocating and discarding them per burst churns memory during animation, so
//! the pool keeps released particles on a free-list and overwrites their
//! fields on the next checkout.
//!
//! - Arena storage: a slot vector plus a free-list of indices
//! - Generation-tagged [`ParticleHandle`]s: double and stale releases are rejected
//! - Bounded retention: at most `max_pool_size` free particles are kept
//! - Reuse accounting via [`ParticlePool::statistics`]
//!
//! ```
//! use tetris_sim_particles::{BurstRequest, ParticlePool};
//! use tetris_sim_particles::types::Color;
//!
//! let mut pool = ParticlePool::with_seed(150, 7);
//! pool.preload_pool(20);
//!
//! let handles = pool.get_particles(&BurstRequest::new(10, 40.0, 380.0, Color::WHITE));
//! assert_eq!(pool.statistics().reuse_count, 10);
//!
//! pool.release_particles(handles);
//! assert_eq!(pool.statistics().pool_size, 20);
//! ```

pub mod error;
pub mod particle;
pub mod pool;

pub use tetris_sim_core::rng;
pub use tetris_sim_types as types;

pub use error::PoolError;
pub use particle::{BurstRequest, Particle, ParticleHandle};
pub use pool::{ParticlePool, PoolStatistics, ReleaseSummary, Released};
