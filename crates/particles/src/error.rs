//! Pool error types

use thiserror::Error;

use crate::particle::ParticleHandle;

/// Invalid handle passed back to the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("handle {0:?} does not belong to this pool")]
    UnknownHandle(ParticleHandle),

    #[error("handle {0:?} refers to a particle that was already recycled")]
    StaleHandle(ParticleHandle),

    #[error("particle {0:?} released twice")]
    DoubleRelease(ParticleHandle),
}
