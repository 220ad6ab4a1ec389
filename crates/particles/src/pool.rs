//! Arena-backed particle pool
//!
//! Particles live in a slot vector and are addressed by generation-tagged
//! handles. Free slots sit on a free-list capped at `max_pool_size`; a release
//! past that cap drops the particle and leaves its slot vacant. Vacant storage
//! is recycled by later allocations, so memory is bounded by peak demand.
//!
//! Checkout prefers a free slot (reuse) and falls back to a fresh particle
//! (allocation). Under steady load nearly every checkout is a reuse.

use tracing::{debug, warn};

use crate::error::PoolError;
use crate::particle::{BurstRequest, Particle, ParticleHandle, JITTER_X, JITTER_Y};
use crate::rng::{RandomSource, SimpleRng};
use crate::types::DEFAULT_MAX_POOL_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    /// On the free-list, ready for reuse
    Free,
    CheckedOut,
    /// Dropped over capacity; storage kept, particle gone
    Vacant,
}

#[derive(Debug)]
struct Slot {
    particle: Particle,
    generation: u32,
    state: SlotState,
}

/// What happened to a released particle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Released {
    Pooled,
    Dropped,
}

/// Tally of a batch release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReleaseSummary {
    pub pooled: usize,
    pub dropped: usize,
    pub rejected: usize,
}

/// Snapshot of pool accounting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolStatistics {
    /// Free particles ready for reuse
    pub pool_size: usize,
    pub max_pool_size: usize,
    /// Particles constructed on demand
    pub allocated_count: u64,
    /// Checkouts satisfied from the free-list
    pub reuse_count: u64,
    /// `reuse / (reuse + allocated)`, 0 before any checkout
    pub reuse_ratio: f64,
    /// `pool_size / max_pool_size`
    pub utilization: f64,
    pub in_use: usize,
}

/// Object pool for short-lived line-clear particles
pub struct ParticlePool {
    slots: Vec<Slot>,
    free: Vec<u32>,
    vacant: Vec<u32>,
    max_pool_size: usize,
    allocated_count: u64,
    reuse_count: u64,
    in_use: usize,
    next_id: u64,
    rng: Box<dyn RandomSource + Send>,
}

impl ParticlePool {
    pub fn new(max_pool_size: usize, rng: Box<dyn RandomSource + Send>) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::with_capacity(max_pool_size),
            vacant: Vec::new(),
            max_pool_size,
            allocated_count: 0,
            reuse_count: 0,
            in_use: 0,
            next_id: 1,
            rng,
        }
    }

    /// Pool with a deterministic [`SimpleRng`]
    pub fn with_seed(max_pool_size: usize, seed: u32) -> Self {
        Self::new(max_pool_size, Box::new(SimpleRng::new(seed)))
    }

    pub fn max_pool_size(&self) -> usize {
        self.max_pool_size
    }

    /// Slot for a brand-new particle, recycling vacant storage first
    fn allocate_slot(&mut self) -> u32 {
        if let Some(index) = self.vacant.pop() {
            return index;
        }
        self.slots.push(Slot {
            particle: Particle::inert(),
            generation: 0,
            state: SlotState::Vacant,
        });
        (self.slots.len() - 1) as u32
    }

    fn spawn_fields(&mut self, req: &BurstRequest) -> Particle {
        let id = self.next_id;
        self.next_id += 1;
        let rng = &mut self.rng;
        let x = req.base_x + (rng.next_f64() as f32 - 0.5) * 2.0 * JITTER_X;
        let y = req.base_y + (rng.next_f64() as f32 - 0.5) * 2.0 * JITTER_Y;
        let vx = rng.range(req.velocity.start as f64, req.velocity.end as f64) as f32;
        let vy = rng.range(req.velocity.start as f64, req.velocity.end as f64) as f32;
        let life = rng.range(req.life.start as f64, req.life.end as f64) as f32;
        Particle {
            id,
            x,
            y,
            vx,
            vy,
            life,
            max_life: life,
            color: req.color,
        }
    }

    /// Check out `req.count` particles jittered around the burst origin
    pub fn get_particles(&mut self, req: &BurstRequest) -> Vec<ParticleHandle> {
        let mut handles = Vec::with_capacity(req.count);
        for _ in 0..req.count {
            let index = match self.free.pop() {
                Some(index) => {
                    self.reuse_count += 1;
                    index
                }
                None => {
                    self.allocated_count += 1;
                    self.allocate_slot()
                }
            };
            let fields = self.spawn_fields(req);
            let slot = &mut self.slots[index as usize];
            slot.particle = fields;
            slot.generation = slot.generation.wrapping_add(1);
            slot.state = SlotState::CheckedOut;
            self.in_use += 1;
            handles.push(ParticleHandle {
                index,
                generation: slot.generation,
            });
        }
        debug!(
            count = req.count,
            free = self.free.len(),
            in_use = self.in_use,
            "particles checked out"
        );
        handles
    }

    fn checked_out_slot(&mut self, handle: ParticleHandle) -> Result<&mut Slot, PoolError> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .ok_or(PoolError::UnknownHandle(handle))?;
        if slot.generation != handle.generation {
            return Err(PoolError::StaleHandle(handle));
        }
        if slot.state != SlotState::CheckedOut {
            return Err(PoolError::DoubleRelease(handle));
        }
        Ok(slot)
    }

    /// Return one particle; it is dropped if the free-list is already full
    pub fn release(&mut self, handle: ParticleHandle) -> Result<Released, PoolError> {
        let has_room = self.free.len() < self.max_pool_size;
        self.checked_out_slot(handle)?;
        self.in_use -= 1;
        let slot = &mut self.slots[handle.index as usize];
        if has_room {
            slot.state = SlotState::Free;
            self.free.push(handle.index);
            Ok(Released::Pooled)
        } else {
            slot.state = SlotState::Vacant;
            slot.particle = Particle::inert();
            self.vacant.push(handle.index);
            Ok(Released::Dropped)
        }
    }

    /// Return a batch of particles; invalid handles are rejected and logged
    pub fn release_particles<I>(&mut self, handles: I) -> ReleaseSummary
    where
        I: IntoIterator<Item = ParticleHandle>,
    {
        let mut summary = ReleaseSummary::default();
        for handle in handles {
            match self.release(handle) {
                Ok(Released::Pooled) => summary.pooled += 1,
                Ok(Released::Dropped) => summary.dropped += 1,
                Err(e) => {
                    warn!(error = %e, "rejected particle release");
                    summary.rejected += 1;
                }
            }
        }
        summary
    }

    /// Fill the free-list with inert particles, up to capacity.
    ///
    /// Returns how many were added. Preloads are not counted as allocations.
    pub fn preload_pool(&mut self, n: usize) -> usize {
        let room = self.max_pool_size.saturating_sub(self.free.len());
        let count = n.min(room);
        for _ in 0..count {
            let index = self.allocate_slot();
            let slot = &mut self.slots[index as usize];
            slot.particle = Particle::inert();
            slot.state = SlotState::Free;
            self.free.push(index);
        }
        debug!(added = count, free = self.free.len(), "pool preloaded");
        count
    }

    /// Read a checked-out particle
    pub fn get(&self, handle: ParticleHandle) -> Option<&Particle> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.generation == handle.generation && s.state == SlotState::CheckedOut)
            .map(|s| &s.particle)
    }

    /// Mutate a checked-out particle
    pub fn get_mut(&mut self, handle: ParticleHandle) -> Option<&mut Particle> {
        self.checked_out_slot(handle).ok().map(|s| &mut s.particle)
    }

    /// Advance `handles` by `dt` seconds and release those whose life ran out.
    ///
    /// Expired and invalid handles are removed from `handles`. Returns the
    /// number of particles released.
    pub fn step(&mut self, handles: &mut Vec<ParticleHandle>, dt: f32) -> usize {
        let mut expired = Vec::new();
        handles.retain(|&h| match self.get_mut(h) {
            Some(p) => {
                p.advance(dt);
                if p.is_alive() {
                    true
                } else {
                    expired.push(h);
                    false
                }
            }
            None => false,
        });
        let count = expired.len();
        self.release_particles(expired);
        count
    }

    pub fn statistics(&self) -> PoolStatistics {
        let checkouts = self.reuse_count + self.allocated_count;
        let reuse_ratio = if checkouts == 0 {
            0.0
        } else {
            self.reuse_count as f64 / checkouts as f64
        };
        let utilization = if self.max_pool_size == 0 {
            0.0
        } else {
            self.free.len() as f64 / self.max_pool_size as f64
        };
        PoolStatistics {
            pool_size: self.free.len(),
            max_pool_size: self.max_pool_size,
            allocated_count: self.allocated_count,
            reuse_count: self.reuse_count,
            reuse_ratio,
            utilization,
            in_use: self.in_use,
        }
    }
}

impl Default for ParticlePool {
    fn default() -> Self {
        Self::with_seed(DEFAULT_MAX_POOL_SIZE, 0xDEAD_BEEF)
    }
}

impl std::fmt::Debug for ParticlePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticlePool")
            .field("slots", &self.slots.len())
            .field("free", &self.free.len())
            .field("vacant", &self.vacant.len())
            .field("in_use", &self.in_use)
            .field("max_pool_size", &self.max_pool_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRng;
    use crate::types::Color;

    fn burst(count: usize) -> BurstRequest {
        BurstRequest::new(count, 100.0, 200.0, Color::WHITE)
    }

    #[test]
    fn empty_pool_allocates() {
        let mut pool = ParticlePool::default();
        let handles = pool.get_particles(&burst(4));
        assert_eq!(handles.len(), 4);
        let stats = pool.statistics();
        assert_eq!(stats.allocated_count, 4);
        assert_eq!(stats.reuse_count, 0);
        assert_eq!(stats.reuse_ratio, 0.0);
        assert_eq!(stats.in_use, 4);
    }

    #[test]
    fn reuse_after_release() {
        let mut pool = ParticlePool::default();
        let handles = pool.get_particles(&burst(10));
        let summary = pool.release_particles(handles);
        assert_eq!(summary.pooled, 10);

        let before = pool.statistics();
        pool.get_particles(&burst(5));
        let after = pool.statistics();
        assert_eq!(after.reuse_count - before.reuse_count, 5);
        assert_eq!(after.allocated_count, before.allocated_count);
        assert_eq!(after.pool_size, 5);
    }

    #[test]
    fn release_past_capacity_drops() {
        let mut pool = ParticlePool::with_seed(3, 1);
        let handles = pool.get_particles(&burst(5));
        let summary = pool.release_particles(handles);
        assert_eq!(summary, ReleaseSummary { pooled: 3, dropped: 2, rejected: 0 });
        assert_eq!(pool.statistics().pool_size, 3);
        assert_eq!(pool.statistics().utilization, 1.0);

        // Vacant storage is recycled but still counts as a fresh allocation.
        pool.get_particles(&burst(5));
        let stats = pool.statistics();
        assert_eq!(stats.reuse_count, 3);
        assert_eq!(stats.allocated_count, 7);
        assert_eq!(pool.slots.len(), 5);
    }

    #[test]
    fn double_release_is_rejected() {
        let mut pool = ParticlePool::default();
        let handles = pool.get_particles(&burst(2));
        assert_eq!(pool.release(handles[0]), Ok(Released::Pooled));
        assert_eq!(
            pool.release(handles[0]),
            Err(PoolError::DoubleRelease(handles[0]))
        );
        let summary = pool.release_particles(vec![handles[1], handles[1]]);
        assert_eq!(summary, ReleaseSummary { pooled: 1, dropped: 0, rejected: 1 });
        assert_eq!(pool.statistics().pool_size, 2);
        assert_eq!(pool.statistics().in_use, 0);
    }

    #[test]
    fn stale_handle_after_reuse() {
        let mut pool = ParticlePool::default();
        let old = pool.get_particles(&burst(1))[0];
        pool.release(old).unwrap();
        let new = pool.get_particles(&burst(1))[0];
        assert_eq!(old.index(), new.index());
        assert!(pool.get(old).is_none());
        assert!(pool.get(new).is_some());
        assert_eq!(pool.release(old), Err(PoolError::StaleHandle(old)));
    }

    #[test]
    fn unknown_handle() {
        let mut pool = ParticlePool::default();
        let bogus = ParticleHandle { index: 42, generation: 1 };
        assert_eq!(pool.release(bogus), Err(PoolError::UnknownHandle(bogus)));
    }

    #[test]
    fn fields_follow_request_ranges() {
        let rng = ScriptedRng::new(vec![0.0, 1.0, 0.5, 0.25, 0.5]);
        let mut pool = ParticlePool::new(10, Box::new(rng));
        let req = burst(1).with_velocity(-4.0..4.0).with_life(1.0..3.0);
        let h = pool.get_particles(&req)[0];
        let p = pool.get(h).unwrap();
        assert_eq!(p.x, 80.0);
        assert!((p.y - 210.0).abs() < 1e-3);
        assert_eq!(p.vx, 0.0);
        assert_eq!(p.vy, -2.0);
        assert_eq!(p.life, 2.0);
        assert_eq!(p.max_life, 2.0);
        assert_eq!(p.color, Color::WHITE);
    }

    #[test]
    fn reused_particles_get_fresh_fields() {
        let mut pool = ParticlePool::default();
        let first = pool.get_particles(&burst(1))[0];
        let first_id = pool.get(first).unwrap().id;
        pool.release(first).unwrap();

        let red = Color::rgb(0xff, 0, 0);
        let second = pool.get_particles(&BurstRequest::new(1, 0.0, 0.0, red))[0];
        let p = pool.get(second).unwrap();
        assert_ne!(p.id, first_id);
        assert_eq!(p.color, red);
        assert!(p.is_alive());
    }

    #[test]
    fn preload_fills_to_capacity_without_allocations() {
        let mut pool = ParticlePool::with_seed(8, 1);
        assert_eq!(pool.preload_pool(20), 8);
        assert_eq!(pool.preload_pool(5), 0);
        let stats = pool.statistics();
        assert_eq!(stats.pool_size, 8);
        assert_eq!(stats.allocated_count, 0);

        pool.get_particles(&burst(6));
        let stats = pool.statistics();
        assert_eq!(stats.reuse_count, 6);
        assert_eq!(stats.reuse_ratio, 1.0);
    }

    #[test]
    fn steady_load_approaches_full_reuse() {
        let mut pool = ParticlePool::default();
        for _ in 0..200 {
            let handles = pool.get_particles(&burst(40));
            pool.release_particles(handles);
        }
        let stats = pool.statistics();
        assert_eq!(stats.allocated_count, 40);
        assert!(stats.reuse_ratio > 0.99);
    }

    #[test]
    fn step_releases_expired() {
        let mut pool = ParticlePool::default();
        let req = burst(3).with_life(1.0..1.0 + f32::EPSILON);
        let mut live = pool.get_particles(&req);
        assert_eq!(pool.step(&mut live, 0.5), 0);
        assert_eq!(live.len(), 3);
        assert_eq!(pool.step(&mut live, 0.6), 3);
        assert!(live.is_empty());
        assert_eq!(pool.statistics().pool_size, 3);
        assert_eq!(pool.statistics().in_use, 0);
    }
}
