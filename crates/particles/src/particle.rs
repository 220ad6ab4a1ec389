//! Particle types: pooled simulation state and checkout handles

use std::ops::Range;

use crate::types::Color;

/// Downward acceleration applied while stepping, in px/s²
pub const GRAVITY: f32 = 300.0;

/// Horizontal jitter around a burst origin (±px)
pub const JITTER_X: f32 = 20.0;

/// Vertical jitter around a burst origin (±px)
pub const JITTER_Y: f32 = 10.0;

/// Pool-owned particle. Fields are overwritten in place on reuse.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Remaining lifetime in seconds
    pub life: f32,
    /// Lifetime at spawn, for fade-out
    pub max_life: f32,
    pub color: Color,
}

impl Particle {
    /// Placeholder for preloaded and vacant slots
    pub fn inert() -> Self {
        Self {
            id: 0,
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            life: 0.0,
            max_life: 0.0,
            color: Color::WHITE,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// Remaining life as opacity in [0, 1]
    pub fn alpha(&self) -> f32 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }

    /// Integrate one step of `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        self.x += self.vx * dt;
        self.y += self.vy * dt;
        self.vy += GRAVITY * dt;
        self.life -= dt;
    }
}

/// Generation-tagged reference to a checked-out particle.
///
/// A handle is only valid until it is released; afterwards every pool
/// operation rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticleHandle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl ParticleHandle {
    /// Arena slot this handle points at
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

/// Parameters for one batch checkout
#[derive(Debug, Clone, PartialEq)]
pub struct BurstRequest {
    pub count: usize,
    pub base_x: f32,
    pub base_y: f32,
    pub color: Color,
    /// Range for both velocity components, px/s
    pub velocity: Range<f32>,
    /// Lifetime range, seconds
    pub life: Range<f32>,
}

impl BurstRequest {
    pub fn new(count: usize, base_x: f32, base_y: f32, color: Color) -> Self {
        Self {
            count,
            base_x,
            base_y,
            color,
            velocity: -120.0..120.0,
            life: 0.6..1.2,
        }
    }

    pub fn with_velocity(mut self, velocity: Range<f32>) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_life(mut self, life: Range<f32>) -> Self {
        self.life = life;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_applies_gravity_and_decay() {
        let mut p = Particle {
            vx: 10.0,
            vy: -20.0,
            life: 1.0,
            max_life: 2.0,
            ..Particle::inert()
        };
        p.advance(0.5);
        assert_eq!(p.x, 5.0);
        assert_eq!(p.y, -10.0);
        assert_eq!(p.vy, -20.0 + GRAVITY * 0.5);
        assert_eq!(p.life, 0.5);
        assert_eq!(p.alpha(), 0.25);
        assert!(p.is_alive());
    }

    #[test]
    fn inert_particle_is_dead() {
        let p = Particle::inert();
        assert!(!p.is_alive());
        assert_eq!(p.alpha(), 0.0);
    }
}
