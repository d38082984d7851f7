//! Projectile kinematics
//!
//! Knows nothing about terrain or combatants: a step only integrates gravity,
//! wind and optional quadratic drag.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::TRAIL_LENGTH;
use crate::deg_to_dir;
use crate::tuning::Tuning;

/// A shell in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Index of the combatant that fired it
    pub owner: usize,
    /// Recent positions, oldest first
    pub trail: Vec<Vec2>,
}

impl Projectile {
    pub fn new(pos: Vec2, vel: Vec2, owner: usize) -> Self {
        Self {
            pos,
            vel,
            owner,
            trail: Vec::with_capacity(TRAIL_LENGTH + 1),
        }
    }

    /// Spawn a shell `muzzle_offset` away from `turret` along the aim direction
    pub fn launch(turret: Vec2, angle_deg: f32, speed: f32, muzzle_offset: f32, owner: usize) -> Self {
        let dir = deg_to_dir(angle_deg);
        Self::new(turret + dir * muzzle_offset, dir * speed, owner)
    }

    /// Record current position to trail, dropping the oldest beyond the cap
    pub fn record_trail(&mut self) {
        self.trail.push(self.pos);
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.remove(0);
        }
    }
}

/// Force model applied to a shell each step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ballistics {
    /// Downward acceleration (pixels/s²)
    pub gravity: f32,
    /// Horizontal acceleration per unit of wind
    pub wind_accel: f32,
    /// Quadratic drag coefficient
    pub drag: f32,
}

impl Ballistics {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            gravity: tuning.gravity,
            wind_accel: tuning.wind_accel,
            drag: tuning.drag,
        }
    }

    /// Advance one semi-implicit Euler step: velocity first, then position.
    pub fn step(&self, projectile: &mut Projectile, wind: f32, dt: f32) {
        let vel = projectile.vel;
        let drag = -self.drag * vel * vel.abs();
        let accel = drag + Vec2::new(wind * self.wind_accel, self.gravity);

        projectile.vel += accel * dt;
        projectile.pos += projectile.vel * dt;
        projectile.record_trail();
    }
}
