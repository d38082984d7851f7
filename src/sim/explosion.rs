//! Explosion resolution
//!
//! [`resolve`] only decides *what* an impact does: the crater to dig and the
//! damage each combatant takes. The engine's clock decides *when* those
//! effects land, via the [`Explosion`] staged on impact.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Damage staged for one combatant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDamage {
    pub combatant: usize,
    /// Raw falloff damage; the minimum-hit floor is applied on delivery
    pub amount: i32,
}

/// Terrain deformation staged by an impact
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CraterOp {
    pub center: Vec2,
    pub radius: f32,
}

/// Everything an impact will do once delivered
#[derive(Debug, Clone, PartialEq)]
pub struct ExplosionEffects {
    pub crater: CraterOp,
    pub damages: Vec<PendingDamage>,
}

/// Compute crater and graduated damage for an impact.
///
/// `positions` must be captured at impact time so later movement (such as
/// re-seating on the new crater) cannot change the outcome. Damage falls off
/// linearly to zero at `radius + margin`; only positive amounts are kept.
pub fn resolve(impact: Vec2, positions: &[Vec2], radius: f32, margin: f32) -> ExplosionEffects {
    let reach = radius + margin;
    let damages = positions
        .iter()
        .enumerate()
        .filter_map(|(combatant, pos)| {
            let dist = impact.distance(*pos);
            if !(dist < reach) {
                return None;
            }
            let amount = ((reach - dist) * 100.0 / reach).floor() as i32;
            (amount > 0).then_some(PendingDamage { combatant, amount })
        })
        .collect();

    ExplosionEffects {
        crater: CraterOp {
            center: impact,
            radius,
        },
        damages,
    }
}

/// Damage actually dealt for a staged amount: any hit deals at least `min_damage`
pub fn applied_damage(amount: i32, min_damage: i32) -> i32 {
    amount.max(min_damage)
}

/// A live explosion with its staged effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub center: Vec2,
    pub radius: f32,
    /// Engine clock (seconds) when the explosion began
    pub start_time: f32,
    /// Animation time elapsed so far (seconds)
    pub elapsed: f32,
    pub duration: f32,
    /// Crater still to be dug; cleared once effects are delivered
    pub pending_terrain_damage: bool,
    pub pending_damage: Vec<PendingDamage>,
}

impl Explosion {
    pub fn new(effects: ExplosionEffects, start_time: f32, duration: f32) -> Self {
        Self {
            center: effects.crater.center,
            radius: effects.crater.radius,
            start_time,
            elapsed: 0.0,
            duration,
            pending_terrain_damage: true,
            pending_damage: effects.damages,
        }
    }

    /// Animation progress in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt.max(0.0);
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Hand over the staged effects exactly once, when progress reaches `trigger`
    pub fn take_due_effects(&mut self, trigger: f32) -> Option<ExplosionEffects> {
        if !self.pending_terrain_damage || self.progress() < trigger {
            return None;
        }
        self.pending_terrain_damage = false;
        Some(ExplosionEffects {
            crater: CraterOp {
                center: self.center,
                radius: self.radius,
            },
            damages: std::mem::take(&mut self.pending_damage),
        })
    }
}
