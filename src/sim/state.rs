//! Match state types shared by the simulation modules

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::terrain::TerrainField;
use crate::consts::*;

/// Current phase of the turn state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Current combatant may aim or fire
    AwaitingInput,
    /// A shell is airborne
    ProjectileInFlight,
    /// Explosion animation is playing; effects land partway through
    ExplosionResolving,
    /// Transient: clearing the shot and passing the turn
    TurnHandoff,
    /// Match ended; only a reset leaves this phase
    GameOver,
}

/// Match result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Combatant(usize),
    Tie,
}

/// What a shell struck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitKind {
    Terrain,
    Combatant(usize),
}

/// Notable things that happened during a command or `advance` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    MatchStarted { seed: u64 },
    Fired { combatant: usize, power: i32, angle: i32 },
    Impact { point: Vec2, hit: HitKind },
    OutOfBounds { combatant: usize },
    TerrainDeformed { center: Vec2, radius: f32 },
    DamageApplied { combatant: usize, amount: i32, health: i32 },
    TurnPassed { next: usize, wind: f32 },
    GameOver { winner: Winner },
}

/// One of the two tanks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    /// Seated position on the terrain surface
    pub pos: Vec2,
    /// Display color (0xRRGGBB)
    pub color: u32,
    pub health: i32,
    pub power: i32,
    /// Aim in degrees: 0 = right, 90 = up, 180 = left
    pub angle: i32,
}

impl Combatant {
    pub fn new(x: f32, color: u32, angle: i32) -> Self {
        Self {
            pos: Vec2::new(x, 0.0),
            color,
            health: MAX_HEALTH,
            power: DEFAULT_POWER,
            angle: angle.clamp(MIN_ANGLE, MAX_ANGLE),
        }
    }

    /// Effective target and launch point, raised above the seat
    pub fn turret(&self, offset: f32) -> Vec2 {
        self.pos - Vec2::new(0.0, offset)
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Drop onto the terrain surface at the current x
    pub fn seat(&mut self, terrain: &TerrainField) {
        self.pos.y = terrain.height_at(self.pos.x);
    }

    pub fn adjust_power(&mut self, delta: i32) {
        self.power = self.power.saturating_add(delta).clamp(MIN_POWER, MAX_POWER);
    }

    pub fn adjust_angle(&mut self, delta: i32) {
        self.angle = self.angle.saturating_add(delta).clamp(MIN_ANGLE, MAX_ANGLE);
    }

    /// Subtract health, never leaving [0, MAX_HEALTH]. Returns remaining health.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        self.health = self.health.saturating_sub(amount.max(0)).clamp(0, MAX_HEALTH);
        self.health
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_power_and_angle_clamp() {
        let mut c = Combatant::new(100.0, COLORS[0], 45);
        c.adjust_power(500);
        assert_eq!(c.power, MAX_POWER);
        c.adjust_power(-1000);
        assert_eq!(c.power, MIN_POWER);
        c.adjust_angle(-90);
        assert_eq!(c.angle, MIN_ANGLE);
        c.adjust_angle(400);
        assert_eq!(c.angle, MAX_ANGLE);
        c.adjust_angle(-1);
        assert_eq!(c.angle, 179);
    }

    #[test]
    fn test_turret_sits_above_seat() {
        let mut c = Combatant::new(50.0, COLORS[1], 135);
        c.pos.y = 400.0;
        assert_eq!(c.turret(TURRET_OFFSET), Vec2::new(50.0, 390.0));
    }

    #[test]
    fn test_seat_follows_terrain() {
        let terrain = TerrainField::flat(200.0, 300.0, 285.0, 250.0, 20);
        let mut c = Combatant::new(60.0, COLORS[0], 45);
        c.seat(&terrain);
        assert_eq!(c.pos.y, 250.0);
    }

    proptest! {
        #[test]
        fn prop_health_stays_in_range(hits in prop::collection::vec(-50i32..200, 0..20)) {
            let mut c = Combatant::new(0.0, COLORS[0], 45);
            for hit in hits {
                let health = c.take_damage(hit);
                prop_assert!((0..=MAX_HEALTH).contains(&health));
            }
        }
    }
}
