//! Read-only view of a match, handed to renderers and drivers

use glam::Vec2;
use serde::Serialize;

use super::ballistics::Projectile;
use super::explosion::Explosion;
use super::state::{Combatant, Phase, Winner};
use super::terrain::TerrainPoint;

/// What a renderer needs to draw the blast
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExplosionView {
    pub center: Vec2,
    pub radius: f32,
    /// Animation progress in [0, 1]
    pub progress: f32,
}

impl From<&Explosion> for ExplosionView {
    fn from(explosion: &Explosion) -> Self {
        Self {
            center: explosion.center,
            radius: explosion.radius,
            progress: explosion.progress(),
        }
    }
}

/// Borrowed state after the latest `advance`
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub width: f32,
    pub height: f32,
    pub bedrock: f32,
    pub terrain: &'a [TerrainPoint],
    pub combatants: &'a [Combatant],
    pub current: usize,
    pub wind: f32,
    pub projectile: Option<&'a Projectile>,
    pub explosion: Option<ExplosionView>,
    pub phase: Phase,
    pub winner: Option<Winner>,
    pub turn: u32,
}

impl Snapshot<'_> {
    pub fn current_combatant(&self) -> Option<&Combatant> {
        self.combatants.get(self.current)
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }
}
