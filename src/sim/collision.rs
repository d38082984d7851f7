//! Collision detection for a shell against terrain, tanks and the playfield
//!
//! Rules are evaluated in a fixed order and the first match wins:
//! terrain, then combatants (in index order), then bounds.

use glam::Vec2;

use super::ballistics::Projectile;
use super::state::Combatant;
use super::terrain::TerrainField;
use crate::tuning::Tuning;

/// Result of a collision check
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionOutcome {
    /// Nothing hit; keep flying
    Clear,
    /// Shell reached the ground; point is clamped onto the surface
    Terrain { point: Vec2 },
    /// Shell passed within the hit radius of a turret
    Combatant { index: usize, point: Vec2 },
    /// Shell left the playfield without hitting anything
    OutOfBounds,
}

impl CollisionOutcome {
    /// Impact point for outcomes that produce an explosion
    pub fn impact_point(&self) -> Option<Vec2> {
        match *self {
            CollisionOutcome::Terrain { point } | CollisionOutcome::Combatant { point, .. } => {
                Some(point)
            }
            CollisionOutcome::Clear | CollisionOutcome::OutOfBounds => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionDetector {
    pub hit_radius: f32,
    pub turret_offset: f32,
}

impl CollisionDetector {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            hit_radius: tuning.hit_radius,
            turret_offset: tuning.turret_offset,
        }
    }

    pub fn check(
        &self,
        projectile: &Projectile,
        terrain: &TerrainField,
        combatants: &[Combatant],
    ) -> CollisionOutcome {
        let pos = projectile.pos;

        let ground = terrain.height_at(pos.x);
        if pos.y >= ground {
            return CollisionOutcome::Terrain {
                point: Vec2::new(pos.x, ground),
            };
        }

        for (index, combatant) in combatants.iter().enumerate() {
            if pos.distance(combatant.turret(self.turret_offset)) < self.hit_radius {
                return CollisionOutcome::Combatant { index, point: pos };
            }
        }

        if pos.x < 0.0 || pos.x > terrain.width() || pos.y > terrain.floor() {
            return CollisionOutcome::OutOfBounds;
        }

        CollisionOutcome::Clear
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::COLORS;

    fn setup() -> (CollisionDetector, TerrainField, Vec<Combatant>) {
        let detector = CollisionDetector {
            hit_radius: 25.0,
            turret_offset: 10.0,
        };
        let terrain = TerrainField::flat(800.0, 700.0, 665.0, 420.0, 800);
        let mut combatants = vec![
            Combatant::new(160.0, COLORS[0], 45),
            Combatant::new(640.0, COLORS[1], 135),
        ];
        for c in &mut combatants {
            c.seat(&terrain);
        }
        (detector, terrain, combatants)
    }

    fn shell_at(x: f32, y: f32) -> Projectile {
        Projectile::new(Vec2::new(x, y), Vec2::ZERO, 0)
    }

    #[test]
    fn test_clear_in_open_air() {
        let (d, t, c) = setup();
        assert_eq!(d.check(&shell_at(400.0, 100.0), &t, &c), CollisionOutcome::Clear);
    }

    #[test]
    fn test_terrain_hit_clamps_to_surface() {
        let (d, t, c) = setup();
        let outcome = d.check(&shell_at(400.0, 431.0), &t, &c);
        assert_eq!(
            outcome,
            CollisionOutcome::Terrain {
                point: Vec2::new(400.0, 420.0)
            }
        );
        assert_eq!(outcome.impact_point(), Some(Vec2::new(400.0, 420.0)));
    }

    #[test]
    fn test_combatant_hit_uses_turret_point() {
        let (d, t, c) = setup();
        // Turret at (640, 410); 20 px above it is inside the radius
        let outcome = d.check(&shell_at(640.0, 390.0), &t, &c);
        assert_eq!(
            outcome,
            CollisionOutcome::Combatant {
                index: 1,
                point: Vec2::new(640.0, 390.0)
            }
        );
        // 26 px away misses
        assert_eq!(d.check(&shell_at(640.0, 384.0), &t, &c), CollisionOutcome::Clear);
    }

    #[test]
    fn test_terrain_checked_before_combatants() {
        let (d, t, c) = setup();
        // On the ground right beside a turret: terrain wins
        let outcome = d.check(&shell_at(650.0, 420.0), &t, &c);
        assert!(matches!(outcome, CollisionOutcome::Terrain { .. }));
    }

    #[test]
    fn test_out_of_bounds() {
        let (d, t, c) = setup();
        assert_eq!(d.check(&shell_at(-1.0, 100.0), &t, &c), CollisionOutcome::OutOfBounds);
        assert_eq!(d.check(&shell_at(801.0, 100.0), &t, &c), CollisionOutcome::OutOfBounds);
        assert_eq!(d.check(&shell_at(-1.0, 100.0), &t, &c).impact_point(), None);
    }

    #[test]
    fn test_off_terrain_below_floor_hits_floor() {
        let (d, t, c) = setup();
        // Outside the x-range the ground is the floor
        let outcome = d.check(&shell_at(-5.0, 705.0), &t, &c);
        assert_eq!(
            outcome,
            CollisionOutcome::Terrain {
                point: Vec2::new(-5.0, 700.0)
            }
        );
    }
}
