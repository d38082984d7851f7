//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by combatant index)
//! - No rendering or platform dependencies

pub mod ballistics;
pub mod collision;
pub mod engine;
pub mod explosion;
pub mod snapshot;
pub mod state;
pub mod terrain;

pub use ballistics::{Ballistics, Projectile};
pub use collision::{CollisionDetector, CollisionOutcome};
pub use engine::TurnEngine;
pub use explosion::{CraterOp, Explosion, ExplosionEffects, PendingDamage};
pub use snapshot::{ExplosionView, Snapshot};
pub use state::{Combatant, GameEvent, HitKind, Phase, Winner};
pub use terrain::{TerrainField, TerrainPoint};
