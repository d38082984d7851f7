//! Artillery Duel - turn-based artillery on destructible terrain
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain, ballistics, collisions, turn state machine)
//! - `tuning`: Data-driven physics and balance
//! - `error`: Configuration errors

pub mod error;
pub mod sim;
pub mod tuning;

pub use error::TuningError;
pub use sim::{Snapshot, TurnEngine};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
///
/// These are the canonical defaults; [`Tuning`] mirrors every one of them so a
/// driver can override them at runtime.
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum logical steps consumed per `advance` call
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta accepted by `advance` (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Ballistic steps run per logical step while a shell is airborne
    pub const FLIGHT_SUBSTEPS: u32 = 2;

    /// Default playfield dimensions
    pub const DEFAULT_WIDTH: f32 = 800.0;
    pub const DEFAULT_HEIGHT: f32 = 700.0;

    /// Gravity (pixels/s², y grows downward)
    pub const GRAVITY: f32 = 300.0;
    /// Muzzle speed per point of power (pixels/s)
    pub const POWER_TO_SPEED: f32 = 6.5;
    /// Horizontal acceleration per unit of wind (pixels/s²)
    pub const WIND_ACCEL: f32 = 50.0;
    /// Wind is drawn from [-MAX_WIND, MAX_WIND]
    pub const MAX_WIND: f32 = 1.0;
    /// Quadratic drag coefficient (0 disables drag)
    pub const DRAG: f32 = 0.0;

    /// Power and angle limits
    pub const MIN_POWER: i32 = 1;
    pub const MAX_POWER: i32 = 100;
    pub const MIN_ANGLE: i32 = 0;
    pub const MAX_ANGLE: i32 = 180;
    pub const DEFAULT_POWER: i32 = 50;
    /// Opening aim for each side (degrees, 0 = right, 90 = up)
    pub const DEFAULT_ANGLES: [i32; 2] = [45, 135];
    pub const MAX_HEALTH: i32 = 100;

    /// Combatant geometry
    pub const TURRET_OFFSET: f32 = 10.0;
    pub const HIT_RADIUS: f32 = 25.0;
    pub const MUZZLE_OFFSET: f32 = 30.0;
    /// Pad half-width; never narrower than the muzzle reach
    pub const PLATFORM_HALF_WIDTH: f32 = 30.0;
    /// Horizontal placement of each side as a fraction of width
    pub const SPAWN_FRACTIONS: [f32; 2] = [0.2, 0.8];
    /// Display colors (0xRRGGBB)
    pub const COLORS: [u32; 2] = [0xFF6600, 0x3399FF];

    /// Explosion defaults
    pub const EXPLOSION_RADIUS: f32 = 40.0;
    pub const DAMAGE_MARGIN: f32 = 10.0;
    pub const MIN_DAMAGE: i32 = 10;
    /// Explosion animation length (seconds)
    pub const EXPLOSION_DURATION: f32 = 2.0;
    /// Fraction of the animation at which terrain and damage land
    pub const EFFECT_TRIGGER: f32 = 0.75;
    /// Crater depth as a fraction of explosion radius
    pub const CRATER_DEPTH_SCALE: f32 = 0.5;

    /// Terrain synthesis
    pub const CONTROL_POINTS: usize = 6;
    pub const TERRAIN_SEGMENTS: usize = 4000;
    pub const BASE_HEIGHT_FRACTION: f32 = 0.6;
    pub const VARIANCE_FRACTION: f32 = 0.5;
    pub const BEDROCK_FRACTION: f32 = 0.95;

    /// Undrained engine events kept before the oldest are dropped
    pub const MAX_PENDING_EVENTS: usize = 256;

    /// Maximum number of trail points kept per projectile
    pub const TRAIL_LENGTH: usize = 10;
}

/// Convert an aim angle in degrees into a unit direction on a y-down screen.
///
/// 0° points right, 90° straight up, 180° left.
#[inline]
pub fn deg_to_dir(degrees: f32) -> Vec2 {
    let rad = degrees.to_radians();
    Vec2::new(rad.cos(), -rad.sin())
}

/// Cubic smoothstep `t² · (3 − 2t)` for `t` in [0, 1]
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
