//! Runtime physics and balance tuning
//!
//! Every field defaults to the matching constant in [`crate::consts`]. Missing
//! keys in a JSON document fall back to those defaults, so a driver can
//! override just the values it cares about.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::TuningError;

/// Tunable constant set for a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Ballistics ===
    /// Downward acceleration (pixels/s²)
    pub gravity: f32,
    /// Muzzle speed per point of power (pixels/s)
    pub power_to_speed: f32,
    /// Horizontal acceleration per unit of wind (pixels/s²)
    pub wind_accel: f32,
    /// Wind magnitude cap; wind is drawn from [-max_wind, max_wind]
    pub max_wind: f32,
    /// Quadratic drag coefficient (0 = no drag)
    pub drag: f32,
    /// Ballistic steps per logical step while airborne
    pub flight_substeps: u32,

    // === Explosions ===
    pub explosion_radius: f32,
    /// Extra reach added to the radius for damage falloff
    pub damage_margin: f32,
    /// Floor for any nonzero hit
    pub min_damage: i32,
    /// Animation length (seconds)
    pub explosion_duration: f32,
    /// Animation fraction at which crater and damage are applied
    pub effect_trigger: f32,
    pub crater_depth_scale: f32,

    // === Combatants ===
    pub hit_radius: f32,
    pub turret_offset: f32,
    pub muzzle_offset: f32,
    pub platform_half_width: f32,

    // === Terrain ===
    pub control_points: usize,
    pub terrain_segments: usize,
    pub base_height_fraction: f32,
    pub variance_fraction: f32,
    pub bedrock_fraction: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            power_to_speed: POWER_TO_SPEED,
            wind_accel: WIND_ACCEL,
            max_wind: MAX_WIND,
            drag: DRAG,
            flight_substeps: FLIGHT_SUBSTEPS,

            explosion_radius: EXPLOSION_RADIUS,
            damage_margin: DAMAGE_MARGIN,
            min_damage: MIN_DAMAGE,
            explosion_duration: EXPLOSION_DURATION,
            effect_trigger: EFFECT_TRIGGER,
            crater_depth_scale: CRATER_DEPTH_SCALE,

            hit_radius: HIT_RADIUS,
            turret_offset: TURRET_OFFSET,
            muzzle_offset: MUZZLE_OFFSET,
            platform_half_width: PLATFORM_HALF_WIDTH,

            control_points: CONTROL_POINTS,
            terrain_segments: TERRAIN_SEGMENTS,
            base_height_fraction: BASE_HEIGHT_FRACTION,
            variance_fraction: VARIANCE_FRACTION,
            bedrock_fraction: BEDROCK_FRACTION,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON document and validate the result
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        positive("gravity", self.gravity)?;
        positive("power_to_speed", self.power_to_speed)?;
        positive("explosion_radius", self.explosion_radius)?;
        positive("explosion_duration", self.explosion_duration)?;
        positive("hit_radius", self.hit_radius)?;
        non_negative("wind_accel", self.wind_accel)?;
        non_negative("max_wind", self.max_wind)?;
        non_negative("drag", self.drag)?;
        non_negative("damage_margin", self.damage_margin)?;
        non_negative("crater_depth_scale", self.crater_depth_scale)?;
        non_negative("turret_offset", self.turret_offset)?;
        non_negative("muzzle_offset", self.muzzle_offset)?;
        non_negative("platform_half_width", self.platform_half_width)?;
        unit_interval("effect_trigger", self.effect_trigger)?;
        unit_interval("base_height_fraction", self.base_height_fraction)?;
        unit_interval("bedrock_fraction", self.bedrock_fraction)?;
        non_negative("variance_fraction", self.variance_fraction)?;

        if self.platform_half_width < self.muzzle_offset {
            return Err(TuningError::OutOfRange {
                name: "platform_half_width",
                value: self.platform_half_width,
                expected: ">= muzzle_offset",
            });
        }
        if self.min_damage < 0 {
            return Err(TuningError::OutOfRange {
                name: "min_damage",
                value: self.min_damage as f32,
                expected: ">= 0",
            });
        }
        if self.flight_substeps == 0 {
            return Err(TuningError::OutOfRange {
                name: "flight_substeps",
                value: 0.0,
                expected: ">= 1",
            });
        }
        if self.control_points < CONTROL_POINTS {
            return Err(TuningError::OutOfRange {
                name: "control_points",
                value: self.control_points as f32,
                expected: ">= 6",
            });
        }
        if self.terrain_segments < self.control_points {
            return Err(TuningError::OutOfRange {
                name: "terrain_segments",
                value: self.terrain_segments as f32,
                expected: ">= control_points",
            });
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), TuningError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TuningError::OutOfRange {
            name,
            value,
            expected: "> 0",
        })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), TuningError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TuningError::OutOfRange {
            name,
            value,
            expected: ">= 0",
        })
    }
}

fn unit_interval(name: &'static str, value: f32) -> Result<(), TuningError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(TuningError::OutOfRange {
            name,
            value,
            expected: "in (0, 1]",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "gravity": 450.0, "drag": 0.001 }"#).unwrap();
        assert_eq!(tuning.gravity, 450.0);
        assert_eq!(tuning.drag, 0.001);
        assert_eq!(tuning.explosion_radius, EXPLOSION_RADIUS);
        assert_eq!(tuning.control_points, CONTROL_POINTS);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = Tuning::from_json(r#"{ "gravity": 0.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::OutOfRange { name: "gravity", .. }));

        let err = Tuning::from_json(r#"{ "control_points": 3 }"#).unwrap_err();
        assert!(matches!(err, TuningError::OutOfRange { name: "control_points", .. }));

        let err = Tuning::from_json(r#"{ "effect_trigger": 1.5 }"#).unwrap_err();
        assert!(matches!(err, TuningError::OutOfRange { name: "effect_trigger", .. }));
    }

    #[test]
    fn test_pad_must_cover_muzzle() {
        let err = Tuning::from_json(r#"{ "muzzle_offset": 30.0, "platform_half_width": 20.0 }"#)
            .unwrap_err();
        assert!(matches!(err, TuningError::OutOfRange { name: "platform_half_width", .. }));
        assert!(Tuning::from_json(r#"{ "muzzle_offset": 20.0, "platform_half_width": 20.0 }"#).is_ok());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = Tuning::from_json("not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_json_round_trip_preserves_overrides() {
        let mut tuning = Tuning::default();
        tuning.max_wind = 0.0;
        tuning.flight_substeps = 3;
        let json = tuning.to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), tuning);
    }
}
