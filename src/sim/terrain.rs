//! Destructible terrain height field
//!
//! The terrain is a single-valued height function of x, stored as a list of
//! points sorted by strictly increasing x. Heights follow screen convention:
//! larger values sit lower on the playfield, and nothing may sink past the
//! bedrock line.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::smoothstep;
use crate::tuning::Tuning;

/// Fewest points a flattened platform may span before boundary points are added
const MIN_PLATFORM_POINTS: usize = 3;

/// One sample of the height field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainPoint {
    pub x: f32,
    pub height: f32,
}

impl TerrainPoint {
    pub fn new(x: f32, height: f32) -> Self {
        Self { x, height }
    }
}

/// The destructible height map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainField {
    points: Vec<TerrainPoint>,
    width: f32,
    /// Playfield height; returned for queries outside the terrain
    floor: f32,
    /// Deepest height any point may reach
    bedrock: f32,
}

impl TerrainField {
    /// Build a smooth random profile across `width`.
    ///
    /// Control points are spaced evenly and given random heights around the
    /// baseline; every fine sample between them is blended with a smoothstep
    /// so the profile has no visible kinks. Both ends are pinned to the
    /// baseline.
    pub fn generate<R: Rng + ?Sized>(width: f32, height: f32, tuning: &Tuning, rng: &mut R) -> Self {
        let bedrock = height * tuning.bedrock_fraction;
        let base = (height * tuning.base_height_fraction).min(bedrock);
        let variance = (height * tuning.variance_fraction).max(0.0);
        let num_controls = tuning.control_points.max(crate::consts::CONTROL_POINTS);
        let spacing = width / num_controls as f32;

        let mut controls = Vec::with_capacity(num_controls + 1);
        for i in 0..=num_controls {
            let x = i as f32 * spacing;
            let h = if i == 0 || i == num_controls || !(variance > 0.0) {
                base
            } else {
                rng.random_range((base - variance)..=(base + variance))
                    .clamp(0.0, bedrock)
            };
            controls.push(TerrainPoint::new(x, h));
        }

        let segments = tuning.terrain_segments.max(num_controls);
        let step = width / segments as f32;
        let mut points = Vec::with_capacity(segments + 1);
        points.push(TerrainPoint::new(0.0, base));
        for i in 1..segments {
            let x = i as f32 * step;
            points.push(TerrainPoint::new(x, blend_controls(&controls, x)));
        }
        points.push(TerrainPoint::new(width, base));

        log::debug!(
            "Generated terrain: {} points, base={:.1}, bedrock={:.1}",
            points.len(),
            base,
            bedrock
        );

        Self {
            points,
            width,
            floor: height,
            bedrock,
        }
    }

    /// Level ground at `level`, sampled `segments` times across `width`
    pub fn flat(width: f32, height: f32, bedrock: f32, level: f32, segments: usize) -> Self {
        let segments = segments.max(1);
        let level = level.min(bedrock);
        let step = width / segments as f32;
        let points = (0..=segments)
            .map(|i| {
                let x = if i == segments { width } else { i as f32 * step };
                TerrainPoint::new(x, level)
            })
            .collect();
        Self {
            points,
            width,
            floor: height,
            bedrock,
        }
    }

    pub fn points(&self) -> &[TerrainPoint] {
        &self.points
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn floor(&self) -> f32 {
        self.floor
    }

    pub fn bedrock(&self) -> f32 {
        self.bedrock
    }

    /// Linearly interpolated height at `x`; the floor when `x` is off the terrain
    pub fn height_at(&self, x: f32) -> f32 {
        let (Some(first), Some(last)) = (self.points.first(), self.points.last()) else {
            return self.floor;
        };
        if !(x >= first.x && x <= last.x) {
            return self.floor;
        }

        // First point at or right of x; always exists since x <= last.x
        let idx = self.points.partition_point(|p| p.x < x);
        if idx == 0 {
            return first.height;
        }
        let a = self.points[idx - 1];
        let b = self.points[idx];
        let span = b.x - a.x;
        if span <= f32::EPSILON {
            return a.height;
        }
        a.height + (x - a.x) / span * (b.height - a.height)
    }

    /// Force a level pad around `center_x` at the height found there.
    ///
    /// On coarse terrain with too few samples inside the pad, boundary points
    /// are inserted so the pad is actually flat.
    pub fn flatten_platform(&mut self, center_x: f32, half_width: f32) {
        if !(0.0..=self.width).contains(&center_x) {
            return;
        }
        let start = (center_x - half_width).max(0.0);
        let end = (center_x + half_width).min(self.width);
        let level = self.height_at(center_x).min(self.bedrock);

        let mut covered = 0;
        for p in self.points.iter_mut().filter(|p| p.x >= start && p.x <= end) {
            p.height = level;
            covered += 1;
        }

        if covered < MIN_PLATFORM_POINTS {
            for x in [start, center_x, end] {
                self.insert_point(TerrainPoint::new(x, level));
            }
        }
    }

    /// Dig a circular-arc crater centered on `center.x`.
    ///
    /// Every point within `radius` horizontally is pushed down by
    /// `radius · √(1 − (d/radius)²) · depth_scale`, stopping at bedrock. The
    /// impact's y has no effect on the shape.
    pub fn crater(&mut self, center: Vec2, radius: f32, depth_scale: f32) {
        if !(radius > 0.0) {
            return;
        }
        let depth_scale = depth_scale.max(0.0);
        let lo = self.points.partition_point(|p| p.x <= center.x - radius);
        let hi = self.points.partition_point(|p| p.x < center.x + radius);
        if lo >= hi {
            return;
        }

        let bedrock = self.bedrock;
        for p in &mut self.points[lo..hi] {
            let dist = (p.x - center.x).abs();
            if dist < radius {
                let ratio = dist / radius;
                let depth = radius * (1.0 - ratio * ratio).max(0.0).sqrt() * depth_scale;
                p.height = (p.height + depth).min(bedrock);
            }
        }
    }

    /// Stretch the terrain to a new playfield size without regenerating it.
    ///
    /// X coordinates scale with the width; heights keep their values but are
    /// clamped to the new bedrock.
    pub fn rescale(&mut self, width: f32, height: f32, bedrock_fraction: f32) {
        if !(width > 0.0 && height > 0.0) {
            return;
        }
        let ratio = if self.width > 0.0 { width / self.width } else { 1.0 };
        self.width = width;
        self.floor = height;
        self.bedrock = height * bedrock_fraction;

        let bedrock = self.bedrock;
        for p in &mut self.points {
            p.x *= ratio;
            p.height = p.height.min(bedrock);
        }
        if let Some(last) = self.points.last_mut() {
            last.x = width;
        }
        self.points.dedup_by(|next, prev| next.x <= prev.x);
    }

    /// True when x is strictly increasing and no point sits below bedrock
    pub fn is_well_formed(&self) -> bool {
        self.points.windows(2).all(|w| w[0].x < w[1].x)
            && self.points.iter().all(|p| p.height <= self.bedrock)
    }

    /// Insert keeping x sorted; an existing point at the same x wins
    fn insert_point(&mut self, point: TerrainPoint) {
        let idx = self.points.partition_point(|p| p.x < point.x);
        if self.points.get(idx).is_some_and(|p| p.x == point.x) {
            return;
        }
        self.points.insert(idx, point);
    }
}

/// Smoothstep blend between the control points bracketing `x`
fn blend_controls(controls: &[TerrainPoint], x: f32) -> f32 {
    let idx = controls.partition_point(|c| c.x <= x);
    match (idx.checked_sub(1).and_then(|i| controls.get(i)), controls.get(idx)) {
        (Some(left), Some(right)) => {
            let span = right.x - left.x;
            if span <= f32::EPSILON {
                return left.height;
            }
            let t = (x - left.x) / span;
            left.height + smoothstep(t) * (right.height - left.height)
        }
        (Some(left), None) => left.height,
        (None, Some(right)) => right.height,
        (None, None) => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn generated(seed: u64) -> TerrainField {
        let mut rng = Pcg32::seed_from_u64(seed);
        TerrainField::generate(800.0, 700.0, &Tuning::default(), &mut rng)
    }

    #[test]
    fn test_generate_bounds_and_order() {
        let terrain = generated(7);
        assert!(terrain.is_well_formed());
        assert_eq!(terrain.points().len(), Tuning::default().terrain_segments + 1);
        assert!((terrain.bedrock() - 665.0).abs() < 1e-3);

        let first = terrain.points()[0];
        let last = *terrain.points().last().unwrap();
        assert_eq!(first.x, 0.0);
        assert_eq!(last.x, 800.0);
        assert!((first.height - 420.0).abs() < 1e-3);
        assert!((last.height - 420.0).abs() < 1e-3);
    }

    #[test]
    fn test_generate_is_smooth() {
        let terrain = generated(11);
        // Neighbouring samples are 0.2 px apart; a smoothstep profile cannot jump
        let max_step = terrain
            .points()
            .windows(2)
            .map(|w| (w[1].height - w[0].height).abs())
            .fold(0.0f32, f32::max);
        assert!(max_step < 2.0, "terrain jumps by {}", max_step);
    }

    #[test]
    fn test_generate_tolerates_unvalidated_variance() {
        let mut rng = Pcg32::seed_from_u64(5);
        let tuning = Tuning {
            variance_fraction: -0.3,
            ..Tuning::default()
        };
        let terrain = TerrainField::generate(800.0, 700.0, &tuning, &mut rng);
        assert!(terrain.is_well_formed());
        assert!(terrain.points().iter().all(|p| (p.height - 420.0).abs() < 1e-3));
    }

    #[test]
    fn test_generate_is_deterministic() {
        assert_eq!(generated(42).points(), generated(42).points());
        assert_ne!(generated(42).points(), generated(43).points());
    }

    #[test]
    fn test_height_at_interpolates() {
        let mut terrain = TerrainField::flat(100.0, 200.0, 190.0, 100.0, 2);
        terrain.points[1].height = 150.0;
        assert_eq!(terrain.height_at(0.0), 100.0);
        assert_eq!(terrain.height_at(50.0), 150.0);
        assert!((terrain.height_at(25.0) - 125.0).abs() < 1e-4);
        assert!((terrain.height_at(75.0) - 125.0).abs() < 1e-4);
        assert_eq!(terrain.height_at(100.0), 100.0);
    }

    #[test]
    fn test_height_at_outside_returns_floor() {
        let terrain = TerrainField::flat(100.0, 200.0, 190.0, 100.0, 4);
        assert_eq!(terrain.height_at(-0.5), 200.0);
        assert_eq!(terrain.height_at(100.5), 200.0);
        assert_eq!(terrain.height_at(f32::NAN), 200.0);
    }

    #[test]
    fn test_degenerate_control_span_uses_left_height() {
        let controls = [
            TerrainPoint::new(0.0, 10.0),
            TerrainPoint::new(5.0, 20.0),
            TerrainPoint::new(5.0, 30.0),
        ];
        assert_eq!(blend_controls(&controls, 5.0), 30.0);
        assert_eq!(blend_controls(&controls, 9.0), 30.0);
        assert!((blend_controls(&controls, 2.5) - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_flatten_platform_levels_pad() {
        let mut terrain = generated(3);
        let center = 160.0;
        let level = terrain.height_at(center);
        terrain.flatten_platform(center, 20.0);

        assert!(terrain.is_well_formed());
        for p in terrain.points().iter().filter(|p| (p.x - center).abs() <= 20.0) {
            assert_eq!(p.height, level);
        }
        assert_eq!(terrain.height_at(center - 10.0), level);
        assert_eq!(terrain.height_at(center + 10.0), level);
    }

    #[test]
    fn test_flatten_platform_inserts_boundaries_on_coarse_terrain() {
        // Samples every 100 px: the pad contains no original point at all
        let mut terrain = TerrainField::flat(400.0, 300.0, 290.0, 200.0, 4);
        terrain.points[1].height = 100.0;
        terrain.points[2].height = 250.0;
        let level = terrain.height_at(150.0);

        terrain.flatten_platform(150.0, 20.0);

        assert!(terrain.is_well_formed());
        assert_eq!(terrain.points().len(), 8);
        assert_eq!(terrain.height_at(130.0), level);
        assert_eq!(terrain.height_at(150.0), level);
        assert_eq!(terrain.height_at(170.0), level);
    }

    #[test]
    fn test_crater_circular_profile() {
        let mut terrain = TerrainField::flat(800.0, 700.0, 665.0, 400.0, 800);
        terrain.crater(Vec2::new(400.0, 123.0), 40.0, 0.5);

        assert!((terrain.height_at(400.0) - 420.0).abs() < 1e-3);
        // d = 24: sqrt(1 - 0.36) = 0.8
        assert!((terrain.height_at(424.0) - 416.0).abs() < 1e-3);
        assert!((terrain.height_at(376.0) - 416.0).abs() < 1e-3);
        assert_eq!(terrain.height_at(440.0), 400.0);
        assert_eq!(terrain.height_at(300.0), 400.0);
    }

    #[test]
    fn test_crater_at_bedrock_stays_at_bedrock() {
        let mut terrain = TerrainField::flat(800.0, 700.0, 665.0, 665.0, 800);
        terrain.crater(Vec2::new(300.0, 665.0), 40.0, 0.5);
        assert_eq!(terrain.height_at(300.0), 665.0);
        assert!(terrain.points().iter().all(|p| p.height == 665.0));
    }

    #[test]
    fn test_crater_clamps_near_bedrock() {
        let mut terrain = TerrainField::flat(800.0, 700.0, 665.0, 660.0, 800);
        terrain.crater(Vec2::new(300.0, 660.0), 40.0, 0.5);
        assert_eq!(terrain.height_at(300.0), 665.0);
        assert!(terrain.is_well_formed());
    }

    #[test]
    fn test_rescale_keeps_shape_and_order() {
        let mut terrain = generated(5);
        let before = terrain.height_at(400.0);
        terrain.rescale(1600.0, 700.0, 0.95);
        assert!(terrain.is_well_formed());
        assert_eq!(terrain.width(), 1600.0);
        assert!((terrain.height_at(800.0) - before).abs() < 1e-2);

        terrain.rescale(1600.0, 400.0, 0.95);
        assert!(terrain.is_well_formed());
        assert!((terrain.bedrock() - 380.0).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_craters_preserve_invariants(
            seed in any::<u64>(),
            craters in prop::collection::vec((-50.0f32..850.0, 1.0f32..120.0), 1..12),
        ) {
            let mut terrain = generated(seed);
            terrain.flatten_platform(160.0, 20.0);
            terrain.flatten_platform(640.0, 20.0);
            prop_assert!(terrain.is_well_formed());

            for (x, radius) in craters {
                let before: Vec<f32> = terrain.points().iter().map(|p| p.height).collect();
                terrain.crater(Vec2::new(x, 0.0), radius, 0.5);
                prop_assert!(terrain.is_well_formed());
                for (p, old) in terrain.points().iter().zip(before) {
                    prop_assert!(p.height >= old);
                }
            }
        }

        #[test]
        fn prop_height_at_within_bounds(seed in any::<u64>(), x in 0.0f32..800.0) {
            let terrain = generated(seed);
            let h = terrain.height_at(x);
            prop_assert!(h <= terrain.bedrock());
            prop_assert!(h >= 0.0);
        }
    }
}
