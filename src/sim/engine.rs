//! Turn state machine
//!
//! `AwaitingInput → ProjectileInFlight → ExplosionResolving → TurnHandoff`
//! and back to `AwaitingInput`, or on to `GameOver`. The driver calls
//! [`TurnEngine::advance`] once per frame with the elapsed logical time and
//! reads a [`Snapshot`] afterwards.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::ballistics::{Ballistics, Projectile};
use super::collision::{CollisionDetector, CollisionOutcome};
use super::explosion::{self, Explosion, ExplosionEffects};
use super::snapshot::{ExplosionView, Snapshot};
use super::state::{Combatant, GameEvent, HitKind, Phase, Winner};
use super::terrain::TerrainField;
use crate::consts::*;
use crate::error::TuningError;
use crate::tuning::Tuning;

/// Owns the whole match: terrain, both combatants, wind and the live shot
#[derive(Debug, Clone)]
pub struct TurnEngine {
    tuning: Tuning,
    ballistics: Ballistics,
    detector: CollisionDetector,
    seed: u64,
    rng: Pcg32,
    width: f32,
    height: f32,
    terrain: TerrainField,
    combatants: [Combatant; 2],
    current: usize,
    phase: Phase,
    winner: Option<Winner>,
    wind: f32,
    /// At most one shell exists at a time
    projectile: Option<Projectile>,
    explosion: Option<Explosion>,
    /// Logical seconds since the match started
    clock: f32,
    /// Unconsumed flight time (seconds)
    flight_accumulator: f32,
    turn: u32,
    events: Vec<GameEvent>,
}

impl TurnEngine {
    /// Start a match with default tuning
    pub fn new(width: f32, height: f32, seed: u64) -> Self {
        Self::build(Tuning::default(), width, height, seed, None)
    }

    /// Start a match with custom tuning
    pub fn with_tuning(tuning: Tuning, width: f32, height: f32, seed: u64) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self::build(tuning, width, height, seed, None))
    }

    /// Start a match over a prepared terrain instead of a generated one
    pub fn with_terrain(tuning: Tuning, terrain: TerrainField, seed: u64) -> Result<Self, TuningError> {
        tuning.validate()?;
        let (width, height) = (terrain.width(), terrain.floor());
        Ok(Self::build(tuning, width, height, seed, Some(terrain)))
    }

    fn build(tuning: Tuning, width: f32, height: f32, seed: u64, terrain: Option<TerrainField>) -> Self {
        let width = if width > 0.0 && width.is_finite() { width } else { DEFAULT_WIDTH };
        let height = if height > 0.0 && height.is_finite() { height } else { DEFAULT_HEIGHT };
        let mut rng = Pcg32::seed_from_u64(seed);
        let terrain =
            terrain.unwrap_or_else(|| TerrainField::generate(width, height, &tuning, &mut rng));

        let mut engine = Self {
            ballistics: Ballistics::from_tuning(&tuning),
            detector: CollisionDetector::from_tuning(&tuning),
            tuning,
            seed,
            rng,
            width,
            height,
            terrain,
            combatants: std::array::from_fn(|i| Combatant::new(0.0, COLORS[i], DEFAULT_ANGLES[i])),
            current: 0,
            phase: Phase::AwaitingInput,
            winner: None,
            wind: 0.0,
            projectile: None,
            explosion: None,
            clock: 0.0,
            flight_accumulator: 0.0,
            turn: 1,
            events: Vec::new(),
        };
        engine.reset_match();
        engine
    }

    /// (Re)start the match with fresh terrain, combatants and wind.
    ///
    /// Valid from any phase; an in-flight shell or running explosion is
    /// discarded without applying any of its effects.
    pub fn init_game(&mut self) {
        self.terrain = TerrainField::generate(self.width, self.height, &self.tuning, &mut self.rng);
        self.reset_match();
    }

    /// Replace the random source and start a new match from it
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
        self.init_game();
    }

    fn reset_match(&mut self) {
        self.projectile = None;
        self.explosion = None;
        self.flight_accumulator = 0.0;
        self.clock = 0.0;
        self.turn = 1;
        self.current = 0;
        self.winner = None;
        self.phase = Phase::AwaitingInput;
        self.place_combatants();
        self.wind = self.roll_wind();

        self.events.clear();
        self.push_event(GameEvent::MatchStarted { seed: self.seed });
        log::info!(
            "Match started: {}x{}, seed={}, wind={:.2}",
            self.width,
            self.height,
            self.seed,
            self.wind
        );
    }

    fn place_combatants(&mut self) {
        let width = self.terrain.width();
        for i in 0..self.combatants.len() {
            let mut combatant = Combatant::new(width * SPAWN_FRACTIONS[i], COLORS[i], DEFAULT_ANGLES[i]);
            self.terrain
                .flatten_platform(combatant.pos.x, self.tuning.platform_half_width);
            combatant.seat(&self.terrain);
            self.combatants[i] = combatant;
        }
    }

    fn roll_wind(&mut self) -> f32 {
        let max = self.tuning.max_wind;
        if !(max > 0.0) {
            return 0.0;
        }
        let raw = self.rng.random_range(-max..=max);
        (raw * 100.0).round() / 100.0
    }

    /// Stretch the match to a new viewport without regenerating terrain
    pub fn update_dimensions(&mut self, width: f32, height: f32) {
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            return;
        }
        let ratio = width / self.terrain.width().max(f32::EPSILON);
        self.terrain.rescale(width, height, self.tuning.bedrock_fraction);
        for combatant in &mut self.combatants {
            combatant.pos.x *= ratio;
            combatant.seat(&self.terrain);
        }
        // Live shot and staged crater move with the terrain under them
        if let Some(projectile) = self.projectile.as_mut() {
            projectile.pos.x *= ratio;
            projectile.vel.x *= ratio;
            for point in &mut projectile.trail {
                point.x *= ratio;
            }
        }
        if let Some(explosion) = self.explosion.as_mut() {
            explosion.center.x *= ratio;
        }
        self.width = width;
        self.height = height;
        log::debug!("Dimensions updated to {}x{}", width, height);
    }

    /// Change a combatant's power; ignored outside `AwaitingInput` or for a bad index
    pub fn adjust_power(&mut self, index: usize, delta: i32) {
        if self.phase != Phase::AwaitingInput {
            return;
        }
        if let Some(combatant) = self.combatants.get_mut(index) {
            combatant.adjust_power(delta);
        }
    }

    /// Change a combatant's aim; ignored outside `AwaitingInput` or for a bad index
    pub fn adjust_angle(&mut self, index: usize, delta: i32) {
        if self.phase != Phase::AwaitingInput {
            return;
        }
        if let Some(combatant) = self.combatants.get_mut(index) {
            combatant.adjust_angle(delta);
        }
    }

    /// Launch a shell for the current combatant. Returns false if not allowed now.
    pub fn fire_missile(&mut self) -> bool {
        if self.phase != Phase::AwaitingInput || self.projectile.is_some() {
            return false;
        }

        let shooter = &self.combatants[self.current];
        let (power, angle) = (shooter.power, shooter.angle);
        let projectile = Projectile::launch(
            shooter.turret(self.tuning.turret_offset),
            angle as f32,
            power as f32 * self.tuning.power_to_speed,
            self.tuning.muzzle_offset,
            self.current,
        );

        log::info!(
            "Combatant {} fires: power={}, angle={}, wind={:.2}",
            self.current,
            power,
            angle,
            self.wind
        );
        self.push_event(GameEvent::Fired {
            combatant: self.current,
            power,
            angle,
        });

        self.projectile = Some(projectile);
        self.flight_accumulator = 0.0;
        self.phase = Phase::ProjectileInFlight;
        true
    }

    /// Advance the simulation by `dt` logical seconds
    pub fn advance(&mut self, dt: f32) {
        if !(dt > 0.0 && dt.is_finite()) {
            return;
        }
        let dt = dt.min(MAX_FRAME_DT);
        self.clock += dt;

        match self.phase {
            Phase::ProjectileInFlight => self.advance_flight(dt),
            Phase::ExplosionResolving => self.advance_explosion(dt),
            Phase::AwaitingInput | Phase::TurnHandoff | Phase::GameOver => {}
        }

        if self.phase == Phase::TurnHandoff {
            self.hand_off();
        }
    }

    fn advance_flight(&mut self, dt: f32) {
        self.flight_accumulator += dt;

        let mut substeps = 0;
        while self.flight_accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.flight_accumulator -= SIM_DT;
            substeps += 1;

            for _ in 0..self.tuning.flight_substeps {
                let Some(projectile) = self.projectile.as_mut() else {
                    self.phase = Phase::TurnHandoff;
                    return;
                };
                self.ballistics.step(projectile, self.wind, SIM_DT);
                let outcome = self.detector.check(projectile, &self.terrain, &self.combatants);
                if outcome != CollisionOutcome::Clear {
                    self.finish_flight(outcome);
                    return;
                }
            }
        }
    }

    fn finish_flight(&mut self, outcome: CollisionOutcome) {
        let (point, hit) = match outcome {
            CollisionOutcome::Clear => return,
            CollisionOutcome::OutOfBounds => {
                log::debug!("Shell from combatant {} left the playfield", self.current);
                self.push_event(GameEvent::OutOfBounds {
                    combatant: self.current,
                });
                self.projectile = None;
                self.phase = Phase::TurnHandoff;
                return;
            }
            CollisionOutcome::Terrain { point } => (point, HitKind::Terrain),
            CollisionOutcome::Combatant { index, point } => (point, HitKind::Combatant(index)),
        };

        // Positions are frozen now so the crater cannot shift who gets hurt
        let positions: [Vec2; 2] = std::array::from_fn(|i| self.combatants[i].pos);
        let effects = explosion::resolve(
            point,
            &positions,
            self.tuning.explosion_radius,
            self.tuning.damage_margin,
        );
        log::debug!(
            "Impact at ({:.1}, {:.1}) {:?}, {} combatant(s) in reach",
            point.x,
            point.y,
            hit,
            effects.damages.len()
        );

        self.push_event(GameEvent::Impact { point, hit });
        self.explosion = Some(Explosion::new(effects, self.clock, self.tuning.explosion_duration));
        self.projectile = None;
        self.phase = Phase::ExplosionResolving;
    }

    fn advance_explosion(&mut self, dt: f32) {
        let trigger = self.tuning.effect_trigger;
        let Some(explosion) = self.explosion.as_mut() else {
            self.phase = Phase::TurnHandoff;
            return;
        };
        explosion.advance(dt);
        let due = explosion.take_due_effects(trigger);
        let finished = explosion.is_finished();

        if let Some(effects) = due {
            self.apply_effects(effects);
        }

        if finished {
            self.explosion = None;
            match self.winner {
                Some(winner) => {
                    log::info!("Game over: {:?}", winner);
                    self.push_event(GameEvent::GameOver { winner });
                    self.phase = Phase::GameOver;
                }
                None => self.phase = Phase::TurnHandoff,
            }
        }
    }

    fn apply_effects(&mut self, effects: ExplosionEffects) {
        let crater = effects.crater;
        self.terrain
            .crater(crater.center, crater.radius, self.tuning.crater_depth_scale);
        self.push_event(GameEvent::TerrainDeformed {
            center: crater.center,
            radius: crater.radius,
        });
        for combatant in &mut self.combatants {
            combatant.seat(&self.terrain);
        }

        for pending in effects.damages {
            self.apply_damage(pending.combatant, pending.amount);
        }
        self.evaluate_game_over();
    }

    fn apply_damage(&mut self, index: usize, amount: i32) {
        let min_damage = self.tuning.min_damage;
        let Some(combatant) = self.combatants.get_mut(index) else {
            return;
        };
        let dealt = explosion::applied_damage(amount, min_damage);
        let health = combatant.take_damage(dealt);

        log::info!("Combatant {} took {} damage, health {}", index, dealt, health);
        self.push_event(GameEvent::DamageApplied {
            combatant: index,
            amount: dealt,
            health,
        });
    }

    fn evaluate_game_over(&mut self) {
        let alive: Vec<usize> = self
            .combatants
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_alive())
            .map(|(i, _)| i)
            .collect();

        self.winner = match alive.as_slice() {
            [] => Some(Winner::Tie),
            [survivor] => Some(Winner::Combatant(*survivor)),
            _ => None,
        };
    }

    fn hand_off(&mut self) {
        self.projectile = None;
        self.explosion = None;
        self.flight_accumulator = 0.0;
        self.wind = self.roll_wind();
        self.current = 1 - self.current;
        self.turn += 1;
        self.phase = Phase::AwaitingInput;

        log::info!(
            "Turn {}: combatant {} to play, wind={:.2}",
            self.turn,
            self.current,
            self.wind
        );
        self.push_event(GameEvent::TurnPassed {
            next: self.current,
            wind: self.wind,
        });
    }

    /// Record an event, dropping the oldest once `MAX_PENDING_EVENTS` are undrained
    fn push_event(&mut self, event: GameEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            let excess = self.events.len() + 1 - MAX_PENDING_EVENTS;
            self.events.drain(..excess);
        }
        self.events.push(event);
    }

    /// Take every event recorded since the last drain.
    ///
    /// Drivers should drain after each `advance`; only the newest
    /// `MAX_PENDING_EVENTS` are kept otherwise.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read-only view for rendering
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            width: self.width,
            height: self.height,
            bedrock: self.terrain.bedrock(),
            terrain: self.terrain.points(),
            combatants: &self.combatants,
            current: self.current,
            wind: self.wind,
            projectile: self.projectile.as_ref(),
            explosion: self.explosion.as_ref().map(ExplosionView::from),
            phase: self.phase,
            winner: self.winner,
            turn: self.turn,
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn wind(&self) -> f32 {
        self.wind
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn terrain(&self) -> &TerrainField {
        &self.terrain
    }

    pub fn combatants(&self) -> &[Combatant; 2] {
        &self.combatants
    }

    pub fn projectile(&self) -> Option<&Projectile> {
        self.projectile.as_ref()
    }

    pub fn explosion(&self) -> Option<&Explosion> {
        self.explosion.as_ref()
    }
}
