//! Artillery Duel headless driver
//!
//! Plays a scripted match at the fixed timestep and logs what happens.
//!
//! Usage: `artillery-duel [seed] [tuning.json]`

use std::error::Error;

use artillery_duel::consts::*;
use artillery_duel::sim::{GameEvent, Phase};
use artillery_duel::{Tuning, TurnEngine};

/// Stop a match that has not been decided after this many turns
const TURN_CAP: u32 = 60;
/// Upper bound on frames spent resolving a single shot
const FRAMES_PER_SHOT: usize = 60 * 30;

/// Power and angle nudges applied before each shot, cycled per combatant
const SHOT_SCHEDULE: [(i32, i32); 6] = [(0, 0), (8, 0), (-4, 5), (6, -3), (-10, 10), (12, -8)];

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(raw) => raw.parse::<u64>()?,
        None => 12345,
    };
    let tuning = match args.next() {
        Some(path) => Tuning::from_json(&std::fs::read_to_string(&path)?)?,
        None => Tuning::default(),
    };

    log::info!("Artillery Duel (headless) starting, seed={}", seed);
    let mut engine = TurnEngine::with_tuning(tuning, DEFAULT_WIDTH, DEFAULT_HEIGHT, seed)?;
    report(engine.drain_events());

    while engine.phase() != Phase::GameOver && engine.turn() <= TURN_CAP {
        let shooter = engine.current();
        let (power, angle) = SHOT_SCHEDULE[(engine.turn() as usize / 2) % SHOT_SCHEDULE.len()];
        engine.adjust_power(shooter, power);
        engine.adjust_angle(shooter, angle);

        if !engine.fire_missile() {
            log::warn!("Combatant {} could not fire in {:?}", shooter, engine.phase());
            break;
        }
        for _ in 0..FRAMES_PER_SHOT {
            engine.advance(SIM_DT);
            report(engine.drain_events());
            if matches!(engine.phase(), Phase::AwaitingInput | Phase::GameOver) {
                break;
            }
        }
    }

    let snapshot = engine.snapshot();
    let summary = serde_json::json!({
        "seed": engine.seed(),
        "turns": snapshot.turn,
        "phase": snapshot.phase,
        "winner": snapshot.winner,
        "health": snapshot.combatants.iter().map(|c| c.health).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless driver on the web; embed `TurnEngine` directly
}

fn report(events: Vec<GameEvent>) {
    for event in events {
        match event {
            GameEvent::Impact { point, hit } => {
                log::debug!("Impact {:?} at ({:.1}, {:.1})", hit, point.x, point.y)
            }
            GameEvent::GameOver { winner } => log::info!("Result: {:?}", winner),
            other => log::trace!("{:?}", other),
        }
    }
}
