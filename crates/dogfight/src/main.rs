//! Headless dogfight: the player flies straight at an enemy ring, holding the
//! trigger whenever a target is locked and loosing a missile every few seconds.
//!
//! Usage: `dogfight [seconds] [seed]`

use anyhow::{Context, Result};
use dogfight::{MatchTally, SimConfig, SimEvent, Simulation};
use engine_core::{Transform, Vec3};
use input::{ActionState, FlightAction, FlightAxis, InputState};
use rand::{rngs::StdRng, SeedableRng};

const FRAME: f32 = 1.0 / 60.0;
const ENEMY_COUNT: usize = 4;
const MISSILE_PERIOD_FRAMES: u64 = 300;
const REPORT_PERIOD_FRAMES: u64 = 600;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seconds: f32 = args
        .next()
        .map(|s| s.parse::<f32>())
        .transpose()
        .context("duration must be a number of seconds")?
        .unwrap_or(60.0);
    let seed: u64 = args
        .next()
        .map(|s| s.parse::<u64>())
        .transpose()
        .context("seed must be an unsigned integer")?
        .unwrap_or(7);

    let config = SimConfig::load();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut sim = Simulation::new(config);

    let player = sim.spawn_player(Transform::facing(Vec3::new(0.0, 1500.0, 0.0), Vec3::NEG_Z))?;
    let enemies = sim.spawn_enemy_ring(ENEMY_COUNT, 1500.0, 1500.0, &mut rng)?;
    let mut tally = MatchTally::new(enemies.len() as u32);

    let mut input = InputState::new();
    input.set_axis(FlightAxis::Throttle, 1.0);

    let frames = (seconds.max(0.0) / FRAME) as u64;
    log::info!("Running {} s ({} frames), seed {}", seconds, frames, seed);

    for frame in 0..frames {
        let locked = sim
            .readout(player)
            .and_then(|r| r.locked_target)
            .is_some();
        let trigger = if locked { ActionState::Pressed } else { ActionState::Released };
        input.process_action(FlightAction::FireGun, trigger);
        if locked && frame % MISSILE_PERIOD_FRAMES == 0 {
            input.process_action(FlightAction::FireMissile, ActionState::Pressed);
        } else {
            input.process_action(FlightAction::FireMissile, ActionState::Released);
        }

        for event in sim.advance(FRAME, &mut input) {
            if let SimEvent::Notice { message, .. } = event {
                log::info!("{}", message);
            }
            tally.observe(&event);
        }

        if frame % REPORT_PERIOD_FRAMES == 0 {
            if let Some(r) = sim.readout(player) {
                log::info!(
                    "t={:.0}s  {:.0} km/h  alt {:.0} m  thr {:.0}%  hp {:.0}%  missiles {}  lock {:?}",
                    sim.clock().elapsed_seconds(),
                    r.airspeed_kmh,
                    r.altitude_m,
                    r.throttle_percent,
                    r.health_percent,
                    r.missiles,
                    r.locked_target,
                );
            }
        }
        if tally.outcome().is_some() {
            break;
        }
    }

    log::info!(
        "Finished: {:?}, {} kills, {} enemies left",
        tally.outcome(),
        tally.kills(),
        tally.living_enemies()
    );
    Ok(())
}
