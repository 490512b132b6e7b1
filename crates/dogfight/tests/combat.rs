use dogfight::ai::AiPilot;
use dogfight::{MatchOutcome, MatchTally, Pilot, SimConfig, SimEvent, Simulation};
use engine_core::{AIState, Entity, Transform, Vec3};
use input::{ActionState, FlightAction, InputState};

const DT: f32 = 1.0 / 60.0;

/// No gravity, nobody moving, and AI that neither turns nor throttles up,
/// so shots and missiles have a fixed geometry.
fn still_config() -> SimConfig {
    let mut config = SimConfig::default();
    config.gravity = 0.0;
    config.player.spawn_speed = 0.0;
    config.enemy.spawn_speed = 0.0;
    config.ai.turn_speed = 0.0;
    config.ai.max_speed = 0.0;
    config
}

fn setup(config: SimConfig, enemy_distance: f32) -> (Simulation, Entity, Entity) {
    let mut sim = Simulation::new(config);
    let player = sim
        .spawn_player(Transform::facing(Vec3::new(0.0, 1000.0, 0.0), Vec3::NEG_Z))
        .unwrap();
    // Enemy dead ahead, facing away so it never lines up a shot.
    let enemy = sim
        .spawn_enemy(Transform::facing(Vec3::new(0.0, 1000.0, -enemy_distance), Vec3::NEG_Z))
        .unwrap();
    (sim, player, enemy)
}

fn press(input: &mut InputState, action: FlightAction) {
    input.process_action(action, ActionState::Pressed);
}

fn release(input: &mut InputState, action: FlightAction) {
    input.process_action(action, ActionState::Released);
}

fn ai_state(sim: &Simulation, entity: Entity) -> AIState {
    sim.world().get::<&AiPilot>(entity).unwrap().state
}

#[test]
fn gun_kills_target_ahead_in_ten_hits() {
    let (mut sim, player, enemy) = setup(still_config(), 200.0);
    let mut tally = MatchTally::new(1);
    let mut input = InputState::new();
    press(&mut input, FlightAction::FireGun);

    let mut hits = 0;
    let mut deaths = 0;
    for _ in 0..120 {
        for event in sim.tick(&input, DT) {
            match event {
                SimEvent::GunFired { shooter, hit: Some(target) } => {
                    assert_eq!(shooter, player);
                    assert_eq!(target, enemy);
                    hits += 1;
                }
                SimEvent::Died { entity, pilot } => {
                    assert_eq!(entity, enemy);
                    assert_eq!(pilot, Pilot::Ai);
                    deaths += 1;
                }
                _ => {}
            }
            tally.observe(&event);
        }
        input.begin_frame();
    }

    assert_eq!(hits, 10);
    assert_eq!(deaths, 1);
    assert!(!sim.world().contains(enemy));
    assert!(sim.enemies().is_empty());
    assert_eq!(tally.outcome(), Some(MatchOutcome::Victory));
    assert_eq!(sim.player(), Some(player));
}

#[test]
fn missile_needs_a_lock_and_spends_one_round() {
    let mut sim = Simulation::new(still_config());
    let player = sim
        .spawn_player(Transform::facing(Vec3::new(0.0, 1000.0, 0.0), Vec3::NEG_Z))
        .unwrap();
    let mut input = InputState::new();

    // Nothing to lock: the press is silently rejected.
    press(&mut input, FlightAction::FireMissile);
    let events = sim.tick(&input, DT);
    input.begin_frame();
    release(&mut input, FlightAction::FireMissile);
    assert!(!events.iter().any(|e| matches!(e, SimEvent::MissileLaunched { .. })));
    assert_eq!(sim.readout(player).unwrap().missiles, 10);

    let enemy = sim
        .spawn_enemy(Transform::facing(Vec3::new(0.0, 1000.0, -300.0), Vec3::NEG_Z))
        .unwrap();
    press(&mut input, FlightAction::FireMissile);
    let events = sim.tick(&input, DT);
    input.begin_frame();
    release(&mut input, FlightAction::FireMissile);
    assert!(events.contains(&SimEvent::MissileLaunched { shooter: player, target: enemy }));
    assert_eq!(sim.readout(player).unwrap().missiles, 9);

    let mut died = false;
    for _ in 0..600 {
        let events = sim.tick(&input, DT);
        if events.contains(&SimEvent::Died { entity: enemy, pilot: Pilot::Ai }) {
            assert!(events.iter().any(|e| matches!(e, SimEvent::MissileDetonated { hit: Some(h), .. } if *h == enemy)));
            died = true;
            break;
        }
    }
    assert!(died, "missile never reached its target");

    // The lock does not outlive its target.
    sim.tick(&input, DT);
    assert_eq!(sim.readout(player).unwrap().locked_target, None);
    press(&mut input, FlightAction::FireMissile);
    sim.tick(&input, DT);
    assert_eq!(sim.readout(player).unwrap().missiles, 9);
}

#[test]
fn empty_rack_raises_a_notice() {
    let mut config = still_config();
    config.player.missile_capacity = 0;
    let (mut sim, player, _enemy) = setup(config, 300.0);
    let mut input = InputState::new();
    press(&mut input, FlightAction::FireMissile);

    let events = sim.tick(&input, DT);
    assert!(events.contains(&SimEvent::Notice {
        entity: player,
        message: "OUT OF MISSILES"
    }));
    assert!(!events.iter().any(|e| matches!(e, SimEvent::MissileLaunched { .. })));
}

#[test]
fn hit_enemy_evades_then_resumes_seeking() {
    let (mut sim, _player, enemy) = setup(still_config(), 200.0);
    let mut input = InputState::new();

    press(&mut input, FlightAction::FireGun);
    let events = sim.tick(&input, DT);
    assert!(events.iter().any(|e| matches!(
        e,
        SimEvent::AiStateChanged { entity, to: AIState::Evading { .. }, .. } if *entity == enemy
    )));
    input.begin_frame();
    release(&mut input, FlightAction::FireGun);

    // Two seconds of evasion at 60 Hz.
    for _ in 0..100 {
        sim.tick(&input, DT);
    }
    assert!(ai_state(&sim, enemy).is_evading());
    for _ in 0..20 {
        sim.tick(&input, DT);
    }
    assert!(!ai_state(&sim, enemy).is_evading());
}

#[test]
fn flaps_toggle_shows_a_notice_and_the_readout() {
    let (mut sim, player, _enemy) = setup(still_config(), 2000.0);
    let mut input = InputState::new();
    press(&mut input, FlightAction::ToggleFlaps);

    let events = sim.tick(&input, DT);
    assert!(events.contains(&SimEvent::Notice {
        entity: player,
        message: "Flaps Deployed"
    }));
    assert!(sim.readout(player).unwrap().flaps_deployed);
}

#[test]
fn diving_into_the_ground_hurts() {
    let mut config = SimConfig::default();
    config.player.spawn_speed = 60.0;
    let mut sim = Simulation::new(config);
    let player = sim
        .spawn_player(Transform::facing(Vec3::new(0.0, 30.0, 0.0), Vec3::NEG_Y))
        .unwrap();
    let input = InputState::new();

    let mut hurt = false;
    for _ in 0..120 {
        let events = sim.tick(&input, DT);
        if events
            .iter()
            .any(|e| matches!(e, SimEvent::HealthChanged { entity, .. } if *entity == player))
        {
            hurt = true;
            break;
        }
    }
    assert!(hurt, "no impact damage from a 60 m/s dive");
}

#[test]
fn fixed_clock_runs_one_tick_per_frame() {
    let (mut sim, _player, _enemy) = setup(still_config(), 2000.0);
    let mut input = InputState::new();
    for _ in 0..30 {
        sim.advance(DT, &mut input);
    }
    assert_eq!(sim.clock().tick_count(), 30);
}
