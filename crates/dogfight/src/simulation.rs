//! The simulation tick loop.
//!
//! One tick runs, in order: read bodies back from physics, player and AI
//! controls, aerodynamics, missile locks, weapons, missiles, the physics
//! step with impact damage, and finally removal of the dead. Spawns and
//! despawns are queued and applied at the end of the tick.

use std::f32::consts::TAU;

use engine_core::{
    ControlInputs, Damage, Entity, Faction, Health, Player, RigidBodyState, SimClock, Transform, Vec3,
    World,
};
use hecs::{CommandBuffer, EntityBuilder};
use input::{ControlInputController, InputState};
use physics::{CollisionGroup, ContactImpulse, PhysicsBody, PhysicsWorld, RigidBodyHandle};
use rand::Rng;
use thiserror::Error;

use crate::aero::{compute_aero_forces, AeroEnvironment};
use crate::ai::AiPilot;
use crate::aircraft::{entity_from_user_data, user_data_for, Aircraft, AircraftConfig, FlightReadout, FlightState};
use crate::config::SimConfig;
use crate::events::{EffectCue, SimEvent};
use crate::health::{apply_damage, is_alive};
use crate::missile::{missile_bundle, update_missiles, MissileConfig};
use crate::targeting::{update_locks, TargetLock};
use crate::weapons::{fire_hitscan, FireError, Gun, MissileRack};

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SpawnError {
    #[error("spawn transform is not finite")]
    NonFiniteTransform,
    #[error("airframe mass must be positive, got {0}")]
    InvalidMass(f32),
}

/// One resolved gun shot, collected before damage is applied.
struct Shot {
    shooter: Entity,
    body: RigidBodyHandle,
    origin: Vec3,
    direction: Vec3,
    range: f32,
    damage: f32,
}

/// Owns the entity registry and the physics world and advances both.
pub struct Simulation {
    world: World,
    physics: PhysicsWorld,
    config: SimConfig,
    controller: ControlInputController,
    commands: CommandBuffer,
    clock: SimClock,
    player: Option<Entity>,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        let mut physics = PhysicsWorld::with_gravity(config.gravity);
        physics.add_ground_plane();
        physics.update_query_pipeline();
        Self {
            world: World::new(),
            physics,
            controller: ControlInputController::new(config.player.throttle),
            commands: CommandBuffer::new(),
            clock: SimClock::with_rate(config.tick_rate),
            player: None,
            config,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// The player aircraft, while it is alive.
    pub fn player(&self) -> Option<Entity> {
        self.player.filter(|p| is_alive(&self.world, *p))
    }

    /// Living AI aircraft.
    pub fn enemies(&self) -> Vec<Entity> {
        self.world
            .query::<(&AiPilot, &Health)>()
            .iter()
            .filter(|(_, (_, health))| !health.is_dead())
            .map(|(entity, _)| entity)
            .collect()
    }

    /// Spawn the player's aircraft. It starts at the template's spawn speed
    /// along its forward axis.
    pub fn spawn_player(&mut self, transform: Transform) -> Result<Entity, SpawnError> {
        let template = self.config.player.clone();
        let mut builder = EntityBuilder::new();
        builder.add(Player);
        let entity = self.spawn_aircraft(&template, Faction::Player, transform, builder)?;
        if let Some(previous) = self.player() {
            log::warn!("Replacing player aircraft {:?} with {:?}", previous, entity);
        }
        self.player = Some(entity);
        Ok(entity)
    }

    /// Spawn one AI aircraft from the enemy template.
    pub fn spawn_enemy(&mut self, transform: Transform) -> Result<Entity, SpawnError> {
        let template = self.config.enemy.clone();
        let mut builder = EntityBuilder::new();
        builder.add(AiPilot::new(self.config.ai));
        self.spawn_aircraft(&template, Faction::Enemy, transform, builder)
    }

    /// Spawn `count` enemies at random angles on a ring around the player
    /// (or the origin), all facing the ring's centre.
    pub fn spawn_enemy_ring<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        radius: f32,
        altitude: f32,
        rng: &mut R,
    ) -> Result<Vec<Entity>, SpawnError> {
        let centre = self
            .player()
            .and_then(|p| self.world.get::<&Transform>(p).ok().map(|t| t.position))
            .unwrap_or(Vec3::ZERO);
        let centre = Vec3::new(centre.x, altitude, centre.z);

        let mut spawned = Vec::with_capacity(count);
        for _ in 0..count {
            let angle = rng.gen_range(0.0..TAU);
            let position = centre + Vec3::new(angle.cos(), 0.0, angle.sin()) * radius;
            spawned.push(self.spawn_enemy(Transform::facing(position, centre - position))?);
        }
        log::info!("Spawned {} enemies on a {} m ring", count, radius);
        Ok(spawned)
    }

    fn spawn_aircraft(
        &mut self,
        template: &AircraftConfig,
        faction: Faction,
        transform: Transform,
        mut builder: EntityBuilder,
    ) -> Result<Entity, SpawnError> {
        if !transform.position.is_finite() || !transform.rotation.is_finite() {
            return Err(SpawnError::NonFiniteTransform);
        }
        let mass = template.airframe.mass;
        if !(mass > 0.0 && mass.is_finite()) {
            return Err(SpawnError::InvalidMass(mass));
        }
        let transform = Transform::from_position_rotation(transform.position, transform.rotation.normalize());
        let velocity = transform.forward() * template.spawn_speed;
        let groups = match faction {
            Faction::Player => CollisionGroup::player_aircraft(),
            Faction::Enemy => CollisionGroup::enemy_aircraft(),
        };

        let entity = self.world.reserve_entity();
        let (rigid_body, collider) = self.physics.add_aircraft_body(
            transform,
            velocity,
            &template.airframe.to_body(),
            groups,
            user_data_for(entity),
        );
        self.physics.update_query_pipeline();

        let body = RigidBodyState {
            linear_velocity: velocity,
            ..RigidBodyState::at_rest(transform, mass)
        };
        builder
            .add(Aircraft { aero: template.aero })
            .add(transform)
            .add(FlightState {
                body,
                env: AeroEnvironment {
                    on_ground: false,
                    altitude: transform.position.y,
                },
                ..Default::default()
            })
            .add(ControlInputs::default())
            .add(template.health())
            .add(faction)
            .add(Gun::new(template.gun))
            .add(template.missile_rack())
            .add(TargetLock::default())
            .add(PhysicsBody::new(rigid_body, collider));
        self.world.spawn_at(entity, builder.build());

        log::debug!("Spawned {:?} aircraft {:?} at {:?}", faction, entity, transform.position);
        Ok(entity)
    }

    /// HUD read-outs for an aircraft.
    pub fn readout(&self, entity: Entity) -> Option<FlightReadout> {
        let mut query = self
            .world
            .query_one::<(&FlightState, &ControlInputs, &Health, &MissileRack, &TargetLock)>(entity)
            .ok()?;
        let (flight, controls, health, rack, lock) = query.get()?;
        Some(FlightReadout::new(
            flight,
            controls,
            health,
            rack.ammo(),
            lock.valid_target(&self.world),
        ))
    }

    /// Feed a frame's worth of wall time through the fixed-step clock.
    ///
    /// Press edges in `input` are consumed by the first tick of the frame.
    pub fn advance(&mut self, frame_delta: f32, input: &mut InputState) -> Vec<SimEvent> {
        self.clock.advance(frame_delta);
        let dt = self.clock.fixed_timestep();
        let mut events = Vec::new();
        while self.clock.should_fixed_update() {
            events.extend(self.tick(input, dt));
            input.begin_frame();
        }
        events
    }

    /// Run exactly one tick of `dt` seconds.
    pub fn tick(&mut self, input: &InputState, dt: f32) -> Vec<SimEvent> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let mut events = Vec::new();

        self.sync_bodies();
        let fire_missile = self.update_player(input, dt, &mut events);
        self.update_ai(dt, &mut events);
        self.apply_aero(dt);

        update_locks(&mut self.world, self.config.lock_cone_cos, &mut events);
        if fire_missile {
            if let Some(player) = self.player() {
                if let Err(e) = self.launch_missile(player, &mut events) {
                    log::debug!("{:?} missile launch refused: {}", player, e);
                }
            }
        }
        self.fire_guns(dt, &mut events);
        update_missiles(&mut self.world, &self.physics, dt, &mut events, &mut self.commands);

        self.disable_dead_bodies();
        let contacts = self.physics.step(dt);
        self.apply_impacts(&contacts, &mut events);

        self.remove_dead();
        self.commands.run_on(&mut self.world);
        self.physics.update_query_pipeline();
        events
    }

    /// Read every live aircraft's body back from physics and probe for ground.
    fn sync_bodies(&mut self) {
        let probe = self.config.ground_probe_distance;
        for (_, (body, flight, transform, health)) in self
            .world
            .query_mut::<(&PhysicsBody, &mut FlightState, &mut Transform, &Health)>()
        {
            if health.is_dead() {
                continue;
            }
            let Some(state) = self.physics.body_state(body.rigid_body) else {
                continue;
            };
            let ground = self
                .physics
                .raycast(state.position, -state.up(), probe, Some(body.rigid_body));
            flight.env = AeroEnvironment {
                on_ground: ground.is_some(),
                altitude: state.position.y,
            };
            flight.body = state;
            *transform = state.transform();
        }
    }

    /// Returns true when the player pressed missile fire this tick.
    fn update_player(&mut self, input: &InputState, dt: f32, events: &mut Vec<SimEvent>) -> bool {
        let Some(player) = self.player() else {
            return false;
        };
        let Ok((controls, gun)) = self.world.query_one_mut::<(&mut ControlInputs, &mut Gun)>(player) else {
            return false;
        };
        let edges = self.controller.update(input, controls, dt);
        if controls.firing {
            gun.start_fire();
        } else {
            gun.stop_fire();
        }
        if edges.flaps_toggled {
            let message = if controls.flaps_deployed {
                "Flaps Deployed"
            } else {
                "Flaps Retracted"
            };
            events.push(SimEvent::Notice {
                entity: player,
                message,
            });
        }
        edges.fire_missile
    }

    fn update_ai(&mut self, dt: f32, events: &mut Vec<SimEvent>) {
        let opponent = self
            .player()
            .and_then(|p| self.world.get::<&Transform>(p).ok().map(|t| t.position));

        for (entity, (pilot, flight, controls, gun, body, health)) in self.world.query_mut::<(
            &mut AiPilot,
            &mut FlightState,
            &mut ControlInputs,
            &mut Gun,
            &PhysicsBody,
            &Health,
        )>() {
            if health.is_dead() {
                continue;
            }
            let command = pilot.update(&flight.body, opponent, dt);
            self.physics.set_heading(body.rigid_body, command.rotation);
            flight.body.rotation = command.rotation;
            flight.body.angular_velocity = Vec3::ZERO;

            controls.clear_axes();
            controls.set_throttle(command.throttle);
            if command.fire {
                gun.start_fire();
            } else {
                gun.stop_fire();
            }
            if let Some((from, to)) = command.transition {
                events.push(SimEvent::AiStateChanged { entity, from, to });
            }
        }
    }

    fn apply_aero(&mut self, dt: f32) {
        for (_, (aircraft, controls, flight, body, health)) in self.world.query_mut::<(
            &Aircraft,
            &ControlInputs,
            &mut FlightState,
            &PhysicsBody,
            &Health,
        )>() {
            if health.is_dead() {
                continue;
            }
            let output = compute_aero_forces(&flight.body, controls, &aircraft.aero, flight.env);
            flight.last_output = output;
            self.physics
                .apply_forces(body.rigid_body, output.force, output.torque, dt);
        }
    }

    /// Validate and launch one missile from `shooter` at its current lock.
    fn launch_missile(&mut self, shooter: Entity, events: &mut Vec<SimEvent>) -> Result<Entity, FireError> {
        let (target, missile_config, muzzle, carrier_velocity) = match self.prepare_launch(shooter) {
            Ok(launch) => launch,
            Err(FireError::OutOfAmmo) => {
                log::warn!("{:?} is out of missiles", shooter);
                events.push(SimEvent::Notice {
                    entity: shooter,
                    message: "OUT OF MISSILES",
                });
                return Err(FireError::OutOfAmmo);
            }
            Err(e) => return Err(e),
        };

        self.commands
            .spawn(missile_bundle(missile_config, shooter, target, muzzle, carrier_velocity));
        log::debug!("{:?} launched a missile at {:?}", shooter, target);
        events.push(SimEvent::MissileLaunched { shooter, target });
        events.push(SimEvent::Effect(EffectCue::MissileLaunch {
            position: muzzle.position,
        }));
        Ok(target)
    }

    /// Resolve the launch pose, then spend one missile. Nothing is consumed
    /// unless the missile can actually leave the rail.
    fn prepare_launch(&mut self, shooter: Entity) -> Result<(Entity, MissileConfig, Transform, Vec3), FireError> {
        let lock = self
            .world
            .get::<&TargetLock>(shooter)
            .ok()
            .and_then(|l| l.target);
        let pose = self
            .world
            .query_one_mut::<(&FlightState, &Gun)>(shooter)
            .ok()
            .map(|(flight, gun)| {
                let t = flight.body.transform();
                (
                    Transform::from_position_rotation(t.transform_point(gun.config.muzzle_offset), t.rotation),
                    flight.body.linear_velocity,
                )
            });

        let mut rack = self
            .world
            .get::<&mut MissileRack>(shooter)
            .map_err(|_| FireError::OutOfAmmo)?;
        let Some((muzzle, carrier_velocity)) = pose else {
            return Err(if rack.ammo() == 0 {
                FireError::OutOfAmmo
            } else {
                FireError::NoLock
            });
        };
        let target = rack.try_launch(lock, |e| is_alive(&self.world, e))?;
        Ok((target, rack.missile, muzzle, carrier_velocity))
    }

    fn fire_guns(&mut self, dt: f32, events: &mut Vec<SimEvent>) {
        let mut shots = Vec::new();
        for (entity, (gun, flight, body, health)) in self.world.query_mut::<(
            &mut Gun,
            &FlightState,
            &PhysicsBody,
            &Health,
        )>() {
            if health.is_dead() {
                gun.stop_fire();
                continue;
            }
            let count = gun.tick(dt);
            if count == 0 {
                continue;
            }
            let transform = flight.body.transform();
            let origin = transform.transform_point(gun.config.muzzle_offset);
            for _ in 0..count {
                shots.push(Shot {
                    shooter: entity,
                    body: body.rigid_body,
                    origin,
                    direction: transform.forward(),
                    range: gun.config.range,
                    damage: gun.config.damage,
                });
            }
        }

        for shot in shots {
            // A shooter killed or driven into evasion earlier in this loop
            // does not keep firing.
            if !is_alive(&self.world, shot.shooter) || self.is_evading(shot.shooter) {
                continue;
            }
            let hit = fire_hitscan(&self.physics, shot.origin, shot.direction, shot.range, shot.body);
            let victim = hit.and_then(|h| entity_from_user_data(h.user_data));
            events.push(SimEvent::Effect(EffectCue::MuzzleFlash { position: shot.origin }));
            events.push(SimEvent::Effect(EffectCue::GunSound { position: shot.origin }));
            events.push(SimEvent::GunFired {
                shooter: shot.shooter,
                hit: victim,
            });
            if let Some(victim) = victim {
                apply_damage(&mut self.world, victim, Damage::gun(shot.damage), events);
            }
        }
    }

    fn is_evading(&self, entity: Entity) -> bool {
        self.world
            .get::<&AiPilot>(entity)
            .map(|pilot| pilot.state.is_evading())
            .unwrap_or(false)
    }

    fn disable_dead_bodies(&mut self) {
        for (_, (body, health)) in self
            .world
            .query_mut::<(&PhysicsBody, &Health)>()
        {
            if health.is_dead() {
                self.physics.disable_body(body.rigid_body);
            }
        }
    }

    /// Crash damage: a contact whose impulse per unit of our mass exceeds the
    /// threshold hurts.
    fn apply_impacts(&mut self, contacts: &[ContactImpulse], events: &mut Vec<SimEvent>) {
        let impact = self.config.impact;
        for contact in contacts {
            for collider in [contact.collider1, contact.collider2] {
                let Some(entity) = self
                    .physics
                    .collider_user_data(collider)
                    .and_then(entity_from_user_data)
                else {
                    continue;
                };
                let mass = self
                    .world
                    .get::<&FlightState>(entity)
                    .map(|f| f.body.mass)
                    .unwrap_or(0.0);
                if mass <= 0.0 {
                    continue;
                }
                if contact.impulse / mass > impact.speed_threshold {
                    apply_damage(&mut self.world, entity, Damage::impact(impact.damage), events);
                }
            }
        }
    }

    /// Release the physics bodies of dead aircraft and queue their despawn.
    fn remove_dead(&mut self) {
        let dead: Vec<(Entity, PhysicsBody)> = self
            .world
            .query::<(&PhysicsBody, &Health)>()
            .iter()
            .filter(|(_, (_, health))| health.is_dead())
            .map(|(entity, (body, _))| (entity, *body))
            .collect();
        for (entity, body) in dead {
            self.physics.remove_body(body.rigid_body);
            self.commands.despawn(entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::AIState;
    use input::InputState;

    const DT: f32 = 1.0 / 60.0;

    fn still_sim() -> Simulation {
        let mut config = SimConfig::default();
        config.gravity = 0.0;
        config.player.spawn_speed = 0.0;
        config.enemy.spawn_speed = 0.0;
        config.ai.turn_speed = 0.0;
        config.ai.max_speed = 0.0;
        Simulation::new(config)
    }

    fn player_at_origin(sim: &mut Simulation) -> Entity {
        sim.spawn_player(Transform::facing(Vec3::new(0.0, 1000.0, 0.0), Vec3::NEG_Z))
            .unwrap()
    }

    #[test]
    fn missing_rack_raises_the_out_of_missiles_notice() {
        let mut sim = still_sim();
        let player = player_at_origin(&mut sim);
        sim.world.remove_one::<MissileRack>(player).unwrap();

        let mut events = Vec::new();
        assert_eq!(sim.launch_missile(player, &mut events), Err(FireError::OutOfAmmo));
        assert!(events.contains(&SimEvent::Notice {
            entity: player,
            message: "OUT OF MISSILES"
        }));
    }

    #[test]
    fn launch_without_a_muzzle_keeps_the_missile() {
        let mut sim = still_sim();
        let player = player_at_origin(&mut sim);
        let enemy = sim
            .spawn_enemy(Transform::facing(Vec3::new(0.0, 1000.0, -300.0), Vec3::NEG_Z))
            .unwrap();
        sim.tick(&InputState::new(), DT);
        assert_eq!(sim.readout(player).unwrap().locked_target, Some(enemy));

        sim.world.remove_one::<Gun>(player).unwrap();
        let mut events = Vec::new();
        assert_eq!(sim.launch_missile(player, &mut events), Err(FireError::NoLock));
        assert_eq!(sim.readout(player).unwrap().missiles, 10);
        assert!(events.is_empty());
    }

    #[test]
    fn evading_shooter_drops_its_queued_shot() {
        let mut sim = still_sim();
        let player = player_at_origin(&mut sim);
        let enemy = sim
            .spawn_enemy(Transform::facing(Vec3::new(0.0, 1000.0, -200.0), Vec3::Z))
            .unwrap();
        sim.world.get::<&mut Gun>(enemy).unwrap().start_fire();
        sim.world.get::<&mut AiPilot>(enemy).unwrap().state = AIState::Evading { remaining: 2.0 };

        let mut events = Vec::new();
        sim.fire_guns(DT, &mut events);
        assert!(!events
            .iter()
            .any(|e| matches!(e, SimEvent::GunFired { shooter, .. } if *shooter == enemy)));
        assert_eq!(sim.world.get::<&Health>(player).unwrap().current(), 100.0);
    }
}
