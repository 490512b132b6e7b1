//! Homing missiles.
//!
//! Missiles are not rigid bodies: they fly kinematically and sweep a ray
//! along each tick's motion to find what they hit.

use engine_core::{look_rotation, Damage, Entity, Lifetime, Transform, Vec3, Velocity, World};
use hecs::CommandBuffer;
use physics::{PhysicsBody, PhysicsWorld};
use serde::{Deserialize, Serialize};

use crate::aircraft::entity_from_user_data;
use crate::events::{EffectCue, SimEvent};
use crate::health::{apply_damage, is_alive};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissileConfig {
    pub damage: f32,
    /// Speed added along the launcher's forward axis at launch.
    pub launch_speed: f32,
    pub max_speed: f32,
    /// Acceleration toward the target while guided, m/s².
    pub homing_acceleration: f32,
    /// Seconds before an unexploded missile self-destructs.
    pub lifetime: f32,
}

impl Default for MissileConfig {
    fn default() -> Self {
        Self {
            damage: 100.0,
            launch_speed: 80.0,
            max_speed: 200.0,
            homing_acceleration: 150.0,
            lifetime: 10.0,
        }
    }
}

/// Missile in flight. `target` is a weak reference, re-checked every tick.
#[derive(Debug, Clone, Copy)]
pub struct Missile {
    pub target: Option<Entity>,
    pub launcher: Entity,
    pub config: MissileConfig,
}

/// Components for a freshly launched missile.
pub fn missile_bundle(
    config: MissileConfig,
    launcher: Entity,
    target: Entity,
    muzzle: Transform,
    carrier_velocity: Vec3,
) -> (Missile, Transform, Velocity, Lifetime) {
    let velocity = (carrier_velocity + muzzle.forward() * config.launch_speed)
        .clamp_length_max(config.max_speed);
    (
        Missile {
            target: Some(target),
            launcher,
            config,
        },
        muzzle,
        Velocity::new(velocity),
        Lifetime::new(config.lifetime),
    )
}

/// New velocity after one tick of homing toward `target_position`.
pub fn steer(velocity: Vec3, position: Vec3, target_position: Option<Vec3>, config: &MissileConfig, dt: f32) -> Vec3 {
    let mut velocity = velocity;
    if let Some(target) = target_position {
        let to_target = (target - position).normalize_or_zero();
        velocity += to_target * config.homing_acceleration * dt;
    }
    velocity.clamp_length_max(config.max_speed)
}

enum Outcome {
    Fly {
        transform: Transform,
        velocity: Vec3,
        target: Option<Entity>,
    },
    Detonate {
        hit: Option<Entity>,
        position: Vec3,
    },
    Expire,
}

/// Advance every missile by `dt`: guide, move, resolve hits and expiry.
///
/// Despawns are queued on `commands`.
pub fn update_missiles(
    world: &mut World,
    physics: &PhysicsWorld,
    dt: f32,
    events: &mut Vec<SimEvent>,
    commands: &mut CommandBuffer,
) {
    // Collect outcomes first, then apply, so damage can borrow the world mutably.
    let mut outcomes: Vec<(Entity, Missile, Outcome)> = Vec::new();
    {
        let mut query = world.query::<(&Missile, &Transform, &Velocity, &mut Lifetime)>();
        for (entity, (missile, transform, velocity, lifetime)) in query.iter() {
            let target = missile.target.filter(|t| is_alive(world, *t));
            if missile.target.is_some() && target.is_none() {
                log::debug!("Missile {:?} lost its target", entity);
            }
            let target_position = target
                .and_then(|t| world.get::<&Transform>(t).ok().map(|tr| tr.position));

            let velocity = steer(velocity.linear, transform.position, target_position, &missile.config, dt);
            let step = velocity * dt;
            let launcher_body = world
                .get::<&PhysicsBody>(missile.launcher)
                .ok()
                .map(|b| b.rigid_body);

            let outcome = if let Some(hit) =
                physics.raycast(transform.position, step, step.length(), launcher_body)
            {
                Outcome::Detonate {
                    hit: entity_from_user_data(hit.user_data),
                    position: hit.point,
                }
            } else if lifetime.update(dt) {
                Outcome::Expire
            } else {
                let position = transform.position + step;
                let rotation = if velocity.length_squared() > f32::EPSILON {
                    look_rotation(velocity, Vec3::Y)
                } else {
                    transform.rotation
                };
                Outcome::Fly {
                    transform: Transform::from_position_rotation(position, rotation),
                    velocity,
                    target,
                }
            };
            outcomes.push((entity, *missile, outcome));
        }
    }

    for (entity, missile, outcome) in outcomes {
        match outcome {
            Outcome::Fly {
                transform,
                velocity,
                target,
            } => {
                if let Ok((m, t, v)) = world.query_one_mut::<(&mut Missile, &mut Transform, &mut Velocity)>(entity) {
                    m.target = target;
                    *t = transform;
                    v.linear = velocity;
                }
            }
            Outcome::Detonate { hit, position } => {
                log::debug!("Missile {:?} detonated at {:?} (hit {:?})", entity, position, hit);
                if let Some(victim) = hit {
                    apply_damage(world, victim, Damage::missile(missile.config.damage), events);
                }
                events.push(SimEvent::MissileDetonated { hit, position });
                events.push(SimEvent::Effect(EffectCue::Explosion { position }));
                commands.despawn(entity);
            }
            Outcome::Expire => {
                events.push(SimEvent::MissileExpired { missile: entity });
                commands.despawn(entity);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_adds_to_carrier_velocity_and_caps() {
        let mut world = World::new();
        let a = world.spawn((0u8,));
        let b = world.spawn((0u8,));
        let config = MissileConfig::default();
        let muzzle = Transform::default();

        let (_, _, v, life) = missile_bundle(config, a, b, muzzle, Vec3::new(0.0, 0.0, -50.0));
        assert!((v.linear - Vec3::new(0.0, 0.0, -130.0)).length() < 1e-4);
        assert_eq!(life.remaining, config.lifetime);

        let (_, _, v, _) = missile_bundle(config, a, b, muzzle, Vec3::new(0.0, 0.0, -500.0));
        assert!((v.linear.length() - config.max_speed).abs() < 1e-3);
    }

    #[test]
    fn steering_turns_toward_target() {
        let config = MissileConfig::default();
        let v = steer(Vec3::new(0.0, 0.0, -100.0), Vec3::ZERO, Some(Vec3::new(100.0, 0.0, 0.0)), &config, 0.1);
        assert!((v.x - 15.0).abs() < 1e-4);
        assert_eq!(v.z, -100.0);
    }

    #[test]
    fn unguided_missile_keeps_heading() {
        let config = MissileConfig::default();
        let v = steer(Vec3::new(0.0, 0.0, -100.0), Vec3::ZERO, None, &config, 0.1);
        assert_eq!(v, Vec3::new(0.0, 0.0, -100.0));
    }

    #[test]
    fn missile_expires_and_is_queued_for_removal() {
        let mut world = World::new();
        let physics = PhysicsWorld::new();
        let launcher = world.spawn((0u8,));
        let target = world.spawn((0u8,));
        let config = MissileConfig {
            lifetime: 0.25,
            ..MissileConfig::default()
        };
        let missile = world.spawn(missile_bundle(config, launcher, target, Transform::default(), Vec3::ZERO));

        let mut events = Vec::new();
        let mut commands = CommandBuffer::new();
        for _ in 0..2 {
            update_missiles(&mut world, &physics, 0.1, &mut events, &mut commands);
        }
        assert!(events.is_empty());
        // Target never had health, so the missile flew unguided.
        assert!(world.get::<&Missile>(missile).unwrap().target.is_none());

        update_missiles(&mut world, &physics, 0.1, &mut events, &mut commands);
        assert_eq!(events, vec![SimEvent::MissileExpired { missile }]);
        commands.run_on(&mut world);
        assert!(!world.contains(missile));
    }
}
