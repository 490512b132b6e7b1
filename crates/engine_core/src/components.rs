//! Common ECS components used across the simulation.

use glam::{Quat, Vec3};

use crate::Transform;

/// Velocity component for kinematically moved entities (missiles).
#[derive(Debug, Clone, Copy, Default)]
pub struct Velocity {
    pub linear: Vec3,
    pub angular: Vec3,
}

impl Velocity {
    pub fn new(linear: Vec3) -> Self {
        Self {
            linear,
            angular: Vec3::ZERO,
        }
    }
}

/// Kinematic snapshot of a physics-owned body, read once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBodyState {
    pub position: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub mass: f32,
}

impl Default for RigidBodyState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass: 1.0,
        }
    }
}

impl RigidBodyState {
    /// Snapshot at rest with the given pose.
    pub fn at_rest(transform: Transform, mass: f32) -> Self {
        Self {
            position: transform.position,
            rotation: transform.rotation,
            mass,
            ..Default::default()
        }
    }

    pub fn transform(&self) -> Transform {
        Transform::from_position_rotation(self.position, self.rotation)
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Magnitude of linear velocity.
    pub fn airspeed(&self) -> f32 {
        self.linear_velocity.length()
    }
}

/// Result of applying damage to a [`Health`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Target was already dead, or the hit carried no damage; nothing changed.
    Ignored,
    /// Health dropped but the target is still alive.
    Damaged { new_health: f32 },
    /// This hit took the target to zero. Returned exactly once per entity.
    Killed,
}

/// Health component for damageable entities.
///
/// Health only goes down; once `dead` is set it stays set and further
/// damage is ignored.
#[derive(Debug, Clone, Copy)]
pub struct Health {
    current: f32,
    max: f32,
    dead: bool,
}

impl Health {
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self {
            current: max,
            max,
            dead: max <= 0.0,
        }
    }

    pub fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        // Zero, negative and NaN amounts never heal.
        if self.dead || !(amount > 0.0) {
            return DamageOutcome::Ignored;
        }
        self.current = (self.current - amount).max(0.0);
        if self.current <= 0.0 {
            self.dead = true;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Damaged {
                new_health: self.current,
            }
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn percentage(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

/// Tag component for the player-controlled aircraft.
#[derive(Debug, Clone, Copy, Default)]
pub struct Player;

/// Side an entity fights for. Aircraft only target the opposing side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Faction {
    Player,
    Enemy,
}

impl Faction {
    pub fn is_hostile_to(self, other: Faction) -> bool {
        self != other
    }
}

/// AI behaviour state for enemy aircraft.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum AIState {
    /// Pursue the target directly.
    #[default]
    Seeking,
    /// Orbit the target at an offset along our own right axis.
    Circling,
    /// Forced evasive turn after taking damage.
    Evading { remaining: f32 },
}

impl AIState {
    pub fn is_evading(&self) -> bool {
        matches!(self, AIState::Evading { .. })
    }
}

/// Pilot inputs consumed by the flight model.
///
/// Throttle values are kept in [0, 1] and control axes in [-1, 1] by the setters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlInputs {
    pub throttle_target: f32,
    pub current_throttle: f32,
    pub pitch: f32,
    pub roll: f32,
    pub yaw: f32,
    pub ground_steer: f32,
    pub flaps_deployed: bool,
    pub firing: bool,
}

impl ControlInputs {
    pub fn set_throttle_target(&mut self, value: f32) {
        self.throttle_target = clamp_unit(value);
    }

    pub fn set_current_throttle(&mut self, value: f32) {
        self.current_throttle = clamp_unit(value);
    }

    /// Set both throttle values at once (AI and direct-throttle control).
    pub fn set_throttle(&mut self, value: f32) {
        let v = clamp_unit(value);
        self.throttle_target = v;
        self.current_throttle = v;
    }

    pub fn set_axes(&mut self, pitch: f32, roll: f32, yaw: f32, ground_steer: f32) {
        self.pitch = clamp_axis(pitch);
        self.roll = clamp_axis(roll);
        self.yaw = clamp_axis(yaw);
        self.ground_steer = clamp_axis(ground_steer);
    }

    pub fn clear_axes(&mut self) {
        self.set_axes(0.0, 0.0, 0.0, 0.0);
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn clamp_axis(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}

/// Lifetime component for temporary entities (missiles).
#[derive(Debug, Clone, Copy)]
pub struct Lifetime {
    pub remaining: f32,
}

impl Lifetime {
    pub fn new(seconds: f32) -> Self {
        Self { remaining: seconds }
    }

    /// Count down; returns true once expired.
    pub fn update(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }
}

/// A single hit's damage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Damage {
    pub amount: f32,
    pub damage_type: DamageType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DamageType {
    #[default]
    Gun,
    Missile,
    Impact,
}

impl Damage {
    pub fn gun(amount: f32) -> Self {
        Self {
            amount,
            damage_type: DamageType::Gun,
        }
    }

    pub fn missile(amount: f32) -> Self {
        Self {
            amount,
            damage_type: DamageType::Missile,
        }
    }

    pub fn impact(amount: f32) -> Self {
        Self {
            amount,
            damage_type: DamageType::Impact,
        }
    }
}
