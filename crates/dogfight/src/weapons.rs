//! Aircraft weapons: the repeating hitscan gun and the missile rack.

use engine_core::{Entity, Vec3};
use physics::{PhysicsWorld, RaycastHit, RigidBodyHandle};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::missile::MissileConfig;

/// Upper bound on shots resolved in a single tick, whatever the interval.
const MAX_SHOTS_PER_TICK: u32 = 16;

/// Gun tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GunConfig {
    /// Seconds between shots while the trigger is held.
    pub fire_interval: f32,
    pub range: f32,
    pub damage: f32,
    /// Muzzle position in aircraft-local space (forward is -Z).
    pub muzzle_offset: Vec3,
}

impl Default for GunConfig {
    fn default() -> Self {
        Self {
            fire_interval: 0.1,
            range: 500.0,
            damage: 10.0,
            muzzle_offset: Vec3::new(0.0, 0.0, -10.0),
        }
    }
}

/// Repeating hitscan gun.
///
/// The repeat timer only exists while firing; stopping cancels it so no
/// further shots are produced.
#[derive(Debug, Clone, Copy)]
pub struct Gun {
    pub config: GunConfig,
    cooldown: Option<f32>,
}

impl Gun {
    pub fn new(config: GunConfig) -> Self {
        Self {
            config,
            cooldown: None,
        }
    }

    /// Begin firing. The first shot goes out on the next [`Gun::tick`].
    /// Does nothing if already firing.
    pub fn start_fire(&mut self) {
        if self.cooldown.is_none() {
            self.cooldown = Some(0.0);
        }
    }

    /// Cancel the repeat timer.
    pub fn stop_fire(&mut self) {
        self.cooldown = None;
    }

    pub fn is_firing(&self) -> bool {
        self.cooldown.is_some()
    }

    /// Advance the repeat timer and return how many shots to resolve this tick.
    pub fn tick(&mut self, dt: f32) -> u32 {
        let Some(mut cooldown) = self.cooldown else {
            return 0;
        };
        let interval = self.config.fire_interval.max(1e-3);
        cooldown -= dt.max(0.0);
        let mut shots = 0;
        while cooldown <= 0.0 && shots < MAX_SHOTS_PER_TICK {
            shots += 1;
            cooldown += interval;
        }
        self.cooldown = Some(cooldown.max(0.0));
        shots
    }
}

/// Trace one gun shot from `origin` along `direction`, ignoring the shooter's body.
pub fn fire_hitscan(
    physics: &PhysicsWorld,
    origin: Vec3,
    direction: Vec3,
    range: f32,
    shooter: RigidBodyHandle,
) -> Option<RaycastHit> {
    physics.raycast(origin, direction, range, Some(shooter))
}

/// Why a missile launch was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FireError {
    #[error("out of missiles")]
    OutOfAmmo,
    #[error("no target locked")]
    NoLock,
}

/// Finite missile stock.
#[derive(Debug, Clone, Copy)]
pub struct MissileRack {
    ammo: u32,
    capacity: u32,
    pub missile: MissileConfig,
}

impl MissileRack {
    pub fn new(capacity: u32, missile: MissileConfig) -> Self {
        Self {
            ammo: capacity,
            capacity,
            missile,
        }
    }

    pub fn ammo(&self) -> u32 {
        self.ammo
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Validate a launch and consume one missile.
    ///
    /// Ammo is checked before the lock. `is_live` decides whether the locked
    /// entity still exists; a stale lock is treated as no lock. On success
    /// exactly one missile is consumed and the target is returned.
    pub fn try_launch(
        &mut self,
        lock: Option<Entity>,
        is_live: impl Fn(Entity) -> bool,
    ) -> Result<Entity, FireError> {
        if self.ammo == 0 {
            return Err(FireError::OutOfAmmo);
        }
        let target = lock.filter(|t| is_live(*t)).ok_or(FireError::NoLock)?;
        self.ammo -= 1;
        Ok(target)
    }
}
