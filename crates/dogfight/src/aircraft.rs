//! Aircraft templates and the per-aircraft components that make up an
//! aircraft entity in the registry.

use engine_core::{ControlInputs, Entity, Health, RigidBodyState, Vec3};
use input::ThrottleModel;
use physics::AirframeBody;
use serde::{Deserialize, Serialize};

use crate::aero::{AeroConfig, AeroEnvironment, AeroOutput};
use crate::missile::MissileConfig;
use crate::weapons::{GunConfig, MissileRack};

/// Rigid-body parameters of an airframe, in config form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirframeConfig {
    pub half_extents: Vec3,
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for AirframeConfig {
    fn default() -> Self {
        Self {
            half_extents: Vec3::new(5.0, 1.5, 9.0),
            mass: 15_000.0,
            // Drag comes from the aero model.
            linear_damping: 0.0,
            angular_damping: 2.0,
        }
    }
}

impl AirframeConfig {
    pub fn to_body(&self) -> AirframeBody {
        AirframeBody {
            half_extents: self.half_extents,
            mass: self.mass,
            linear_damping: self.linear_damping,
            angular_damping: self.angular_damping,
        }
    }
}

/// Everything needed to spawn one kind of aircraft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AircraftConfig {
    pub aero: AeroConfig,
    pub airframe: AirframeConfig,
    pub max_health: f32,
    pub gun: GunConfig,
    pub missile_capacity: u32,
    pub missile: MissileConfig,
    pub throttle: ThrottleModel,
    /// Initial forward speed in m/s when spawned in the air.
    pub spawn_speed: f32,
}

impl Default for AircraftConfig {
    fn default() -> Self {
        Self {
            aero: AeroConfig::default(),
            airframe: AirframeConfig::default(),
            max_health: 100.0,
            gun: GunConfig::default(),
            missile_capacity: 10,
            missile: MissileConfig::default(),
            throttle: ThrottleModel::default(),
            spawn_speed: 150.0,
        }
    }
}

impl AircraftConfig {
    /// Default enemy fighter: slower gun, shorter range, no missiles.
    pub fn enemy() -> Self {
        Self {
            gun: GunConfig {
                fire_interval: 0.5,
                range: 300.0,
                ..GunConfig::default()
            },
            missile_capacity: 0,
            spawn_speed: 120.0,
            ..Self::default()
        }
    }

    pub fn missile_rack(&self) -> MissileRack {
        MissileRack::new(self.missile_capacity, self.missile)
    }

    pub fn health(&self) -> Health {
        Health::new(self.max_health)
    }
}

/// Collider user data that resolves back to `entity`.
pub fn user_data_for(entity: Entity) -> u128 {
    u128::from(entity.to_bits().get())
}

/// Owning entity of a collider, if its user data names one (the ground is 0).
pub fn entity_from_user_data(data: u128) -> Option<Entity> {
    u64::try_from(data).ok().and_then(Entity::from_bits)
}

/// Immutable per-aircraft tuning, set at spawn.
#[derive(Debug, Clone, Copy)]
pub struct Aircraft {
    pub aero: AeroConfig,
}

/// Per-tick flight snapshot: the body state read from physics, the sampled
/// environment and the last computed aero output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlightState {
    pub body: RigidBodyState,
    pub env: AeroEnvironment,
    pub last_output: AeroOutput,
}

/// HUD read-outs for one aircraft.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightReadout {
    pub airspeed_kmh: f32,
    pub altitude_m: f32,
    pub throttle_percent: f32,
    pub health_percent: f32,
    pub missiles: u32,
    pub locked_target: Option<Entity>,
    pub flaps_deployed: bool,
    pub on_ground: bool,
    pub stalled: bool,
}

impl FlightReadout {
    pub fn new(
        flight: &FlightState,
        controls: &ControlInputs,
        health: &Health,
        missiles: u32,
        locked_target: Option<Entity>,
    ) -> Self {
        Self {
            airspeed_kmh: flight.body.airspeed() * 3.6,
            altitude_m: flight.env.altitude,
            throttle_percent: controls.current_throttle * 100.0,
            health_percent: health.percentage() * 100.0,
            missiles,
            locked_target,
            flaps_deployed: controls.flaps_deployed,
            on_ground: flight.env.on_ground,
            stalled: flight.last_output.stalled,
        }
    }
}
