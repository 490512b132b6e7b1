//! Flight and combat simulation core for an arcade dogfighting game.
//!
//! Aircraft are hecs entities composed of plain components; behaviour lives
//! in free functions and the [`Simulation`] tick loop, which drives a
//! rapier physics world. Hosts feed an [`input::InputState`] and consume the
//! returned [`SimEvent`]s for HUD, audio and effects.

pub mod aero;
pub mod ai;
pub mod aircraft;
pub mod config;
pub mod events;
pub mod health;
pub mod missile;
pub mod simulation;
pub mod targeting;
pub mod weapons;

pub use aero::{compute_aero_forces, AeroConfig, AeroEnvironment, AeroOutput, LiftCurve};
pub use ai::{AiCommand, AiConfig, AiPilot};
pub use aircraft::{Aircraft, AircraftConfig, AirframeConfig, FlightReadout, FlightState};
pub use config::{ConfigError, ImpactConfig, SimConfig};
pub use events::{EffectCue, MatchOutcome, MatchTally, Pilot, SimEvent};
pub use missile::{Missile, MissileConfig};
pub use simulation::{Simulation, SpawnError};
pub use targeting::TargetLock;
pub use weapons::{FireError, Gun, GunConfig, MissileRack};
