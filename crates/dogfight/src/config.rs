//! Simulation configuration (aircraft templates, AI, targeting, physics).
//! Loaded from config.ron at startup.

use input::ThrottleModel;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ai::AiConfig;
use crate::aero::AeroConfig;
use crate::aircraft::{AircraftConfig, AirframeConfig};
use crate::missile::MissileConfig;
use crate::weapons::GunConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("could not serialize config: {0}")]
    Serialize(#[from] ron::Error),
}

/// Crash damage from physics contacts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConfig {
    /// Velocity change (impulse / mass, m/s) above which a contact hurts.
    pub speed_threshold: f32,
    pub damage: f32,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            speed_threshold: 10.0,
            damage: 50.0,
        }
    }
}

/// Persistent simulation settings. Every field falls back to its default
/// when missing from the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub player: AircraftConfig,
    /// Fields left out of an override come from [`AircraftConfig::enemy`].
    #[serde(deserialize_with = "enemy_template")]
    pub enemy: AircraftConfig,
    pub ai: AiConfig,
    /// Minimum cosine between the aircraft's forward axis and the direction
    /// to a candidate for it to be lockable.
    pub lock_cone_cos: f32,
    /// How far below the aircraft the ground probe reaches.
    pub ground_probe_distance: f32,
    pub gravity: f32,
    pub impact: ImpactConfig,
    /// Fixed simulation rate in Hz.
    pub tick_rate: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            player: AircraftConfig::default(),
            enemy: AircraftConfig::enemy(),
            ai: AiConfig::default(),
            lock_cone_cos: 0.8,
            ground_probe_distance: 3.0,
            gravity: -9.81,
            impact: ImpactConfig::default(),
            tick_rate: 60.0,
        }
    }
}

impl SimConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&data)
    }

    pub fn from_ron(data: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(data)?)
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Save current config to `config.ron`. Logs on error.
    pub fn save(&self) {
        let path = config_path();
        match self.to_ron() {
            Ok(s) => {
                if let Err(e) = std::fs::write(&path, s) {
                    log::warn!("Could not write config to {:?}: {}", path, e);
                }
            }
            Err(e) => log::warn!("{}", e),
        }
    }
}

/// Mirror of [`AircraftConfig`] whose missing fields default to the enemy
/// template rather than the player one.
#[derive(Deserialize)]
#[serde(default = "EnemyFields::template")]
struct EnemyFields {
    aero: AeroConfig,
    airframe: AirframeConfig,
    max_health: f32,
    gun: GunConfig,
    missile_capacity: u32,
    missile: MissileConfig,
    throttle: ThrottleModel,
    spawn_speed: f32,
}

impl EnemyFields {
    fn template() -> Self {
        let c = AircraftConfig::enemy();
        Self {
            aero: c.aero,
            airframe: c.airframe,
            max_health: c.max_health,
            gun: c.gun,
            missile_capacity: c.missile_capacity,
            missile: c.missile,
            throttle: c.throttle,
            spawn_speed: c.spawn_speed,
        }
    }
}

impl From<EnemyFields> for AircraftConfig {
    fn from(f: EnemyFields) -> Self {
        Self {
            aero: f.aero,
            airframe: f.airframe,
            max_health: f.max_health,
            gun: f.gun,
            missile_capacity: f.missile_capacity,
            missile: f.missile,
            throttle: f.throttle,
            spawn_speed: f.spawn_speed,
        }
    }
}

fn enemy_template<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AircraftConfig, D::Error> {
    EnemyFields::deserialize(deserializer).map(AircraftConfig::from)
}

fn config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.ron")
}
