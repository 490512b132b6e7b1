//! Physics binding using Rapier3D for the dogfight simulation.
//!
//! Owns rigid-body integration, collision and ray queries. The simulation
//! core only submits forces and reads back [`engine_core::RigidBodyState`].

pub mod collision;
pub mod contact;
pub mod physics_world;
pub mod raycast;

pub use collision::*;
pub use contact::*;
pub use physics_world::*;
pub use raycast::*;

// Re-export Rapier for downstream crates
pub use rapier3d;

// Re-export common Rapier types
pub use rapier3d::prelude::{ColliderHandle, RigidBodyHandle};
