//! Core engine types and utilities for the dogfight simulation.
//!
//! This crate provides the foundational types used across all simulation systems:
//! - Transform and spatial helpers
//! - Simulation clock (fixed-step accumulator)
//! - Common component types for the ECS registry

pub mod components;
pub mod math;
pub mod time;
pub mod transform;

pub use components::*;
pub use math::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat3, Quat, Vec3};
pub use hecs::{Entity, World};
