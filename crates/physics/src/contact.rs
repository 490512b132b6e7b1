//! Contact impulse collection from the physics step.

use rapier3d::crossbeam::channel::{unbounded, Receiver};
use rapier3d::prelude::*;

/// Impulse exchanged between two colliders during one physics step.
#[derive(Debug, Clone, Copy)]
pub struct ContactImpulse {
    pub collider1: ColliderHandle,
    pub collider2: ColliderHandle,
    /// Total contact force magnitude times the step length.
    pub impulse: f32,
}

/// Rapier's channel collector plus the receiving end of its force events.
pub struct ContactEvents {
    collector: ChannelEventCollector,
    forces: Receiver<ContactForceEvent>,
}

impl Default for ContactEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactEvents {
    pub fn new() -> Self {
        // Only contact-force events are enabled on colliders, so the
        // collision channel is never written to.
        let (collision_send, _) = unbounded();
        let (force_send, forces) = unbounded();
        Self {
            collector: ChannelEventCollector::new(collision_send, force_send),
            forces,
        }
    }

    pub fn handler(&self) -> &ChannelEventCollector {
        &self.collector
    }

    /// Take every force event since the last drain as impulses over `dt`.
    pub fn drain(&self, dt: f32) -> Vec<ContactImpulse> {
        self.forces
            .try_iter()
            .map(|event| ContactImpulse {
                collider1: event.collider1,
                collider2: event.collider2,
                impulse: event.total_force_magnitude * dt,
            })
            .collect()
    }
}
