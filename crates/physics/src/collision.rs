//! Collision groups and filtering.

use rapier3d::prelude::*;

/// Collision groups for different entity types.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroup {
    /// Static environment (ground plane, terrain)
    Environment = 1 << 0,
    /// Player-side aircraft
    PlayerAircraft = 1 << 1,
    /// Enemy aircraft
    EnemyAircraft = 1 << 2,
}

impl CollisionGroup {
    /// Environment collides with everything.
    pub fn environment() -> InteractionGroups {
        InteractionGroups::new(Group::from_bits_retain(Self::Environment as u32), Group::ALL)
    }

    /// Aircraft collide with the environment and with every other aircraft.
    pub fn player_aircraft() -> InteractionGroups {
        InteractionGroups::new(
            Group::from_bits_retain(Self::PlayerAircraft as u32),
            Self::aircraft_filter(),
        )
    }

    pub fn enemy_aircraft() -> InteractionGroups {
        InteractionGroups::new(
            Group::from_bits_retain(Self::EnemyAircraft as u32),
            Self::aircraft_filter(),
        )
    }

    fn aircraft_filter() -> Group {
        Group::from_bits_retain(
            Self::Environment as u32 | Self::PlayerAircraft as u32 | Self::EnemyAircraft as u32,
        )
    }
}

/// Component linking an ECS entity to its physics handles.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsBody {
    pub rigid_body: RigidBodyHandle,
    pub collider: ColliderHandle,
}

impl PhysicsBody {
    pub fn new(rigid_body: RigidBodyHandle, collider: ColliderHandle) -> Self {
        Self {
            rigid_body,
            collider,
        }
    }
}
