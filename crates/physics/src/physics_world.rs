//! Physics world management with Rapier3D.

use crate::collision::CollisionGroup;
use crate::contact::{ContactEvents, ContactImpulse};
use engine_core::{RigidBodyState, Transform, Vec3};
use glam::Quat;
use rapier3d::na::{Isometry3, Quaternion, Translation3, UnitQuaternion};
use rapier3d::prelude::*;

/// Shape and damping of a simulated airframe.
#[derive(Debug, Clone, Copy)]
pub struct AirframeBody {
    pub half_extents: Vec3,
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for AirframeBody {
    fn default() -> Self {
        Self {
            half_extents: Vec3::new(5.0, 1.5, 9.0),
            mass: 15_000.0,
            linear_damping: 0.5,
            angular_damping: 2.0,
        }
    }
}

/// Main physics world containing all simulation state.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub gravity: Vector<Real>,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,
    contacts: ContactEvents,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Create a new physics world with default gravity.
    pub fn new() -> Self {
        Self::with_gravity(-9.81)
    }

    /// Create a physics world with gravity `g` along world Y.
    pub fn with_gravity(g: f32) -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: vector![0.0, g, 0.0],
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            contacts: ContactEvents::new(),
        }
    }

    /// Step the physics simulation by `dt` seconds and return the contact
    /// impulses recorded during the step.
    pub fn step(&mut self, dt: f32) -> Vec<ContactImpulse> {
        if !(dt > 0.0 && dt.is_finite()) {
            log::debug!("Skipping physics step with dt {}", dt);
            return Vec::new();
        }
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            self.contacts.handler(),
        );
        self.contacts.drain(dt)
    }

    /// Update query pipeline for raycasting. Needed after spawning bodies
    /// and before the first step.
    pub fn update_query_pipeline(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Add a dynamic aircraft body with a cuboid collider.
    ///
    /// `user_data` is stored on the collider so ray and contact hits can be
    /// resolved back to the owning entity.
    pub fn add_aircraft_body(
        &mut self,
        transform: Transform,
        initial_velocity: Vec3,
        airframe: &AirframeBody,
        groups: InteractionGroups,
        user_data: u128,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let rigid_body = RigidBodyBuilder::dynamic()
            .position(to_isometry(transform))
            .linvel(to_vector(initial_velocity))
            .linear_damping(airframe.linear_damping)
            .angular_damping(airframe.angular_damping)
            .ccd_enabled(true)
            .build();
        let body_handle = self.rigid_body_set.insert(rigid_body);

        let h = airframe.half_extents;
        let collider = ColliderBuilder::cuboid(h.x, h.y, h.z)
            .mass(airframe.mass)
            .collision_groups(groups)
            .active_events(ActiveEvents::CONTACT_FORCE_EVENTS)
            .contact_force_event_threshold(0.0)
            .user_data(user_data)
            .build();
        let collider_handle =
            self.collider_set
                .insert_with_parent(collider, body_handle, &mut self.rigid_body_set);
        (body_handle, collider_handle)
    }

    /// Add a ground plane collider (flat Y=0 half-space).
    pub fn add_ground_plane(&mut self) -> ColliderHandle {
        let collider = ColliderBuilder::halfspace(Vector::y_axis())
            .collision_groups(CollisionGroup::environment())
            .build();
        self.collider_set.insert(collider)
    }

    /// Read the kinematic state of a rigid body.
    pub fn body_state(&self, handle: RigidBodyHandle) -> Option<RigidBodyState> {
        self.rigid_body_set.get(handle).map(|body| {
            let pos = body.translation();
            let rot = body.rotation();
            let linvel = body.linvel();
            let angvel = body.angvel();
            RigidBodyState {
                position: Vec3::new(pos.x, pos.y, pos.z),
                rotation: Quat::from_xyzw(rot.i, rot.j, rot.k, rot.w),
                linear_velocity: Vec3::new(linvel.x, linvel.y, linvel.z),
                angular_velocity: Vec3::new(angvel.x, angvel.y, angvel.z),
                mass: body.mass(),
            }
        })
    }

    /// Replace the user force on a body for this step and apply an angular
    /// acceleration as a velocity change (independent of inertia).
    pub fn apply_forces(
        &mut self,
        handle: RigidBodyHandle,
        force: Vec3,
        angular_acceleration: Vec3,
        dt: f32,
    ) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.reset_forces(false);
            body.add_force(to_vector(force), true);
            if angular_acceleration != Vec3::ZERO {
                let angvel = *body.angvel() + to_vector(angular_acceleration * dt);
                body.set_angvel(angvel, true);
            }
        }
    }

    /// Override a body's orientation and cancel its spin (kinematic steering).
    pub fn set_heading(&mut self, handle: RigidBodyHandle, rotation: Quat) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_rotation(to_rotation(rotation), true);
            body.set_angvel(vector![0.0, 0.0, 0.0], true);
        }
    }

    /// Stop simulating a body: it no longer moves, collides or shows up in queries.
    pub fn disable_body(&mut self, handle: RigidBodyHandle) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_enabled(false);
        }
    }

    /// User data stored on a collider, if it still exists.
    pub fn collider_user_data(&self, handle: ColliderHandle) -> Option<u128> {
        self.collider_set.get(handle).map(|c| c.user_data)
    }

    /// Remove a rigid body and its colliders.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }
}

fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

fn to_rotation(q: Quat) -> UnitQuaternion<Real> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

fn to_isometry(transform: Transform) -> Isometry3<Real> {
    let p = transform.position;
    Isometry3::from_parts(Translation3::new(p.x, p.y, p.z), to_rotation(transform.rotation))
}
