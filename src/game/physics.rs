use rapier3d::prelude::*;

use super::constants::physics as consts;

// Only the character and static level geometry live in this world.
const GROUP_STATIC: Group = Group::GROUP_1;
const GROUP_CHARACTER: Group = Group::GROUP_2;

/// Shape and placement of the character's collision volume.
#[derive(Debug, Clone, Copy)]
pub struct CapsuleSpec {
    pub spawn: [f32; 3],
    pub half_height: f32,
    pub radius: f32,
    /// Collider offset relative to the body origin.
    pub offset: [f32; 3],
}

impl Default for CapsuleSpec {
    fn default() -> Self {
        Self {
            spawn: consts::CHARACTER_SPAWN,
            half_height: consts::CAPSULE_HALF_HEIGHT,
            radius: consts::CAPSULE_RADIUS,
            offset: consts::COLLIDER_OFFSET,
        }
    }
}

/// Wrapper around the Rapier3D pipeline that simulates the character body
/// and the static ground it stands on.
pub struct PhysicsWorld {
    pub gravity: Vector<Real>,
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,
}

impl PhysicsWorld {
    /// Creates a new physics world pulling bodies down with `gravity_y`.
    pub fn new(gravity_y: f32) -> Self {
        Self {
            gravity: vector![0.0, -gravity_y, 0.0],
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Steps the physics simulation forward by dt seconds
    pub fn step(&mut self, dt: f32) {
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
            &(),
        );
    }

    /// Adds a fixed slab whose top face sits at `top_y`.
    /// Stands in for the level geometry loaded by the host.
    pub fn add_ground(&mut self, half_extents: [f32; 3], top_y: f32) -> RigidBodyHandle {
        let [hx, hy, hz] = half_extents;
        let body = RigidBodyBuilder::fixed()
            .translation(vector![0.0, top_y - hy, 0.0])
            .build();
        let handle = self.rigid_body_set.insert(body);

        let collider = ColliderBuilder::cuboid(hx, hy, hz)
            .collision_groups(InteractionGroups::new(GROUP_STATIC, Group::ALL))
            .build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);

        handle
    }

    /// Adds the character: a dynamic body with a capsule collider.
    /// Pitch and roll are locked; only yaw may change.
    pub fn add_character(&mut self, spec: CapsuleSpec) -> RigidBodyHandle {
        let [x, y, z] = spec.spawn;
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![x, y, z])
            .enabled_rotations(false, true, false)
            .ccd_enabled(true)
            .build();
        let handle = self.rigid_body_set.insert(body);

        let [ox, oy, oz] = spec.offset;
        let collider = ColliderBuilder::capsule_y(spec.half_height, spec.radius)
            .translation(vector![ox, oy, oz])
            .friction(0.0)
            .collision_groups(InteractionGroups::new(GROUP_CHARACTER, GROUP_STATIC))
            .build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);

        handle
    }

    /// Removes a body and its colliders. Returns false for an unknown handle.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> bool {
        self.rigid_body_set
            .remove(
                handle,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            )
            .is_some()
    }

    pub fn body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle)
    }

    pub fn body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.rigid_body_set.get_mut(handle)
    }

    /// Gets the position of a rigid body
    pub fn get_position(&self, handle: RigidBodyHandle) -> Option<[f32; 3]> {
        self.body(handle).map(|body| {
            let pos = body.translation();
            [pos.x, pos.y, pos.z]
        })
    }

    /// Gets the velocity of a rigid body
    pub fn get_velocity(&self, handle: RigidBodyHandle) -> Option<[f32; 3]> {
        self.body(handle).map(|body| {
            let vel = body.linvel();
            [vel.x, vel.y, vel.z]
        })
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(consts::DEFAULT_GRAVITY)
    }
}
