pub mod character_controller;
mod tick_pipeline;

use nalgebra::Vector3;
use rapier3d::dynamics::RigidBodyHandle;
use serde::Serialize;
use tracing::info;

use crate::config::ControllerConfig;

use super::animation::AnimationMixer;
use super::camera::{OrbitCamera, OrbitSettings, Spherical};
use super::input::{InputSnapshot, InputState, KeyEvent};
use super::locomotion::{CharacterState, Transition};
use super::motion::MotionVector;
use super::physics::{CapsuleSpec, PhysicsWorld};

pub use character_controller::{CharacterController, ControllerTuning, NotReady};

/// What one tick did, for logging and tests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub input: InputSnapshot,
    pub motion: MotionVector,
    pub jump: bool,
    /// Velocity written into the body, if one was bound.
    pub velocity: Option<[f32; 3]>,
    pub state: CharacterState,
    pub transition: Option<Transition>,
    /// Body position after this tick's physics step.
    pub position: Option<[f32; 3]>,
    /// Body yaw after the orientation stage.
    pub yaw: Option<f32>,
    /// Spherical coordinates applied to the camera this tick.
    pub camera: Option<Spherical>,
    pub skipped: Vec<NotReady>,
}

/// A third-person character in a Rapier world:
/// - the controller turns input into body velocity and facing
/// - Rapier integrates gravity, contacts and the jump arc
/// - the orbit camera follows the body without resetting user zoom/tilt
pub struct GameInstance {
    pub physics: PhysicsWorld,
    pub controller: CharacterController,
    pub animator: AnimationMixer,
    pub camera: Option<OrbitCamera>,
    pub input: InputState,
    pub tick: u64,
    config: ControllerConfig,
}

impl GameInstance {
    /// Creates the world with its ground. The body is not bound and the
    /// camera is not mounted yet; ticks no-op those stages until they are.
    pub fn new(config: ControllerConfig) -> Self {
        let mut physics = PhysicsWorld::new(config.world.gravity);
        physics.add_ground(config.world.ground_half_extents, config.world.ground_top);

        let mut animator = AnimationMixer::new();
        for (index, name) in config.animation.clips.iter().enumerate() {
            animator.add_clip(name.clone(), config.animation.clip_length(index));
        }

        let controller = CharacterController::new(&config);
        controller.locomotion.start(&mut animator);

        Self {
            physics,
            controller,
            animator,
            camera: None,
            input: InputState::new(config.keys.clone()),
            tick: 0,
            config,
        }
    }

    /// Creates a ready-to-run instance: world, bound body and mounted camera.
    pub fn spawn(config: ControllerConfig) -> Self {
        let mut instance = Self::new(config);
        instance.spawn_character();
        instance.mount_camera();
        instance
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Adds the character body to the world and binds the controller to it.
    pub fn spawn_character(&mut self) -> RigidBodyHandle {
        let body = &self.config.body;
        let handle = self.physics.add_character(CapsuleSpec {
            spawn: body.spawn,
            half_height: body.capsule_half_height,
            radius: body.capsule_radius,
            offset: body.collider_offset,
        });
        self.controller.bind_body(handle);
        info!(spawn = ?body.spawn, "character spawned");
        handle
    }

    /// Removes the character body. Later ticks skip body stages.
    pub fn despawn_character(&mut self) -> bool {
        match self.controller.unbind_body() {
            Some(handle) => self.physics.remove_body(handle),
            None => false,
        }
    }

    /// Mounts the orbit camera at its configured position, looking at the body.
    pub fn mount_camera(&mut self) {
        let cam = &self.config.camera;
        let target = self
            .character_position()
            .unwrap_or_else(|| Vector3::from(self.config.body.spawn));
        let mut camera = OrbitCamera::new(
            Vector3::from(cam.initial_position),
            target,
            OrbitSettings {
                min_distance: cam.min_distance,
                max_distance: cam.max_distance,
                min_polar: cam.min_polar,
                max_polar: cam.max_polar,
                rotate_speed: cam.rotate_speed,
                zoom_speed: cam.zoom_speed,
                reverse_orbit: cam.reverse_orbit,
                enable_damping: cam.enable_damping,
                damping_factor: cam.damping_factor,
            },
        );
        camera.fov_degrees = cam.fov_degrees;
        self.mount_camera_with(camera);
    }

    pub fn mount_camera_with(&mut self, camera: OrbitCamera) {
        self.camera = Some(camera);
    }

    pub fn unmount_camera(&mut self) -> Option<OrbitCamera> {
        self.camera.take()
    }

    /// Queues a raw key event for the next tick.
    pub fn push_key(&self, event: KeyEvent) {
        // The receiver lives in `self.input`, so the channel cannot be disconnected.
        let _ = self.input.sender().send(event);
    }

    pub fn character_position(&self) -> Option<Vector3<f32>> {
        let handle = self.controller.body()?;
        self.physics.body(handle).map(|body| *body.translation())
    }

    pub fn state(&self) -> CharacterState {
        self.controller.locomotion.current()
    }

    /// Assigns a locomotion state directly, bypassing the policy.
    pub fn force_state(&mut self, state: CharacterState) -> Option<Transition> {
        self.controller.locomotion.force(state, &mut self.animator)
    }

    /// Runs one tick with the configured fixed timestep.
    pub fn tick(&mut self) -> TickReport {
        let dt = self.config.world.timestep();
        self.tick_with_dt(dt)
    }

    pub fn tick_with_dt(&mut self, dt: f32) -> TickReport {
        tick_pipeline::run_tick_phases(self, dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::camera::OrbitControls;

    fn press(instance: &GameInstance, key: &str) {
        instance.push_key(KeyEvent::Pressed(key.to_string()));
    }

    fn release(instance: &GameInstance, key: &str) {
        instance.push_key(KeyEvent::Released(key.to_string()));
    }

    /// Instance whose camera sits on +Z of the spawn point, so the movement
    /// frame starts out as the world frame.
    fn aligned_instance() -> GameInstance {
        let mut instance = GameInstance::new(ControllerConfig::default());
        instance.spawn_character();
        let spawn = Vector3::from(instance.config().body.spawn);
        instance.mount_camera_with(OrbitCamera::new(
            spawn + Vector3::new(0.0, 1.0, 5.0),
            spawn,
            OrbitSettings::default(),
        ));
        instance
    }

    #[test]
    fn test_unbound_instance_skips_body_and_camera() {
        let mut instance = GameInstance::new(ControllerConfig::default());
        press(&instance, "w");

        let report = instance.tick();

        assert_eq!(report.tick, 0);
        assert_eq!(report.skipped, vec![NotReady::Body, NotReady::Camera]);
        assert_eq!(report.velocity, None);
        assert_eq!(report.position, None);
        assert_eq!(report.camera, None);
        // The policy still runs without a body.
        assert_eq!(report.state, CharacterState::Run);
        assert_eq!(instance.tick, 1);
    }

    #[test]
    fn test_idle_tick_keeps_state_and_passes_vertical_velocity() {
        let mut instance = aligned_instance();
        let report = instance.tick();

        assert!(report.skipped.is_empty());
        assert_eq!(report.motion, MotionVector::ZERO);
        assert_eq!(report.velocity, Some([0.0, 0.0, 0.0]));
        assert_eq!(report.state, CharacterState::Idle);
        assert_eq!(report.transition, None);
        assert_eq!(instance.animator.playing(), vec!["idle"]);
    }

    #[test]
    fn test_forward_left_runs_diagonally() {
        let mut instance = aligned_instance();
        press(&instance, "w");
        press(&instance, "a");

        let report = instance.tick();

        assert_eq!(report.motion, MotionVector { x: -2.83, z: -2.83 });
        let [vx, _, vz] = report.velocity.unwrap();
        assert_eq!((vx, vz), (-2.83, -2.83));
        assert_eq!(
            report.transition,
            Some(Transition {
                from: CharacterState::Idle,
                to: CharacterState::Run,
            })
        );
    }

    #[test]
    fn test_jump_writes_pure_vertical_velocity() {
        let mut instance = aligned_instance();
        press(&instance, "w");
        press(&instance, "Space");

        let report = instance.tick();

        assert!(report.jump);
        assert_eq!(report.velocity, Some([0.0, 7.0, 0.0]));
        assert_eq!(report.state, CharacterState::Run);
    }

    #[test]
    fn test_transition_fires_once_while_held() {
        let mut instance = aligned_instance();
        press(&instance, "d");

        let transitions = (0..10)
            .filter_map(|_| instance.tick().transition)
            .count();
        assert_eq!(transitions, 1);

        release(&instance, "d");
        let report = instance.tick();
        assert_eq!(
            report.transition,
            Some(Transition {
                from: CharacterState::Run,
                to: CharacterState::Idle,
            })
        );
    }

    #[test]
    fn test_edge_trigger_keeps_run_while_jump_is_held() {
        let config = ControllerConfig::from_toml_str("[movement]\njump_trigger = \"edge\"\n").unwrap();
        let mut instance = GameInstance::new(config);
        instance.spawn_character();
        press(&instance, "Space");

        let reports: Vec<TickReport> = (0..5).map(|_| instance.tick()).collect();
        assert_eq!(reports.iter().filter(|r| r.jump).count(), 1);
        assert!(reports.iter().all(|r| r.state == CharacterState::Run));

        release(&instance, "Space");
        assert_eq!(instance.tick().state, CharacterState::Idle);
    }

    #[test]
    fn test_mounted_camera_eases_manual_orbit() {
        let mut instance = GameInstance::spawn(ControllerConfig::default());
        let before = instance.camera.as_ref().unwrap().azimuthal_angle();
        instance.camera.as_mut().unwrap().orbit(0.4, 0.0);

        instance.tick();
        let camera = instance.camera.as_ref().unwrap();
        let moved = before - camera.azimuthal_angle();
        // One tick applies a fifth of the 0.2 rad drag.
        assert!((moved - 0.04).abs() < 1.0e-3, "moved {}", moved);
        assert!(camera.pending_orbit().0 < 0.0);
    }

    #[test]
    fn test_camera_follows_without_changing_distance_or_polar() {
        let mut instance = GameInstance::spawn(ControllerConfig::default());
        let before = instance.camera.as_ref().unwrap().spherical();
        press(&instance, "w");

        for _ in 0..30 {
            instance.tick();
        }

        let camera = instance.camera.as_ref().unwrap();
        let after = camera.spherical();
        assert!((after.radius - before.radius).abs() < 1.0e-3);
        assert!((after.polar - before.polar).abs() < 1.0e-3);
        let player = instance.character_position().unwrap();
        assert!((camera.target() - player).norm() < 1.0e-5);
    }

    #[test]
    fn test_despawned_body_is_skipped() {
        let mut instance = aligned_instance();
        assert!(instance.despawn_character());
        assert!(!instance.despawn_character());

        let report = instance.tick();
        assert_eq!(report.skipped, vec![NotReady::Body]);
        assert_eq!(report.velocity, None);
    }

    #[test]
    fn test_forced_walk_plays_walk_clip() {
        let mut instance = aligned_instance();
        let transition = instance.force_state(CharacterState::Walk);
        assert_eq!(transition.map(|t| t.to), Some(CharacterState::Walk));
        instance.animator.tick(0.5);
        assert_eq!(instance.animator.playing(), vec!["walk"]);

        // The policy takes over again on the next tick.
        assert_eq!(instance.tick().state, CharacterState::Idle);
    }
}
