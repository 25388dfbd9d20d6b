use rapier3d::dynamics::RigidBodyHandle;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

use crate::config::ControllerConfig;

use super::super::locomotion::{ClipTable, LocomotionStateMachine};
use super::super::motion::JumpGate;
use super::super::orientation::OrientationBlend;

/// Per-tick tuning of the controller, resolved from config once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerTuning {
    pub move_speed: f32,
    pub jump_speed: f32,
    pub velocity_precision: u32,
    pub orientation_blend: f32,
    pub blend_mode: OrientationBlend,
    pub azimuth_drift_divisor: f32,
}

impl ControllerTuning {
    pub fn from_config(config: &ControllerConfig) -> Self {
        Self {
            move_speed: config.movement.move_speed,
            jump_speed: config.movement.jump_speed,
            velocity_precision: config.movement.velocity_precision,
            orientation_blend: config.orientation.blend,
            blend_mode: config.orientation.blend_mode(),
            azimuth_drift_divisor: config.camera.azimuth_drift_divisor,
        }
    }
}

impl Default for ControllerTuning {
    fn default() -> Self {
        Self::from_config(&ControllerConfig::default())
    }
}

/// A collaborator the tick needed but that is not available yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotReady {
    /// No physics body bound, or the bound handle no longer resolves.
    Body,
    /// No orbit camera mounted.
    Camera,
}

impl fmt::Display for NotReady {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotReady::Body => write!(f, "character body not bound"),
            NotReady::Camera => write!(f, "orbit camera not mounted"),
        }
    }
}

/// Controller-side state that survives between ticks.
pub struct CharacterController {
    pub tuning: ControllerTuning,
    pub locomotion: LocomotionStateMachine,
    pub jump_gate: JumpGate,
    body: Option<RigidBodyHandle>,
    warned: HashSet<NotReady>,
}

impl CharacterController {
    pub fn new(config: &ControllerConfig) -> Self {
        let clips = config.animation.clips.clone();
        let table = match <[String; 3]>::try_from(clips) {
            Ok(names) => ClipTable::new(names),
            Err(_) => ClipTable::default(),
        };
        Self {
            tuning: ControllerTuning::from_config(config),
            locomotion: LocomotionStateMachine::new(table, config.animation.crossfade),
            jump_gate: JumpGate::new(config.movement.jump_trigger),
            body: None,
            warned: HashSet::new(),
        }
    }

    pub fn bind_body(&mut self, handle: RigidBodyHandle) {
        self.body = Some(handle);
        self.warned.remove(&NotReady::Body);
    }

    pub fn unbind_body(&mut self) -> Option<RigidBodyHandle> {
        self.body.take()
    }

    pub fn body(&self) -> Option<RigidBodyHandle> {
        self.body
    }

    /// Logs a skipped stage: the first time at warn, afterwards at debug.
    pub fn note_not_ready(&mut self, tick: u64, reason: NotReady) {
        if self.warned.insert(reason) {
            warn!(tick, %reason, "skipping stage until ready");
        } else {
            debug!(tick, %reason, "stage skipped");
        }
    }

    pub fn note_ready(&mut self, reason: NotReady) {
        self.warned.remove(&reason);
    }
}
