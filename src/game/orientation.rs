//! Turns the character body to face its direction of travel.

use nalgebra::{UnitQuaternion, Vector3};

use super::body::CharacterBody;
use super::constants::orientation as consts;
use super::motion::MotionVector;

/// How the per-tick slerp factor is derived.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OrientationBlend {
    /// Same factor every tick. Turn speed scales with tick rate.
    #[default]
    ConstantFactor,
    /// Factor rescaled by elapsed time so the turn feels the same as
    /// `ConstantFactor` at `reference_hz`, whatever the tick rate.
    TimeNormalized { reference_hz: f32 },
}

impl OrientationBlend {
    pub fn factor(&self, blend: f32, dt: f32) -> f32 {
        match *self {
            OrientationBlend::ConstantFactor => blend,
            OrientationBlend::TimeNormalized { reference_hz } => {
                let steps = (dt * reference_hz).max(0.0);
                1.0 - (1.0 - blend.clamp(0.0, 1.0)).powf(steps)
            }
        }
    }

    pub fn time_normalized() -> Self {
        OrientationBlend::TimeNormalized {
            reference_hz: consts::REFERENCE_HZ,
        }
    }
}

/// |q1 . q2| at or above which two orientations count as the same.
pub const ALIGNED_DOT: f32 = 1.0 - 1.0e-6;

/// Yaw that faces along the horizontal motion.
pub fn target_yaw(motion: MotionVector) -> f32 {
    motion.x.atan2(motion.z)
}

pub fn facing(yaw: f32) -> UnitQuaternion<f32> {
    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw)
}

/// Slerps `current` toward `target`. Orientations that already coincide
/// (within [`ALIGNED_DOT`]) resolve to `target` itself.
pub fn blend_toward(
    current: &UnitQuaternion<f32>,
    target: &UnitQuaternion<f32>,
    factor: f32,
) -> UnitQuaternion<f32> {
    if current.coords.dot(&target.coords).abs() >= ALIGNED_DOT {
        return *target;
    }
    current
        .try_slerp(target, factor.clamp(0.0, 1.0), 1.0e-6)
        .unwrap_or(*target)
}

/// Rotates the body toward the direction of travel. Does nothing while the
/// character stands still. Returns whether the orientation was written.
pub fn update_orientation<B: CharacterBody + ?Sized>(
    body: &mut B,
    motion: MotionVector,
    factor: f32,
) -> bool {
    if !motion.is_moving() {
        return false;
    }
    let target = facing(target_yaw(motion));
    let next = blend_toward(&body.orientation(), &target, factor);
    body.set_orientation(next);
    true
}

/// Signed yaw of an orientation, in radians.
pub fn yaw_of(orientation: &UnitQuaternion<f32>) -> f32 {
    let forward = orientation * Vector3::z();
    forward.x.atan2(forward.z)
}
