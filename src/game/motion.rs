//! Motion resolution: input snapshot + camera yaw -> horizontal velocity.
//!
//! Also owns the jump decision and the velocity write into the body. The
//! vertical velocity of the body is never computed here; it is read back from
//! the simulation and passed through untouched unless a jump fires.

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use super::body::CharacterBody;
use super::input::InputSnapshot;

/// Intended horizontal velocity for one tick. `y` is always zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionVector {
    pub x: f32,
    pub z: f32,
}

impl MotionVector {
    pub const ZERO: MotionVector = MotionVector { x: 0.0, z: 0.0 };

    pub fn is_moving(&self) -> bool {
        self.x != 0.0 || self.z != 0.0
    }

    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.z * self.z).sqrt()
    }
}

/// Rounds half away from zero to `precision` decimal digits.
/// Negative zero comes back as positive zero.
pub fn round_to(value: f32, precision: u32) -> f32 {
    let scale = 10f32.powi(precision as i32);
    let rounded = (value * scale).round() / scale;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Yaw-only rotation for an orbit camera sitting at `azimuth` around its target.
/// "Forward" (-Z) then points from the camera toward the target.
pub fn yaw_rotation(azimuth: f32) -> UnitQuaternion<f32> {
    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), azimuth)
}

/// Strips pitch and roll from a camera orientation.
pub fn yaw_only(orientation: &UnitQuaternion<f32>) -> UnitQuaternion<f32> {
    let forward = orientation * Vector3::new(0.0, 0.0, -1.0);
    if forward.x.abs() < f32::EPSILON && forward.z.abs() < f32::EPSILON {
        // Looking straight up or down: fall back to the camera's up vector.
        let up = orientation * Vector3::y();
        let sign = if forward.y < 0.0 { 1.0 } else { -1.0 };
        return yaw_rotation((sign * -up.x).atan2(sign * -up.z));
    }
    yaw_rotation((-forward.x).atan2(-forward.z))
}

/// Turns held directions into a world-space horizontal velocity.
///
/// The raw intent is `(right - left, 0, backward - forward)`. It is normalized,
/// scaled by `speed`, rotated into camera space and rounded to `precision`
/// digits. Opposing keys cancel out to exactly zero.
pub fn resolve(
    input: &InputSnapshot,
    camera_yaw: &UnitQuaternion<f32>,
    speed: f32,
    precision: u32,
) -> MotionVector {
    let axis = |positive: bool, negative: bool| f32::from(positive as u8) - f32::from(negative as u8);
    let intent = Vector3::new(
        axis(input.right, input.left),
        0.0,
        axis(input.backward, input.forward),
    );

    let Some(direction) = intent.try_normalize(f32::EPSILON) else {
        return MotionVector::ZERO;
    };

    let world = camera_yaw * (direction * speed);
    MotionVector {
        x: round_to(world.x, precision),
        z: round_to(world.z, precision),
    }
}

/// How a held jump action turns into impulses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpTrigger {
    /// Fires on every tick the action is held.
    #[default]
    Level,
    /// Fires only on the tick the action goes from released to held.
    Edge,
}

/// Turns the jump action into a per-tick fire decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct JumpGate {
    trigger: JumpTrigger,
    was_held: bool,
}

impl JumpGate {
    pub fn new(trigger: JumpTrigger) -> Self {
        Self {
            trigger,
            was_held: false,
        }
    }

    pub fn fire(&mut self, held: bool) -> bool {
        let fired = match self.trigger {
            JumpTrigger::Level => held,
            JumpTrigger::Edge => held && !self.was_held,
        };
        self.was_held = held;
        fired
    }
}

/// Writes this tick's velocity into the body and returns what was written.
///
/// Without a jump the horizontal part comes from `horizontal` and the vertical
/// part is read back from the body just before the write. A jump replaces the
/// whole vector with `(0, jump_speed, 0)`.
pub fn apply_velocity<B: CharacterBody + ?Sized>(
    body: &mut B,
    horizontal: MotionVector,
    jump: bool,
    jump_speed: f32,
) -> Vector3<f32> {
    let velocity = if jump {
        Vector3::new(0.0, jump_speed, 0.0)
    } else {
        let vertical = body.linear_velocity().y;
        Vector3::new(horizontal.x, vertical, horizontal.z)
    };
    body.set_linear_velocity(velocity);
    velocity
}
