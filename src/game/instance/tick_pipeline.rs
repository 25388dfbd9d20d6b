use nalgebra::UnitQuaternion;

use super::super::camera::update_camera;
use super::super::motion::{apply_velocity, resolve, yaw_rotation};
use super::super::orientation::{update_orientation, yaw_of};
use super::character_controller::NotReady;
use super::{GameInstance, TickReport};
use crate::game::body::CharacterBody;

/// Executes the controller phases for one tick, in fixed order:
/// input -> motion -> velocity write -> locomotion -> physics step ->
/// orientation -> camera -> animation.
///
/// The physics step runs inside the tick, so orientation and camera read the
/// position committed this tick.
pub(super) fn run_tick_phases(instance: &mut GameInstance, dt: f32) -> TickReport {
    let tick = instance.tick;
    let mut skipped = Vec::new();

    // Input snapshot.
    let input = instance.input.snapshot();

    // Motion resolution in the camera's yaw frame.
    let camera_yaw = instance
        .camera
        .as_ref()
        .map(|camera| yaw_rotation(camera.yaw()))
        .unwrap_or_else(UnitQuaternion::identity);
    let tuning = instance.controller.tuning;
    let motion = resolve(
        &input,
        &camera_yaw,
        tuning.move_speed,
        tuning.velocity_precision,
    );
    let jump = instance.controller.jump_gate.fire(input.jump);

    // Velocity write.
    let handle = instance.controller.body();
    let velocity = handle
        .and_then(|h| instance.physics.body_mut(h))
        .map(|body| apply_velocity(body, motion, jump, tuning.jump_speed));
    if velocity.is_none() {
        instance.controller.note_not_ready(tick, NotReady::Body);
        skipped.push(NotReady::Body);
    } else {
        instance.controller.note_ready(NotReady::Body);
    }

    // Locomotion transition. Reads the held key, so under the edge trigger
    // a held jump keeps Run after the single impulse.
    let transition = instance
        .controller
        .locomotion
        .update(motion, input.jump, &mut instance.animator);

    // Physics step.
    instance.physics.step(dt);

    // Orientation.
    let factor = tuning.blend_mode.factor(tuning.orientation_blend, dt);
    let mut position = None;
    let mut yaw = None;
    if let Some(body) = handle.and_then(|h| instance.physics.body_mut(h)) {
        update_orientation(body, motion, factor);
        // `RigidBody::position` is the full isometry; read the translation.
        position = Some(CharacterBody::position(body));
        yaw = Some(yaw_of(&CharacterBody::orientation(body)));
    }

    // Camera rig.
    let mut camera_state = None;
    match (instance.camera.as_mut(), position) {
        (Some(camera), Some(player)) => {
            camera.update_damping();
            camera_state = Some(update_camera(
                camera,
                player,
                motion.x,
                dt,
                tuning.azimuth_drift_divisor,
            ));
            instance.controller.note_ready(NotReady::Camera);
        }
        (None, _) => {
            instance.controller.note_not_ready(tick, NotReady::Camera);
            skipped.push(NotReady::Camera);
        }
        // Nothing to follow; already reported as a missing body.
        (Some(_), None) => {}
    }

    // Advance clip blending.
    instance.animator.tick(dt);

    instance.tick += 1;

    TickReport {
        tick,
        input,
        motion,
        jump,
        velocity: velocity.map(|v| [v.x, v.y, v.z]),
        state: instance.controller.locomotion.current(),
        transition,
        position: position.map(|p| [p.x, p.y, p.z]),
        yaw,
        camera: camera_state,
        skipped,
    }
}
