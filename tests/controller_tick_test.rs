//! End-to-end controller ticks against a real Rapier world.
//!
//! Run with: cargo test --test controller_tick_test -- --nocapture

use nalgebra::Vector3;
use strider::config::ControllerConfig;
use strider::game::camera::{OrbitCamera, OrbitControls, OrbitSettings};
use strider::game::orientation::yaw_of;
use strider::game::{CharacterBody, CharacterState, GameInstance, KeyEvent, NotReady, TickReport};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn press(instance: &GameInstance, key: &str) {
    instance.push_key(KeyEvent::Pressed(key.to_string()));
}

fn release(instance: &GameInstance, key: &str) {
    instance.push_key(KeyEvent::Released(key.to_string()));
}

fn run(instance: &mut GameInstance, ticks: usize) -> Vec<TickReport> {
    (0..ticks).map(|_| instance.tick()).collect()
}

/// Spawned instance left to land on the ground before any input.
fn landed(config: ControllerConfig) -> GameInstance {
    let mut instance = GameInstance::spawn(config);
    run(&mut instance, 90);
    instance
}

fn horizontal(v: Vector3<f32>) -> Vector3<f32> {
    Vector3::new(v.x, 0.0, v.z)
}

// ---------------------------------------------------------------------------
// Idle
// ---------------------------------------------------------------------------

#[test]
fn test_character_lands_and_idles() {
    let mut instance = GameInstance::spawn(ControllerConfig::default());
    let reports = run(&mut instance, 90);

    assert!(reports.iter().all(|r| r.state == CharacterState::Idle));
    assert!(reports.iter().all(|r| r.transition.is_none()));
    let y = instance.character_position().unwrap().y;
    assert!((y - 1.0).abs() < 0.05, "resting y {}", y);
    assert_eq!(instance.animator.playing(), vec!["idle"]);
}

// ---------------------------------------------------------------------------
// Running
// ---------------------------------------------------------------------------

#[test]
fn test_forward_runs_away_from_camera_at_move_speed() {
    let mut instance = landed(ControllerConfig::default());
    let start = instance.character_position().unwrap();
    let camera_side = horizontal(instance.camera.as_ref().unwrap().position() - start);

    press(&instance, "ArrowUp");
    let reports = run(&mut instance, 60);

    assert_eq!(reports[0].state, CharacterState::Run);
    let written = reports[0].velocity.unwrap();
    let speed = (written[0] * written[0] + written[2] * written[2]).sqrt();
    assert!((speed - 4.0).abs() < 0.02, "speed {}", speed);

    let travelled = horizontal(instance.character_position().unwrap() - start);
    assert!(travelled.dot(&camera_side) < 0.0, "moved toward the camera");
    assert!((travelled.norm() - 4.0).abs() < 0.3, "travelled {}", travelled.norm());
}

#[test]
fn test_body_turns_to_face_travel() {
    let mut instance = landed(ControllerConfig::default());
    press(&instance, "d");
    let reports = run(&mut instance, 60);

    let last = reports.last().unwrap();
    let expected = last.motion.x.atan2(last.motion.z);
    let handle = instance.controller.body().unwrap();
    let yaw = yaw_of(&instance.physics.body(handle).unwrap().orientation());
    assert!((yaw - expected).abs() < 0.05, "yaw {} vs {}", yaw, expected);
    assert_eq!(last.yaw, Some(yaw));
}

#[test]
fn test_release_returns_to_idle_and_stops() {
    let mut instance = landed(ControllerConfig::default());
    press(&instance, "w");
    run(&mut instance, 30);
    release(&instance, "w");

    let report = instance.tick();
    assert_eq!(report.state, CharacterState::Idle);
    let [vx, _, vz] = report.velocity.unwrap();
    assert_eq!((vx, vz), (0.0, 0.0));

    let before = instance.character_position().unwrap();
    run(&mut instance, 30);
    let drift = horizontal(instance.character_position().unwrap() - before).norm();
    assert!(drift < 0.05, "kept sliding {}", drift);
}

// ---------------------------------------------------------------------------
// Jumping
// ---------------------------------------------------------------------------

#[test]
fn test_tap_jump_leaves_the_ground() {
    let mut instance = landed(ControllerConfig::default());
    press(&instance, "Space");
    let report = instance.tick();
    release(&instance, "Space");

    assert!(report.jump);
    assert_eq!(report.velocity, Some([0.0, 7.0, 0.0]));
    assert_eq!(report.state, CharacterState::Run);

    let apex = run(&mut instance, 40)
        .iter()
        .filter_map(|r| r.position.map(|p| p[1]))
        .fold(f32::MIN, f32::max);
    assert!(apex > 3.0, "apex {}", apex);
}

#[test]
fn test_level_trigger_fires_every_held_tick() {
    let mut instance = landed(ControllerConfig::default());
    press(&instance, "Space");
    let jumps = run(&mut instance, 10).iter().filter(|r| r.jump).count();
    assert_eq!(jumps, 10);
}

#[test]
fn test_edge_trigger_fires_once_per_press() {
    let config = ControllerConfig::from_toml_str("[movement]\njump_trigger = \"edge\"\n").unwrap();
    let mut instance = landed(config);

    press(&instance, "Space");
    let jumps = run(&mut instance, 10).iter().filter(|r| r.jump).count();
    assert_eq!(jumps, 1);

    release(&instance, "Space");
    instance.tick();
    press(&instance, "Space");
    assert!(instance.tick().jump);
}

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

#[test]
fn test_camera_keeps_user_zoom_and_tilt_while_following() {
    let mut instance = landed(ControllerConfig::default());
    {
        let camera = instance.camera.as_mut().unwrap();
        camera.zoom(1.5);
        camera.orbit(0.3, 0.2);
    }
    // Let the damped drag settle before following.
    run(&mut instance, 120);
    assert_eq!(instance.camera.as_ref().unwrap().pending_orbit(), (0.0, 0.0));
    let manual = instance.camera.as_ref().unwrap().spherical();

    press(&instance, "w");
    press(&instance, "d");
    for report in run(&mut instance, 60) {
        let applied = report.camera.unwrap();
        assert!((applied.radius - manual.radius).abs() < 1.0e-3);
        assert!((applied.polar - manual.polar).abs() < 1.0e-3);
    }

    let camera = instance.camera.as_ref().unwrap();
    let player = instance.character_position().unwrap();
    assert!((camera.target() - player).norm() < 1.0e-5, "camera lags the body");
    assert!(camera.azimuthal_angle() < manual.azimuth, "rightward drift swings azimuth");
}

#[test]
fn test_camera_yaw_defines_forward() {
    let mut instance = GameInstance::new(ControllerConfig::default());
    instance.spawn_character();
    let target = instance.character_position().unwrap();
    // Camera west of the body: forward is +X.
    instance.mount_camera_with(OrbitCamera::new(
        target + Vector3::new(-5.0, 1.0, 0.0),
        target,
        OrbitSettings::default(),
    ));
    press(&instance, "w");

    let report = instance.tick();
    assert_eq!((report.motion.x, report.motion.z), (4.0, 0.0));
}

// ---------------------------------------------------------------------------
// Readiness
// ---------------------------------------------------------------------------

#[test]
fn test_stages_wait_for_body_and_camera() {
    let mut instance = GameInstance::new(ControllerConfig::default());
    press(&instance, "w");

    let report = instance.tick();
    assert_eq!(report.skipped, vec![NotReady::Body, NotReady::Camera]);
    assert_eq!(report.velocity, None);

    instance.spawn_character();
    let report = instance.tick();
    assert_eq!(report.skipped, vec![NotReady::Camera]);
    // Without a camera the movement frame is the world frame.
    assert_eq!(report.velocity.map(|v| (v[0], v[2])), Some((0.0, -4.0)));

    instance.mount_camera();
    let report = instance.tick();
    assert!(report.skipped.is_empty());
    assert!(report.camera.is_some());
}

#[test]
fn test_json_report_shape() {
    let mut instance = GameInstance::spawn(ControllerConfig::default());
    press(&instance, "a");
    let report = instance.tick();

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["tick"], 0);
    assert_eq!(value["state"], "run");
    assert_eq!(value["input"]["left"], true);
    assert_eq!(value["transition"]["from"], "idle");
    assert_eq!(value["transition"]["to"], "run");
    assert!(value["camera"]["radius"].is_number());
    assert_eq!(value["skipped"], serde_json::json!([]));
}
