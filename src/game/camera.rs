//! Third-person orbit camera rig.
//!
//! The orbit controller owns distance, polar angle and azimuth; the user may
//! change any of them between ticks. Each tick the rig re-reads all three,
//! nudges only the azimuth by the lateral drift, and re-centres the orbit on
//! the character. Distance and polar angle pass through unchanged.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::constants::camera as consts;

/// Capabilities the rig needs from an orbit-style camera controller.
pub trait OrbitControls {
    fn distance(&self) -> f32;
    /// Angle from +Y, in radians.
    fn polar_angle(&self) -> f32;
    /// Angle around +Y measured from +Z toward +X, in radians.
    fn azimuthal_angle(&self) -> f32;
    fn target(&self) -> Vector3<f32>;
    fn set_target(&mut self, target: Vector3<f32>);
    fn set_position(&mut self, position: Vector3<f32>);
}

/// Spherical coordinates of a camera offset around its target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spherical {
    pub radius: f32,
    pub polar: f32,
    pub azimuth: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vector3<f32>) -> Self {
        let radius = offset.norm();
        if radius <= f32::EPSILON {
            return Self {
                radius: 0.0,
                polar: 0.0,
                azimuth: 0.0,
            };
        }
        Self {
            radius,
            polar: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            azimuth: offset.x.atan2(offset.z),
        }
    }

    pub fn to_offset(self) -> Vector3<f32> {
        let ring = self.radius * self.polar.sin();
        Vector3::new(
            ring * self.azimuth.sin(),
            self.radius * self.polar.cos(),
            ring * self.azimuth.cos(),
        )
    }
}

/// Limits and speeds for manual orbiting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitSettings {
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar: f32,
    pub max_polar: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub reverse_orbit: bool,
    /// Manual orbit eases in over several ticks.
    pub enable_damping: bool,
    /// Fraction of the pending orbit applied per tick.
    pub damping_factor: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            min_distance: consts::MIN_DISTANCE,
            max_distance: consts::MAX_DISTANCE,
            min_polar: consts::MIN_POLAR,
            max_polar: consts::MAX_POLAR,
            rotate_speed: consts::ROTATE_SPEED,
            zoom_speed: consts::ZOOM_SPEED,
            reverse_orbit: true,
            enable_damping: true,
            damping_factor: consts::DAMPING_FACTOR,
        }
    }
}

/// Orbit camera with a position and a look-at target.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    position: Vector3<f32>,
    target: Vector3<f32>,
    /// Manual rotation (azimuth, polar) not yet applied under damping.
    pending: (f32, f32),
    pub fov_degrees: f32,
    pub settings: OrbitSettings,
}

impl OrbitCamera {
    pub fn new(position: Vector3<f32>, target: Vector3<f32>, settings: OrbitSettings) -> Self {
        Self {
            position,
            target,
            pending: (0.0, 0.0),
            fov_degrees: consts::FOV_DEGREES,
            settings,
        }
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn spherical(&self) -> Spherical {
        Spherical::from_offset(self.position - self.target)
    }

    fn apply_spherical(&mut self, spherical: Spherical) {
        self.position = self.target + spherical.to_offset();
    }

    /// Manual orbit by the user (drag). With damping on, the rotation is
    /// queued and eased in by [`OrbitCamera::update_damping`].
    pub fn orbit(&mut self, d_azimuth: f32, d_polar: f32) {
        let sign = if self.settings.reverse_orbit { -1.0 } else { 1.0 };
        let d_azimuth = sign * d_azimuth * self.settings.rotate_speed;
        let d_polar = sign * d_polar * self.settings.rotate_speed;
        if self.settings.enable_damping {
            self.pending.0 += d_azimuth;
            self.pending.1 += d_polar;
        } else {
            self.rotate(d_azimuth, d_polar);
        }
    }

    /// Applies one tick's share of the queued orbit and decays the rest.
    pub fn update_damping(&mut self) {
        let (d_azimuth, d_polar) = self.pending;
        if d_azimuth == 0.0 && d_polar == 0.0 {
            return;
        }
        if !self.settings.enable_damping {
            self.pending = (0.0, 0.0);
            self.rotate(d_azimuth, d_polar);
            return;
        }
        let factor = self.settings.damping_factor.clamp(0.0, 1.0);
        self.rotate(d_azimuth * factor, d_polar * factor);
        let keep = 1.0 - factor;
        self.pending = (d_azimuth * keep, d_polar * keep);
        if self.pending.0.abs() < f32::EPSILON && self.pending.1.abs() < f32::EPSILON {
            self.pending = (0.0, 0.0);
        }
    }

    /// Rotation still queued by damping.
    pub fn pending_orbit(&self) -> (f32, f32) {
        self.pending
    }

    /// Polar stays inside the configured bounds and away from the poles.
    fn rotate(&mut self, d_azimuth: f32, d_polar: f32) {
        let mut s = self.spherical();
        s.azimuth += d_azimuth;
        s.polar = (s.polar + d_polar)
            .max(self.settings.min_polar)
            .min(self.settings.max_polar)
            .clamp(consts::POLE_EPSILON, std::f32::consts::PI - consts::POLE_EPSILON);
        self.apply_spherical(s);
    }

    /// Manual zoom by the user. `scale` > 1 moves the camera away.
    pub fn zoom(&mut self, scale: f32) {
        if !scale.is_finite() || scale <= 0.0 {
            return;
        }
        let mut s = self.spherical();
        s.radius = (s.radius * scale.powf(self.settings.zoom_speed))
            .max(self.settings.min_distance)
            .min(self.settings.max_distance);
        self.apply_spherical(s);
    }

    /// Orbit azimuth, i.e. the camera yaw used as the movement frame.
    pub fn yaw(&self) -> f32 {
        self.azimuthal_angle()
    }
}

impl OrbitControls for OrbitCamera {
    fn distance(&self) -> f32 {
        (self.position - self.target).norm()
    }

    fn polar_angle(&self) -> f32 {
        self.spherical().polar
    }

    fn azimuthal_angle(&self) -> f32 {
        self.spherical().azimuth
    }

    fn target(&self) -> Vector3<f32> {
        self.target
    }

    fn set_target(&mut self, target: Vector3<f32>) {
        self.target = target;
    }

    fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position;
    }
}

/// Re-centres the orbit on the player for this tick.
///
/// Distance and polar angle are re-applied as read. The azimuth drifts by
/// `-(last_horizontal_x / divisor) * dt`, leaning the camera into turns.
/// Returns the spherical coordinates that were applied.
pub fn update_camera<C: OrbitControls + ?Sized>(
    camera: &mut C,
    player_position: Vector3<f32>,
    last_horizontal_x: f32,
    delta_time: f32,
    divisor: f32,
) -> Spherical {
    let spherical = Spherical {
        radius: camera.distance(),
        polar: camera.polar_angle(),
        azimuth: camera.azimuthal_angle() - (last_horizontal_x / divisor) * delta_time,
    };
    camera.set_position(player_position + spherical.to_offset());
    camera.set_target(player_position);
    spherical
}
