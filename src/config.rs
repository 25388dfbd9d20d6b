//! Controller configuration parsing from TOML files

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::game::constants::{animation, camera, movement, orientation, physics};
use crate::game::input::KeyBindings;
use crate::game::motion::JumpTrigger;
use crate::game::orientation::OrientationBlend;

/// Movement section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Horizontal speed in units per tick-equivalent
    pub move_speed: f32,
    /// Vertical speed written on jump
    pub jump_speed: f32,
    /// Decimal digits kept on horizontal velocity
    pub velocity_precision: u32,
    /// `level` (re-fires while held) or `edge` (fires on press only)
    pub jump_trigger: JumpTrigger,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            move_speed: movement::MOVE_SPEED,
            jump_speed: movement::JUMP_SPEED,
            velocity_precision: movement::VELOCITY_PRECISION,
            jump_trigger: JumpTrigger::Level,
        }
    }
}

/// Animation section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Crossfade duration in seconds
    pub crossfade: f32,
    /// Clip names indexed by state ordinal (walk, idle, run)
    pub clips: Vec<String>,
    /// Clip lengths in seconds, parallel to `clips`
    pub clip_lengths: Vec<f32>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            crossfade: animation::CROSSFADE,
            clips: animation::CLIP_NAMES.iter().map(|s| s.to_string()).collect(),
            clip_lengths: vec![animation::DEFAULT_CLIP_LENGTH; animation::CLIP_NAMES.len()],
        }
    }
}

impl AnimationConfig {
    /// Length of the clip at `index`, falling back to the default length.
    pub fn clip_length(&self, index: usize) -> f32 {
        self.clip_lengths
            .get(index)
            .copied()
            .unwrap_or(animation::DEFAULT_CLIP_LENGTH)
    }
}

/// Orientation section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationConfig {
    /// Per-tick slerp factor toward the facing direction
    pub blend: f32,
    /// `constant` or `time_normalized`
    pub mode: BlendMode,
    /// Tick rate the constant blend is matched against in time-normalized mode
    pub reference_hz: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    #[default]
    Constant,
    TimeNormalized,
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            blend: orientation::BLEND,
            mode: BlendMode::Constant,
            reference_hz: orientation::REFERENCE_HZ,
        }
    }
}

impl OrientationConfig {
    pub fn blend_mode(&self) -> OrientationBlend {
        match self.mode {
            BlendMode::Constant => OrientationBlend::ConstantFactor,
            BlendMode::TimeNormalized => OrientationBlend::TimeNormalized {
                reference_hz: self.reference_hz,
            },
        }
    }
}

/// Camera section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub azimuth_drift_divisor: f32,
    pub initial_position: [f32; 3],
    pub fov_degrees: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar: f32,
    pub max_polar: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub reverse_orbit: bool,
    /// Spread manual orbit over several ticks instead of applying it at once
    pub enable_damping: bool,
    /// Fraction of the pending orbit applied per tick, in (0, 1]
    pub damping_factor: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            azimuth_drift_divisor: camera::AZIMUTH_DRIFT_DIVISOR,
            initial_position: camera::INITIAL_POSITION,
            fov_degrees: camera::FOV_DEGREES,
            min_distance: camera::MIN_DISTANCE,
            max_distance: camera::MAX_DISTANCE,
            min_polar: camera::MIN_POLAR,
            max_polar: camera::MAX_POLAR,
            rotate_speed: camera::ROTATE_SPEED,
            zoom_speed: camera::ZOOM_SPEED,
            reverse_orbit: true,
            enable_damping: true,
            damping_factor: camera::DAMPING_FACTOR,
        }
    }
}

/// Character body section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub spawn: [f32; 3],
    pub capsule_half_height: f32,
    pub capsule_radius: f32,
    pub collider_offset: [f32; 3],
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            spawn: physics::CHARACTER_SPAWN,
            capsule_half_height: physics::CAPSULE_HALF_HEIGHT,
            capsule_radius: physics::CAPSULE_RADIUS,
            collider_offset: physics::COLLIDER_OFFSET,
        }
    }
}

/// World section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Downward gravity in units/s²
    pub gravity: f32,
    /// Ticks per second
    pub tick_rate: u32,
    pub ground_half_extents: [f32; 3],
    /// Height of the ground's top face
    pub ground_top: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: physics::DEFAULT_GRAVITY,
            tick_rate: physics::TICK_RATE,
            ground_half_extents: physics::GROUND_HALF_EXTENTS,
            ground_top: 0.0,
        }
    }
}

impl WorldConfig {
    pub fn timestep(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }
}

/// Controller configuration from a TOML file. Every key is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub movement: MovementConfig,
    pub animation: AnimationConfig,
    pub orientation: OrientationConfig,
    pub camera: CameraConfig,
    pub body: BodyConfig,
    pub world: WorldConfig,
    pub keys: KeyBindings,
}

impl ControllerConfig {
    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Renders the configuration back to TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::SerializeError)
    }

    /// Rejects values the controller cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        // NaN fails every comparison, so each check is phrased so that NaN
        // lands on the rejecting side.
        for (name, value) in [
            ("movement.move_speed", self.movement.move_speed),
            ("movement.jump_speed", self.movement.jump_speed),
            ("animation.crossfade", self.animation.crossfade),
            ("world.gravity", self.world.gravity),
            ("world.ground_top", self.world.ground_top),
            ("camera.rotate_speed", self.camera.rotate_speed),
            ("camera.zoom_speed", self.camera.zoom_speed),
            ("camera.min_distance", self.camera.min_distance),
            ("camera.min_polar", self.camera.min_polar),
            ("body.capsule_half_height", self.body.capsule_half_height),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return invalid(format!("{} must be a non-negative number, got {}", name, value));
            }
        }
        for (name, values) in [
            ("camera.initial_position", self.camera.initial_position),
            ("body.spawn", self.body.spawn),
            ("body.collider_offset", self.body.collider_offset),
        ] {
            if values.iter().any(|v| !v.is_finite()) {
                return invalid(format!("{} must be finite, got {:?}", name, values));
            }
        }
        if self.world.ground_half_extents.iter().any(|v| !(v.is_finite() && *v > 0.0)) {
            return invalid(format!(
                "world.ground_half_extents must be positive, got {:?}",
                self.world.ground_half_extents
            ));
        }
        if self.animation.clip_lengths.iter().any(|v| !(v.is_finite() && *v > 0.0)) {
            return invalid("animation.clip_lengths must all be positive".to_string());
        }
        if self.movement.velocity_precision > movement::MAX_VELOCITY_PRECISION {
            return invalid(format!(
                "movement.velocity_precision must be at most {}, got {}",
                movement::MAX_VELOCITY_PRECISION,
                self.movement.velocity_precision
            ));
        }
        if !(self.orientation.blend > 0.0 && self.orientation.blend <= 1.0) {
            return invalid(format!(
                "orientation.blend must be in (0, 1], got {}",
                self.orientation.blend
            ));
        }
        if !(self.orientation.reference_hz.is_finite() && self.orientation.reference_hz > 0.0) {
            return invalid("orientation.reference_hz must be positive".to_string());
        }
        let divisor = self.camera.azimuth_drift_divisor;
        if !divisor.is_finite() || divisor == 0.0 {
            return invalid("camera.azimuth_drift_divisor must be finite and non-zero".to_string());
        }
        if !(self.camera.fov_degrees > 0.0 && self.camera.fov_degrees < 180.0) {
            return invalid(format!(
                "camera.fov_degrees must be in (0, 180), got {}",
                self.camera.fov_degrees
            ));
        }
        let cam = &self.camera;
        if !(cam.max_distance.is_finite() && cam.max_distance >= cam.min_distance) {
            return invalid(format!(
                "camera distance bounds must satisfy 0 <= min <= max, got [{}, {}]",
                cam.min_distance, cam.max_distance
            ));
        }
        if !(cam.max_polar <= std::f32::consts::PI && cam.max_polar >= cam.min_polar) {
            return invalid(format!(
                "camera polar bounds must satisfy 0 <= min <= max <= pi, got [{}, {}]",
                cam.min_polar, cam.max_polar
            ));
        }
        if !(self.camera.damping_factor > 0.0 && self.camera.damping_factor <= 1.0) {
            return invalid(format!(
                "camera.damping_factor must be in (0, 1], got {}",
                self.camera.damping_factor
            ));
        }
        if self.animation.clips.len() != animation::CLIP_NAMES.len() {
            return invalid(format!(
                "animation.clips needs exactly {} entries (walk, idle, run), got {}",
                animation::CLIP_NAMES.len(),
                self.animation.clips.len()
            ));
        }
        if self.world.tick_rate == 0 {
            return invalid("world.tick_rate must be positive".to_string());
        }
        if !(self.body.capsule_radius.is_finite() && self.body.capsule_radius > 0.0) {
            return invalid("body.capsule_radius must be positive".to_string());
        }
        Ok(())
    }
}

/// Errors that can occur when loading controller configuration
#[derive(Debug)]
pub enum ConfigError {
    IoError(PathBuf, std::io::Error),
    ParseError(PathBuf, toml::de::Error),
    SerializeError(toml::ser::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, e) => {
                write!(f, "Failed to read {}: {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse {}: {}", path.display(), e)
            }
            ConfigError::SerializeError(e) => write!(f, "Failed to render config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
