//! Controller tuning and physics defaults. Config values fall back to these.

/// Physics constants
pub mod physics {
    /// Default gravity in units/s² (downward)
    pub const DEFAULT_GRAVITY: f32 = 9.81;

    /// Fixed tick rate of the simulation (60 Hz)
    pub const TICK_RATE: u32 = 60;

    /// Fixed timestep for physics simulation (60 Hz)
    pub const TIMESTEP: f32 = 1.0 / 60.0;

    /// Half-height of the cylinder part of the character capsule
    pub const CAPSULE_HALF_HEIGHT: f32 = 0.6;

    /// Character capsule radius
    pub const CAPSULE_RADIUS: f32 = 0.3;

    /// Collider offset relative to the body origin
    pub const COLLIDER_OFFSET: [f32; 3] = [0.0, -0.1, 0.0];

    /// Character spawn position
    pub const CHARACTER_SPAWN: [f32; 3] = [0.0, 2.0, 0.0];

    /// Half extents of the stand-in ground slab
    pub const GROUND_HALF_EXTENTS: [f32; 3] = [50.0, 0.5, 50.0];
}

/// Locomotion defaults
pub mod movement {
    /// Horizontal move speed in units per tick-equivalent
    pub const MOVE_SPEED: f32 = 4.0;

    /// Vertical speed written on jump
    pub const JUMP_SPEED: f32 = 7.0;

    /// Decimal digits kept on horizontal velocity before it reaches the solver
    pub const VELOCITY_PRECISION: u32 = 2;

    /// Highest precision accepted by config validation
    pub const MAX_VELOCITY_PRECISION: u32 = 6;
}

/// Animation defaults
pub mod animation {
    /// Crossfade duration between clips
    pub const CROSSFADE: f32 = 0.2;

    /// Fallback clip length when the asset does not provide one
    pub const DEFAULT_CLIP_LENGTH: f32 = 1.0;

    /// Clip names indexed by `CharacterState` ordinal
    pub const CLIP_NAMES: [&str; 3] = ["walk", "idle", "run"];

    /// Weight below which a stopping track counts as silent
    pub const SILENT_WEIGHT: f32 = 0.0001;
}

/// Orientation defaults
pub mod orientation {
    /// Per-tick slerp factor toward the facing direction
    pub const BLEND: f32 = 0.2;

    /// Tick rate the constant blend was tuned at
    pub const REFERENCE_HZ: f32 = 60.0;
}

/// Orbit camera defaults
pub mod camera {
    /// Divisor applied to lateral velocity before it drifts the azimuth
    pub const AZIMUTH_DRIFT_DIVISOR: f32 = 100.0;

    /// Initial camera position
    pub const INITIAL_POSITION: [f32; 3] = [3.0, 1.0, 3.0];

    /// Vertical field of view
    pub const FOV_DEGREES: f32 = 60.0;

    /// Rotation speed multiplier for manual orbiting
    pub const ROTATE_SPEED: f32 = 0.5;

    /// Zoom speed multiplier for manual dolly
    pub const ZOOM_SPEED: f32 = 1.0;

    /// Fraction of pending manual rotation applied per tick when damping is on
    pub const DAMPING_FACTOR: f32 = 0.2;

    /// Distance bounds for manual zoom
    pub const MIN_DISTANCE: f32 = 0.5;
    pub const MAX_DISTANCE: f32 = 100.0;

    /// Polar bounds for manual tilt (radians from +Y)
    pub const MIN_POLAR: f32 = 0.0;
    pub const MAX_POLAR: f32 = std::f32::consts::PI;

    /// Keeps the spherical conversion away from the poles
    pub const POLE_EPSILON: f32 = 1.0e-3;
}
