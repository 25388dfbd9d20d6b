use nalgebra::{UnitQuaternion, Vector3};
use rapier3d::dynamics::RigidBody;

/// What the controller needs from the simulated character body.
///
/// The simulation owns the body; the controller only borrows it for the
/// duration of a tick phase.
pub trait CharacterBody {
    fn linear_velocity(&self) -> Vector3<f32>;
    fn set_linear_velocity(&mut self, velocity: Vector3<f32>);
    fn orientation(&self) -> UnitQuaternion<f32>;
    fn set_orientation(&mut self, orientation: UnitQuaternion<f32>);
    fn position(&self) -> Vector3<f32>;
}

impl CharacterBody for RigidBody {
    fn linear_velocity(&self) -> Vector3<f32> {
        *self.linvel()
    }

    fn set_linear_velocity(&mut self, velocity: Vector3<f32>) {
        self.set_linvel(velocity, true);
    }

    fn orientation(&self) -> UnitQuaternion<f32> {
        *self.rotation()
    }

    fn set_orientation(&mut self, orientation: UnitQuaternion<f32>) {
        self.set_rotation(orientation, true);
    }

    fn position(&self) -> Vector3<f32> {
        *self.translation()
    }
}

/// Plain in-memory body used by unit tests of the individual stages.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct TestBody {
    pub velocity: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub translation: Vector3<f32>,
    pub writes: usize,
}

#[cfg(test)]
impl Default for TestBody {
    fn default() -> Self {
        Self {
            velocity: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            translation: Vector3::zeros(),
            writes: 0,
        }
    }
}

#[cfg(test)]
impl CharacterBody for TestBody {
    fn linear_velocity(&self) -> Vector3<f32> {
        self.velocity
    }

    fn set_linear_velocity(&mut self, velocity: Vector3<f32>) {
        self.velocity = velocity;
        self.writes += 1;
    }

    fn orientation(&self) -> UnitQuaternion<f32> {
        self.rotation
    }

    fn set_orientation(&mut self, orientation: UnitQuaternion<f32>) {
        self.rotation = orientation;
        self.writes += 1;
    }

    fn position(&self) -> Vector3<f32> {
        self.translation
    }
}
