pub mod animation;
pub mod body;
pub mod camera;
pub mod constants;
pub mod input;
pub mod instance;
pub mod locomotion;
pub mod motion;
pub mod orientation;
pub mod physics;

pub use animation::AnimationMixer;
pub use body::CharacterBody;
pub use camera::{update_camera, OrbitCamera, OrbitControls, Spherical};
pub use input::{Action, InputSnapshot, InputState, KeyBindings, KeyEvent};
pub use instance::{CharacterController, GameInstance, NotReady, TickReport};
pub use locomotion::{Animator, CharacterState, ClipTable, LocomotionStateMachine, Transition};
pub use motion::{apply_velocity, resolve, JumpGate, JumpTrigger, MotionVector};
pub use orientation::{update_orientation, OrientationBlend};
pub use physics::PhysicsWorld;
