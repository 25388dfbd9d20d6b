//! Locomotion state machine.
//!
//! Picks an animation state from the tick's resolved motion and crossfades
//! clips when the state changes. The clip for each state comes from a fixed
//! table indexed by the state's ordinal (`walk`, `idle`, `run`).
//!
//! `Walk` is part of the enumeration but the transition policy never selects
//! it; it can only be reached through [`LocomotionStateMachine::force`].

use serde::{Deserialize, Serialize};
use tracing::info;

use super::constants::animation as anim_consts;
use super::motion::MotionVector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterState {
    Walk,
    Idle,
    Run,
}

impl CharacterState {
    pub const ALL: [CharacterState; 3] =
        [CharacterState::Walk, CharacterState::Idle, CharacterState::Run];

    pub fn ordinal(self) -> usize {
        match self {
            CharacterState::Walk => 0,
            CharacterState::Idle => 1,
            CharacterState::Run => 2,
        }
    }
}

/// Clip name for each state, indexed by ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipTable([String; 3]);

impl ClipTable {
    pub fn new(names: [String; 3]) -> Self {
        Self(names)
    }

    pub fn clip(&self, state: CharacterState) -> &str {
        &self.0[state.ordinal()]
    }
}

impl Default for ClipTable {
    fn default() -> Self {
        Self(anim_consts::CLIP_NAMES.map(String::from))
    }
}

/// Animation capabilities of the loaded character asset.
pub trait Animator {
    fn clip_names(&self) -> Vec<String>;
    fn fade_out_stop(&mut self, clip: &str, duration: f32);
    /// Rewinds the clip, fades it in and plays it looping.
    fn reset_fade_in_play(&mut self, clip: &str, duration: f32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: CharacterState,
    pub to: CharacterState,
}

pub struct LocomotionStateMachine {
    current: CharacterState,
    clips: ClipTable,
    crossfade: f32,
}

impl LocomotionStateMachine {
    pub fn new(clips: ClipTable, crossfade: f32) -> Self {
        Self {
            current: CharacterState::Idle,
            clips,
            crossfade,
        }
    }

    pub fn current(&self) -> CharacterState {
        self.current
    }

    /// Run while moving or jumping, Idle otherwise.
    pub fn select(motion: MotionVector, jump: bool) -> CharacterState {
        if motion.is_moving() || jump {
            CharacterState::Run
        } else {
            CharacterState::Idle
        }
    }

    /// Plays the clip of the initial state. Call once when the asset is mounted.
    pub fn start<A: Animator + ?Sized>(&self, animator: &mut A) {
        self.crossfade_to(self.current, animator);
    }

    /// Applies the policy for this tick. Returns the transition if one fired.
    pub fn update<A: Animator + ?Sized>(
        &mut self,
        motion: MotionVector,
        jump: bool,
        animator: &mut A,
    ) -> Option<Transition> {
        self.enter(Self::select(motion, jump), animator)
    }

    /// Direct assignment bypassing the policy.
    pub fn force<A: Animator + ?Sized>(
        &mut self,
        state: CharacterState,
        animator: &mut A,
    ) -> Option<Transition> {
        self.enter(state, animator)
    }

    fn enter<A: Animator + ?Sized>(
        &mut self,
        target: CharacterState,
        animator: &mut A,
    ) -> Option<Transition> {
        if target == self.current {
            return None;
        }
        let transition = Transition {
            from: self.current,
            to: target,
        };
        self.current = target;
        info!(from = ?transition.from, to = ?transition.to, "locomotion state changed");
        self.crossfade_to(target, animator);
        Some(transition)
    }

    fn crossfade_to<A: Animator + ?Sized>(&self, state: CharacterState, animator: &mut A) {
        let clip = self.clips.clip(state);
        for name in animator.clip_names() {
            if name != clip {
                animator.fade_out_stop(&name, self.crossfade);
            }
        }
        animator.reset_fade_in_play(clip, self.crossfade);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every call instead of blending anything.
    #[derive(Default)]
    struct RecordingAnimator {
        calls: Vec<String>,
    }

    impl Animator for RecordingAnimator {
        fn clip_names(&self) -> Vec<String> {
            anim_consts::CLIP_NAMES.map(String::from).to_vec()
        }

        fn fade_out_stop(&mut self, clip: &str, duration: f32) {
            self.calls.push(format!("out:{}:{}", clip, duration));
        }

        fn reset_fade_in_play(&mut self, clip: &str, duration: f32) {
            self.calls.push(format!("in:{}:{}", clip, duration));
        }
    }

    fn machine() -> LocomotionStateMachine {
        LocomotionStateMachine::new(ClipTable::default(), 0.2)
    }

    const MOVING: MotionVector = MotionVector { x: 0.0, z: -4.0 };

    #[test]
    fn test_clip_table_follows_ordinals() {
        let table = ClipTable::default();
        assert_eq!(table.clip(CharacterState::Walk), "walk");
        assert_eq!(table.clip(CharacterState::Idle), "idle");
        assert_eq!(table.clip(CharacterState::Run), "run");
    }

    #[test]
    fn test_policy_never_selects_walk() {
        for motion in [MotionVector::ZERO, MOVING] {
            for jump in [false, true] {
                assert_ne!(LocomotionStateMachine::select(motion, jump), CharacterState::Walk);
            }
        }
        assert_eq!(
            LocomotionStateMachine::select(MotionVector::ZERO, true),
            CharacterState::Run
        );
        assert_eq!(
            LocomotionStateMachine::select(MotionVector::ZERO, false),
            CharacterState::Idle
        );
    }

    #[test]
    fn test_transition_fires_once_while_key_held() {
        let mut sm = machine();
        let mut animator = RecordingAnimator::default();

        let first = sm.update(MOVING, false, &mut animator);
        assert_eq!(
            first,
            Some(Transition {
                from: CharacterState::Idle,
                to: CharacterState::Run
            })
        );
        let calls_after_first = animator.calls.len();

        for _ in 0..10 {
            assert_eq!(sm.update(MOVING, false, &mut animator), None);
        }
        assert_eq!(animator.calls.len(), calls_after_first);
    }

    #[test]
    fn test_crossfade_fades_others_then_plays_target() {
        let mut sm = machine();
        let mut animator = RecordingAnimator::default();
        sm.update(MOVING, false, &mut animator);
        assert_eq!(
            animator.calls,
            vec!["out:walk:0.2", "out:idle:0.2", "in:run:0.2"]
        );
    }

    #[test]
    fn test_idle_input_keeps_idle_without_restart() {
        let mut sm = machine();
        let mut animator = RecordingAnimator::default();
        assert_eq!(sm.update(MotionVector::ZERO, false, &mut animator), None);
        assert!(animator.calls.is_empty());
    }

    #[test]
    fn test_walk_reachable_only_by_force() {
        let mut sm = machine();
        let mut animator = RecordingAnimator::default();
        sm.force(CharacterState::Walk, &mut animator);
        assert_eq!(sm.current(), CharacterState::Walk);
        assert_eq!(animator.calls.last().map(String::as_str), Some("in:walk:0.2"));

        sm.update(MotionVector::ZERO, false, &mut animator);
        assert_eq!(sm.current(), CharacterState::Idle);
    }

    #[test]
    fn test_start_plays_initial_idle_clip() {
        let sm = machine();
        let mut animator = RecordingAnimator::default();
        sm.start(&mut animator);
        assert_eq!(animator.calls.last().map(String::as_str), Some("in:idle:0.2"));
    }
}
