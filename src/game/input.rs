//! Keyboard actions and per-tick input snapshots.
//!
//! Platform code pushes raw [`KeyEvent`]s through the channel returned by
//! [`InputState::sender`]; the simulation drains them once per tick with
//! [`InputState::snapshot`] and hands the resulting [`InputSnapshot`] to the
//! motion resolver.

use crossbeam_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Named actions understood by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Forward,
    Backward,
    Left,
    Right,
    Jump,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Forward,
        Action::Backward,
        Action::Left,
        Action::Right,
        Action::Jump,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::Forward => "forward",
            Action::Backward => "backward",
            Action::Left => "left",
            Action::Right => "right",
            Action::Jump => "jump",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction(pub String);

impl fmt::Display for UnknownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown action '{}'", self.0)
    }
}

impl std::error::Error for UnknownAction {}

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// Boolean state of every action for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl InputSnapshot {
    /// Builds a snapshot from name/state pairs. Unknown names are ignored and
    /// missing actions read as released.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        let mut snapshot = Self::default();
        for (name, pressed) in pairs {
            if let Ok(action) = name.parse::<Action>() {
                snapshot.set(action, pressed);
            }
        }
        snapshot
    }

    pub fn get(&self, action: Action) -> bool {
        match action {
            Action::Forward => self.forward,
            Action::Backward => self.backward,
            Action::Left => self.left,
            Action::Right => self.right,
            Action::Jump => self.jump,
        }
    }

    pub fn set(&mut self, action: Action, pressed: bool) {
        match action {
            Action::Forward => self.forward = pressed,
            Action::Backward => self.backward = pressed,
            Action::Left => self.left = pressed,
            Action::Right => self.right = pressed,
            Action::Jump => self.jump = pressed,
        }
    }
}

/// Key names bound to each action. One action may own several keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub forward: Vec<String>,
    pub backward: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub jump: Vec<String>,
}

fn bind(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: bind(&["ArrowUp", "w", "W"]),
            backward: bind(&["ArrowDown", "s", "S"]),
            left: bind(&["ArrowLeft", "a", "A"]),
            right: bind(&["ArrowRight", "d", "D"]),
            jump: bind(&["Space"]),
        }
    }
}

impl KeyBindings {
    pub fn keys(&self, action: Action) -> &[String] {
        match action {
            Action::Forward => &self.forward,
            Action::Backward => &self.backward,
            Action::Left => &self.left,
            Action::Right => &self.right,
            Action::Jump => &self.jump,
        }
    }

    /// Reverse lookup from a key name to the action it drives.
    pub fn action_for(&self, key: &str) -> Option<Action> {
        Action::ALL
            .into_iter()
            .find(|&action| self.keys(action).iter().any(|k| k == key))
    }
}

/// Raw keyboard event delivered by the platform layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyEvent {
    Pressed(String),
    Released(String),
}

/// Accumulates key events into held actions.
pub struct InputState {
    bindings: KeyBindings,
    held_keys: HashSet<String>,
    event_receiver: Receiver<KeyEvent>,
    event_sender: Sender<KeyEvent>,
}

impl InputState {
    pub fn new(bindings: KeyBindings) -> Self {
        let (event_sender, event_receiver) = crossbeam_channel::unbounded();
        Self {
            bindings,
            held_keys: HashSet::new(),
            event_receiver,
            event_sender,
        }
    }

    /// Producer side of the event queue.
    pub fn sender(&self) -> Sender<KeyEvent> {
        self.event_sender.clone()
    }

    /// Drains pending events and returns the actions held right now.
    pub fn snapshot(&mut self) -> InputSnapshot {
        for event in self.event_receiver.try_iter() {
            match event {
                KeyEvent::Pressed(key) => {
                    if self.bindings.action_for(&key).is_some() {
                        self.held_keys.insert(key);
                    }
                }
                KeyEvent::Released(key) => {
                    self.held_keys.remove(&key);
                }
            }
        }

        let mut snapshot = InputSnapshot::default();
        for key in &self.held_keys {
            if let Some(action) = self.bindings.action_for(key) {
                snapshot.set(action, true);
            }
        }
        snapshot
    }

    /// Releases every key, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        for _ in self.event_receiver.try_iter() {}
        self.held_keys.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new(KeyBindings::default())
    }
}
