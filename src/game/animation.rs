use tracing::warn;

use super::constants::animation as anim_consts;
use super::locomotion::Animator;

/// Playback state of one named clip.
#[derive(Debug, Clone)]
pub struct AnimationTrack {
    pub name: String,
    pub length: f32,
    pub looped: bool,
    pub speed: f32,
    pub time_position: f32,
    pub is_playing: bool,
    pub is_stopping: bool,
    pub weight_current: f32,
    pub weight_target: f32,
    pub fade_from: f32,
    pub fade_to: f32,
    pub fade_duration: f32,
    pub fade_elapsed: f32,
}

impl AnimationTrack {
    pub fn new(name: impl Into<String>, length: f32) -> Self {
        Self {
            name: name.into(),
            length: length.max(0.01),
            looped: false,
            speed: 1.0,
            time_position: 0.0,
            is_playing: false,
            is_stopping: false,
            weight_current: 0.0,
            weight_target: 1.0,
            fade_from: 0.0,
            fade_to: 0.0,
            fade_duration: 0.0,
            fade_elapsed: 0.0,
        }
    }

    fn begin_fade(&mut self, to: f32, duration: f32) {
        self.fade_from = self.weight_current;
        self.fade_to = to;
        self.weight_target = to;
        self.fade_duration = duration.max(0.0);
        self.fade_elapsed = 0.0;
        if self.fade_duration <= 0.0 {
            self.weight_current = to;
        }
    }

    /// Rewinds to the first frame.
    pub fn reset(&mut self) {
        self.time_position = 0.0;
    }

    /// Starts (or keeps) playing and fades the weight up to 1.
    pub fn fade_in_play(&mut self, duration: f32, looped: bool) {
        self.looped = looped;
        self.is_playing = true;
        self.is_stopping = false;
        self.begin_fade(1.0, duration);
    }

    /// Fades the weight down to 0 and stops once silent.
    pub fn fade_out_stop(&mut self, duration: f32) {
        if !self.is_playing {
            return;
        }
        self.is_stopping = true;
        self.begin_fade(0.0, duration);
        if self.fade_duration <= 0.0 {
            self.halt();
        }
    }

    fn halt(&mut self) {
        self.is_playing = false;
        self.is_stopping = false;
        self.weight_current = 0.0;
        self.weight_target = 0.0;
        self.fade_duration = 0.0;
        self.fade_elapsed = 0.0;
    }

    pub fn tick(&mut self, delta_time: f32) {
        let dt = delta_time.max(0.0);
        if !self.is_playing && !self.is_stopping {
            return;
        }

        if self.fade_duration > 0.0 {
            self.fade_elapsed = (self.fade_elapsed + dt).min(self.fade_duration);
            let alpha = (self.fade_elapsed / self.fade_duration).clamp(0.0, 1.0);
            self.weight_current = self.fade_from + (self.fade_to - self.fade_from) * alpha;
            if (self.fade_duration - self.fade_elapsed).abs() <= f32::EPSILON {
                self.fade_duration = 0.0;
                self.fade_elapsed = 0.0;
                self.weight_current = self.fade_to;
            }
        } else {
            self.weight_current = self.weight_target.max(0.0);
        }
        self.weight_current = self.weight_current.max(0.0);

        if self.is_playing {
            self.time_position += dt * self.speed.max(0.0);
        }

        if self.is_playing && self.time_position >= self.length {
            if self.looped {
                self.time_position %= self.length;
            } else {
                self.time_position = self.length;
                self.halt();
                return;
            }
        }

        if self.is_stopping && self.weight_current <= anim_consts::SILENT_WEIGHT {
            self.halt();
        }
    }
}

/// Named clips of the character asset and their blend state.
#[derive(Debug, Clone, Default)]
pub struct AnimationMixer {
    tracks: Vec<AnimationTrack>,
}

impl AnimationMixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a clip. A clip with the same name is replaced.
    pub fn add_clip(&mut self, name: impl Into<String>, length: f32) {
        let track = AnimationTrack::new(name, length);
        if let Some(existing) = self.tracks.iter_mut().find(|t| t.name == track.name) {
            *existing = track;
        } else {
            self.tracks.push(track);
        }
    }

    pub fn track(&self, name: &str) -> Option<&AnimationTrack> {
        self.tracks.iter().find(|t| t.name == name)
    }

    fn track_mut(&mut self, name: &str) -> Option<&mut AnimationTrack> {
        self.tracks.iter_mut().find(|t| t.name == name)
    }

    /// Clips currently playing, in registration order.
    pub fn playing(&self) -> Vec<&str> {
        self.tracks
            .iter()
            .filter(|t| t.is_playing)
            .map(|t| t.name.as_str())
            .collect()
    }

    pub fn tick(&mut self, delta_time: f32) {
        for track in &mut self.tracks {
            track.tick(delta_time);
        }
    }
}

impl Animator for AnimationMixer {
    fn clip_names(&self) -> Vec<String> {
        self.tracks.iter().map(|t| t.name.clone()).collect()
    }

    fn fade_out_stop(&mut self, clip: &str, duration: f32) {
        match self.track_mut(clip) {
            Some(track) => track.fade_out_stop(duration),
            None => warn!(clip, "fade out requested for unknown clip"),
        }
    }

    fn reset_fade_in_play(&mut self, clip: &str, duration: f32) {
        match self.track_mut(clip) {
            Some(track) => {
                track.reset();
                track.fade_in_play(duration, true);
            }
            None => warn!(clip, "play requested for unknown clip"),
        }
    }
}
