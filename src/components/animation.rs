use serde::{Deserialize, Serialize};

/// Frame playback state for sprite sheets.
///
/// The animation system adds the pass delta to `elapsed` and advances
/// `frame_index` every `1 / framerate` seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Animation {
    /// Frames per second. Zero pauses playback.
    pub framerate: f32,
    pub frame_count: usize,
    pub looped: bool,
    #[serde(skip)]
    pub frame_index: usize,
    #[serde(skip)]
    pub elapsed: f32,
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            framerate: 12.0,
            frame_count: 1,
            looped: true,
            frame_index: 0,
            elapsed: 0.0,
        }
    }
}

impl Animation {
    pub fn new(framerate: f32, frame_count: usize) -> Self {
        Self {
            framerate,
            frame_count,
            ..Self::default()
        }
    }

    pub fn once(mut self) -> Self {
        self.looped = false;
        self
    }

    pub fn reset(&mut self) {
        self.frame_index = 0;
        self.elapsed = 0.0;
    }

    pub fn is_finished(&self) -> bool {
        !self.looped && self.frame_index + 1 >= self.frame_count
    }
}
