use serde::{Deserialize, Serialize};

/// Marks the entity steered by keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerInput {
    pub enabled: bool,
    /// Horizontal target speed set while a direction key is held.
    pub speed: f32,
}

impl Default for PlayerInput {
    fn default() -> Self {
        Self {
            enabled: true,
            speed: 0.5,
        }
    }
}

impl PlayerInput {
    pub fn with_speed(speed: f32) -> Self {
        Self {
            speed,
            ..Self::default()
        }
    }
}
