use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraMode {
    /// Stays where its entity is.
    #[default]
    Fixed,
    /// Centres on the first member of the `player` group.
    Follow,
}

/// Viewport description consumed by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub viewport: Vec2,
    pub layer: i32,
    pub mode: CameraMode,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            viewport: Vec2::new(64.0, 64.0),
            layer: 0,
            mode: CameraMode::Fixed,
        }
    }
}

impl Camera {
    pub fn follow(viewport: Vec2) -> Self {
        Self {
            viewport,
            mode: CameraMode::Follow,
            ..Self::default()
        }
    }
}
