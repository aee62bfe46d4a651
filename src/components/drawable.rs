use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Sprite reference read by the renderer. The core only flips it to follow
/// [`Facing`](super::facing::Facing).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Drawable {
    /// Asset key of the sprite.
    pub sprite: String,
    /// Draw order; higher layers are drawn on top, negative layers are hidden.
    pub layer: i32,
    /// Draw offset relative to the entity position.
    pub offset: Vec2,
    pub flipped: bool,
}

impl Drawable {
    pub fn new(sprite: impl Into<String>, layer: i32) -> Self {
        Self {
            sprite: sprite.into(),
            layer,
            ..Self::default()
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Swap the sprite, keeping layer and offset.
    pub fn set_sprite(&mut self, sprite: impl Into<String>) {
        self.sprite = sprite.into();
    }
}
