//! Logical input keys.
//!
//! The input collaborator maps physical keys onto these actions and posts
//! [`Event::KeyDown`](crate::events::Event::KeyDown) /
//! [`Event::KeyUp`](crate::events::Event::KeyUp) before each scheduler pass.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Interact,
    Enter,
    Exit,
}
