//! Collision event payloads.
//!
//! The tile collision system emits exactly one event per tile-colliding
//! entity, either [`Event::Offscreen`](crate::events::Event::Offscreen) with
//! the [`Edge`] crossed or [`CollisionEvent::Tile`], plus one
//! [`CollisionEvent::Entity`] per newly overlapping entity pair.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ecs::entity::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionEvent {
    /// `entity` overlaps at least one solid tile.
    Tile { entity: EntityId },
    /// `a` and `b` overlap. No ordering guarantee between the two ids.
    Entity { a: EntityId, b: EntityId },
}

impl CollisionEvent {
    /// `true` when `entity` takes part in this collision.
    pub fn involves(&self, entity: EntityId) -> bool {
        match *self {
            CollisionEvent::Tile { entity: e } => e == entity,
            CollisionEvent::Entity { a, b } => a == entity || b == entity,
        }
    }
}

/// World boundary an entity has crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Edge::Left => "LEFT",
            Edge::Right => "RIGHT",
            Edge::Top => "TOP",
            Edge::Bottom => "BOTTOM",
        })
    }
}
