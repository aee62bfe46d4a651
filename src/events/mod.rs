//! Event values exchanged between the host, the systems and handlers.
//!
//! Events are plain values: the host posts input, systems post collision and
//! gameplay notifications, and the [`bus`] delivers them to handlers once per
//! update cycle.
//!
//! Submodules:
//! - [`bus`] – the FIFO queue and handler registration
//! - [`collision`] – tile/entity collision payloads and world edges
//! - [`input`] – logical keys produced by the input source

pub mod bus;
pub mod collision;
pub mod input;

use crate::ecs::entity::EntityId;
use crate::events::collision::{CollisionEvent, Edge};
use crate::events::input::Key;

/// Discriminator used to key handler lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Quit,
    KeyDown,
    KeyUp,
    Collision,
    Offscreen,
    Interact,
    Sound,
    GameOver,
    LevelComplete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Quit,
    KeyDown { key: Key },
    KeyUp { key: Key },
    Collision(CollisionEvent),
    /// A tile-colliding entity has left the map through `edge`.
    Offscreen { entity: EntityId, edge: Edge },
    /// `actor` used the interact key while overlapping `target`.
    Interact { actor: EntityId, target: EntityId },
    /// Request for the audio collaborator to play the effect `code`.
    Sound { code: String },
    GameOver,
    LevelComplete,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Quit => EventKind::Quit,
            Event::KeyDown { .. } => EventKind::KeyDown,
            Event::KeyUp { .. } => EventKind::KeyUp,
            Event::Collision(_) => EventKind::Collision,
            Event::Offscreen { .. } => EventKind::Offscreen,
            Event::Interact { .. } => EventKind::Interact,
            Event::Sound { .. } => EventKind::Sound,
            Event::GameOver => EventKind::GameOver,
            Event::LevelComplete => EventKind::LevelComplete,
        }
    }

    pub fn sound(code: impl Into<String>) -> Self {
        Event::Sound { code: code.into() }
    }
}
