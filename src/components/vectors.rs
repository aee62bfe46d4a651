//! Vector-valued components.
//!
//! All six wrap a [`Vec2`] in world units (pixels). Velocity is a per-step
//! displacement: physics adds it to [`Position`] once per fixed pass, and
//! tile collision rolls back by subtracting it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

macro_rules! vector_component {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Vec2);

        impl $name {
            pub fn new(x: f32, y: f32) -> Self {
                Self(Vec2::new(x, y))
            }
        }

        impl From<Vec2> for $name {
            fn from(value: Vec2) -> Self {
                Self(value)
            }
        }
    };
}

vector_component!(
    /// Top-left corner of the entity's box.
    Position
);
vector_component!(
    /// Displacement applied per fixed step.
    Velocity
);
vector_component!(
    /// Change of velocity per second. With a [`TargetVelocity`] only its
    /// length is used, as the rate of approach.
    Acceleration
);
vector_component!(
    /// Box size. Absent means 1x1 for collision, 0x0 for edge checks.
    Dimension
);
vector_component!(
    /// Position before the last physics step, used for rollback.
    LastPosition
);
vector_component!(
    /// Velocity the entity is steering toward.
    TargetVelocity
);
