//! Error taxonomy shared by the ECS substrate, the systems and session setup.
//!
//! Setup-time failures ([`SimError::Configuration`]) abort session
//! construction. [`SimError::MissingComponent`] raised while a system runs
//! means the system read a component it never declared as a requirement;
//! the scheduler aborts the frame and hands the error back to the caller.

use thiserror::Error;

use crate::ecs::component::ComponentKind;
use crate::ecs::entity::EntityId;

/// Errors raised by the simulation core.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// A value could not be turned into a component (unknown kind name or
    /// data that does not fit the kind).
    #[error("invalid component '{kind}': {reason}")]
    InvalidComponent { kind: String, reason: String },

    /// Detach or lookup by name of a component the entity does not carry.
    #[error("entity {entity} has no component named '{name}'")]
    UnknownComponent { entity: EntityId, name: String },

    /// A system accessed a component it failed to declare as a requirement.
    #[error("entity {entity} is missing required component {kind:?}")]
    MissingComponent {
        entity: EntityId,
        kind: ComponentKind,
    },

    /// The entity was destroyed or never allocated.
    #[error("entity {0} does not exist")]
    NoSuchEntity(EntityId),

    /// Malformed setup data (map geometry, config values, layout files).
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl SimError {
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        SimError::Configuration(reason.into())
    }
}

pub type SimResult<T> = Result<T, SimError>;
