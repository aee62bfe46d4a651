//! Entity-component-system substrate.
//!
//! - [`component`] – closed [`ComponentKind`](component::ComponentKind) enum, requirement bitsets
//! - [`entity`] – entity ids and per-entity component stores
//! - [`group`] – named membership sets
//! - [`scheduler`] – the ordered system pipeline
//! - [`world`] – the context object tying registry, groups and events together

pub mod component;
pub mod entity;
pub mod group;
pub mod scheduler;
pub mod world;
