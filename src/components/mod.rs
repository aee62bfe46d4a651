//! Component payloads that can be attached to entities.
//!
//! Each type here is the data of one [`Component`](crate::ecs::component::Component)
//! variant.
//!
//! Submodules overview:
//! - [`animation`] – frame playback state for sprite sheets
//! - [`camera`] – viewport and follow mode for the renderer
//! - [`collidable`] – opt-in to collision plus the per-frame overlap set
//! - [`drawable`] – sprite key, layer and flip for the renderer
//! - [`eventhandler`] – entity-scoped event handlers and interaction hooks
//! - [`facing`] – horizontal look direction
//! - [`playerinput`] – marks the keyboard-driven entity
//! - [`radar`] – line-of-sight detection of other groups
//! - [`script`] – ordered per-frame callbacks
//! - [`state`] – open key-value state and handler contexts
//! - [`vectors`] – position, velocity, acceleration, dimension and friends

pub mod animation;
pub mod camera;
pub mod collidable;
pub mod drawable;
pub mod eventhandler;
pub mod facing;
pub mod playerinput;
pub mod radar;
pub mod script;
pub mod state;
pub mod vectors;
