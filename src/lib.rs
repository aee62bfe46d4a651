//! Ghostcore: the runtime core of a 2D tile-based stealth simulation.
//!
//! An entity-component-system substrate (closed component kinds, bitset
//! requirements, ordered system pipeline, queued events) plus a spatial
//! collision engine over a static tile grid.
//!
//! - [`components`] – component payloads
//! - [`ecs`] – entities, component stores, groups, the world and the scheduler
//! - [`error`] – the shared error type
//! - [`events`] – event values and the event bus
//! - [`level`] – the built-in demo level
//! - [`prefab`] – spawning entities from JSON descriptions
//! - [`resources`] – configuration, tile maps and the clock
//! - [`session`] – the fixed-timestep driver
//! - [`spatial`] – box overlap, tile ranges, edges and raycasts
//! - [`systems`] – the built-in pipeline

pub mod components;
pub mod ecs;
pub mod error;
pub mod events;
pub mod level;
pub mod prefab;
pub mod resources;
pub mod session;
pub mod spatial;
pub mod systems;
