//! Per-pass processors.
//!
//! Every type here implements [`System`](crate::ecs::scheduler::System).
//! [`default_pipeline`] registers them in the order the simulation relies
//! on: intent, then integration, then collision, then presentation.
//!
//! Submodules overview
//! - [`animation`] – advance sprite animation frames
//! - [`camera`] – keep follow cameras centred on the player
//! - [`collision`] – tile bucketing, rollback, entity pairs and raycasts
//! - [`facing`] – turn entities toward their horizontal velocity
//! - [`input`] – translate Left/Right key events into target velocity
//! - [`interaction`] – post interact events for overlapping props
//! - [`physics`] – integrate acceleration and velocity
//! - [`radar`] – line-of-sight pings toward watched groups
//! - [`script`] – run per-entity script callbacks

pub mod animation;
pub mod camera;
pub mod collision;
pub mod facing;
pub mod input;
pub mod interaction;
pub mod physics;
pub mod radar;
pub mod script;

use std::rc::Rc;

use crate::ecs::scheduler::Scheduler;
use crate::error::SimError;
use crate::resources::tilemap::TileMap;

/// Scheduler with every built-in system in pipeline order. A map the
/// spatial systems cannot use is rejected here, before the first pass.
pub fn default_pipeline(map: Rc<dyn TileMap>) -> Result<Scheduler, SimError> {
    Ok(Scheduler::new()
        .with_system(input::PlayerInputSystem::new())
        .with_system(interaction::InteractionSystem::new())
        .with_system(radar::RadarSystem::new(Rc::clone(&map))?)
        .with_system(script::ScriptSystem::new())
        .with_system(physics::PhysicsSystem::new())
        .with_system(collision::TileCollisionSystem::new(map)?)
        .with_system(facing::FacingSystem::new())
        .with_system(animation::AnimationSystem::new())
        .with_system(camera::CameraSystem::new()))
}
