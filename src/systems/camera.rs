//! Camera follow.
//!
//! A camera in [`CameraMode::Follow`] moves its entity so the viewport is
//! centred on the first member of the `player` group. Fixed cameras are left
//! alone.

use glam::Vec2;

use crate::components::camera::{Camera, CameraMode};
use crate::components::vectors::{Dimension, Position};
use crate::ecs::component::{ComponentKind, ComponentSet};
use crate::ecs::entity::EntityId;
use crate::ecs::scheduler::System;
use crate::ecs::world::World;
use crate::error::SimError;

pub const FOLLOW_GROUP: &str = "player";

#[derive(Debug, Default)]
pub struct CameraSystem;

impl CameraSystem {
    pub fn new() -> Self {
        Self
    }
}

/// Centre of the first positioned member of the follow group.
fn follow_target(world: &World) -> Option<Vec2> {
    world.groups().get(FOLLOW_GROUP).iter().find_map(|&target| {
        let position = world.try_get::<Position>(target)?.0;
        let size = world.try_get::<Dimension>(target).map_or(Vec2::ZERO, |d| d.0);
        Some(position + size / 2.0)
    })
}

impl System for CameraSystem {
    fn name(&self) -> &str {
        "camera"
    }

    fn requirements(&self) -> ComponentSet {
        ComponentSet::of(&[ComponentKind::Camera, ComponentKind::Position])
    }

    fn process(
        &mut self,
        world: &mut World,
        entities: &[EntityId],
        _dt: f32,
    ) -> Result<(), SimError> {
        let Some(centre) = follow_target(world) else {
            return Ok(());
        };
        for &entity in entities {
            let camera = world.get::<Camera>(entity)?;
            if camera.mode != CameraMode::Follow {
                continue;
            }
            let origin = centre - camera.viewport / 2.0;
            world.get_mut::<Position>(entity)?.0 = origin;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_camera_centres_on_player() {
        let mut world = World::new();
        let player = world.create_entity();
        world.attach(player, Position::new(100.0, 50.0)).unwrap();
        world.attach(player, Dimension::new(4.0, 12.0)).unwrap();
        world.add_to_group(FOLLOW_GROUP, player).unwrap();

        let follow = world.create_entity();
        world.attach(follow, Position::default()).unwrap();
        world.attach(follow, Camera::follow(Vec2::new(64.0, 64.0))).unwrap();
        let fixed = world.create_entity();
        world.attach(fixed, Position::new(5.0, 5.0)).unwrap();
        world.attach(fixed, Camera::default()).unwrap();

        let mut sys = CameraSystem::new();
        let entities = world.entities_with(sys.requirements());
        sys.process(&mut world, &entities, 1.0 / 60.0).unwrap();

        assert_eq!(world.get::<Position>(follow).unwrap().0, Vec2::new(70.0, 24.0));
        assert_eq!(world.get::<Position>(fixed).unwrap().0, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn no_player_leaves_camera() {
        let mut world = World::new();
        let cam = world.create_entity();
        world.attach(cam, Position::new(1.0, 1.0)).unwrap();
        world.attach(cam, Camera::follow(Vec2::new(64.0, 64.0))).unwrap();
        let mut sys = CameraSystem::new();
        let entities = world.entities_with(sys.requirements());
        sys.process(&mut world, &entities, 1.0 / 60.0).unwrap();
        assert_eq!(world.get::<Position>(cam).unwrap().0, Vec2::new(1.0, 1.0));
    }
}
