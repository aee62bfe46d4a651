//! Facing follows the sign of horizontal velocity.
//!
//! A stationary entity keeps its facing. When the entity is drawable, its
//! sprite is flipped while facing left.

use crate::components::drawable::Drawable;
use crate::components::facing::Facing;
use crate::components::vectors::Velocity;
use crate::ecs::component::{ComponentKind, ComponentSet};
use crate::ecs::entity::EntityId;
use crate::ecs::scheduler::System;
use crate::ecs::world::World;
use crate::error::SimError;

#[derive(Debug, Default)]
pub struct FacingSystem;

impl FacingSystem {
    pub fn new() -> Self {
        Self
    }
}

impl System for FacingSystem {
    fn name(&self) -> &str {
        "facing"
    }

    fn requirements(&self) -> ComponentSet {
        ComponentSet::of(&[ComponentKind::Facing, ComponentKind::Velocity])
    }

    fn process(
        &mut self,
        world: &mut World,
        entities: &[EntityId],
        _dt: f32,
    ) -> Result<(), SimError> {
        for &entity in entities {
            let vx = world.get::<Velocity>(entity)?.0.x;
            let facing = world.get_mut::<Facing>(entity)?;
            if vx > 0.0 {
                *facing = Facing::Right;
            } else if vx < 0.0 {
                *facing = Facing::Left;
            }
            let facing = *facing;
            if let Some(drawable) = world.try_get_mut::<Drawable>(entity) {
                drawable.flipped = facing == Facing::Left;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(world: &mut World) {
        let mut sys = FacingSystem::new();
        let entities = world.entities_with(sys.requirements());
        sys.process(world, &entities, 1.0 / 60.0).unwrap();
    }

    #[test]
    fn facing_tracks_velocity_sign() {
        let mut world = World::new();
        let e = world.create_entity();
        world.attach(e, Facing::Right).unwrap();
        world.attach(e, Velocity::new(-0.3, 0.0)).unwrap();
        world.attach(e, Drawable::new("ghost", 1)).unwrap();
        run(&mut world);
        assert_eq!(*world.get::<Facing>(e).unwrap(), Facing::Left);
        assert!(world.get::<Drawable>(e).unwrap().flipped);

        world.get_mut::<Velocity>(e).unwrap().0.x = 0.0;
        run(&mut world);
        assert_eq!(*world.get::<Facing>(e).unwrap(), Facing::Left);

        world.get_mut::<Velocity>(e).unwrap().0.x = 0.1;
        run(&mut world);
        assert_eq!(*world.get::<Facing>(e).unwrap(), Facing::Right);
        assert!(!world.get::<Drawable>(e).unwrap().flipped);
    }
}
