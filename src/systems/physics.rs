//! Velocity integration.
//!
//! For each entity with `Position` and `Velocity`:
//! - stores the current position in `LastPosition` when the entity has one,
//! - steers velocity toward `TargetVelocity` at the rate given by the length
//!   of `Acceleration` when both are present, otherwise adds
//!   `Acceleration * dt`,
//! - adds velocity to position (velocity is a per-step displacement).

use glam::Vec2;

use crate::components::vectors::{Acceleration, LastPosition, Position, TargetVelocity, Velocity};
use crate::ecs::component::{ComponentKind, ComponentSet};
use crate::ecs::entity::EntityId;
use crate::ecs::scheduler::System;
use crate::ecs::world::World;
use crate::error::SimError;

#[derive(Debug, Default)]
pub struct PhysicsSystem;

impl PhysicsSystem {
    pub fn new() -> Self {
        Self
    }
}

/// Move `current` toward `target` by at most `max_delta` per axis.
fn approach(current: Vec2, target: Vec2, max_delta: f32) -> Vec2 {
    let step = |c: f32, t: f32| {
        if (t - c).abs() <= max_delta {
            t
        } else {
            c + max_delta.copysign(t - c)
        }
    };
    Vec2::new(step(current.x, target.x), step(current.y, target.y))
}

impl System for PhysicsSystem {
    fn name(&self) -> &str {
        "physics"
    }

    fn requirements(&self) -> ComponentSet {
        ComponentSet::of(&[ComponentKind::Position, ComponentKind::Velocity])
    }

    fn process(
        &mut self,
        world: &mut World,
        entities: &[EntityId],
        dt: f32,
    ) -> Result<(), SimError> {
        for &entity in entities {
            let position = world.get::<Position>(entity)?.0;
            if let Some(last) = world.try_get_mut::<LastPosition>(entity) {
                last.0 = position;
            }

            let acceleration = world.try_get::<Acceleration>(entity).map(|a| a.0);
            let target = world.try_get::<TargetVelocity>(entity).map(|t| t.0);
            let velocity = world.get_mut::<Velocity>(entity)?;
            match (acceleration, target) {
                (Some(acc), Some(target)) => {
                    velocity.0 = approach(velocity.0, target, acc.length() * dt);
                }
                (Some(acc), None) => velocity.0 += acc * dt,
                _ => {}
            }
            let displacement = velocity.0;

            world.get_mut::<Position>(entity)?.0 += displacement;
        }
        Ok(())
    }
}
