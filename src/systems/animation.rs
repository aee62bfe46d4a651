//! Animation playback.
//!
//! Accumulates the pass delta on each [`Animation`] and steps `frame_index`
//! once per `1 / framerate` seconds. Looping animations wrap; one-shot ones
//! hold the last frame.

use crate::components::animation::Animation;
use crate::ecs::component::{ComponentKind, ComponentSet};
use crate::ecs::entity::EntityId;
use crate::ecs::scheduler::System;
use crate::ecs::world::World;
use crate::error::SimError;

#[derive(Debug, Default)]
pub struct AnimationSystem;

impl AnimationSystem {
    pub fn new() -> Self {
        Self
    }
}

/// Advance `animation` by `dt` seconds.
pub fn advance(animation: &mut Animation, dt: f32) {
    if animation.framerate <= 0.0 || animation.frame_count == 0 {
        return;
    }
    let frame_time = 1.0 / animation.framerate;
    animation.elapsed += dt;
    while animation.elapsed >= frame_time {
        animation.elapsed -= frame_time;
        if animation.frame_index + 1 < animation.frame_count {
            animation.frame_index += 1;
        } else if animation.looped {
            animation.frame_index = 0;
        } else {
            animation.elapsed = 0.0;
            break;
        }
    }
}

impl System for AnimationSystem {
    fn name(&self) -> &str {
        "animation"
    }

    fn requirements(&self) -> ComponentSet {
        ComponentSet::of(&[ComponentKind::Animation])
    }

    fn process(
        &mut self,
        world: &mut World,
        entities: &[EntityId],
        dt: f32,
    ) -> Result<(), SimError> {
        for &entity in entities {
            advance(world.get_mut::<Animation>(entity)?, dt);
        }
        Ok(())
    }
}
