//! Keyboard intent.
//!
//! Reads the key events queued for this pass and turns Left/Right into a
//! horizontal [`TargetVelocity`] for every enabled [`PlayerInput`] entity.
//! Releasing the key that set the current direction zeroes the target; the
//! physics system does the actual acceleration.

use log::trace;
use smallvec::SmallVec;

use crate::components::playerinput::PlayerInput;
use crate::components::vectors::TargetVelocity;
use crate::ecs::component::{ComponentKind, ComponentSet};
use crate::ecs::entity::EntityId;
use crate::ecs::scheduler::System;
use crate::ecs::world::World;
use crate::error::SimError;
use crate::events::Event;
use crate::events::input::Key;

#[derive(Debug, Default)]
pub struct PlayerInputSystem;

impl PlayerInputSystem {
    pub fn new() -> Self {
        Self
    }
}

/// Pressed/released horizontal keys in posting order.
fn horizontal_key_events(world: &World) -> SmallVec<[(Key, bool); 4]> {
    world
        .pending_events()
        .filter_map(|event| match event {
            Event::KeyDown { key } => Some((*key, true)),
            Event::KeyUp { key } => Some((*key, false)),
            _ => None,
        })
        .filter(|(key, _)| matches!(key, Key::Left | Key::Right))
        .collect()
}

impl System for PlayerInputSystem {
    fn name(&self) -> &str {
        "player_input"
    }

    fn requirements(&self) -> ComponentSet {
        ComponentSet::of(&[ComponentKind::PlayerInput, ComponentKind::TargetVelocity])
    }

    fn process(
        &mut self,
        world: &mut World,
        entities: &[EntityId],
        _dt: f32,
    ) -> Result<(), SimError> {
        let keys = horizontal_key_events(world);
        for &entity in entities {
            let player = *world.get::<PlayerInput>(entity)?;
            let target = world.get_mut::<TargetVelocity>(entity)?;
            if !player.enabled {
                target.0.x = 0.0;
                continue;
            }
            for &(key, pressed) in &keys {
                match (key, pressed) {
                    (Key::Left, true) => target.0.x = -player.speed,
                    (Key::Right, true) => target.0.x = player.speed,
                    (Key::Left, false) if target.0.x < 0.0 => target.0.x = 0.0,
                    (Key::Right, false) if target.0.x > 0.0 => target.0.x = 0.0,
                    _ => {}
                }
            }
            trace!("entity {entity} target velocity {:?}", target.0);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(world: &mut World) -> EntityId {
        let e = world.create_entity();
        world.attach(e, PlayerInput::with_speed(0.5)).unwrap();
        world.attach(e, TargetVelocity::default()).unwrap();
        e
    }

    fn run(world: &mut World) {
        let mut sys = PlayerInputSystem::new();
        let entities = world.entities_with(sys.requirements());
        sys.process(world, &entities, 1.0 / 60.0).unwrap();
    }

    #[test]
    fn key_down_sets_direction() {
        let mut world = World::new();
        let e = player(&mut world);
        world.post(Event::KeyDown { key: Key::Left });
        run(&mut world);
        assert_eq!(world.get::<TargetVelocity>(e).unwrap().0.x, -0.5);
    }

    #[test]
    fn releasing_other_direction_keeps_target() {
        let mut world = World::new();
        let e = player(&mut world);
        world.post(Event::KeyDown { key: Key::Right });
        world.post(Event::KeyUp { key: Key::Left });
        run(&mut world);
        assert_eq!(world.get::<TargetVelocity>(e).unwrap().0.x, 0.5);

        world.dispatch_events().unwrap();
        world.post(Event::KeyUp { key: Key::Right });
        run(&mut world);
        assert_eq!(world.get::<TargetVelocity>(e).unwrap().0.x, 0.0);
    }

    #[test]
    fn disabled_player_stops() {
        let mut world = World::new();
        let e = player(&mut world);
        world.get_mut::<TargetVelocity>(e).unwrap().0.x = 0.5;
        world.get_mut::<PlayerInput>(e).unwrap().enabled = false;
        world.post(Event::KeyDown { key: Key::Right });
        run(&mut world);
        assert_eq!(world.get::<TargetVelocity>(e).unwrap().0.x, 0.0);
    }

    #[test]
    fn vertical_keys_do_not_steer() {
        let mut world = World::new();
        let e = player(&mut world);
        world.post(Event::KeyDown { key: Key::Up });
        run(&mut world);
        assert_eq!(world.get::<TargetVelocity>(e).unwrap().0.x, 0.0);
    }
}
