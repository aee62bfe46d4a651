//! Interact key handling.
//!
//! When `Key::Interact` is pressed, every enabled player entity posts one
//! `Event::Interact { actor, target }` per peer in its collision set that
//! carries an `Interactable`. The collision set is the one computed by the
//! previous pass, since collision runs later in the pipeline.

use log::debug;
use smallvec::SmallVec;

use crate::components::collidable::Collidable;
use crate::components::playerinput::PlayerInput;
use crate::ecs::component::{ComponentKind, ComponentSet};
use crate::ecs::entity::EntityId;
use crate::ecs::scheduler::System;
use crate::ecs::world::World;
use crate::error::SimError;
use crate::events::Event;
use crate::events::input::Key;

#[derive(Debug, Default)]
pub struct InteractionSystem;

impl InteractionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl System for InteractionSystem {
    fn name(&self) -> &str {
        "interaction"
    }

    fn requirements(&self) -> ComponentSet {
        ComponentSet::of(&[ComponentKind::PlayerInput, ComponentKind::Collidable])
    }

    fn process(
        &mut self,
        world: &mut World,
        entities: &[EntityId],
        _dt: f32,
    ) -> Result<(), SimError> {
        let pressed = world
            .pending_events()
            .any(|event| matches!(event, Event::KeyDown { key: Key::Interact }));
        if !pressed {
            return Ok(());
        }

        for &actor in entities {
            if !world.get::<PlayerInput>(actor)?.enabled {
                continue;
            }
            let targets: SmallVec<[EntityId; 4]> = world
                .get::<Collidable>(actor)?
                .collision_set
                .iter()
                .copied()
                .filter(|peer| world.has(*peer, ComponentKind::Interactable))
                .collect();
            for target in targets {
                debug!("entity {actor} interacts with {target}");
                world.post(Event::Interact { actor, target });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::eventhandler::Interactable;
    use crate::components::state::Blackboard;
    use crate::events::bus::Handler;

    fn noop(
        _world: &mut World,
        _owner: Option<EntityId>,
        _event: &Event,
        _context: &Blackboard,
    ) -> Result<(), SimError> {
        Ok(())
    }

    fn setup() -> (World, EntityId, EntityId, EntityId) {
        let mut world = World::new();
        let actor = world.create_entity();
        let terminal = world.create_entity();
        let wall = world.create_entity();
        world.attach(actor, PlayerInput::default()).unwrap();
        let mut collidable = Collidable::new();
        collidable.collision_set.insert(terminal);
        collidable.collision_set.insert(wall);
        world.attach(actor, collidable).unwrap();
        world.attach(terminal, Interactable::new(Handler::new(noop))).unwrap();
        (world, actor, terminal, wall)
    }

    fn run(world: &mut World) {
        let mut sys = InteractionSystem::new();
        let entities = world.entities_with(sys.requirements());
        sys.process(world, &entities, 1.0 / 60.0).unwrap();
    }

    #[test]
    fn interact_targets_only_interactable_peers() {
        let (mut world, actor, terminal, _wall) = setup();
        world.post(Event::KeyDown { key: Key::Interact });
        run(&mut world);
        let interacts: Vec<Event> = world
            .pending_events()
            .filter(|e| matches!(e, Event::Interact { .. }))
            .cloned()
            .collect();
        assert_eq!(interacts, vec![Event::Interact { actor, target: terminal }]);
    }

    #[test]
    fn no_key_no_interaction() {
        let (mut world, _actor, _terminal, _wall) = setup();
        run(&mut world);
        assert_eq!(world.pending_events().count(), 0);
    }
}
