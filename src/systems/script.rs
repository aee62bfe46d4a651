//! Runs [`Script`] callbacks once per pass, in attachment order.

use crate::components::script::{Script, ScriptEntry};
use crate::ecs::component::{ComponentKind, ComponentSet};
use crate::ecs::entity::EntityId;
use crate::ecs::scheduler::System;
use crate::ecs::world::World;
use crate::error::SimError;

#[derive(Debug, Default)]
pub struct ScriptSystem;

impl ScriptSystem {
    pub fn new() -> Self {
        Self
    }
}

impl System for ScriptSystem {
    fn name(&self) -> &str {
        "script"
    }

    fn requirements(&self) -> ComponentSet {
        ComponentSet::of(&[ComponentKind::Script])
    }

    fn process(
        &mut self,
        world: &mut World,
        entities: &[EntityId],
        dt: f32,
    ) -> Result<(), SimError> {
        for &entity in entities {
            // A script may destroy its own or another scripted entity.
            let Some(script) = world.try_get::<Script>(entity) else {
                continue;
            };
            let entries: Vec<ScriptEntry> = script.entries().to_vec();
            for entry in entries {
                if !world.is_alive(entity) {
                    break;
                }
                (entry.callback)(world, entity, dt, &entry.context)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::state::{Blackboard, State};

    fn count_up(
        world: &mut World,
        entity: EntityId,
        dt: f32,
        context: &Blackboard,
    ) -> Result<(), SimError> {
        let step = context.get_int("step").unwrap_or(1);
        let state = world.get_mut::<State>(entity)?;
        let count = state.get_int("count").unwrap_or(0);
        state.set("count", count + step);
        state.set("dt", dt);
        Ok(())
    }

    fn self_destruct(
        world: &mut World,
        entity: EntityId,
        _dt: f32,
        _context: &Blackboard,
    ) -> Result<(), SimError> {
        world.destroy_entity(entity)
    }

    fn needs_state(
        world: &mut World,
        entity: EntityId,
        _dt: f32,
        _context: &Blackboard,
    ) -> Result<(), SimError> {
        world.get::<State>(entity).map(|_| ())
    }

    fn run(world: &mut World) -> Result<(), SimError> {
        let mut sys = ScriptSystem::new();
        let entities = world.entities_with(sys.requirements());
        sys.process(world, &entities, 0.5)
    }

    #[test]
    fn entries_run_in_order_with_context() {
        let mut world = World::new();
        let e = world.create_entity();
        world.attach(e, State::default()).unwrap();
        world
            .attach(
                e,
                Script::new()
                    .with(count_up, Blackboard::new())
                    .with(count_up, Blackboard::new().with("step", 10)),
            )
            .unwrap();
        run(&mut world).unwrap();
        let state = world.get::<State>(e).unwrap();
        assert_eq!(state.get_int("count"), Some(11));
        assert_eq!(state.get_float("dt"), Some(0.5));
    }

    #[test]
    fn destroyed_entity_stops_running() {
        let mut world = World::new();
        let e = world.create_entity();
        world
            .attach(
                e,
                Script::new()
                    .with(self_destruct, Blackboard::new())
                    .with(count_up, Blackboard::new()),
            )
            .unwrap();
        run(&mut world).unwrap();
        assert!(!world.is_alive(e));
    }

    #[test]
    fn script_error_propagates() {
        let mut world = World::new();
        let e = world.create_entity();
        world
            .attach(e, Script::new().with(needs_state, Blackboard::new()))
            .unwrap();
        assert!(matches!(
            run(&mut world),
            Err(SimError::MissingComponent { .. })
        ));
    }
}
