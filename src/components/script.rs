//! Per-frame behaviour callbacks.
//!
//! A [`Script`] is an ordered list of function pointers, each paired with the
//! [`Blackboard`] it was created with. The script system calls them once per
//! pass. Mutable per-entity data lives in components (usually
//! [`State`](super::state::State)), not in the context.

use std::rc::Rc;

use crate::components::state::Blackboard;
use crate::ecs::entity::EntityId;
use crate::ecs::world::World;
use crate::error::SimError;

pub type ScriptFn = fn(
    world: &mut World,
    entity: EntityId,
    dt: f32,
    context: &Blackboard,
) -> Result<(), SimError>;

#[derive(Debug, Clone)]
pub struct ScriptEntry {
    pub callback: ScriptFn,
    pub context: Rc<Blackboard>,
}

#[derive(Debug, Clone, Default)]
pub struct Script {
    entries: Vec<ScriptEntry>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, callback: ScriptFn, context: Blackboard) -> Self {
        self.attach(callback, context);
        self
    }

    pub fn attach(&mut self, callback: ScriptFn, context: Blackboard) {
        self.entries.push(ScriptEntry {
            callback,
            context: Rc::new(context),
        });
    }

    pub fn entries(&self) -> &[ScriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
