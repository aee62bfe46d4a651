//! Ordered system pipeline.
//!
//! Each [`System`] declares the component kinds it requires. On every pass
//! [`Scheduler::run`] walks the systems in registration order, computes the
//! matching entities at the start of each system's turn and calls
//! [`System::process`] exactly once, even when nothing matches.
//!
//! Order is part of the contract: intent (input) runs before physics
//! integration, which runs before collision, which runs before animation and
//! camera updates, because later systems read what earlier ones wrote in the
//! same pass.

use log::{error, trace};

use crate::ecs::component::ComponentSet;
use crate::ecs::entity::EntityId;
use crate::ecs::world::World;
use crate::error::SimError;

pub trait System {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Kinds an entity must carry to be passed to [`System::process`].
    fn requirements(&self) -> ComponentSet;

    /// Process the matching entities (ascending id order) for one pass.
    fn process(
        &mut self,
        world: &mut World,
        entities: &[EntityId],
        dt: f32,
    ) -> Result<(), SimError>;
}

#[derive(Default)]
pub struct Scheduler {
    systems: Vec<Box<dyn System>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a system to the end of the pipeline.
    pub fn add_system(&mut self, system: impl System + 'static) -> &mut Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.add_system(system);
        self
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    /// Run one pass. The first failing system aborts the rest of the pass.
    pub fn run(&mut self, world: &mut World, dt: f32) -> Result<(), SimError> {
        for system in self.systems.iter_mut() {
            let matched = world.entities_with(system.requirements());
            trace!("{}: {} entities", system.name(), matched.len());
            if let Err(e) = system.process(world, &matched, dt) {
                error!("system '{}' aborted the frame: {e}", system.name());
                return Err(e);
            }
        }
        Ok(())
    }
}
