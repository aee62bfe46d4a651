//! Fixed-timestep driver.
//!
//! A [`Session`] owns the active [`World`], its [`Scheduler`] and the
//! [`WorldTime`] clock. The host feeds it input with [`Session::post_input`]
//! and wall-clock time with [`Session::advance`]; the session runs as many
//! whole passes as the accumulated time allows, never a fractional one.
//!
//! A pass is one scheduler run followed by one event drain. The clock only
//! counts a pass once every system ran without error. When a handler
//! requests a scene transition, the remaining passes of that frame are
//! skipped so the host can swap worlds with [`Session::replace_world`].

use log::{debug, info, warn};

use crate::ecs::scheduler::Scheduler;
use crate::ecs::world::World;
use crate::error::SimError;
use crate::events::Event;
use crate::resources::simconfig::SimConfig;
use crate::resources::worldtime::WorldTime;

pub struct Session {
    world: World,
    scheduler: Scheduler,
    time: WorldTime,
    timestep: f32,
    max_steps_per_frame: u32,
    accumulator: f32,
}

impl Session {
    /// Build a session, validating the configuration first.
    pub fn new(world: World, scheduler: Scheduler, config: &SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        info!(
            "Session started: {} systems, {} entities, {} Hz",
            scheduler.len(),
            world.entity_count(),
            config.timestep_hz
        );
        Ok(Self {
            world,
            scheduler,
            time: WorldTime::with_time_scale(config.time_scale),
            timestep: config.timestep(),
            max_steps_per_frame: config.max_steps_per_frame,
            accumulator: 0.0,
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    pub fn time(&self) -> &WorldTime {
        &self.time
    }

    /// Unscaled length of one pass in seconds.
    pub fn timestep(&self) -> f32 {
        self.timestep
    }

    /// Queue an input event for the next pass.
    pub fn post_input(&mut self, event: Event) {
        self.world.post(event);
    }

    /// Run one pass: every system once, then drain the event queue. Returns
    /// the number of events dispatched.
    pub fn step(&mut self) -> Result<usize, SimError> {
        let dt = self.time.scaled(self.timestep);
        self.scheduler.run(&mut self.world, dt)?;
        self.time.tick(self.timestep);
        self.world.dispatch_events()
    }

    /// Add `wall_dt` seconds to the accumulator and run the passes it pays
    /// for, up to `max_steps_per_frame`. Returns the number of passes run.
    ///
    /// A failing pass aborts the frame and discards the accumulated time, so
    /// the next call does not replay the backlog into the same error.
    pub fn advance(&mut self, wall_dt: f32) -> Result<u32, SimError> {
        self.accumulator += wall_dt.max(0.0);
        let mut steps = 0;
        while self.accumulator >= self.timestep {
            if self.world.pending_transition().is_some() {
                debug!("transition pending, skipping remaining passes");
                break;
            }
            if steps == self.max_steps_per_frame {
                let dropped = (self.accumulator / self.timestep).floor();
                warn!("simulation is behind, dropping {dropped} passes");
                self.accumulator %= self.timestep;
                break;
            }
            if let Err(err) = self.step() {
                warn!("pass failed, discarding {:.3}s of backlog", self.accumulator);
                self.accumulator = 0.0;
                return Err(err);
            }
            self.accumulator -= self.timestep;
            steps += 1;
        }
        Ok(steps)
    }

    /// Scene switch requested by a handler, if any.
    pub fn take_transition(&mut self) -> Option<String> {
        self.world.take_transition()
    }

    /// Swap in a new world (scene switch) and return the old one. Time left
    /// in the accumulator is discarded.
    pub fn replace_world(&mut self, world: World) -> World {
        self.accumulator = 0.0;
        info!("World replaced: {} entities", world.entity_count());
        std::mem::replace(&mut self.world, world)
    }

    /// Swap both the world and its pipeline.
    pub fn replace_scene(&mut self, world: World, scheduler: Scheduler) -> World {
        self.scheduler = scheduler;
        self.replace_world(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::state::Blackboard;
    use crate::ecs::component::ComponentSet;
    use crate::ecs::entity::EntityId;
    use crate::ecs::scheduler::System;
    use crate::events::EventKind;
    use crate::events::bus::Handler;

    struct Counter {
        passes: std::rc::Rc<std::cell::Cell<u32>>,
    }

    impl System for Counter {
        fn name(&self) -> &str {
            "counter"
        }

        fn requirements(&self) -> ComponentSet {
            ComponentSet::EMPTY
        }

        fn process(&mut self, _: &mut World, _: &[EntityId], _: f32) -> Result<(), SimError> {
            self.passes.set(self.passes.get() + 1);
            Ok(())
        }
    }

    struct Broken;

    impl System for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn requirements(&self) -> ComponentSet {
            ComponentSet::EMPTY
        }

        fn process(&mut self, _: &mut World, _: &[EntityId], _: f32) -> Result<(), SimError> {
            Err(SimError::NoSuchEntity(EntityId(7)))
        }
    }

    fn session() -> (Session, std::rc::Rc<std::cell::Cell<u32>>) {
        let passes = std::rc::Rc::new(std::cell::Cell::new(0));
        let scheduler = Scheduler::new().with_system(Counter {
            passes: passes.clone(),
        });
        let config = SimConfig {
            timestep_hz: 10,
            max_steps_per_frame: 3,
            ..SimConfig::new()
        };
        (Session::new(World::new(), scheduler, &config).unwrap(), passes)
    }

    fn game_over(
        world: &mut World,
        _owner: Option<EntityId>,
        _event: &Event,
        _context: &Blackboard,
    ) -> Result<(), SimError> {
        world.request_transition("game_over");
        Ok(())
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SimConfig {
            timestep_hz: 0,
            ..SimConfig::new()
        };
        assert!(Session::new(World::new(), Scheduler::new(), &config).is_err());
    }

    #[test]
    fn advance_runs_whole_passes_only() {
        let (mut session, passes) = session();
        assert_eq!(session.advance(0.05).unwrap(), 0);
        assert_eq!(session.advance(0.06).unwrap(), 1);
        assert_eq!(session.advance(0.2).unwrap(), 2);
        assert_eq!(passes.get(), 3);
        assert_eq!(session.time().frame_count, 3);
    }

    #[test]
    fn advance_caps_passes_per_frame() {
        let (mut session, passes) = session();
        assert_eq!(session.advance(10.0).unwrap(), 3);
        assert_eq!(passes.get(), 3);
        // The backlog was dropped.
        assert_eq!(session.advance(0.0).unwrap(), 0);
    }

    #[test]
    fn transition_skips_remaining_passes() {
        let (mut session, passes) = session();
        session.world_mut().on(EventKind::GameOver, Handler::new(game_over));
        session.post_input(Event::GameOver);
        assert_eq!(session.advance(0.25).unwrap(), 1);
        assert_eq!(passes.get(), 1);
        assert_eq!(session.take_transition().as_deref(), Some("game_over"));

        let old = session.replace_world(World::new());
        assert!(old.pending_transition().is_none());
        assert_eq!(session.advance(0.1).unwrap(), 1);
    }

    #[test]
    fn failed_pass_is_not_counted_or_replayed() {
        let config = SimConfig {
            timestep_hz: 10,
            ..SimConfig::new()
        };
        let scheduler = Scheduler::new().with_system(Broken);
        let mut session = Session::new(World::new(), scheduler, &config).unwrap();

        assert!(session.advance(0.25).is_err());
        assert_eq!(session.time().frame_count, 0);
        assert_eq!(session.time().elapsed, 0.0);
        // The backlog went with the failed frame.
        assert_eq!(session.advance(0.0).unwrap(), 0);
        assert!(session.step().is_err());
        assert_eq!(session.time().frame_count, 0);
    }

    #[test]
    fn step_returns_dispatched_count() {
        let (mut session, _) = session();
        session.post_input(Event::Quit);
        session.post_input(Event::sound("door"));
        assert_eq!(session.step().unwrap(), 2);
        assert_eq!(session.step().unwrap(), 0);
    }
}
