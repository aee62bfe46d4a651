//! World-owned event queue and world-level handler registry.
//!
//! Producers [`post`](EventBus::post) events onto a FIFO. Once per update
//! cycle the [`World`](crate::ecs::world::World) takes the whole queue with
//! [`EventBus::take_pending`] and dispatches it; anything posted while that
//! drain runs lands in the fresh queue and waits for the next drain point.
//!
//! Handlers are a function pointer plus an explicit [`Blackboard`] context.
//! Registration is additive and keeps registration order.

use std::collections::VecDeque;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::components::state::Blackboard;
use crate::ecs::entity::EntityId;
use crate::ecs::world::World;
use crate::error::SimError;
use crate::events::{Event, EventKind};

/// Handler signature.
///
/// `owner` is the entity whose component registered the handler, or `None`
/// for world-level handlers. `context` is the data captured at registration.
pub type HandlerFn = fn(
    world: &mut World,
    owner: Option<EntityId>,
    event: &Event,
    context: &Blackboard,
) -> Result<(), SimError>;

/// A callback paired with the context it was registered with.
#[derive(Debug, Clone)]
pub struct Handler {
    pub callback: HandlerFn,
    pub context: Rc<Blackboard>,
}

impl Handler {
    pub fn new(callback: HandlerFn) -> Self {
        Self {
            callback,
            context: Rc::new(Blackboard::default()),
        }
    }

    pub fn with_context(callback: HandlerFn, context: Blackboard) -> Self {
        Self {
            callback,
            context: Rc::new(context),
        }
    }

    pub fn call(
        &self,
        world: &mut World,
        owner: Option<EntityId>,
        event: &Event,
    ) -> Result<(), SimError> {
        (self.callback)(world, owner, event, &self.context)
    }
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: VecDeque<Event>,
    handlers: FxHashMap<EventKind, SmallVec<[Handler; 2]>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    pub fn post_all(&mut self, events: impl IntoIterator<Item = Event>) {
        self.queue.extend(events);
    }

    /// Register a world-level handler for `kind`.
    pub fn on(&mut self, kind: EventKind, handler: Handler) {
        self.handlers.entry(kind).or_default().push(handler);
    }

    pub fn handlers_for(&self, kind: EventKind) -> &[Handler] {
        self.handlers
            .get(&kind)
            .map(|list| list.as_slice())
            .unwrap_or(&[])
    }

    /// Events waiting for the next drain, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &Event> {
        self.queue.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    /// Take the whole queue, leaving an empty one for events posted during
    /// dispatch.
    pub fn take_pending(&mut self) -> VecDeque<Event> {
        std::mem::take(&mut self.queue)
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
