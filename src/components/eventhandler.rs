//! Entity-scoped event handlers.
//!
//! [`EventHandler`] keeps one ordered handler list per [`EventKind`]; every
//! queued event of that kind reaches it during the drain. [`Interactable`] is
//! the narrower form used by props: its handlers only run for
//! `Event::Interact` events whose target is the owning entity.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::events::EventKind;
use crate::events::bus::Handler;

#[derive(Debug, Clone, Default)]
pub struct EventHandler {
    handlers: FxHashMap<EventKind, SmallVec<[Handler; 1]>>,
}

impl EventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`EventHandler::attach`].
    pub fn with(mut self, kind: EventKind, handler: Handler) -> Self {
        self.attach(kind, handler);
        self
    }

    /// Append `handler` to the list for `kind`.
    pub fn attach(&mut self, kind: EventKind, handler: Handler) {
        self.handlers.entry(kind).or_default().push(handler);
    }

    pub fn handlers_for(&self, kind: EventKind) -> &[Handler] {
        self.handlers
            .get(&kind)
            .map(|list| list.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default)]
pub struct Interactable {
    handlers: SmallVec<[Handler; 1]>,
}

impl Interactable {
    pub fn new(handler: Handler) -> Self {
        let mut interactable = Self::default();
        interactable.attach(handler);
        interactable
    }

    pub fn attach(&mut self, handler: Handler) {
        self.handlers.push(handler);
    }

    pub fn handlers(&self) -> &[Handler] {
        &self.handlers
    }
}
