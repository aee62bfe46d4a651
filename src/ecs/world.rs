//! The simulation context handed to every system, handler and factory call.
//!
//! A [`World`] owns the entity registry (ids plus their component stores),
//! the [`GroupIndex`] and the [`EventBus`]. It is built at level load and
//! dropped at level exit; nothing about it is global.

use std::collections::BTreeMap;

use log::{debug, error, trace};
use smallvec::SmallVec;

use crate::components::eventhandler::{EventHandler, Interactable};
use crate::ecs::component::{Component, ComponentData, ComponentKind, ComponentSet};
use crate::ecs::entity::{ComponentStore, EntityId};
use crate::ecs::group::GroupIndex;
use crate::error::SimError;
use crate::events::bus::{EventBus, Handler};
use crate::events::{Event, EventKind};

#[derive(Debug, Default)]
pub struct World {
    next_id: u32,
    entities: BTreeMap<EntityId, ComponentStore>,
    groups: GroupIndex,
    events: EventBus,
    transition: Option<String>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------------
    // Registry
    // ---------------------------------------------------------------------

    /// Allocate a fresh id with an empty component store.
    pub fn create_entity(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, ComponentStore::new());
        trace!("created entity {id}");
        id
    }

    /// Remove `entity` from the registry and from every group.
    pub fn destroy_entity(&mut self, entity: EntityId) -> Result<(), SimError> {
        if self.entities.remove(&entity).is_none() {
            return Err(SimError::NoSuchEntity(entity));
        }
        self.groups.purge(entity);
        debug!("destroyed entity {entity}");
        Ok(())
    }

    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Live entity ids in ascending order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Live entities whose component mask contains every kind in `required`,
    /// in ascending id order.
    pub fn entities_with(&self, required: ComponentSet) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, store)| store.mask().is_superset_of(required))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn store(&self, entity: EntityId) -> Result<&ComponentStore, SimError> {
        self.entities
            .get(&entity)
            .ok_or(SimError::NoSuchEntity(entity))
    }

    fn store_mut(&mut self, entity: EntityId) -> Result<&mut ComponentStore, SimError> {
        self.entities
            .get_mut(&entity)
            .ok_or(SimError::NoSuchEntity(entity))
    }

    // ---------------------------------------------------------------------
    // Components
    // ---------------------------------------------------------------------

    /// Attach a component, replacing any existing one of the same kind.
    /// Returns the replaced instance.
    pub fn attach(
        &mut self,
        entity: EntityId,
        component: impl Into<Component>,
    ) -> Result<Option<Component>, SimError> {
        let component = component.into();
        trace!("attach {} to {entity}", component.kind());
        Ok(self.store_mut(entity)?.insert(component))
    }

    pub fn detach(
        &mut self,
        entity: EntityId,
        kind: ComponentKind,
    ) -> Result<Component, SimError> {
        self.store_mut(entity)?
            .remove(kind)
            .ok_or_else(|| SimError::UnknownComponent {
                entity,
                name: kind.name().to_string(),
            })
    }

    /// Detach by kind name, as used by data-driven callers.
    pub fn detach_named(&mut self, entity: EntityId, name: &str) -> Result<Component, SimError> {
        let Some(kind) = ComponentKind::from_name(name) else {
            self.store(entity)?;
            return Err(SimError::UnknownComponent {
                entity,
                name: name.to_string(),
            });
        };
        self.detach(entity, kind)
    }

    /// `false` for dead entities.
    pub fn has(&self, entity: EntityId, kind: ComponentKind) -> bool {
        self.entities
            .get(&entity)
            .is_some_and(|store| store.contains(kind))
    }

    /// Required-component read. Absence is a programming error in the caller.
    pub fn get<T: ComponentData>(&self, entity: EntityId) -> Result<&T, SimError> {
        self.store(entity)?
            .get::<T>()
            .ok_or(SimError::MissingComponent {
                entity,
                kind: T::KIND,
            })
    }

    pub fn get_mut<T: ComponentData>(&mut self, entity: EntityId) -> Result<&mut T, SimError> {
        self.store_mut(entity)?
            .get_mut::<T>()
            .ok_or(SimError::MissingComponent {
                entity,
                kind: T::KIND,
            })
    }

    /// Optional-component read: `None` when the entity or component is absent.
    pub fn try_get<T: ComponentData>(&self, entity: EntityId) -> Option<&T> {
        self.entities.get(&entity).and_then(ComponentStore::get::<T>)
    }

    pub fn try_get_mut<T: ComponentData>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.entities
            .get_mut(&entity)
            .and_then(ComponentStore::get_mut::<T>)
    }

    // ---------------------------------------------------------------------
    // Groups
    // ---------------------------------------------------------------------

    pub fn add_to_group(&mut self, group: impl Into<String>, entity: EntityId) -> Result<(), SimError> {
        if !self.is_alive(entity) {
            return Err(SimError::NoSuchEntity(entity));
        }
        let group = group.into();
        trace!("group '{group}' += {entity}");
        self.groups.add(group, entity);
        Ok(())
    }

    pub fn remove_from_group(&mut self, group: &str, entity: EntityId) -> bool {
        self.groups.remove(group, entity)
    }

    pub fn groups(&self) -> &GroupIndex {
        &self.groups
    }

    /// Snapshot of a group's members, safe to hold while mutating the world.
    pub fn group_members(&self, group: &str) -> Vec<EntityId> {
        self.groups.get(group).iter().copied().collect()
    }

    pub fn in_group(&self, entity: EntityId, group: &str) -> bool {
        self.groups.check(entity, group)
    }

    // ---------------------------------------------------------------------
    // Events
    // ---------------------------------------------------------------------

    /// Queue an event for the next drain point.
    pub fn post(&mut self, event: Event) {
        self.events.post(event);
    }

    pub fn post_all(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.post_all(events);
    }

    /// Register a world-level handler.
    pub fn on(&mut self, kind: EventKind, handler: Handler) {
        self.events.on(kind, handler);
    }

    pub fn on_many(&mut self, kinds: &[EventKind], handler: Handler) {
        for kind in kinds {
            self.events.on(*kind, handler.clone());
        }
    }

    /// Events queued since the last drain, oldest first.
    pub fn pending_events(&self) -> impl Iterator<Item = &Event> {
        self.events.pending()
    }

    /// Drain the queue: every pending event goes, in FIFO order, to the
    /// world-level handlers for its kind, then to matching `EventHandler`
    /// components (ascending entity id), then, for `Interact`, to the target's
    /// `Interactable` handlers. Events posted by handlers wait for the next
    /// call. Returns the number of events dispatched.
    ///
    /// The first handler error aborts the drain; events still pending in this
    /// batch are dropped.
    pub fn dispatch_events(&mut self) -> Result<usize, SimError> {
        let pending = self.events.take_pending();
        let count = pending.len();
        for event in pending {
            if let Err(e) = self.dispatch_one(&event) {
                error!("event dispatch aborted on {:?}: {e}", event.kind());
                return Err(e);
            }
        }
        Ok(count)
    }

    fn dispatch_one(&mut self, event: &Event) -> Result<(), SimError> {
        let kind = event.kind();

        let world_handlers: SmallVec<[Handler; 4]> =
            self.events.handlers_for(kind).iter().cloned().collect();
        for handler in &world_handlers {
            handler.call(self, None, event)?;
        }

        let entity_handlers: Vec<(EntityId, Handler)> = self
            .entities
            .iter()
            .filter_map(|(id, store)| store.get::<EventHandler>().map(|h| (*id, h)))
            .flat_map(|(id, h)| h.handlers_for(kind).iter().map(move |h| (id, h.clone())))
            .collect();
        for (owner, handler) in &entity_handlers {
            if self.is_alive(*owner) {
                handler.call(self, Some(*owner), event)?;
            }
        }

        if let Event::Interact { target, .. } = event {
            let handlers: SmallVec<[Handler; 2]> = self
                .try_get::<Interactable>(*target)
                .map(|i| i.handlers().iter().cloned().collect())
                .unwrap_or_default();
            for handler in &handlers {
                if self.is_alive(*target) {
                    handler.call(self, Some(*target), event)?;
                }
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Scene transitions
    // ---------------------------------------------------------------------

    /// Ask the host to switch to the scene `name` after the current pass.
    pub fn request_transition(&mut self, name: impl Into<String>) {
        self.transition = Some(name.into());
    }

    pub fn pending_transition(&self) -> Option<&str> {
        self.transition.as_deref()
    }

    pub fn take_transition(&mut self) -> Option<String> {
        self.transition.take()
    }
}
