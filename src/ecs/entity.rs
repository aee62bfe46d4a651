//! Entity identities and per-entity component stores.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::ecs::component::{Component, ComponentData, ComponentKind, ComponentSet};

/// Stable entity identifier. Ids are handed out in increasing order and are
/// never reused within one [`World`](crate::ecs::world::World).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Heterogeneous component bag owned by a single entity.
///
/// At most one component per [`ComponentKind`]; inserting a kind that is
/// already present replaces it. The `mask` mirrors the keys of the map so
/// requirement checks are a single bit test.
#[derive(Debug, Clone, Default)]
pub struct ComponentStore {
    mask: ComponentSet,
    components: FxHashMap<ComponentKind, Component>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a component, returning the instance it replaced (if any).
    pub fn insert(&mut self, component: Component) -> Option<Component> {
        let kind = component.kind();
        self.mask.insert(kind);
        self.components.insert(kind, component)
    }

    /// Remove the component of the given kind.
    pub fn remove(&mut self, kind: ComponentKind) -> Option<Component> {
        let removed = self.components.remove(&kind);
        if removed.is_some() {
            self.mask.remove(kind);
        }
        removed
    }

    pub fn contains(&self, kind: ComponentKind) -> bool {
        self.mask.contains(kind)
    }

    pub fn mask(&self) -> ComponentSet {
        self.mask
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get_raw(&self, kind: ComponentKind) -> Option<&Component> {
        self.components.get(&kind)
    }

    /// Typed read access.
    pub fn get<T: ComponentData>(&self) -> Option<&T> {
        self.components.get(&T::KIND).and_then(T::from_component)
    }

    /// Typed write access.
    pub fn get_mut<T: ComponentData>(&mut self) -> Option<&mut T> {
        self.components
            .get_mut(&T::KIND)
            .and_then(T::from_component_mut)
    }

    /// Kinds currently stored, in declaration order.
    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.mask.iter()
    }
}
