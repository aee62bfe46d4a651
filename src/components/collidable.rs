use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ecs::entity::EntityId;

/// Marks an entity for tile and entity collision.
///
/// `collision_set` holds the peers overlapping this entity in the current
/// frame. The collision system clears and rebuilds it every pass; it carries
/// no history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collidable {
    #[serde(skip)]
    pub collision_set: BTreeSet<EntityId>,
}

impl Collidable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_colliding_with(&self, other: EntityId) -> bool {
        self.collision_set.contains(&other)
    }
}
