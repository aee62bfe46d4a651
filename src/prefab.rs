//! Data-driven entity spawning.
//!
//! An [`EntityPrefab`] names the groups an entity joins and the components it
//! carries, each given as JSON data for
//! [`Component::from_json`](crate::ecs::component::Component::from_json).
//! A [`LevelLayout`] is a list of prefabs loaded from a file.
//!
//! # JSON Format
//!
//! ```json
//! {
//!   "entities": [
//!     {
//!       "groups": ["hidable", "plant"],
//!       "components": {
//!         "Position": [38.0, 24.0],
//!         "Dimension": [10.0, 12.0],
//!         "Drawable": { "sprite": "plant.png" },
//!         "Collidable": null
//!       }
//!     }
//!   ]
//! }
//! ```
//!
//! Handler components (EventHandler, Interactable, Script) hold function
//! pointers and have to be attached from code after spawning.

use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::ecs::component::Component;
use crate::ecs::entity::EntityId;
use crate::ecs::world::World;
use crate::error::SimError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityPrefab {
    pub groups: Vec<String>,
    pub components: Map<String, JsonValue>,
}

impl EntityPrefab {
    pub fn from_json(value: JsonValue) -> Result<Self, SimError> {
        serde_json::from_value(value)
            .map_err(|e| SimError::config(format!("invalid entity description: {e}")))
    }

    /// Add or replace the data for component `name`.
    pub fn with_component(mut self, name: impl Into<String>, data: JsonValue) -> Self {
        self.components.insert(name.into(), data);
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelLayout {
    pub entities: Vec<EntityPrefab>,
}

impl LevelLayout {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SimError::config(format!("failed to read layout {}: {e}", path.display()))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            SimError::config(format!("failed to parse layout {}: {e}", path.display()))
        })
    }
}

/// Create an entity from `prefab`. Nothing is left behind on failure: a
/// partially built entity is destroyed before the error is returned.
pub fn spawn_prefab(world: &mut World, prefab: &EntityPrefab) -> Result<EntityId, SimError> {
    let entity = world.create_entity();
    if let Err(e) = populate(world, entity, prefab) {
        world.destroy_entity(entity)?;
        return Err(e);
    }
    debug!(
        "spawned entity {entity} with {} components in {:?}",
        prefab.components.len(),
        prefab.groups
    );
    Ok(entity)
}

fn populate(world: &mut World, entity: EntityId, prefab: &EntityPrefab) -> Result<(), SimError> {
    for (name, data) in prefab.components.iter() {
        world.attach(entity, Component::from_json(name, data)?)?;
    }
    for group in prefab.groups.iter() {
        world.add_to_group(group.clone(), entity)?;
    }
    Ok(())
}

/// Spawn every entity of `layout` in order. Stops at the first failure;
/// entities spawned before it stay in the world.
pub fn spawn_layout(world: &mut World, layout: &LevelLayout) -> Result<Vec<EntityId>, SimError> {
    let ids = layout
        .entities
        .iter()
        .map(|prefab| spawn_prefab(world, prefab))
        .collect::<Result<Vec<_>, _>>()?;
    info!("Spawned {} entities from layout", ids.len());
    Ok(ids)
}
