//! Line-of-sight detection.
//!
//! Every pass, each [`Radar`] is refilled with one [`Ping`] per positioned
//! member of each watched group (the owner itself excluded). Visibility is a
//! raycast between the two positions against the shared tile map.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::components::radar::{Ping, Radar};
use crate::components::vectors::Position;
use crate::ecs::component::{ComponentKind, ComponentSet};
use crate::ecs::entity::EntityId;
use crate::ecs::scheduler::System;
use crate::ecs::world::World;
use crate::error::SimError;
use crate::resources::tilemap::{TileMap, validate_map};
use crate::spatial;

pub struct RadarSystem {
    map: Rc<dyn TileMap>,
}

impl RadarSystem {
    pub fn new(map: Rc<dyn TileMap>) -> Result<Self, SimError> {
        validate_map(map.as_ref())?;
        Ok(Self { map })
    }

    fn scan(&self, world: &World, owner: EntityId, group: &str) -> Result<Vec<Ping>, SimError> {
        let origin = world.get::<Position>(owner)?.0;
        let pings = world
            .groups()
            .get(group)
            .iter()
            .filter(|&&target| target != owner)
            .filter_map(|&target| {
                let position = world.try_get::<Position>(target)?.0;
                Some(Ping {
                    entity: target,
                    distance: position - origin,
                    visible: spatial::is_raycast_clear(self.map.as_ref(), origin, position),
                })
            })
            .collect();
        Ok(pings)
    }
}

impl System for RadarSystem {
    fn name(&self) -> &str {
        "radar"
    }

    fn requirements(&self) -> ComponentSet {
        ComponentSet::of(&[ComponentKind::Radar, ComponentKind::Position])
    }

    fn process(
        &mut self,
        world: &mut World,
        entities: &[EntityId],
        _dt: f32,
    ) -> Result<(), SimError> {
        for &entity in entities {
            let groups = world.get::<Radar>(entity)?.target_groups.clone();
            let mut targets = FxHashMap::default();
            for group in groups {
                let pings = self.scan(world, entity, &group)?;
                targets.insert(group, pings);
            }
            world.get_mut::<Radar>(entity)?.targets = targets;
        }
        Ok(())
    }
}
