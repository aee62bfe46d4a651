//! Detection of entities from other groups.
//!
//! The radar system fills [`Radar::targets`] every pass with one [`Ping`]
//! per member of each watched group, including whether the tile map leaves a
//! clear line of sight between the two positions.

use glam::Vec2;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::ecs::entity::EntityId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ping {
    pub entity: EntityId,
    /// Vector from the radar owner to the target.
    pub distance: Vec2,
    /// `true` when no solid tile lies on the line between them.
    pub visible: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Radar {
    pub target_groups: Vec<String>,
    #[serde(skip)]
    pub targets: FxHashMap<String, Vec<Ping>>,
}

impl Radar {
    pub fn new<I, S>(target_groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            target_groups: target_groups.into_iter().map(Into::into).collect(),
            targets: FxHashMap::default(),
        }
    }

    pub fn pings(&self, group: &str) -> &[Ping] {
        self.targets.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First visible ping in `group`, if any.
    pub fn first_visible(&self, group: &str) -> Option<&Ping> {
        self.pings(group).iter().find(|p| p.visible)
    }
}
