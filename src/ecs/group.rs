//! Named entity groups.
//!
//! Groups are explicit category sets ("player", "lift", "terminal") that are
//! orthogonal to component composition: membership is only ever changed by
//! creation code through [`GroupIndex::add`] / [`GroupIndex::remove`], never
//! inferred from components.
//!
//! The index references entities by id and owns none of them. The
//! [`World`](crate::ecs::world::World) calls [`GroupIndex::purge`] when an
//! entity is destroyed so no group ever hands out a dead id.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use crate::ecs::entity::EntityId;

static EMPTY_GROUP: BTreeSet<EntityId> = BTreeSet::new();

#[derive(Debug, Clone, Default)]
pub struct GroupIndex {
    groups: FxHashMap<String, BTreeSet<EntityId>>,
}

impl GroupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `entity` to `group`. Returns `false` if it was already a member.
    pub fn add(&mut self, group: impl Into<String>, entity: EntityId) -> bool {
        self.groups.entry(group.into()).or_default().insert(entity)
    }

    /// Remove `entity` from `group`. Returns `false` if it was not a member.
    pub fn remove(&mut self, group: &str, entity: EntityId) -> bool {
        let Some(members) = self.groups.get_mut(group) else {
            return false;
        };
        let removed = members.remove(&entity);
        if members.is_empty() {
            self.groups.remove(group);
        }
        removed
    }

    /// Members of `group` in ascending id order. Unknown groups are empty.
    pub fn get(&self, group: &str) -> &BTreeSet<EntityId> {
        self.groups.get(group).unwrap_or(&EMPTY_GROUP)
    }

    pub fn check(&self, entity: EntityId, group: &str) -> bool {
        self.groups
            .get(group)
            .is_some_and(|members| members.contains(&entity))
    }

    /// Names of every group `entity` belongs to, sorted.
    pub fn groups_of(&self, entity: EntityId) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .groups
            .iter()
            .filter(|(_, members)| members.contains(&entity))
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Drop `entity` from every group it belongs to.
    pub fn purge(&mut self, entity: EntityId) {
        self.groups.retain(|_, members| {
            members.remove(&entity);
            !members.is_empty()
        });
    }

    pub fn count(&self, group: &str) -> usize {
        self.get(group).len()
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_check() {
        let mut index = GroupIndex::new();
        assert!(index.add("lift", EntityId(1)));
        assert!(!index.add("lift", EntityId(1)));
        assert!(index.check(EntityId(1), "lift"));
        assert!(!index.check(EntityId(1), "terminal"));
        assert!(!index.check(EntityId(2), "lift"));
        assert_eq!(index.count("lift"), 1);
    }

    #[test]
    fn unknown_group_is_empty() {
        let index = GroupIndex::new();
        assert!(index.get("nothing").is_empty());
    }

    #[test]
    fn entity_in_many_groups() {
        let mut index = GroupIndex::new();
        index.add("hidable", EntityId(4));
        index.add("bin", EntityId(4));
        assert_eq!(index.groups_of(EntityId(4)), vec!["bin", "hidable"]);
    }

    #[test]
    fn purge_removes_from_every_group() {
        let mut index = GroupIndex::new();
        index.add("hidable", EntityId(4));
        index.add("plant", EntityId(4));
        index.add("plant", EntityId(5));
        index.purge(EntityId(4));
        assert!(!index.check(EntityId(4), "hidable"));
        assert!(!index.check(EntityId(4), "plant"));
        assert_eq!(
            index.get("plant").iter().copied().collect::<Vec<_>>(),
            vec![EntityId(5)]
        );
        assert!(index.groups_of(EntityId(4)).is_empty());
    }

    #[test]
    fn remove_single_membership() {
        let mut index = GroupIndex::new();
        index.add("player", EntityId(1));
        assert!(index.remove("player", EntityId(1)));
        assert!(!index.remove("player", EntityId(1)));
        assert!(index.get("player").is_empty());
    }
}
