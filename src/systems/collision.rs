//! Tile and entity collision.
//!
//! Runs once per pass over every entity carrying `Collidable` and `Position`:
//!
//! 1. Buckets each entity into every tile its box covers (inclusive range,
//!    Dimension defaulting to 1x1). Buckets are rebuilt from empty each pass.
//! 2. Flags entities that cover a solid tile.
//! 3. For each flagged entity, classifies the world edge it crossed (if any),
//!    rolls its position back and posts exactly one event: `Offscreen` when
//!    an edge was crossed, `Collision(Tile)` otherwise.
//! 4. Tests every unordered pair within each bucket with the strict box
//!    overlap, records new pairs in both `Collidable` sets and posts one
//!    `Collision(Entity)` per pair.
//!
//! The map is closed: tiles outside it are solid, so an entity reaching an
//! open edge is stopped like at any wall. The crossing is reported as
//! `Offscreen` once the entity sits more than a tile beyond the edge, which
//! takes a step larger than a tile or an entity with nothing to roll back
//! with.
//!
//! Rollback only looks at the last step: an entity carrying `Velocity` moves
//! back by it and stops; otherwise one carrying `LastPosition` is restored to
//! it. An entity moved by direct assignment has neither and stays inside the
//! wall.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use glam::{IVec2, Vec2};
use log::{debug, warn};
use smallvec::SmallVec;

use crate::components::collidable::Collidable;
use crate::components::vectors::{Dimension, LastPosition, Position, Velocity};
use crate::ecs::component::{ComponentKind, ComponentSet};
use crate::ecs::entity::EntityId;
use crate::ecs::scheduler::System;
use crate::ecs::world::World;
use crate::error::SimError;
use crate::events::Event;
use crate::events::collision::CollisionEvent;
use crate::resources::tilemap::{TileMap, validate_map};
use crate::spatial::{self, Aabb, DEFAULT_COLLISION_SIZE, DEFAULT_OFFSCREEN_SIZE, TileRange};

type Bucket = SmallVec<[EntityId; 4]>;

pub struct TileCollisionSystem {
    map: Rc<dyn TileMap>,
    buckets: BTreeMap<(i32, i32), Bucket>,
    collisions: BTreeMap<EntityId, BTreeSet<EntityId>>,
}

impl TileCollisionSystem {
    /// Fails with `Configuration` when the map has a zero cell size or no
    /// tiles.
    pub fn new(map: Rc<dyn TileMap>) -> Result<Self, SimError> {
        validate_map(map.as_ref())?;
        Ok(Self {
            map,
            buckets: BTreeMap::new(),
            collisions: BTreeMap::new(),
        })
    }

    pub fn map(&self) -> &Rc<dyn TileMap> {
        &self.map
    }

    /// Entities recorded in tile `(x, y)` during the last pass.
    pub fn entities_in_tile(&self, x: i32, y: i32) -> &[EntityId] {
        self.buckets
            .get(&(x, y))
            .map(|bucket| bucket.as_slice())
            .unwrap_or(&[])
    }

    /// Peers found overlapping `entity` during the last pass.
    pub fn entity_collisions(&self, entity: EntityId) -> Option<&BTreeSet<EntityId>> {
        self.collisions.get(&entity)
    }

    pub fn is_raycast_clear(&self, start: Vec2, end: Vec2) -> bool {
        spatial::is_raycast_clear(self.map.as_ref(), start, end)
    }

    fn collision_box(world: &World, entity: EntityId) -> Result<Aabb, SimError> {
        let position = world.get::<Position>(entity)?.0;
        let size = world
            .try_get::<Dimension>(entity)
            .map_or(DEFAULT_COLLISION_SIZE, |d| d.0);
        Ok(Aabb::new(position, size))
    }

    fn offscreen_box(world: &World, entity: EntityId) -> Result<Aabb, SimError> {
        let position = world.get::<Position>(entity)?.0;
        let size = world
            .try_get::<Dimension>(entity)
            .map_or(DEFAULT_OFFSCREEN_SIZE, |d| d.0);
        Ok(Aabb::new(position, size))
    }

    /// Bucket every entity and return the ones covering a solid tile.
    fn broad_phase(
        &mut self,
        world: &World,
        entities: &[EntityId],
    ) -> Result<BTreeSet<EntityId>, SimError> {
        let cell = self.map.cell_size();
        let mut tile_collided = BTreeSet::new();
        for &entity in entities {
            let range = TileRange::covering(&Self::collision_box(world, entity)?, cell);
            for IVec2 { x, y } in range.iter() {
                self.buckets.entry((x, y)).or_default().push(entity);
                if self.map.is_tile_solid(x, y) {
                    tile_collided.insert(entity);
                }
            }
        }
        Ok(tile_collided)
    }

    fn resolve_tile_collision(&self, world: &mut World, entity: EntityId) -> Result<(), SimError> {
        let edge = spatial::offscreen_edge(&Self::offscreen_box(world, entity)?, self.map.as_ref());

        if let Some(velocity) = world.try_get::<Velocity>(entity).map(|v| v.0) {
            world.get_mut::<Position>(entity)?.0 -= velocity;
            world.get_mut::<Velocity>(entity)?.0 = Vec2::ZERO;
        } else if let Some(last) = world.try_get::<LastPosition>(entity).map(|p| p.0) {
            world.get_mut::<Position>(entity)?.0 = last;
        } else {
            warn!("entity {entity} is inside a solid tile and has nothing to roll back with");
        }

        match edge {
            Some(edge) => {
                debug!("entity {entity} left the map through {edge}");
                world.post(Event::Offscreen { entity, edge });
            }
            None => {
                debug!("entity {entity} hit a solid tile");
                world.post(Event::Collision(CollisionEvent::Tile { entity }));
            }
        }
        Ok(())
    }

    fn narrow_phase(&mut self, world: &mut World) -> Result<(), SimError> {
        for bucket in self.buckets.values() {
            if bucket.len() < 2 {
                continue;
            }
            for (i, &a) in bucket.iter().enumerate() {
                for &b in &bucket[i + 1..] {
                    let recorded = self
                        .collisions
                        .get(&a)
                        .is_some_and(|peers| peers.contains(&b));
                    if recorded {
                        continue;
                    }
                    if !Self::collision_box(world, a)?.overlaps(&Self::collision_box(world, b)?) {
                        continue;
                    }
                    self.collisions.entry(a).or_default().insert(b);
                    self.collisions.entry(b).or_default().insert(a);
                    world.get_mut::<Collidable>(a)?.collision_set.insert(b);
                    world.get_mut::<Collidable>(b)?.collision_set.insert(a);
                    debug!("entities {a} and {b} collide");
                    world.post(Event::Collision(CollisionEvent::Entity { a, b }));
                }
            }
        }
        Ok(())
    }
}

impl System for TileCollisionSystem {
    fn name(&self) -> &str {
        "tile_collision"
    }

    fn requirements(&self) -> ComponentSet {
        ComponentSet::of(&[ComponentKind::Collidable, ComponentKind::Position])
    }

    fn process(
        &mut self,
        world: &mut World,
        entities: &[EntityId],
        _dt: f32,
    ) -> Result<(), SimError> {
        self.buckets.clear();
        self.collisions.clear();
        for &entity in entities {
            self.collisions.insert(entity, BTreeSet::new());
            world.get_mut::<Collidable>(entity)?.collision_set.clear();
        }

        let tile_collided = self.broad_phase(world, entities)?;
        for entity in tile_collided {
            self.resolve_tile_collision(world, entity)?;
        }

        self.narrow_phase(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::tilemap::GridTileMap;
    use crate::events::collision::Edge;

    fn approx_eq(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-5
    }

    fn system(rows: &[&str], cell: u32) -> TileCollisionSystem {
        TileCollisionSystem::new(Rc::new(GridTileMap::from_rows(rows, (cell, cell)).unwrap()))
            .unwrap()
    }

    fn spawn(world: &mut World, pos: Vec2, size: Option<Vec2>) -> EntityId {
        let e = world.create_entity();
        world.attach(e, Position(pos)).unwrap();
        world.attach(e, Collidable::new()).unwrap();
        if let Some(size) = size {
            world.attach(e, Dimension(size)).unwrap();
        }
        e
    }

    fn run(sys: &mut TileCollisionSystem, world: &mut World) {
        let entities = world.entities_with(sys.requirements());
        sys.process(world, &entities, 1.0 / 60.0).unwrap();
    }

    fn pending(world: &World) -> Vec<Event> {
        world.pending_events().cloned().collect()
    }

    // ===== TILE COLLISION TESTS =====

    #[test]
    fn velocity_rollback_stops_entity() {
        let mut sys = system(&["....", ".#..", "....", "...."], 8);
        let mut world = World::new();
        let e = spawn(&mut world, Vec2::new(10.0, 10.0), Some(Vec2::new(4.0, 4.0)));
        world.attach(e, Velocity::new(3.0, 0.0)).unwrap();

        run(&mut sys, &mut world);

        assert!(approx_eq(world.get::<Position>(e).unwrap().0, Vec2::new(7.0, 10.0)));
        assert!(approx_eq(world.get::<Velocity>(e).unwrap().0, Vec2::ZERO));
        assert_eq!(
            pending(&world),
            vec![Event::Collision(CollisionEvent::Tile { entity: e })]
        );
    }

    #[test]
    fn last_position_rollback_without_velocity() {
        let mut sys = system(&["....", ".#..", "....", "...."], 8);
        let mut world = World::new();
        let e = spawn(&mut world, Vec2::new(9.0, 9.0), None);
        world.attach(e, LastPosition::new(2.0, 2.0)).unwrap();

        run(&mut sys, &mut world);

        assert!(approx_eq(world.get::<Position>(e).unwrap().0, Vec2::new(2.0, 2.0)));
    }

    #[test]
    fn no_rollback_source_leaves_position() {
        let mut sys = system(&["....", ".#..", "....", "...."], 8);
        let mut world = World::new();
        let e = spawn(&mut world, Vec2::new(9.0, 9.0), None);

        run(&mut sys, &mut world);

        assert!(approx_eq(world.get::<Position>(e).unwrap().0, Vec2::new(9.0, 9.0)));
        assert_eq!(pending(&world).len(), 1);
    }

    #[test]
    fn passable_tiles_emit_nothing() {
        let mut sys = system(&["....", "....", "....", "...."], 8);
        let mut world = World::new();
        spawn(&mut world, Vec2::new(9.0, 9.0), Some(Vec2::new(8.0, 8.0)));
        run(&mut sys, &mut world);
        assert!(pending(&world).is_empty());
    }

    #[test]
    fn offscreen_takes_priority_over_tile_event() {
        let mut sys = system(&["#...", "....", "....", "...."], 8);
        let mut world = World::new();
        let e = spawn(&mut world, Vec2::new(-20.0, 4.0), Some(Vec2::new(24.0, 2.0)));
        run(&mut sys, &mut world);
        assert_eq!(
            pending(&world),
            vec![Event::Offscreen {
                entity: e,
                edge: Edge::Left
            }]
        );
    }

    // ===== MAP EDGE TESTS =====

    #[test]
    fn open_edge_stops_entity_like_a_wall() {
        let mut sys = system(&["....", "....", "....", "...."], 8);
        let mut world = World::new();
        // Moved from 26 to 28, so the box now ends on the right edge at 32.
        let e = spawn(&mut world, Vec2::new(28.0, 4.0), Some(Vec2::new(4.0, 4.0)));
        world.attach(e, Velocity::new(2.0, 0.0)).unwrap();

        run(&mut sys, &mut world);

        assert!(approx_eq(world.get::<Position>(e).unwrap().0, Vec2::new(26.0, 4.0)));
        assert!(approx_eq(world.get::<Velocity>(e).unwrap().0, Vec2::ZERO));
        assert_eq!(
            pending(&world),
            vec![Event::Collision(CollisionEvent::Tile { entity: e })]
        );
    }

    #[test]
    fn fast_entity_leaves_through_right_edge() {
        let mut sys = system(&["....", "....", "....", "...."], 8);
        let mut world = World::new();
        let e = spawn(&mut world, Vec2::new(40.0, 4.0), Some(Vec2::new(4.0, 4.0)));
        world.attach(e, Velocity::new(12.0, 0.0)).unwrap();

        run(&mut sys, &mut world);

        assert_eq!(
            pending(&world),
            vec![Event::Offscreen {
                entity: e,
                edge: Edge::Right
            }]
        );
        assert!(approx_eq(world.get::<Position>(e).unwrap().0, Vec2::new(28.0, 4.0)));
        assert!(approx_eq(world.get::<Velocity>(e).unwrap().0, Vec2::ZERO));
    }

    #[test]
    fn fast_entity_leaves_through_top_edge() {
        let mut sys = system(&["....", "....", "....", "...."], 8);
        let mut world = World::new();
        let e = spawn(&mut world, Vec2::new(12.0, -10.0), None);
        world.attach(e, LastPosition::new(12.0, 2.0)).unwrap();

        run(&mut sys, &mut world);

        assert_eq!(
            pending(&world),
            vec![Event::Offscreen {
                entity: e,
                edge: Edge::Top
            }]
        );
        assert!(approx_eq(world.get::<Position>(e).unwrap().0, Vec2::new(12.0, 2.0)));
    }

    // ===== MAP VALIDATION =====

    struct BrokenMap {
        cell: (u32, u32),
        size: (u32, u32),
    }

    impl TileMap for BrokenMap {
        fn is_tile_solid(&self, _x: i32, _y: i32) -> bool {
            false
        }

        fn cell_size(&self) -> (u32, u32) {
            self.cell
        }

        fn width_in_tiles(&self) -> u32 {
            self.size.0
        }

        fn height_in_tiles(&self) -> u32 {
            self.size.1
        }
    }

    #[test]
    fn zero_cell_size_is_rejected_at_setup() {
        let map = Rc::new(BrokenMap { cell: (0, 8), size: (4, 4) });
        assert!(matches!(
            TileCollisionSystem::new(map),
            Err(SimError::Configuration(_))
        ));
    }

    #[test]
    fn empty_map_is_rejected_at_setup() {
        let map = Rc::new(BrokenMap { cell: (8, 8), size: (4, 0) });
        assert!(matches!(
            TileCollisionSystem::new(map),
            Err(SimError::Configuration(_))
        ));
    }

    // ===== BUCKET TESTS =====

    #[test]
    fn buckets_use_inclusive_range() {
        let mut sys = system(&["....", "....", "....", "...."], 8);
        let mut world = World::new();
        let e = spawn(&mut world, Vec2::new(4.0, 4.0), Some(Vec2::new(8.0, 8.0)));
        run(&mut sys, &mut world);
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(sys.entities_in_tile(x, y), &[e]);
        }
        assert!(sys.entities_in_tile(2, 2).is_empty());
    }

    #[test]
    fn buckets_are_rebuilt_each_pass() {
        let mut sys = system(&["....", "....", "....", "...."], 8);
        let mut world = World::new();
        let e = spawn(&mut world, Vec2::new(1.0, 1.0), None);
        run(&mut sys, &mut world);
        assert_eq!(sys.entities_in_tile(0, 0), &[e]);
        world.get_mut::<Position>(e).unwrap().0 = Vec2::new(20.0, 20.0);
        run(&mut sys, &mut world);
        assert!(sys.entities_in_tile(0, 0).is_empty());
        assert_eq!(sys.entities_in_tile(2, 2), &[e]);
    }

    // ===== ENTITY COLLISION TESTS =====

    #[test]
    fn overlapping_pair_is_recorded_once() {
        let mut sys = system(&["....", "....", "....", "...."], 8);
        let mut world = World::new();
        // Both boxes span tiles (0,0)..(1,1), so the pair meets in four buckets.
        let a = spawn(&mut world, Vec2::new(4.0, 4.0), Some(Vec2::new(6.0, 6.0)));
        let b = spawn(&mut world, Vec2::new(6.0, 6.0), Some(Vec2::new(6.0, 6.0)));
        run(&mut sys, &mut world);

        assert_eq!(
            pending(&world),
            vec![Event::Collision(CollisionEvent::Entity { a, b })]
        );
        assert!(world.get::<Collidable>(a).unwrap().is_colliding_with(b));
        assert!(world.get::<Collidable>(b).unwrap().is_colliding_with(a));
        assert!(sys.entity_collisions(a).unwrap().contains(&b));
    }

    #[test]
    fn touching_pair_does_not_collide() {
        let mut sys = system(&["....", "....", "....", "...."], 8);
        let mut world = World::new();
        let a = spawn(&mut world, Vec2::new(0.0, 0.0), Some(Vec2::new(2.0, 2.0)));
        let b = spawn(&mut world, Vec2::new(2.0, 2.0), Some(Vec2::new(2.0, 2.0)));
        run(&mut sys, &mut world);
        assert!(pending(&world).is_empty());
        assert!(world.get::<Collidable>(a).unwrap().collision_set.is_empty());
        assert!(world.get::<Collidable>(b).unwrap().collision_set.is_empty());
    }

    #[test]
    fn collision_sets_are_cleared_every_pass() {
        let mut sys = system(&["....", "....", "....", "...."], 8);
        let mut world = World::new();
        let a = spawn(&mut world, Vec2::new(0.0, 0.0), Some(Vec2::new(4.0, 4.0)));
        let b = spawn(&mut world, Vec2::new(2.0, 2.0), Some(Vec2::new(4.0, 4.0)));
        run(&mut sys, &mut world);
        assert!(world.get::<Collidable>(a).unwrap().is_colliding_with(b));

        world.get_mut::<Position>(b).unwrap().0 = Vec2::new(24.0, 24.0);
        run(&mut sys, &mut world);
        assert!(!world.get::<Collidable>(a).unwrap().is_colliding_with(b));
        assert!(sys.entity_collisions(a).unwrap().is_empty());
    }

    #[test]
    fn default_dimension_is_unit_box() {
        let mut sys = system(&["....", "....", "....", "...."], 8);
        let mut world = World::new();
        let a = spawn(&mut world, Vec2::new(3.0, 3.0), None);
        let b = spawn(&mut world, Vec2::new(3.5, 3.5), None);
        run(&mut sys, &mut world);
        assert!(world.get::<Collidable>(a).unwrap().is_colliding_with(b));
    }

    #[test]
    fn raycast_uses_shared_map() {
        let sys = system(&["....", ".#..", "....", "...."], 8);
        assert!(!sys.is_raycast_clear(Vec2::new(4.0, 4.0), Vec2::new(28.0, 28.0)));
        assert!(sys.is_raycast_clear(Vec2::new(4.0, 4.0), Vec2::new(28.0, 4.0)));
    }
}
