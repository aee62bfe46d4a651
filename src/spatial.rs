//! Geometry used by the collision engine.
//!
//! Everything here is a pure function of its inputs: box overlap, world to
//! tile conversion, the inclusive tile range a box covers, edge-of-world
//! classification and Bresenham line-of-sight over a [`TileMap`].

use glam::{IVec2, Vec2};

use crate::events::collision::Edge;
use crate::resources::tilemap::TileMap;

/// Size used for collision when an entity carries no Dimension.
pub const DEFAULT_COLLISION_SIZE: Vec2 = Vec2::ONE;
/// Size used for edge-of-world checks when an entity carries no Dimension.
pub const DEFAULT_OFFSCREEN_SIZE: Vec2 = Vec2::ZERO;

/// Axis-aligned box given by its minimum corner and size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub position: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    /// Box spanning `min` to `max`.
    pub fn from_corners(min: Vec2, max: Vec2) -> Self {
        Self {
            position: min,
            size: max - min,
        }
    }

    pub fn max(&self) -> Vec2 {
        self.position + self.size
    }

    /// Strict overlap: boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.position.x < other.position.x + other.size.x
            && self.position.x + self.size.x > other.position.x
            && self.position.y < other.position.y + other.size.y
            && self.position.y + self.size.y > other.position.y
    }
}

/// Tile containing the world point `point` (floor division per axis).
pub fn tile_position(point: Vec2, cell_size: (u32, u32)) -> IVec2 {
    IVec2::new(
        (point.x / cell_size.0 as f32).floor() as i32,
        (point.y / cell_size.1 as f32).floor() as i32,
    )
}

/// Inclusive rectangle of tiles, iterated row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub start: IVec2,
    pub end: IVec2,
}

impl TileRange {
    /// Tiles covered by `aabb`, from the tile of its minimum corner to the
    /// tile of its maximum corner, both inclusive.
    pub fn covering(aabb: &Aabb, cell_size: (u32, u32)) -> Self {
        Self {
            start: tile_position(aabb.position, cell_size),
            end: tile_position(aabb.max(), cell_size),
        }
    }

    pub fn contains(&self, tile: IVec2) -> bool {
        tile.x >= self.start.x && tile.x <= self.end.x && tile.y >= self.start.y && tile.y <= self.end.y
    }

    pub fn iter(&self) -> impl Iterator<Item = IVec2> + '_ {
        let (start, end) = (self.start, self.end);
        (start.y..=end.y).flat_map(move |y| (start.x..=end.x).map(move |x| IVec2::new(x, y)))
    }
}

/// Which world edge, if any, a box has crossed.
///
/// Left/top trigger once the tile position is below -1; right/bottom once
/// `tile position + tile extent` reaches the map size plus one. Edges are
/// checked left, right, top, bottom and the first match wins.
pub fn offscreen_edge(aabb: &Aabb, map: &dyn TileMap) -> Option<Edge> {
    let cell = map.cell_size();
    let tile = tile_position(aabb.position, cell);
    let extent = tile_position(aabb.size, cell);

    if tile.x < -1 {
        Some(Edge::Left)
    } else if tile.x + extent.x >= map.width_in_tiles() as i32 + 1 {
        Some(Edge::Right)
    } else if tile.y < -1 {
        Some(Edge::Top)
    } else if tile.y + extent.y >= map.height_in_tiles() as i32 + 1 {
        Some(Edge::Bottom)
    } else {
        None
    }
}

/// Tiles on the Bresenham line between two tiles.
///
/// The line is walked along its major axis from the lower end, so for lines
/// walked "backwards" the tiles come out reversed relative to `from`/`to`.
pub fn bresenham_line(from: IVec2, to: IVec2) -> Vec<IVec2> {
    let mut tiles = Vec::new();
    walk_line(from, to, |tile| {
        tiles.push(tile);
        true
    });
    tiles
}

/// Visit tiles along the line until `visit` returns false. Returns whether
/// the walk ran to completion.
fn walk_line(from: IVec2, to: IVec2, mut visit: impl FnMut(IVec2) -> bool) -> bool {
    let (mut start, mut end) = (from, to);
    let delta = end - start;

    let steep = delta.y.abs() > delta.x.abs();
    if steep {
        start = IVec2::new(start.y, start.x);
        end = IVec2::new(end.y, end.x);
    }
    if start.x > end.x {
        std::mem::swap(&mut start, &mut end);
    }

    let delta = end - start;
    let mut error = delta.x / 2;
    let ystep = if start.y < end.y { 1 } else { -1 };
    let mut y = start.y;

    for x in start.x..=end.x {
        let tile = if steep { IVec2::new(y, x) } else { IVec2::new(x, y) };
        if !visit(tile) {
            return false;
        }
        error -= delta.y.abs();
        while error < 0 && delta.x > 0 {
            y += ystep;
            error += delta.x;
        }
    }
    true
}

/// Line of sight between two world points. Blocked as soon as any tile on
/// the line is solid, including the tiles holding either endpoint.
pub fn is_raycast_clear(map: &dyn TileMap, start: Vec2, end: Vec2) -> bool {
    let cell = map.cell_size();
    let from = tile_position(start, cell);
    let to = tile_position(end, cell);
    walk_line(from, to, |tile| !map.is_tile_solid(tile.x, tile.y))
}
