//! Tile map query interface and a grid implementation.
//!
//! The simulation core only ever talks to a map through [`TileMap`]: is a
//! tile solid, how big is a cell, how many tiles wide and high is the map.
//! The map is shared between systems as `Rc<dyn TileMap>` and must not change
//! for the lifetime of a session. Everything outside the map counts as solid,
//! so the world is closed on all four sides.
//!
//! [`GridTileMap`] is the bundled implementation. It can be built in code,
//! from ASCII rows (handy in tests), or loaded from a JSON file:
//!
//! ```json
//! {
//!   "tile_size": 8,
//!   "map_width": 16,
//!   "map_height": 16,
//!   "layers": [
//!     { "name": "collision", "positions": [ { "x": 0, "y": 0, "id": 1 } ] }
//!   ]
//! }
//! ```
//!
//! Tiles placed on a layer named `collision` or `solid` are solid; other
//! layers are decorative and ignored by the core.

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Read-only view of the static level geometry.
pub trait TileMap {
    /// Solidity of the tile at `(x, y)`.
    ///
    /// Tiles outside `0..width_in_tiles()` x `0..height_in_tiles()` must
    /// report solid: an entity walking off an open edge is stopped there, and
    /// the collision system classifies the crossing as `Offscreen`.
    fn is_tile_solid(&self, x: i32, y: i32) -> bool;

    /// Cell size in world units, `(width, height)`.
    fn cell_size(&self) -> (u32, u32);

    fn width_in_tiles(&self) -> u32;

    fn height_in_tiles(&self) -> u32;
}

/// Reject maps the collision and radar systems cannot bucket: a zero cell
/// size or a map without tiles.
pub fn validate_map(map: &dyn TileMap) -> Result<(), SimError> {
    check_geometry(map.cell_size(), map.width_in_tiles(), map.height_in_tiles())
}

fn check_geometry(cell_size: (u32, u32), width: u32, height: u32) -> Result<(), SimError> {
    if cell_size.0 == 0 || cell_size.1 == 0 {
        return Err(SimError::config(format!(
            "tile cell size must be positive, got {}x{}",
            cell_size.0, cell_size.1
        )));
    }
    if width == 0 || height == 0 {
        return Err(SimError::config(format!(
            "map must be at least one tile, got {width}x{height}"
        )));
    }
    Ok(())
}

/// Single tile placement within a layer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TilePosition {
    /// X coordinate in tiles.
    pub x: u32,
    /// Y coordinate in tiles.
    pub y: u32,
    /// Tile identifier (tileset-local).
    pub id: u32,
}

/// A named tile layer containing positions.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TileLayer {
    pub name: String,
    pub positions: Vec<TilePosition>,
}

/// On-disk map description.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TileMapData {
    /// Size of a square tile in world units.
    pub tile_size: u32,
    /// Map width in tiles.
    pub map_width: u32,
    /// Map height in tiles.
    pub map_height: u32,
    #[serde(default)]
    pub layers: Vec<TileLayer>,
}

const SOLID_LAYERS: [&str; 2] = ["collision", "solid"];

/// Dense solidity grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridTileMap {
    cell_size: (u32, u32),
    width: u32,
    height: u32,
    solid: Vec<bool>,
}

impl GridTileMap {
    /// Empty (all passable) map. Zero-sized cells or maps are rejected.
    pub fn new(width: u32, height: u32, cell_size: (u32, u32)) -> Result<Self, SimError> {
        check_geometry(cell_size, width, height)?;
        Ok(Self {
            cell_size,
            width,
            height,
            solid: vec![false; (width as usize) * (height as usize)],
        })
    }

    /// Build from ASCII rows: `#` is solid, anything else is passable. All
    /// rows must have the same length.
    pub fn from_rows(rows: &[&str], cell_size: (u32, u32)) -> Result<Self, SimError> {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |r| r.chars().count()) as u32;
        let mut map = Self::new(width, height, cell_size)?;
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() as u32 != width {
                return Err(SimError::config(format!(
                    "row {y} has {} tiles, expected {width}",
                    row.chars().count()
                )));
            }
            for (x, ch) in row.chars().enumerate() {
                if ch == '#' {
                    map.set_solid(x as u32, y as u32, true)?;
                }
            }
        }
        Ok(map)
    }

    pub fn from_data(data: &TileMapData) -> Result<Self, SimError> {
        let mut map = Self::new(
            data.map_width,
            data.map_height,
            (data.tile_size, data.tile_size),
        )?;
        for layer in data.layers.iter() {
            let solid = SOLID_LAYERS.contains(&layer.name.as_str());
            for pos in layer.positions.iter() {
                if pos.x >= data.map_width || pos.y >= data.map_height {
                    return Err(SimError::config(format!(
                        "tile ({}, {}) on layer '{}' lies outside the {}x{} map",
                        pos.x, pos.y, layer.name, data.map_width, data.map_height
                    )));
                }
                if solid {
                    map.set_solid(pos.x, pos.y, true)?;
                }
            }
        }
        Ok(map)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SimError::config(format!("failed to read map {}: {e}", path.display()))
        })?;
        let data: TileMapData = serde_json::from_str(&content).map_err(|e| {
            SimError::config(format!("failed to parse map {}: {e}", path.display()))
        })?;
        let map = Self::from_data(&data)?;
        info!(
            "Loaded map {}: {}x{} tiles of {}px, {} solid",
            path.display(),
            map.width,
            map.height,
            data.tile_size,
            map.solid_count()
        );
        Ok(map)
    }

    pub fn set_solid(&mut self, x: u32, y: u32, solid: bool) -> Result<(), SimError> {
        if x >= self.width || y >= self.height {
            return Err(SimError::config(format!(
                "tile ({x}, {y}) lies outside the {}x{} map",
                self.width, self.height
            )));
        }
        let index = (y * self.width + x) as usize;
        self.solid[index] = solid;
        Ok(())
    }

    pub fn solid_count(&self) -> usize {
        self.solid.iter().filter(|s| **s).count()
    }
}

impl TileMap for GridTileMap {
    fn is_tile_solid(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return true;
        }
        self.solid[(y as u32 * self.width + x as u32) as usize]
    }

    fn cell_size(&self) -> (u32, u32) {
        self.cell_size
    }

    fn width_in_tiles(&self) -> u32 {
        self.width
    }

    fn height_in_tiles(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn zero_cell_size_is_configuration_error() {
        assert!(matches!(
            GridTileMap::new(4, 4, (0, 8)),
            Err(SimError::Configuration(_))
        ));
        assert!(matches!(
            GridTileMap::new(0, 4, (8, 8)),
            Err(SimError::Configuration(_))
        ));
    }

    struct Unchecked((u32, u32));

    impl TileMap for Unchecked {
        fn is_tile_solid(&self, _x: i32, _y: i32) -> bool {
            false
        }
        fn cell_size(&self) -> (u32, u32) {
            self.0
        }
        fn width_in_tiles(&self) -> u32 {
            4
        }
        fn height_in_tiles(&self) -> u32 {
            4
        }
    }

    #[test]
    fn validate_map_checks_any_implementation() {
        assert!(validate_map(&Unchecked((8, 8))).is_ok());
        assert!(matches!(
            validate_map(&Unchecked((8, 0))),
            Err(SimError::Configuration(_))
        ));
        let grid = GridTileMap::new(2, 2, (4, 4)).unwrap();
        assert!(validate_map(&grid).is_ok());
    }

    #[test]
    fn from_rows_marks_hashes_solid() {
        let map = GridTileMap::from_rows(&["#..", "..#"], (8, 8)).unwrap();
        assert_eq!(map.width_in_tiles(), 3);
        assert_eq!(map.height_in_tiles(), 2);
        assert!(map.is_tile_solid(0, 0));
        assert!(map.is_tile_solid(2, 1));
        assert!(!map.is_tile_solid(1, 0));
        assert_eq!(map.solid_count(), 2);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        assert!(GridTileMap::from_rows(&["###", "##"], (8, 8)).is_err());
    }

    #[test]
    fn out_of_bounds_is_solid() {
        let map = GridTileMap::from_rows(&["..", ".."], (8, 8)).unwrap();
        assert!(map.is_tile_solid(-1, 0));
        assert!(map.is_tile_solid(0, -1));
        assert!(map.is_tile_solid(2, 0));
        assert!(map.is_tile_solid(0, 2));
        assert!(map.is_tile_solid(i32::MIN, i32::MAX));
        assert!(!map.is_tile_solid(1, 1));
    }

    #[test]
    fn from_data_uses_collision_layers_only() {
        let data = TileMapData {
            tile_size: 8,
            map_width: 4,
            map_height: 4,
            layers: vec![
                TileLayer {
                    name: "background".into(),
                    positions: vec![TilePosition { x: 1, y: 1, id: 3 }],
                },
                TileLayer {
                    name: "collision".into(),
                    positions: vec![TilePosition { x: 2, y: 3, id: 1 }],
                },
            ],
        };
        let map = GridTileMap::from_data(&data).unwrap();
        assert!(!map.is_tile_solid(1, 1));
        assert!(map.is_tile_solid(2, 3));
        assert_eq!(map.cell_size(), (8, 8));
    }

    #[test]
    fn from_data_rejects_tiles_outside_map() {
        let data = TileMapData {
            tile_size: 8,
            map_width: 4,
            map_height: 4,
            layers: vec![TileLayer {
                name: "background".into(),
                positions: vec![TilePosition { x: 4, y: 0, id: 3 }],
            }],
        };
        assert!(matches!(
            GridTileMap::from_data(&data),
            Err(SimError::Configuration(_))
        ));
    }

    #[test]
    fn load_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"tile_size": 4, "map_width": 16, "map_height": 16,
                "layers": [{{"name": "solid", "positions": [{{"x": 0, "y": 0, "id": 1}}]}}]}}"#
        )
        .unwrap();
        let map = GridTileMap::load_from_file(file.path()).unwrap();
        assert!(map.is_tile_solid(0, 0));
        assert_eq!(map.cell_size(), (4, 4));
    }

    #[test]
    fn load_missing_file_is_configuration_error() {
        let err = GridTileMap::load_from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SimError::Configuration(_)));
    }
}
