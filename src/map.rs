//! Static per-match map data: terrain cells, strategic points, deployment zones
//!
//! A map is created once at match setup and is immutable during play except
//! for strategic point ownership and capture progress.

use ahash::AHashMap;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CAPTURE_TIME_SECS;
use crate::core::types::{PointId, Side};
use crate::hex::{HexCoord, LogicalPos};
use crate::terrain::Terrain;

/// A single hex cell of the map
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HexCell {
    pub coord: HexCoord,
    pub terrain: Terrain,
}

/// A capturable location contributing to victory conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategicPoint {
    pub id: PointId,
    pub name: String,
    pub position: LogicalPos,
    pub owner: Option<Side>,
    pub capture_progress: f32,
    pub capture_time: f32,
}

impl StrategicPoint {
    pub fn new(id: PointId, name: impl Into<String>, position: LogicalPos) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            owner: None,
            capture_progress: 0.0,
            capture_time: DEFAULT_CAPTURE_TIME_SECS,
        }
    }

    /// Axial coordinate of the point's hex
    pub fn axial(&self) -> HexCoord {
        HexCoord::from_logical(self.position)
    }
}

/// Rectangular deployment zone in logical coordinates (inclusive bounds)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct DeploymentZone {
    pub min: LogicalPos,
    pub max: LogicalPos,
}

impl DeploymentZone {
    pub fn new(min: LogicalPos, max: LogicalPos) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, pos: LogicalPos) -> bool {
        pos.x >= self.min.x && pos.x <= self.max.x && pos.y >= self.min.y && pos.y <= self.max.y
    }
}

/// The full map definition for a match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapDefinition {
    pub columns: u32,
    pub rows: u32,
    pub cells: AHashMap<HexCoord, HexCell>,
    pub strategic_points: Vec<StrategicPoint>,
    pub friendly_deployment: DeploymentZone,
    pub enemy_deployment: DeploymentZone,
}

impl MapDefinition {
    /// Create an all-plains map with deployment zones on the west and east edges
    pub fn open(columns: u32, rows: u32) -> Self {
        let mut cells = AHashMap::new();
        for y in 0..rows as i32 {
            for x in 0..columns as i32 {
                let coord = HexCoord::from_logical(LogicalPos::new(x, y));
                cells.insert(
                    coord,
                    HexCell {
                        coord,
                        terrain: Terrain::Plains,
                    },
                );
            }
        }

        let east = columns as i32 - 1;
        let south = rows as i32 - 1;
        Self {
            columns,
            rows,
            cells,
            strategic_points: Vec::new(),
            friendly_deployment: DeploymentZone::new(
                LogicalPos::new(0, 0),
                LogicalPos::new(1, south),
            ),
            enemy_deployment: DeploymentZone::new(
                LogicalPos::new(east - 1, 0),
                LogicalPos::new(east, south),
            ),
        }
    }

    /// Create a skirmish map: seeded terrain plus a line of strategic points
    /// along the middle column
    pub fn skirmish(columns: u32, rows: u32, seed: u64) -> Self {
        let mut map = Self::open(columns, rows);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        map.randomize_terrain(&mut rng);

        let mid_x = columns as i32 / 2;
        let point_rows = [rows as i32 / 4, rows as i32 / 2, 3 * rows as i32 / 4];
        for (i, y) in point_rows.into_iter().enumerate() {
            let position = LogicalPos::new(mid_x, y);
            // Points must be reachable
            map.set_terrain(HexCoord::from_logical(position), Terrain::Plains);
            map.strategic_points.push(StrategicPoint::new(
                PointId(i as u32),
                format!("Objective {}", i + 1),
                position,
            ));
        }

        map
    }

    /// Re-roll terrain for every cell outside the deployment zones
    ///
    /// Deployment zones stay plains so both sides can always deploy and exit.
    /// Iterates in row-major logical order so a given seed always produces
    /// the same map.
    pub fn randomize_terrain(&mut self, rng: &mut impl Rng) {
        for y in 0..self.rows as i32 {
            for x in 0..self.columns as i32 {
                let logical = LogicalPos::new(x, y);
                let coord = HexCoord::from_logical(logical);
                let terrain = if self.friendly_deployment.contains(logical)
                    || self.enemy_deployment.contains(logical)
                {
                    Terrain::Plains
                } else {
                    match rng.gen_range(0..100u32) {
                        0..=54 => Terrain::Plains,
                        55..=69 => Terrain::Forest,
                        70..=79 => Terrain::Hills,
                        80..=84 => Terrain::City,
                        85..=92 => Terrain::Sand,
                        93..=96 => Terrain::Water,
                        _ => Terrain::Mountain,
                    }
                };
                if let Some(cell) = self.cells.get_mut(&coord) {
                    cell.terrain = terrain;
                }
            }
        }
    }

    /// Get the cell at an axial coordinate
    pub fn get(&self, coord: HexCoord) -> Option<&HexCell> {
        self.cells.get(&coord)
    }

    /// Terrain at an axial coordinate, if the hex is on the map
    pub fn terrain_at(&self, coord: HexCoord) -> Option<Terrain> {
        self.cells.get(&coord).map(|c| c.terrain)
    }

    /// Check if a coordinate has a cell
    pub fn contains(&self, coord: HexCoord) -> bool {
        self.cells.contains_key(&coord)
    }

    /// Set terrain at a coordinate
    pub fn set_terrain(&mut self, coord: HexCoord, terrain: Terrain) {
        if let Some(cell) = self.cells.get_mut(&coord) {
            cell.terrain = terrain;
        }
    }

    /// Get a strategic point by id
    pub fn point(&self, id: PointId) -> Option<&StrategicPoint> {
        self.strategic_points.iter().find(|p| p.id == id)
    }

    /// Get a mutable strategic point by id
    pub fn point_mut(&mut self, id: PointId) -> Option<&mut StrategicPoint> {
        self.strategic_points.iter_mut().find(|p| p.id == id)
    }

    /// Deployment zone for a side
    pub fn deployment_zone(&self, side: Side) -> &DeploymentZone {
        match side {
            Side::Friendly => &self.friendly_deployment,
            Side::Enemy => &self.enemy_deployment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_map_cell_count() {
        let map = MapDefinition::open(10, 8);
        assert_eq!(map.cells.len(), 80);
    }

    #[test]
    fn test_open_map_all_cells_reachable_by_logical_lookup() {
        let map = MapDefinition::open(6, 6);
        for y in 0..6 {
            for x in 0..6 {
                let coord = HexCoord::from_logical(LogicalPos::new(x, y));
                assert!(map.contains(coord), "missing cell at ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_deployment_zones_opposed() {
        let map = MapDefinition::open(12, 10);
        assert!(map.friendly_deployment.contains(LogicalPos::new(0, 5)));
        assert!(!map.friendly_deployment.contains(LogicalPos::new(5, 5)));
        assert!(map.enemy_deployment.contains(LogicalPos::new(11, 5)));
        assert!(!map.enemy_deployment.contains(LogicalPos::new(0, 5)));
    }

    #[test]
    fn test_skirmish_map_is_deterministic() {
        let a = MapDefinition::skirmish(20, 16, 42);
        let b = MapDefinition::skirmish(20, 16, 42);
        for (coord, cell) in &a.cells {
            assert_eq!(cell.terrain, b.terrain_at(*coord).unwrap());
        }
    }

    #[test]
    fn test_skirmish_map_has_neutral_points() {
        let map = MapDefinition::skirmish(20, 16, 7);
        assert_eq!(map.strategic_points.len(), 3);
        for point in &map.strategic_points {
            assert!(point.owner.is_none());
            assert_eq!(point.capture_progress, 0.0);
            assert!(map.contains(point.axial()));
        }
    }

    #[test]
    fn test_randomize_keeps_deployment_plains() {
        let map = MapDefinition::skirmish(20, 16, 99);
        for y in 0..16 {
            for x in [0, 1, 18, 19] {
                let terrain = map
                    .terrain_at(HexCoord::from_logical(LogicalPos::new(x, y)))
                    .unwrap();
                assert_eq!(terrain, Terrain::Plains);
            }
        }
    }

    #[test]
    fn test_point_lookup() {
        let mut map = MapDefinition::skirmish(20, 16, 1);
        assert!(map.point(PointId(0)).is_some());
        assert!(map.point(PointId(9)).is_none());

        map.point_mut(PointId(0)).unwrap().owner = Some(Side::Enemy);
        assert_eq!(map.point(PointId(0)).unwrap().owner, Some(Side::Enemy));
    }
}
