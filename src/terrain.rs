//! Terrain types and their effects on movement, visibility, and fire

use serde::{Deserialize, Serialize};

/// Primary terrain type for a map hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    #[default]
    Plains,
    Forest,
    Hills,
    City,
    Sand,
    Water,
    Mountain,
}

impl Terrain {
    /// Movement cost to enter a hex of this terrain (1.0 = normal)
    pub fn movement_cost(&self) -> f32 {
        match self {
            Terrain::Plains => 1.0,
            Terrain::Forest => 2.0,
            Terrain::Hills => 2.0,
            Terrain::City => 1.5,
            Terrain::Sand => 1.5,
            Terrain::Water => f32::INFINITY,    // Impassable
            Terrain::Mountain => f32::INFINITY, // Impassable
        }
    }

    /// Is this terrain impassable for ground units?
    pub fn impassable(&self) -> bool {
        self.movement_cost().is_infinite()
    }

    /// Concealment multiplier applied to the detection range of a unit
    /// standing in this terrain
    pub fn concealment(&self) -> f32 {
        match self {
            Terrain::Forest => 1.5,
            Terrain::City => 2.0,
            Terrain::Hills => 0.8, // Exposed on the slope
            _ => 1.0,
        }
    }

    /// Sight multiplier for an observer standing in this terrain
    pub fn sight_bonus(&self) -> f32 {
        match self {
            Terrain::Hills => 1.2, // Elevation vantage
            _ => 1.0,
        }
    }

    /// Does this terrain block direct fire through the hex?
    pub fn blocks_fire(&self) -> bool {
        matches!(
            self,
            Terrain::Forest | Terrain::City | Terrain::Mountain | Terrain::Hills
        )
    }
}
