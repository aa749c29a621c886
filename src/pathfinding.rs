//! A* pathfinding over the hex map
//!
//! Respects per-terrain movement cost and live unit occupancy. Returns the
//! path excluding the start cell; an empty path means "unreachable" and is
//! never an error - the caller leaves the unit idle.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::{AHashMap, AHashSet};
use ordered_float::OrderedFloat;

use crate::core::types::InstanceId;
use crate::hex::HexCoord;
use crate::map::MapDefinition;
use crate::units::UnitInstance;

/// Node in the A* open set
#[derive(Debug, Clone, Copy)]
struct PathNode {
    coord: HexCoord,
    f_cost: OrderedFloat<f32>,
    h_cost: OrderedFloat<f32>,
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.f_cost == other.f_cost && self.h_cost == other.h_cost && self.coord == other.coord
    }
}

impl Eq for PathNode {}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap; equal f prefers the lower h so the
        // search leans toward the goal, which keeps test expectations stable
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.h_cost.cmp(&self.h_cost))
            .then_with(|| (other.coord.q, other.coord.r).cmp(&(self.coord.q, self.coord.r)))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find a path from start to goal, excluding start
///
/// Cells occupied by another live unit are not expandable, except the goal
/// itself: the goal is always enterable, and callers that need strict
/// occupancy there must validate it separately before pathing.
pub fn find_path(
    map: &MapDefinition,
    units: &[UnitInstance],
    mover: InstanceId,
    start: HexCoord,
    goal: HexCoord,
) -> Vec<HexCoord> {
    if start == goal || !map.contains(goal) {
        return Vec::new();
    }

    let occupied: AHashSet<HexCoord> = units
        .iter()
        .filter(|u| !u.is_destroyed() && u.id != mover)
        .map(|u| u.position)
        .collect();

    let mut open_set = BinaryHeap::new();
    let mut came_from: AHashMap<HexCoord, HexCoord> = AHashMap::new();
    let mut g_scores: AHashMap<HexCoord, f32> = AHashMap::new();

    g_scores.insert(start, 0.0);
    open_set.push(PathNode {
        coord: start,
        f_cost: OrderedFloat(start.distance(&goal) as f32),
        h_cost: OrderedFloat(start.distance(&goal) as f32),
    });

    while let Some(current) = open_set.pop() {
        if current.coord == goal {
            return reconstruct_path(&came_from, current.coord, start);
        }

        let current_g = *g_scores.get(&current.coord).unwrap_or(&f32::INFINITY);

        for neighbor in current.coord.neighbors() {
            let Some(terrain) = map.terrain_at(neighbor) else {
                continue; // Off-map
            };

            let move_cost = terrain.movement_cost();
            if move_cost.is_infinite() {
                continue;
            }

            // Goal is always enterable regardless of occupancy
            if neighbor != goal && occupied.contains(&neighbor) {
                continue;
            }

            let tentative_g = current_g + move_cost;
            let neighbor_g = *g_scores.get(&neighbor).unwrap_or(&f32::INFINITY);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.coord);
                g_scores.insert(neighbor, tentative_g);

                let h = neighbor.distance(&goal) as f32;
                open_set.push(PathNode {
                    coord: neighbor,
                    f_cost: OrderedFloat(tentative_g + h),
                    h_cost: OrderedFloat(h),
                });
            }
        }
    }

    Vec::new() // No path found
}

/// Reconstruct path from came_from map, dropping the start cell
fn reconstruct_path(
    came_from: &AHashMap<HexCoord, HexCoord>,
    mut current: HexCoord,
    start: HexCoord,
) -> Vec<HexCoord> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        if prev == start {
            break;
        }
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Sum of entered-terrain costs along a path
pub fn path_cost(map: &MapDefinition, path: &[HexCoord]) -> f32 {
    path.iter()
        .filter_map(|coord| map.terrain_at(*coord))
        .map(|t| t.movement_cost())
        .sum()
}
