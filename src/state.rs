//! Match state: the map, the unit roster, resources, and the match clock
//!
//! The external game loop owns the tick cadence; this module owns applying
//! intents (deployment, production requests, move and attack orders) to the
//! state. AI decision functions never touch this directly.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ai::tactics::choose_weapon;
use crate::catalog::UnitCatalog;
use crate::combat::has_los;
use crate::constants::AIM_TIME_SECS;
use crate::core::error::{ProductionError, Result, SimError};
use crate::core::types::{InstanceId, Side};
use crate::hex::{HexCoord, LogicalPos};
use crate::map::MapDefinition;
use crate::pathfinding::find_path;
use crate::units::{MovementState, ProductionOrder, UnitInstance, UnitStatus};
use crate::visibility::can_observe;

/// Resource pools for both sides
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct SideResources {
    pub friendly: i32,
    pub enemy: i32,
}

impl SideResources {
    pub fn new(friendly: i32, enemy: i32) -> Self {
        Self { friendly, enemy }
    }

    pub fn get(&self, side: Side) -> i32 {
        match side {
            Side::Friendly => self.friendly,
            Side::Enemy => self.enemy,
        }
    }

    pub fn add(&mut self, side: Side, amount: i32) {
        match side {
            Side::Friendly => self.friendly += amount,
            Side::Enemy => self.enemy += amount,
        }
    }

    /// Spend if affordable; returns whether the spend happened
    pub fn try_spend(&mut self, side: Side, amount: i32) -> bool {
        let pool = match side {
            Side::Friendly => &mut self.friendly,
            Side::Enemy => &mut self.enemy,
        };
        if *pool >= amount {
            *pool -= amount;
            true
        } else {
            false
        }
    }
}

/// Full mutable state of one match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchState {
    pub map: MapDefinition,
    pub catalog: UnitCatalog,
    pub units: Vec<UnitInstance>,
    pub resources: SideResources,
    pub elapsed: f32,
    next_instance: u32,
}

impl MatchState {
    pub fn new(map: MapDefinition, catalog: UnitCatalog, resources: SideResources) -> Self {
        Self {
            map,
            catalog,
            units: Vec::new(),
            resources,
            elapsed: 0.0,
            next_instance: 1,
        }
    }

    /// Get a unit by id
    pub fn unit(&self, id: InstanceId) -> Option<&UnitInstance> {
        self.units.iter().find(|u| u.id == id)
    }

    /// Get a mutable unit by id
    pub fn unit_mut(&mut self, id: InstanceId) -> Option<&mut UnitInstance> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    /// The live unit occupying a hex, if any
    pub fn unit_at(&self, coord: HexCoord) -> Option<&UnitInstance> {
        self.units
            .iter()
            .find(|u| !u.is_destroyed() && u.position == coord)
    }

    /// Is a hex on the map, passable, and unoccupied?
    pub fn is_free(&self, coord: HexCoord) -> bool {
        self.map
            .terrain_at(coord)
            .map(|t| !t.impassable())
            .unwrap_or(false)
            && self.unit_at(coord).is_none()
    }

    /// Live units of a side
    pub fn side_units(&self, side: Side) -> impl Iterator<Item = &UnitInstance> {
        self.units
            .iter()
            .filter(move |u| u.side == side && !u.is_destroyed())
    }

    /// Create a unit at an axial coordinate, bypassing deployment zones
    ///
    /// Used by production completion and match scripting; deployment from the
    /// setup screen goes through [`deploy`](Self::deploy).
    pub fn spawn(&mut self, unit_type: &str, side: Side, position: HexCoord) -> Result<InstanceId> {
        let definition = self
            .catalog
            .get(unit_type)
            .ok_or_else(|| SimError::UnknownUnitType(unit_type.to_string()))?;

        let passable = self
            .map
            .terrain_at(position)
            .map(|t| !t.impassable())
            .unwrap_or(false);
        if !passable {
            return Err(SimError::InvalidDeployment(format!(
                "hex ({}, {}) is off the map or impassable",
                position.q, position.r
            )));
        }
        if self.unit_at(position).is_some() {
            return Err(SimError::InvalidDeployment(format!(
                "hex ({}, {}) is occupied",
                position.q, position.r
            )));
        }

        let id = InstanceId(self.next_instance);
        self.next_instance += 1;

        let mut unit = UnitInstance::new(id, definition, side, position);
        // Fresh units face the opposing map edge
        unit.facing = match side {
            Side::Friendly => 0.0,
            Side::Enemy => 180.0,
        };
        self.units.push(unit);
        Ok(id)
    }

    /// Deploy a unit from the setup screen at a logical position
    ///
    /// The position must fall inside the side's deployment zone.
    pub fn deploy(&mut self, unit_type: &str, side: Side, position: LogicalPos) -> Result<InstanceId> {
        if !self.map.deployment_zone(side).contains(position) {
            return Err(SimError::InvalidDeployment(format!(
                "({}, {}) is outside the {:?} deployment zone",
                position.x, position.y, side
            )));
        }
        self.spawn(unit_type, side, HexCoord::from_logical(position))
    }

    /// Queue production on a commander
    ///
    /// Rejected synchronously with a reason code; resources are spent at
    /// accept time.
    pub fn start_production(
        &mut self,
        commander_id: InstanceId,
        unit_type: &str,
    ) -> std::result::Result<(), ProductionError> {
        let commander = self
            .unit(commander_id)
            .filter(|u| !u.is_destroyed())
            .ok_or(ProductionError::UnknownCommander)?;

        let is_commander = self
            .catalog
            .get(&commander.unit_type)
            .map(|d| d.is_commander)
            .unwrap_or(false);
        if !is_commander {
            return Err(ProductionError::NotACommander);
        }
        if commander.production.is_some() {
            return Err(ProductionError::CommanderBusy);
        }

        let side = commander.side;
        let definition = self
            .catalog
            .get(unit_type)
            .ok_or(ProductionError::UnknownUnitType)?;
        let cost = definition.cost;
        let duration = definition.production_time;
        let produced_type = definition.id.clone();

        if !self.resources.try_spend(side, cost) {
            return Err(ProductionError::InsufficientResources);
        }

        debug!(commander = commander_id.0, unit_type = %produced_type, "production queued");
        let commander = self.unit_mut(commander_id).expect("checked above");
        commander.production = Some(ProductionOrder {
            unit_type: produced_type,
            time_left: duration,
            duration,
        });
        Ok(())
    }

    /// Order a unit to move to a goal hex
    ///
    /// Pathfinds immediately; an unreachable goal leaves the unit idle and
    /// returns false. Units with a turn speed swing toward the first step
    /// before moving, others snap.
    pub fn order_move(&mut self, unit_id: InstanceId, goal: HexCoord) -> bool {
        let Some(unit) = self.unit(unit_id) else {
            return false;
        };
        if unit.is_destroyed() {
            return false;
        }

        let start = unit.position;
        let path = find_path(&self.map, &self.units, unit_id, start, goal);
        if path.is_empty() {
            return false;
        }

        let first = path[0];
        let leg = self.leg_time(unit_id, first);
        let desired = start.bearing_to(&first);
        let needs_turn = self
            .catalog
            .get(&self.unit(unit_id).expect("checked above").unit_type)
            .and_then(|d| d.stats.turn_speed)
            .is_some();

        let unit = self.unit_mut(unit_id).expect("checked above");
        let next_status = if needs_turn && (unit.facing - desired).rem_euclid(360.0) != 0.0 {
            UnitStatus::Turning
        } else {
            UnitStatus::Moving
        };
        // A state that cannot start moving (mid attack sequence) refuses the
        // order outright
        if !unit.transition(next_status) {
            return false;
        }
        if next_status == UnitStatus::Moving {
            unit.set_facing(desired);
        }
        unit.movement = Some(MovementState {
            destination: goal,
            path,
            time_to_next_hex: leg,
        });
        unit.attack_target = None;
        debug!(unit = unit_id.0, ?goal, "move order");
        true
    }

    /// Order a unit to attack a target
    ///
    /// The shot must be in range of a usable weapon, observed, and have line
    /// of sight; otherwise the order is refused.
    pub fn order_attack(&mut self, attacker_id: InstanceId, target_id: InstanceId) -> bool {
        let (Some(attacker), Some(target)) = (self.unit(attacker_id), self.unit(target_id)) else {
            return false;
        };
        if attacker.is_destroyed() || target.is_destroyed() || attacker.side == target.side {
            return false;
        }
        let (Some(attacker_def), Some(target_def)) = (
            self.catalog.get(&attacker.unit_type),
            self.catalog.get(&target.unit_type),
        ) else {
            return false;
        };

        let distance = attacker.position.distance(&target.position);
        if choose_weapon(attacker_def, target_def, distance).is_none() {
            return false;
        }
        if !can_observe(attacker, target, &self.map, &self.catalog) {
            return false;
        }
        if !has_los(Some(&self.map), attacker.position, target.position) {
            return false;
        }

        let unit = self.unit_mut(attacker_id).expect("checked above");
        if !unit.transition(UnitStatus::Aiming) {
            return false;
        }
        unit.attack_target = Some(target_id);
        unit.movement = None;
        unit.action_timer = AIM_TIME_SECS;
        debug!(attacker = attacker_id.0, target = target_id.0, "attack order");
        true
    }

    /// Seconds for a unit to enter a hex, from the entered terrain's cost
    pub(crate) fn leg_time(&self, unit_id: InstanceId, into: HexCoord) -> f32 {
        let speed = self
            .unit(unit_id)
            .and_then(|u| self.catalog.get(&u.unit_type))
            .map(|d| d.stats.move_speed)
            .unwrap_or(1.0);
        let cost = self
            .map
            .terrain_at(into)
            .map(|t| t.movement_cost())
            .unwrap_or(f32::INFINITY);
        if speed > 0.0 {
            cost / speed
        } else {
            f32::INFINITY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skirmish_state() -> MatchState {
        MatchState::new(
            MapDefinition::open(20, 16),
            UnitCatalog::with_defaults(),
            SideResources::new(100, 100),
        )
    }

    #[test]
    fn test_deploy_inside_zone() {
        let mut state = skirmish_state();
        let id = state
            .deploy("rifle_infantry", Side::Friendly, LogicalPos::new(0, 3))
            .expect("deploy failed");
        assert_eq!(state.unit(id).unwrap().side, Side::Friendly);
        assert_eq!(state.units.len(), 1);
    }

    #[test]
    fn test_deploy_outside_zone_rejected() {
        let mut state = skirmish_state();
        let result = state.deploy("rifle_infantry", Side::Friendly, LogicalPos::new(10, 3));
        assert!(matches!(result, Err(SimError::InvalidDeployment(_))));
    }

    #[test]
    fn test_deploy_unknown_type_rejected() {
        let mut state = skirmish_state();
        let result = state.deploy("zeppelin", Side::Friendly, LogicalPos::new(0, 3));
        assert!(matches!(result, Err(SimError::UnknownUnitType(_))));
    }

    #[test]
    fn test_deploy_occupied_hex_rejected() {
        let mut state = skirmish_state();
        state
            .deploy("rifle_infantry", Side::Friendly, LogicalPos::new(0, 3))
            .unwrap();
        let result = state.deploy("rifle_infantry", Side::Friendly, LogicalPos::new(0, 3));
        assert!(matches!(result, Err(SimError::InvalidDeployment(_))));
    }

    #[test]
    fn test_instance_ids_unique_and_sequential() {
        let mut state = skirmish_state();
        let a = state
            .deploy("rifle_infantry", Side::Friendly, LogicalPos::new(0, 1))
            .unwrap();
        let b = state
            .deploy("rifle_infantry", Side::Friendly, LogicalPos::new(0, 2))
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(b.0, a.0 + 1);
    }

    #[test]
    fn test_production_happy_path_spends_resources() {
        let mut state = skirmish_state();
        let cmd = state
            .deploy("commander", Side::Enemy, LogicalPos::new(19, 3))
            .unwrap();

        state.start_production(cmd, "rifle_infantry").expect("rejected");
        assert_eq!(state.resources.get(Side::Enemy), 75);
        let order = state.unit(cmd).unwrap().production.as_ref().unwrap();
        assert_eq!(order.unit_type, "rifle_infantry");
        assert!(order.time_left <= order.duration);
    }

    #[test]
    fn test_production_reason_codes() {
        let mut state = skirmish_state();
        let cmd = state
            .deploy("commander", Side::Enemy, LogicalPos::new(19, 3))
            .unwrap();
        let grunt = state
            .deploy("rifle_infantry", Side::Enemy, LogicalPos::new(19, 5))
            .unwrap();

        assert_eq!(
            state.start_production(grunt, "rifle_infantry"),
            Err(ProductionError::NotACommander)
        );
        assert_eq!(
            state.start_production(InstanceId(99), "rifle_infantry"),
            Err(ProductionError::UnknownCommander)
        );
        assert_eq!(
            state.start_production(cmd, "laser_battery"),
            Err(ProductionError::UnknownUnitType)
        );
        assert_eq!(
            state.start_production(cmd, "heavy_tank"), // costs 140 > 100
            Err(ProductionError::InsufficientResources)
        );

        state.start_production(cmd, "rifle_infantry").unwrap();
        assert_eq!(
            state.start_production(cmd, "rifle_infantry"),
            Err(ProductionError::CommanderBusy)
        );
    }

    #[test]
    fn test_rejected_production_spends_nothing() {
        let mut state = skirmish_state();
        let cmd = state
            .deploy("commander", Side::Enemy, LogicalPos::new(19, 3))
            .unwrap();

        let _ = state.start_production(cmd, "heavy_tank");
        assert_eq!(state.resources.get(Side::Enemy), 100);
    }

    #[test]
    fn test_order_move_sets_movement() {
        let mut state = skirmish_state();
        let id = state
            .deploy("rifle_infantry", Side::Friendly, LogicalPos::new(0, 3))
            .unwrap();

        let goal = HexCoord::from_logical(LogicalPos::new(6, 3));
        assert!(state.order_move(id, goal));

        let unit = state.unit(id).unwrap();
        assert_eq!(unit.status, UnitStatus::Moving); // Infantry snap-turns
        let movement = unit.movement.as_ref().unwrap();
        assert_eq!(movement.destination, goal);
        assert!(!movement.path.is_empty());
        assert!(movement.time_to_next_hex > 0.0);
    }

    #[test]
    fn test_order_move_unreachable_stays_idle() {
        let mut state = skirmish_state();
        let id = state
            .deploy("rifle_infantry", Side::Friendly, LogicalPos::new(0, 3))
            .unwrap();

        assert!(!state.order_move(id, HexCoord::new(500, 500)));
        let unit = state.unit(id).unwrap();
        assert_eq!(unit.status, UnitStatus::Idle);
        assert!(unit.movement.is_none());
    }

    #[test]
    fn test_vehicle_turns_before_moving() {
        let mut state = skirmish_state();
        let id = state
            .deploy("scout_car", Side::Friendly, LogicalPos::new(1, 3))
            .unwrap();
        // Facing east (0.0); order a move back west
        let goal = HexCoord::from_logical(LogicalPos::new(0, 3));
        assert!(state.order_move(id, goal));
        assert_eq!(state.unit(id).unwrap().status, UnitStatus::Turning);
    }

    #[test]
    fn test_order_attack_gates() {
        let mut state = skirmish_state();
        let shooter = state
            .deploy("rifle_infantry", Side::Friendly, LogicalPos::new(1, 3))
            .unwrap();
        // Enemy deployed in its own zone, far out of range
        let far = state
            .deploy("rifle_infantry", Side::Enemy, LogicalPos::new(19, 3))
            .unwrap();
        assert!(!state.order_attack(shooter, far));

        // Adjacent enemy: valid
        let near = state
            .spawn("rifle_infantry", Side::Enemy, HexCoord::from_logical(LogicalPos::new(2, 3)))
            .unwrap();
        assert!(state.order_attack(shooter, near));
        let unit = state.unit(shooter).unwrap();
        assert_eq!(unit.status, UnitStatus::Aiming);
        assert_eq!(unit.attack_target, Some(near));
    }

    #[test]
    fn test_order_attack_refuses_friendlies() {
        let mut state = skirmish_state();
        let a = state
            .deploy("rifle_infantry", Side::Friendly, LogicalPos::new(0, 3))
            .unwrap();
        let b = state
            .deploy("rifle_infantry", Side::Friendly, LogicalPos::new(1, 3))
            .unwrap();
        assert!(!state.order_attack(a, b));
    }
}
