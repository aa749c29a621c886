//! Mutable per-match unit instances and the unit status state machine

use serde::{Deserialize, Serialize};

use crate::catalog::{UnitDefinition, WeaponKind};
use crate::core::types::{InstanceId, Side};
use crate::hex::{HexCoord, LogicalPos};

/// Closed state machine for what a unit is currently doing
///
/// Legal transitions: Idle → Turning/Moving/Aiming, Turning → Moving,
/// Aiming → Attacking, Attacking → Reloading, Reloading → Aiming/Idle.
/// Destroyed is terminal and reachable from every state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnitStatus {
    #[default]
    Idle,
    Turning,
    Moving,
    Aiming,
    Attacking(WeaponKind),
    Reloading(WeaponKind),
    Destroyed,
}

impl UnitStatus {
    /// Is the unit inside an attack sequence (aiming, firing, or reloading)?
    pub fn is_attack_sequence(&self) -> bool {
        matches!(
            self,
            UnitStatus::Aiming | UnitStatus::Attacking(_) | UnitStatus::Reloading(_)
        )
    }

    /// Is the unit committed to an action this tick?
    pub fn is_busy(&self) -> bool {
        !matches!(self, UnitStatus::Idle | UnitStatus::Destroyed)
    }

    /// Would moving to `next` be a legal transition?
    pub fn can_transition(&self, next: UnitStatus) -> bool {
        use UnitStatus::*;
        if matches!(next, Destroyed) {
            return !matches!(self, Destroyed);
        }
        match (self, next) {
            (Idle, Turning) | (Idle, Moving) | (Idle, Aiming) => true,
            // Movement redirects re-enter turning or moving directly
            (Turning, Moving) | (Turning, Turning) | (Turning, Idle) => true,
            (Moving, Idle) | (Moving, Turning) | (Moving, Moving) => true,
            (Aiming, Attacking(_)) | (Aiming, Idle) => true,
            (Attacking(a), Reloading(b)) => a == &b,
            (Reloading(_), Aiming) | (Reloading(_), Idle) => true,
            _ => false,
        }
    }
}

/// In-progress movement along a precomputed path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementState {
    pub destination: HexCoord,
    /// Remaining cells, front first; the unit is between hexes while
    /// `time_to_next_hex` counts down
    pub path: Vec<HexCoord>,
    pub time_to_next_hex: f32,
}

/// A queued production order on a commander
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionOrder {
    pub unit_type: String,
    pub time_left: f32,
    pub duration: f32,
}

/// A deployed or produced unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitInstance {
    pub id: InstanceId,
    pub unit_type: String,
    pub side: Side,
    pub position: HexCoord,
    /// Facing in degrees, kept in [0, 360)
    pub facing: f32,
    pub hp: i32,
    pub status: UnitStatus,
    pub movement: Option<MovementState>,
    pub attack_target: Option<InstanceId>,
    pub production: Option<ProductionOrder>,
    /// Seconds remaining in the current aiming or reloading state
    #[serde(default)]
    pub action_timer: f32,
    /// Transient flag for UI hit feedback, cleared each tick
    pub just_hit: bool,
}

impl UnitInstance {
    pub fn new(id: InstanceId, definition: &UnitDefinition, side: Side, position: HexCoord) -> Self {
        Self {
            id,
            unit_type: definition.id.clone(),
            side,
            position,
            facing: 0.0,
            hp: definition.stats.hp,
            status: UnitStatus::Idle,
            movement: None,
            attack_target: None,
            production: None,
            action_timer: 0.0,
            just_hit: false,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.status == UnitStatus::Destroyed
    }

    /// Logical position for the UI layer
    pub fn logical_position(&self) -> LogicalPos {
        self.position.to_logical()
    }

    /// Attempt a status transition, returning whether it was legal
    pub fn transition(&mut self, next: UnitStatus) -> bool {
        if self.status.can_transition(next) {
            self.status = next;
            true
        } else {
            false
        }
    }

    /// Apply damage, clamping hp at zero; zero hp forces Destroyed
    ///
    /// Destroyed units stay in the roster so UI references remain valid.
    pub fn apply_damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount.max(0)).max(0);
        self.just_hit = true;
        if self.hp == 0 && self.status != UnitStatus::Destroyed {
            self.status = UnitStatus::Destroyed;
            self.movement = None;
            self.attack_target = None;
            self.production = None;
        }
    }

    /// Set facing, normalizing into [0, 360)
    pub fn set_facing(&mut self, degrees: f32) {
        self.facing = degrees.rem_euclid(360.0);
    }
}
