//! Hexfront - tactical simulation core for a hex-grid real-time strategy battle
//!
//! Turns static map/unit data and per-tick intents into unit movement, combat
//! resolution, fog-of-war visibility, and opponent decisions. The embedding
//! game loop owns rendering, input, and timers; this crate owns the rules.
//!
//! Everything is single-threaded and pull-based: the driver calls
//! [`tick::tick`] once per frame, AI decisions come from [`ai`] as intents,
//! and [`state::MatchState`] applies them.

pub mod ai;
pub mod catalog;
pub mod combat;
pub mod constants;
pub mod core;
pub mod hex;
pub mod map;
pub mod pathfinding;
pub mod state;
pub mod terrain;
pub mod tick;
pub mod units;
pub mod visibility;

// Re-exports for convenient access
pub use crate::ai::{AiTuning, CombatAction, CommanderAction, CommanderAgent};
pub use crate::catalog::{
    ArmorFace, ArmorProfile, UnitCatalog, UnitClass, UnitDefinition, UnitStats, WeaponKind,
    WeaponStats,
};
pub use crate::combat::{has_los, resolve_damage, AttackResolution};
pub use crate::core::error::{ProductionError, SimError};
pub use crate::core::types::{InstanceId, PointId, Side, Tick};
pub use crate::hex::{hex_corners, HexCoord, LogicalPos};
pub use crate::map::{DeploymentZone, HexCell, MapDefinition, StrategicPoint};
pub use crate::pathfinding::{find_path, path_cost};
pub use crate::state::{MatchState, SideResources};
pub use crate::terrain::Terrain;
pub use crate::tick::{tick, SimEvent};
pub use crate::units::{MovementState, ProductionOrder, UnitInstance, UnitStatus};
pub use crate::visibility::{can_observe, visible_enemy_ids};
