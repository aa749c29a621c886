//! Opponent decision making
//!
//! Decision functions only return intended actions; applying them (spending
//! resources, starting movement, queuing production) is the caller's job.
//! That keeps decide and apply separate and the decision logic testable
//! without a live match.

pub mod commander;
pub mod tactics;

use serde::{Deserialize, Serialize};

use crate::constants::BUILD_ORDER_PHASE_SECS;
use crate::core::types::InstanceId;
use crate::hex::HexCoord;

pub use commander::CommanderAgent;
pub use tactics::decide_combat;

/// Production decision for a commander unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommanderAction {
    Produce(String),
    Idle,
}

/// Movement/attack decision for a combat unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatAction {
    Attack(InstanceId),
    Move(HexCoord),
    Idle,
}

/// Tunable production behavior, loadable from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiTuning {
    /// Elapsed seconds under which the scripted build order applies
    #[serde(default = "default_build_order_phase")]
    pub build_order_phase_secs: f32,
    /// Keep at least this many reconnaissance units alive
    #[serde(default = "default_recon_minimum")]
    pub recon_minimum: usize,
    /// Rifle infantry to field before heavier choices
    #[serde(default = "default_rifle_quota")]
    pub rifle_quota: usize,
    /// Anti-tank teams to field
    #[serde(default = "default_anti_tank_quota")]
    pub anti_tank_quota: usize,
    /// Heavy vehicles to field
    #[serde(default = "default_heavy_vehicle_quota")]
    pub heavy_vehicle_quota: usize,
    /// Scripted early-game production, in order
    #[serde(default = "default_build_order")]
    pub build_order: Vec<String>,
}

fn default_build_order_phase() -> f32 {
    BUILD_ORDER_PHASE_SECS
}

fn default_recon_minimum() -> usize {
    1
}

fn default_rifle_quota() -> usize {
    4
}

fn default_anti_tank_quota() -> usize {
    2
}

fn default_heavy_vehicle_quota() -> usize {
    2
}

fn default_build_order() -> Vec<String> {
    vec![
        "recon_infantry".into(),
        "rifle_infantry".into(),
        "rifle_infantry".into(),
        "at_infantry".into(),
        "medium_tank".into(),
    ]
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            build_order_phase_secs: default_build_order_phase(),
            recon_minimum: default_recon_minimum(),
            rifle_quota: default_rifle_quota(),
            anti_tank_quota: default_anti_tank_quota(),
            heavy_vehicle_quota: default_heavy_vehicle_quota(),
            build_order: default_build_order(),
        }
    }
}
