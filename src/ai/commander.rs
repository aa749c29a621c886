//! Commander production decisions
//!
//! Early game follows a scripted build order; after that a quota heuristic
//! keeps the force composition balanced. Each agent owns its build-order
//! cursor so multiple AI commanders (or a session reset) never share state.

use tracing::debug;

use crate::ai::{AiTuning, CommanderAction};
use crate::catalog::{UnitCatalog, UnitClass, UnitDefinition};
use crate::units::UnitInstance;

/// Decision state for one AI-controlled commander
#[derive(Debug, Clone)]
pub struct CommanderAgent {
    tuning: AiTuning,
    build_cursor: usize,
}

impl CommanderAgent {
    pub fn new(tuning: AiTuning) -> Self {
        Self {
            tuning,
            build_cursor: 0,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(AiTuning::default())
    }

    /// Position in the scripted build order (for diagnostics and tests)
    pub fn build_cursor(&self) -> usize {
        self.build_cursor
    }

    /// Decide what the commander should produce this tick, if anything
    ///
    /// The cursor advances exactly once per scripted unit actually chosen;
    /// an unaffordable scripted entry waits rather than being skipped, while
    /// an unknown id is skipped permanently.
    pub fn decide_production(
        &mut self,
        commander: &UnitInstance,
        units: &[UnitInstance],
        resources: i32,
        catalog: &UnitCatalog,
        elapsed: f32,
    ) -> CommanderAction {
        if commander.is_destroyed() || commander.production.is_some() {
            return CommanderAction::Idle;
        }

        // Scripted opening
        while elapsed < self.tuning.build_order_phase_secs
            && self.build_cursor < self.tuning.build_order.len()
        {
            let id = &self.tuning.build_order[self.build_cursor];
            match catalog.get(id) {
                None => {
                    // Not a valid catalogue entry; skip it for good
                    self.build_cursor += 1;
                }
                Some(def) if def.cost <= resources => {
                    self.build_cursor += 1;
                    debug!(unit_type = %def.id, cursor = self.build_cursor, "scripted production");
                    return CommanderAction::Produce(def.id.clone());
                }
                Some(_) => return CommanderAction::Idle, // Wait until affordable
            }
        }

        // Quota heuristic
        let candidate = self
            .quota_candidate(commander, units, catalog)
            .or_else(|| catalog.cheapest_non_commander());

        match candidate {
            Some(def) if def.cost <= resources => {
                debug!(unit_type = %def.id, "heuristic production");
                CommanderAction::Produce(def.id.clone())
            }
            _ => CommanderAction::Idle,
        }
    }

    /// First unfilled quota in priority order
    fn quota_candidate<'a>(
        &self,
        commander: &UnitInstance,
        units: &[UnitInstance],
        catalog: &'a UnitCatalog,
    ) -> Option<&'a UnitDefinition> {
        let count = |class: UnitClass| {
            units
                .iter()
                .filter(|u| u.side == commander.side && !u.is_destroyed())
                .filter(|u| catalog.get(&u.unit_type).map(|d| d.class) == Some(class))
                .count()
        };

        let quotas = [
            (UnitClass::Recon, self.tuning.recon_minimum),
            (UnitClass::Rifle, self.tuning.rifle_quota),
            (UnitClass::AntiTank, self.tuning.anti_tank_quota),
            (UnitClass::HeavyVehicle, self.tuning.heavy_vehicle_quota),
        ];

        for (class, quota) in quotas {
            if count(class) < quota {
                if let Some(def) = catalog.of_class(class).min_by_key(|d| d.cost) {
                    return Some(def);
                }
            }
        }

        None
    }
}
