//! Fog-of-war visibility between unit pairs
//!
//! Detection compares hex distance against an effective detection range built
//! from the target's conspicuousness and the observer's optics. This is a
//! looser check than the combat resolver's line of sight: spotting a presence
//! does not mean a clear shot.

use ahash::AHashSet;

use crate::catalog::UnitCatalog;
use crate::constants::ATTACK_DETECTION_PENALTY;
use crate::core::types::{InstanceId, Side};
use crate::map::MapDefinition;
use crate::units::UnitInstance;

/// Can `observer` currently detect `target`?
///
/// Friendly units are never fogged, and a unit always observes itself. A
/// sight multiplier of zero or less leaves the observer permanently blind to
/// enemies. The comparison is inclusive: a target exactly at the effective
/// range is detected.
pub fn can_observe(
    observer: &UnitInstance,
    target: &UnitInstance,
    map: &MapDefinition,
    catalog: &UnitCatalog,
) -> bool {
    if observer.id == target.id {
        return true;
    }
    if observer.side == target.side {
        return true;
    }
    if observer.is_destroyed() || target.is_destroyed() {
        return false;
    }

    let (Some(observer_def), Some(target_def)) =
        (catalog.get(&observer.unit_type), catalog.get(&target.unit_type))
    else {
        return false; // Unknown definitions never grant sight
    };

    let sight = observer_def.stats.sight_multiplier;
    if sight <= 0.0 {
        return false;
    }

    let concealment = map
        .terrain_at(target.position)
        .map(|t| t.concealment())
        .unwrap_or(1.0);
    let sight_bonus = map
        .terrain_at(observer.position)
        .map(|t| t.sight_bonus())
        .unwrap_or(1.0);
    let attack_penalty = if target.status.is_attack_sequence() {
        ATTACK_DETECTION_PENALTY
    } else {
        1.0
    };

    let effective_range =
        target_def.stats.detection_range * concealment * attack_penalty / (sight * sight_bonus);

    observer.position.distance(&target.position) as f32 <= effective_range
}

/// Ids of enemy units any live unit of `side` can currently detect
///
/// This is the boolean visibility set the rendering layer applies as fog of
/// war.
pub fn visible_enemy_ids(
    side: Side,
    units: &[UnitInstance],
    map: &MapDefinition,
    catalog: &UnitCatalog,
) -> AHashSet<InstanceId> {
    let mut visible = AHashSet::new();

    for target in units.iter().filter(|u| u.side != side && !u.is_destroyed()) {
        let spotted = units
            .iter()
            .filter(|u| u.side == side && !u.is_destroyed())
            .any(|observer| can_observe(observer, target, map, catalog));
        if spotted {
            visible.insert(target.id);
        }
    }

    visible
}
