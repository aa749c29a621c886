//! Line-of-sight gating and facing-aware damage resolution
//!
//! The visibility engine answers "can you detect a presence"; this module
//! answers the stricter "can you physically shoot it, and for how much".

use serde::{Deserialize, Serialize};

use crate::catalog::{ArmorFace, UnitDefinition, WeaponKind};
use crate::hex::{HexCoord, LogicalPos};
use crate::map::MapDefinition;

/// Outcome of a single attack resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackResolution {
    pub damage: i32,
    pub penetrated: bool,
}

impl AttackResolution {
    const NONE: Self = Self {
        damage: 0,
        penetrated: false,
    };
}

/// Check line of sight between two hexes
///
/// Self-targets and adjacent hexes always have line of sight. Otherwise the
/// traced line must be clear: an interior cell that blocks fire, or that is
/// missing from the map, fails the check (missing map data is NOT permissive
/// here). A blocking cell equal to either endpoint's own hex is exempt, which
/// is what lets a unit standing on hills shoot over them.
///
/// With no map at all the check is permissive and returns true. That is
/// inconsistent with the fail-closed rule above and kept deliberately; see
/// the design notes before hardening either way.
pub fn has_los(map: Option<&MapDefinition>, attacker: HexCoord, target: HexCoord) -> bool {
    let Some(map) = map else {
        return true;
    };

    if attacker.distance(&target) <= 1 {
        return true;
    }

    let line = attacker.line_to(&target);
    for cell in line.iter().skip(1).take(line.len().saturating_sub(2)) {
        if *cell == attacker || *cell == target {
            continue;
        }
        match map.terrain_at(*cell) {
            None => return false,
            Some(terrain) if terrain.blocks_fire() => return false,
            Some(_) => {}
        }
    }

    true
}

/// Bearing from one logical position to another in degrees [0, 360)
fn bearing_degrees(from: LogicalPos, to: LogicalPos) -> f32 {
    let dy = (to.y - from.y) as f32;
    let dx = (to.x - from.x) as f32;
    dy.atan2(dx).to_degrees().rem_euclid(360.0)
}

/// Which armor face an attack from `attacker_pos` strikes on a target facing
/// `target_facing` degrees
///
/// The impact angle is measured against the target's own facing: within 60°
/// of head-on is the front plate, within 120° the side, beyond that the
/// rear. Top armor is only reachable through indirect fire, which is resolved
/// elsewhere.
pub fn impact_face(attacker_pos: LogicalPos, target_pos: LogicalPos, target_facing: f32) -> ArmorFace {
    let bearing = bearing_degrees(attacker_pos, target_pos);
    let mut impact = (bearing - target_facing + 360.0 + 180.0).rem_euclid(360.0);
    if impact > 180.0 {
        impact = 360.0 - impact;
    }

    if impact <= 60.0 {
        ArmorFace::Front
    } else if impact <= 120.0 {
        ArmorFace::Side
    } else {
        ArmorFace::Back
    }
}

/// Resolve damage for a single attack
///
/// HE is a pure anti-soft weapon: full power against an unarmored target,
/// nothing against any armor. AP compares power against the struck face;
/// a penetrating hit deals `power - armor` and even a bounced shell chips
/// off 1, so resolved AP damage is never zero.
pub fn resolve_damage(
    attacker_def: &UnitDefinition,
    kind: WeaponKind,
    target_def: &UnitDefinition,
    target_facing: f32,
    attacker_pos: LogicalPos,
    target_pos: LogicalPos,
) -> AttackResolution {
    let Some(weapon) = attacker_def.weapon(kind) else {
        return AttackResolution::NONE;
    };
    if weapon.power <= 0 {
        return AttackResolution::NONE;
    }

    let armor = &target_def.stats.armor;
    match kind {
        WeaponKind::He => {
            if armor.is_unarmored() {
                AttackResolution {
                    damage: weapon.power,
                    penetrated: true,
                }
            } else {
                AttackResolution::NONE
            }
        }
        WeaponKind::Ap => {
            let face = impact_face(attacker_pos, target_pos, target_facing);
            let face_armor = armor.face(face);
            if weapon.power > face_armor {
                AttackResolution {
                    damage: (weapon.power - face_armor).max(1),
                    penetrated: true,
                }
            } else {
                AttackResolution {
                    damage: 1,
                    penetrated: false,
                }
            }
        }
    }
}
