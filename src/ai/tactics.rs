//! Combat unit decisions: pick a target, push for objectives, or chase
//!
//! A unit committed to an action finishes it first; there is no preemption
//! of a move already underway.

use tracing::debug;

use crate::ai::CombatAction;
use crate::catalog::{UnitCatalog, UnitDefinition, WeaponKind};
use crate::combat::has_los;
use crate::core::types::InstanceId;
use crate::hex::HexCoord;
use crate::map::MapDefinition;
use crate::units::{UnitInstance, UnitStatus};
use crate::visibility::can_observe;

/// Pick the weapon to use against a target at the given distance
///
/// AP is preferred the moment the target carries any armor and is inside AP
/// range (HE cannot hurt armor); otherwise HE, with AP as the fallback
/// against unarmored targets when HE cannot reach.
pub fn choose_weapon(
    attacker_def: &UnitDefinition,
    target_def: &UnitDefinition,
    distance: u32,
) -> Option<WeaponKind> {
    let ap_in_range = attacker_def
        .stats
        .ap_weapon
        .is_some_and(|w| distance <= w.range);
    let he_in_range = attacker_def
        .stats
        .he_weapon
        .is_some_and(|w| distance <= w.range);

    let armored = !target_def.stats.armor.is_unarmored();
    if armored && ap_in_range {
        Some(WeaponKind::Ap)
    } else if he_in_range {
        Some(WeaponKind::He)
    } else if ap_in_range {
        Some(WeaponKind::Ap)
    } else {
        None
    }
}

/// Decide what a combat unit should do this tick
pub fn decide_combat(
    unit: &UnitInstance,
    units: &[UnitInstance],
    map: &MapDefinition,
    catalog: &UnitCatalog,
) -> CombatAction {
    if unit.is_destroyed() {
        return CombatAction::Idle;
    }
    // Let the current action finish
    if unit.status.is_attack_sequence() && unit.attack_target.is_some() {
        return CombatAction::Idle;
    }
    if matches!(unit.status, UnitStatus::Moving | UnitStatus::Turning) {
        return CombatAction::Idle;
    }

    let Some(def) = catalog.get(&unit.unit_type) else {
        return CombatAction::Idle;
    };

    if let Some(target) = select_target(unit, def, units, map, catalog) {
        debug!(unit = unit.id.0, target = target.0, "attack decision");
        return CombatAction::Attack(target);
    }

    // March on the nearest strategic point this side does not hold; ties go
    // to the first point in map order
    let mut nearest_point: Option<(HexCoord, u32)> = None;
    for point in map.strategic_points.iter().filter(|p| p.owner != Some(unit.side)) {
        let hex = point.axial();
        let d = unit.position.distance(&hex);
        if nearest_point.map(|(_, bd)| d < bd).unwrap_or(true) {
            nearest_point = Some((hex, d));
        }
    }

    if let Some((goal, _)) = nearest_point {
        if already_en_route(unit, goal) {
            return CombatAction::Idle;
        }
        debug!(unit = unit.id.0, ?goal, "objective march");
        return CombatAction::Move(goal);
    }

    // All points held: close on the nearest visible enemy
    let mut nearest_enemy: Option<(HexCoord, u32)> = None;
    for target in units
        .iter()
        .filter(|t| t.side != unit.side && !t.is_destroyed())
        .filter(|t| can_observe(unit, t, map, catalog))
    {
        let d = unit.position.distance(&target.position);
        if nearest_enemy.map(|(_, bd)| d < bd).unwrap_or(true) {
            nearest_enemy = Some((target.position, d));
        }
    }

    if let Some((goal, _)) = nearest_enemy {
        if already_en_route(unit, goal) {
            return CombatAction::Idle;
        }
        debug!(unit = unit.id.0, ?goal, "pursuit");
        return CombatAction::Move(goal);
    }

    CombatAction::Idle
}

/// Best attackable target: any qualifying commander immediately, else the
/// lowest-hp qualifier, else the first found
fn select_target(
    unit: &UnitInstance,
    def: &UnitDefinition,
    units: &[UnitInstance],
    map: &MapDefinition,
    catalog: &UnitCatalog,
) -> Option<InstanceId> {
    let mut best: Option<&UnitInstance> = None;

    for target in units.iter().filter(|t| t.side != unit.side && !t.is_destroyed()) {
        let Some(target_def) = catalog.get(&target.unit_type) else {
            continue;
        };
        let distance = unit.position.distance(&target.position);
        if choose_weapon(def, target_def, distance).is_none() {
            continue;
        }
        if !can_observe(unit, target, map, catalog) {
            continue;
        }
        if !has_los(Some(map), unit.position, target.position) {
            continue;
        }

        if target_def.is_commander {
            return Some(target.id); // Commanders are always the priority
        }
        match best {
            Some(b) if b.hp <= target.hp => {}
            _ => best = Some(target),
        }
    }

    best.map(|t| t.id)
}

fn already_en_route(unit: &UnitInstance, goal: HexCoord) -> bool {
    unit.movement
        .as_ref()
        .is_some_and(|m| m.destination == goal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UnitCatalog;
    use crate::core::types::{InstanceId, Side};
    use crate::map::MapDefinition;
    use crate::terrain::Terrain;
    use crate::units::MovementState;

    fn unit(id: u32, unit_type: &str, side: Side, coord: HexCoord) -> UnitInstance {
        let catalog = UnitCatalog::with_defaults();
        UnitInstance::new(InstanceId(id), catalog.get(unit_type).unwrap(), side, coord)
    }

    #[test]
    fn test_weapon_choice_ap_against_armor() {
        let catalog = UnitCatalog::with_defaults();
        let tank = catalog.get("medium_tank").unwrap();
        let rifle = catalog.get("rifle_infantry").unwrap();

        // Tank vs tank inside AP range
        assert_eq!(choose_weapon(tank, tank, 4), Some(WeaponKind::Ap));
        // Tank vs infantry prefers HE
        assert_eq!(choose_weapon(tank, rifle, 3), Some(WeaponKind::He));
        // AP works against unarmored targets when it is the weapon in range
        let at = catalog.get("at_infantry").unwrap();
        assert_eq!(choose_weapon(at, rifle, 2), Some(WeaponKind::Ap));
        // Nothing in range
        assert_eq!(choose_weapon(rifle, rifle, 5), None);
    }

    #[test]
    fn test_commander_target_preferred_over_lower_hp() {
        let map = MapDefinition::open(20, 20);
        let catalog = UnitCatalog::with_defaults();

        let shooter = unit(1, "rifle_infantry", Side::Enemy, HexCoord::new(5, 5));
        let mut weak_rifle = unit(2, "rifle_infantry", Side::Friendly, HexCoord::new(6, 5));
        weak_rifle.apply_damage(70); // 10 hp left
        let commander = unit(3, "commander", Side::Friendly, HexCoord::new(4, 5));

        let units = vec![shooter.clone(), weak_rifle, commander];
        let action = decide_combat(&shooter, &units, &map, &catalog);
        assert_eq!(action, CombatAction::Attack(InstanceId(3)));
    }

    #[test]
    fn test_lowest_hp_target_wins_without_commander() {
        let map = MapDefinition::open(20, 20);
        let catalog = UnitCatalog::with_defaults();

        let shooter = unit(1, "rifle_infantry", Side::Enemy, HexCoord::new(5, 5));
        let healthy = unit(2, "rifle_infantry", Side::Friendly, HexCoord::new(6, 5));
        let mut hurt = unit(3, "rifle_infantry", Side::Friendly, HexCoord::new(4, 5));
        hurt.apply_damage(30);

        let units = vec![shooter.clone(), healthy, hurt];
        let action = decide_combat(&shooter, &units, &map, &catalog);
        assert_eq!(action, CombatAction::Attack(InstanceId(3)));
    }

    #[test]
    fn test_busy_unit_idles() {
        let map = MapDefinition::open(20, 20);
        let catalog = UnitCatalog::with_defaults();

        let mut shooter = unit(1, "rifle_infantry", Side::Enemy, HexCoord::new(5, 5));
        let target = unit(2, "rifle_infantry", Side::Friendly, HexCoord::new(6, 5));

        shooter.attack_target = Some(InstanceId(2));
        shooter.transition(UnitStatus::Aiming);

        let units = vec![shooter.clone(), target];
        assert_eq!(decide_combat(&shooter, &units, &map, &catalog), CombatAction::Idle);
    }

    #[test]
    fn test_moving_unit_does_not_preempt() {
        let map = MapDefinition::open(20, 20);
        let catalog = UnitCatalog::with_defaults();

        let mut mover = unit(1, "rifle_infantry", Side::Enemy, HexCoord::new(5, 5));
        mover.movement = Some(MovementState {
            destination: HexCoord::new(10, 5),
            path: vec![HexCoord::new(6, 5)],
            time_to_next_hex: 0.5,
        });
        mover.transition(UnitStatus::Moving);

        // An adjacent enemy would normally be attacked
        let target = unit(2, "rifle_infantry", Side::Friendly, HexCoord::new(4, 5));
        let units = vec![mover.clone(), target];
        assert_eq!(decide_combat(&mover, &units, &map, &catalog), CombatAction::Idle);
    }

    #[test]
    fn test_los_blocks_attack_decision() {
        let mut map = MapDefinition::open(20, 20);
        let catalog = UnitCatalog::with_defaults();
        map.set_terrain(HexCoord::new(6, 5), Terrain::Forest);

        let shooter = unit(1, "at_infantry", Side::Enemy, HexCoord::new(5, 5));
        let target = unit(2, "medium_tank", Side::Friendly, HexCoord::new(7, 5));

        let units = vec![shooter.clone(), target];
        let action = decide_combat(&shooter, &units, &map, &catalog);
        // Forest in between: no shot, so march on an objective or chase
        assert_ne!(action, CombatAction::Attack(InstanceId(2)));
    }

    #[test]
    fn test_marches_to_unowned_point() {
        let mut map = MapDefinition::skirmish(20, 16, 3);
        let catalog = UnitCatalog::with_defaults();
        // Hand every point but one to the enemy side; it still marches to the
        // nearest point it does not own
        for p in map.strategic_points.iter_mut().skip(1) {
            p.owner = Some(Side::Enemy);
        }

        let mover = unit(1, "rifle_infantry", Side::Enemy, HexCoord::new(0, 0));
        let units = vec![mover.clone()];
        let expected = map.strategic_points[0].axial();
        assert_eq!(
            decide_combat(&mover, &units, &map, &catalog),
            CombatAction::Move(expected)
        );
    }

    #[test]
    fn test_does_not_reissue_move_to_same_point() {
        let map = MapDefinition::skirmish(20, 16, 3);
        let catalog = UnitCatalog::with_defaults();

        let mut mover = unit(1, "rifle_infantry", Side::Enemy, HexCoord::new(0, 0));
        let nearest = map
            .strategic_points
            .iter()
            .min_by_key(|p| mover.position.distance(&p.axial()))
            .unwrap()
            .axial();
        mover.movement = Some(MovementState {
            destination: nearest,
            path: vec![],
            time_to_next_hex: 0.0,
        });
        // Status Idle but already ordered toward the point

        let units = vec![mover.clone()];
        assert_eq!(decide_combat(&mover, &units, &map, &catalog), CombatAction::Idle);
    }

    fn open_map_with_held_point() -> MapDefinition {
        use crate::core::types::PointId;
        use crate::hex::LogicalPos;
        use crate::map::StrategicPoint;

        let mut map = MapDefinition::open(20, 16);
        let mut point = StrategicPoint::new(PointId(0), "Hill 21", LogicalPos::new(10, 8));
        point.owner = Some(Side::Enemy);
        map.strategic_points.push(point);
        map
    }

    #[test]
    fn test_chases_visible_enemy_when_points_held() {
        let map = open_map_with_held_point();
        let catalog = UnitCatalog::with_defaults();

        let chaser = unit(1, "rifle_infantry", Side::Enemy, HexCoord::new(2, 2));
        let prey = unit(2, "rifle_infantry", Side::Friendly, HexCoord::new(5, 2));

        let units = vec![chaser.clone(), prey.clone()];
        assert_eq!(
            decide_combat(&chaser, &units, &map, &catalog),
            CombatAction::Move(prey.position)
        );
    }

    #[test]
    fn test_idles_with_nothing_to_do() {
        let map = open_map_with_held_point();
        let catalog = UnitCatalog::with_defaults();

        let lone = unit(1, "rifle_infantry", Side::Enemy, HexCoord::new(2, 2));
        let units = vec![lone.clone()];
        assert_eq!(decide_combat(&lone, &units, &map, &catalog), CombatAction::Idle);
    }
}
