//! Per-tick execution of movement, combat, production, and capture
//!
//! The external driver calls [`tick`] once per frame with the elapsed time.
//! Intents were applied to the state beforehand (see `state`); this module
//! only advances them.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ai::tactics::choose_weapon;
use crate::catalog::WeaponKind;
use crate::combat::{has_los, resolve_damage};
use crate::constants::AIM_TIME_SECS;
use crate::core::types::{InstanceId, PointId, Side};
use crate::hex::HexCoord;
use crate::pathfinding::find_path;
use crate::state::MatchState;
use crate::units::{UnitInstance, UnitStatus};
use crate::visibility::can_observe;

/// Things that happened during a tick, for the UI and the match log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    UnitMoved {
        unit: InstanceId,
        position: HexCoord,
    },
    UnitArrived {
        unit: InstanceId,
        position: HexCoord,
    },
    AttackResolved {
        attacker: InstanceId,
        target: InstanceId,
        kind: WeaponKind,
        damage: i32,
        penetrated: bool,
    },
    UnitDestroyed {
        unit: InstanceId,
    },
    ProductionCompleted {
        commander: InstanceId,
        unit: InstanceId,
        unit_type: String,
    },
    /// Production finished but no free hex exists next to the commander
    ProductionHeld {
        commander: InstanceId,
    },
    PointCaptured {
        point: PointId,
        side: Side,
    },
}

/// Advance the whole match by `dt` seconds
pub fn tick(state: &mut MatchState, dt: f32) -> Vec<SimEvent> {
    let mut events = Vec::new();

    for unit in state.units.iter_mut() {
        unit.just_hit = false;
    }

    advance_movement(state, dt, &mut events);
    advance_attacks(state, dt, &mut events);
    advance_production(state, dt, &mut events);
    advance_capture(state, dt, &mut events);

    state.elapsed += dt;
    events
}

/// Signed shortest rotation from one bearing to another, in (-180, 180]
fn shortest_arc(from: f32, to: f32) -> f32 {
    let mut delta = (to - from).rem_euclid(360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    delta
}

fn is_occupied(units: &[UnitInstance], skip_idx: usize, cell: HexCoord) -> bool {
    units
        .iter()
        .enumerate()
        .any(|(i, u)| i != skip_idx && !u.is_destroyed() && u.position == cell)
}

fn advance_movement(state: &mut MatchState, dt: f32, events: &mut Vec<SimEvent>) {
    for idx in 0..state.units.len() {
        match state.units[idx].status {
            UnitStatus::Turning => advance_turning(state, idx, dt),
            UnitStatus::Moving => advance_moving(state, idx, dt, events),
            _ => {}
        }
    }
}

fn advance_turning(state: &mut MatchState, idx: usize, dt: f32) {
    let Some(next) = state.units[idx]
        .movement
        .as_ref()
        .and_then(|m| m.path.first().copied())
    else {
        let unit = &mut state.units[idx];
        unit.movement = None;
        unit.transition(UnitStatus::Idle);
        return;
    };

    let desired = state.units[idx].position.bearing_to(&next);
    let turn_speed = state
        .catalog
        .get(&state.units[idx].unit_type)
        .and_then(|d| d.stats.turn_speed);

    let unit = &mut state.units[idx];
    match turn_speed {
        None => {
            unit.set_facing(desired);
            unit.transition(UnitStatus::Moving);
        }
        Some(speed) => {
            let remaining = shortest_arc(unit.facing, desired);
            let step = speed * dt;
            if remaining.abs() <= step {
                unit.set_facing(desired);
                unit.transition(UnitStatus::Moving);
            } else {
                let facing = unit.facing + step * remaining.signum();
                unit.set_facing(facing);
            }
        }
    }
}

fn advance_moving(state: &mut MatchState, idx: usize, dt: f32, events: &mut Vec<SimEvent>) {
    {
        let unit = &mut state.units[idx];
        let Some(movement) = unit.movement.as_mut() else {
            unit.transition(UnitStatus::Idle);
            return;
        };
        movement.time_to_next_hex -= dt;
        if movement.time_to_next_hex > 0.0 {
            return;
        }
    }

    let next = state.units[idx]
        .movement
        .as_ref()
        .and_then(|m| m.path.first().copied());
    let Some(next) = next else {
        let unit = &mut state.units[idx];
        let (id, position) = (unit.id, unit.position);
        unit.movement = None;
        unit.transition(UnitStatus::Idle);
        events.push(SimEvent::UnitArrived { unit: id, position });
        return;
    };

    if is_occupied(&state.units, idx, next) {
        reroute(state, idx, next);
        return;
    }

    step_into(state, idx, next, events);
}

/// The next cell is blocked: path around it, or give up
fn reroute(state: &mut MatchState, idx: usize, blocked: HexCoord) {
    let (id, position, destination) = {
        let unit = &state.units[idx];
        let destination = unit.movement.as_ref().map(|m| m.destination);
        (unit.id, unit.position, destination)
    };
    let Some(destination) = destination else {
        let unit = &mut state.units[idx];
        unit.transition(UnitStatus::Idle);
        return;
    };

    let new_path = find_path(&state.map, &state.units, id, position, destination);
    // A path that immediately re-enters the blocked cell means the blocker is
    // sitting on the destination itself; wait in place is pointless, stop
    if new_path.is_empty() || new_path.first() == Some(&blocked) {
        debug!(unit = id.0, "route blocked, stopping");
        let unit = &mut state.units[idx];
        unit.movement = None;
        unit.transition(UnitStatus::Idle);
        return;
    }

    let leg = state.leg_time(id, new_path[0]);
    let unit = &mut state.units[idx];
    let movement = unit.movement.as_mut().expect("checked above");
    movement.path = new_path;
    movement.time_to_next_hex = leg;
}

fn step_into(state: &mut MatchState, idx: usize, next: HexCoord, events: &mut Vec<SimEvent>) {
    let id = state.units[idx].id;
    let facing = state.units[idx].position.bearing_to(&next);
    {
        let unit = &mut state.units[idx];
        unit.position = next;
        unit.set_facing(facing);
        if let Some(movement) = unit.movement.as_mut() {
            movement.path.remove(0);
        }
    }
    events.push(SimEvent::UnitMoved {
        unit: id,
        position: next,
    });

    let path_empty = state.units[idx]
        .movement
        .as_ref()
        .map(|m| m.path.is_empty())
        .unwrap_or(true);
    if path_empty {
        let unit = &mut state.units[idx];
        unit.movement = None;
        unit.transition(UnitStatus::Idle);
        events.push(SimEvent::UnitArrived {
            unit: id,
            position: next,
        });
    } else {
        let front = state.units[idx].movement.as_ref().expect("not empty").path[0];
        let leg = state.leg_time(id, front);
        state.units[idx]
            .movement
            .as_mut()
            .expect("not empty")
            .time_to_next_hex = leg;
    }
}

fn advance_attacks(state: &mut MatchState, dt: f32, events: &mut Vec<SimEvent>) {
    for idx in 0..state.units.len() {
        match state.units[idx].status {
            UnitStatus::Aiming => {
                {
                    let unit = &mut state.units[idx];
                    unit.action_timer -= dt;
                    if unit.action_timer > 0.0 {
                        continue;
                    }
                }
                fire(state, idx, events);
            }
            UnitStatus::Reloading(_) => {
                {
                    let unit = &mut state.units[idx];
                    unit.action_timer -= dt;
                    if unit.action_timer > 0.0 {
                        continue;
                    }
                }
                let engageable = target_engageable(state, idx).is_some();
                let unit = &mut state.units[idx];
                if engageable {
                    unit.transition(UnitStatus::Aiming);
                    unit.action_timer = AIM_TIME_SECS;
                } else {
                    unit.attack_target = None;
                    unit.transition(UnitStatus::Idle);
                }
            }
            _ => {}
        }
    }
}

/// Target index and weapon, if the current target can still be shot at
fn target_engageable(state: &MatchState, idx: usize) -> Option<(usize, WeaponKind)> {
    let attacker = &state.units[idx];
    let target_id = attacker.attack_target?;
    let tidx = state
        .units
        .iter()
        .position(|u| u.id == target_id && !u.is_destroyed())?;
    let target = &state.units[tidx];

    let attacker_def = state.catalog.get(&attacker.unit_type)?;
    let target_def = state.catalog.get(&target.unit_type)?;
    let distance = attacker.position.distance(&target.position);
    let kind = choose_weapon(attacker_def, target_def, distance)?;

    if !can_observe(attacker, target, &state.map, &state.catalog) {
        return None;
    }
    if !has_los(Some(&state.map), attacker.position, target.position) {
        return None;
    }
    Some((tidx, kind))
}

/// Release the aimed shot, apply damage, and start reloading
fn fire(state: &mut MatchState, idx: usize, events: &mut Vec<SimEvent>) {
    let Some((tidx, kind)) = target_engageable(state, idx) else {
        let unit = &mut state.units[idx];
        unit.attack_target = None;
        unit.transition(UnitStatus::Idle);
        return;
    };

    let attacker = &state.units[idx];
    let target = &state.units[tidx];
    let attacker_def = state.catalog.get(&attacker.unit_type).expect("checked");
    let target_def = state.catalog.get(&target.unit_type).expect("checked");

    let resolution = resolve_damage(
        attacker_def,
        kind,
        target_def,
        target.facing,
        attacker.logical_position(),
        target.logical_position(),
    );
    let interval = attacker_def
        .weapon(kind)
        .map(|w| w.attack_interval)
        .unwrap_or(1.0);
    let attacker_id = attacker.id;
    let target_id = target.id;
    let toward_target = attacker.position.bearing_to(&target.position);

    {
        let unit = &mut state.units[idx];
        unit.set_facing(toward_target);
        unit.transition(UnitStatus::Attacking(kind));
        unit.transition(UnitStatus::Reloading(kind));
        unit.action_timer = interval;
    }

    let destroyed = {
        let target = &mut state.units[tidx];
        target.apply_damage(resolution.damage);
        target.is_destroyed()
    };

    debug!(
        attacker = attacker_id.0,
        target = target_id.0,
        damage = resolution.damage,
        penetrated = resolution.penetrated,
        "attack resolved"
    );
    events.push(SimEvent::AttackResolved {
        attacker: attacker_id,
        target: target_id,
        kind,
        damage: resolution.damage,
        penetrated: resolution.penetrated,
    });
    if destroyed {
        events.push(SimEvent::UnitDestroyed { unit: target_id });
    }
}

fn advance_production(state: &mut MatchState, dt: f32, events: &mut Vec<SimEvent>) {
    let mut completed = Vec::new();
    for (idx, unit) in state.units.iter_mut().enumerate() {
        if unit.is_destroyed() {
            continue;
        }
        let Some(order) = unit.production.as_mut() else {
            continue;
        };
        order.time_left = (order.time_left - dt).max(0.0);
        if order.time_left <= 0.0 {
            completed.push(idx);
        }
    }

    for idx in completed {
        let (commander_id, side, position, unit_type) = {
            let unit = &state.units[idx];
            let order = unit.production.as_ref().expect("set above");
            (unit.id, unit.side, unit.position, order.unit_type.clone())
        };

        let Some(hex) = position.neighbors().into_iter().find(|h| state.is_free(*h)) else {
            // Hold until a hex next to the commander opens up
            events.push(SimEvent::ProductionHeld {
                commander: commander_id,
            });
            continue;
        };

        match state.spawn(&unit_type, side, hex) {
            Ok(new_id) => {
                state.units[idx].production = None;
                debug!(commander = commander_id.0, unit = new_id.0, unit_type = %unit_type, "production complete");
                events.push(SimEvent::ProductionCompleted {
                    commander: commander_id,
                    unit: new_id,
                    unit_type,
                });
            }
            Err(_) => {
                // Unknown type slipped into an order; drop it, never crash
                state.units[idx].production = None;
            }
        }
    }
}

fn advance_capture(state: &mut MatchState, dt: f32, events: &mut Vec<SimEvent>) {
    for pidx in 0..state.map.strategic_points.len() {
        let hex = state.map.strategic_points[pidx].axial();

        let mut present: Option<Side> = None;
        let mut contested = false;
        for unit in state
            .units
            .iter()
            .filter(|u| !u.is_destroyed() && u.position == hex)
        {
            match present {
                None => present = Some(unit.side),
                Some(side) if side != unit.side => contested = true,
                Some(_) => {}
            }
        }

        let point = &mut state.map.strategic_points[pidx];
        match present {
            // Progress does not survive the capturer leaving
            None => point.capture_progress = 0.0,
            Some(_) if contested => {} // Frozen while contested
            Some(side) => {
                if point.owner == Some(side) {
                    point.capture_progress = 0.0;
                } else {
                    point.capture_progress += dt;
                    if point.capture_progress >= point.capture_time {
                        point.owner = Some(side);
                        point.capture_progress = 0.0;
                        debug!(point = point.id.0, ?side, "point captured");
                        events.push(SimEvent::PointCaptured {
                            point: point.id,
                            side,
                        });
                    }
                }
            }
        }
    }
}
