//! AI behavior preconditions and execution

use super::perception::Perception;
use super::state::AiState;
use crate::config::AiConfig;
use solar_core::math::centroid;
use solar_core::{Value, Vec2};
use solar_script::{AiBehaviorDef, AiKind};
use std::fmt;

/// Steering decision produced by one execution
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Steer {
    To(Vec2),
    Clear,
}

/// A behavior that could not run for this entity
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BehaviorError(pub String);

impl fmt::Display for BehaviorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

type Outcome = Result<Steer, BehaviorError>;

/// Whether `def` may be selected this tick
pub(crate) fn is_applicable(def: &AiBehaviorDef, state: &AiState, view: &Perception<'_>, now: f64) -> bool {
    if state.energy < def.min_energy {
        return false;
    }
    match &def.kind {
        AiKind::Hunt {
            detection_range,
            target_types,
            memory_duration,
        } => {
            view.closest_near(view.position, *detection_range, target_types).is_some()
                || state.memory.latest_sighting(now, *memory_duration).is_some()
        }
        AiKind::Flee {
            detection_range,
            threat_types,
            ..
        } => view
            .matching_near(view.position, *detection_range, threat_types)
            .next()
            .is_some(),
        AiKind::Idle { .. } | AiKind::Patrol { .. } | AiKind::Guard { .. } | AiKind::Trade { .. } => true,
    }
}

/// Run the selected behavior for one tick
pub(crate) fn execute(
    def: &AiBehaviorDef,
    state: &mut AiState,
    view: &Perception<'_>,
    now: f64,
    dt: f64,
    config: &AiConfig,
) -> Outcome {
    state.spend_energy(def.energy_cost * dt);

    let steer = match &def.kind {
        AiKind::Idle {
            energy_recovery_rate,
            alertness_decay,
        } => idle(state, *energy_recovery_rate, *alertness_decay, dt, config),
        AiKind::Patrol {
            waypoints,
            arrival_tolerance,
        } => patrol(state, view, waypoints, *arrival_tolerance)?,
        AiKind::Hunt {
            detection_range,
            target_types,
            memory_duration,
        } => {
            match view.closest_near(view.position, *detection_range, target_types) {
                Some(target) => {
                    state.memory.remember(target.id, target.position, now);
                    state.memory.current_target = Some(target.id);
                    state.adjust_alertness(50.0 * dt, config);
                    Steer::To(target.position)
                }
                None => {
                    state.adjust_alertness(-10.0 * dt, config);
                    match state.memory.latest_sighting(now, *memory_duration) {
                        Some((id, position)) => {
                            state.memory.current_target = Some(id);
                            Steer::To(position)
                        }
                        None => {
                            state.memory.current_target = None;
                            Steer::Clear
                        }
                    }
                }
            }
        }
        AiKind::Flee {
            detection_range,
            threat_types,
            flee_range,
        } => {
            let threats: Vec<Vec2> = view
                .matching_near(view.position, *detection_range, threat_types)
                .map(|t| t.position)
                .collect();
            let Some(center) = centroid(&threats) else {
                return Ok(Steer::Clear);
            };
            let away = (view.position - center).try_normalize().unwrap_or(Vec2::X);
            state.adjust_alertness(30.0 * dt, config);
            state
                .memory
                .goal_data
                .insert("threat_centroid".into(), center.into());
            Steer::To(center + away * *flee_range)
        }
        AiKind::Guard {
            guard_position,
            guard_radius,
            alert_range,
            threat_types,
            ..
        } => match view.closest_near(*guard_position, *alert_range, threat_types) {
            Some(intruder) => {
                state.memory.remember(intruder.id, intruder.position, now);
                state.memory.current_target = Some(intruder.id);
                state.adjust_alertness(40.0 * dt, config);
                Steer::To(intruder.position)
            }
            None => {
                state.memory.current_target = None;
                state.adjust_alertness(-5.0 * dt, config);
                if view.position.distance(*guard_position) > *guard_radius {
                    Steer::To(*guard_position)
                } else {
                    Steer::Clear
                }
            }
        },
        AiKind::Trade {
            trade_routes,
            arrival_tolerance,
            wait_time,
        } => trade(state, view, trade_routes, *arrival_tolerance, *wait_time, now)?,
    };

    match steer {
        Steer::To(target) if !target.is_finite() => Err(BehaviorError(format!(
            "computed a non-finite target ({}, {})",
            target.x, target.y
        ))),
        steer => Ok(steer),
    }
}

/// Recover energy and calm down
pub(crate) fn idle(state: &mut AiState, recovery_rate: f64, decay: f64, dt: f64, config: &AiConfig) -> Steer {
    state.energy = (state.energy + recovery_rate * dt).min(config.energy_max);
    state.adjust_alertness(-decay * dt, config);
    Steer::Clear
}

fn goal_index(state: &AiState, key: &str) -> Result<usize, BehaviorError> {
    match state.memory.goal_data.get(key) {
        None | Some(Value::Null) => Ok(0),
        Some(v) => v
            .as_int()
            .and_then(|i| usize::try_from(i).ok())
            .ok_or_else(|| BehaviorError(format!("goal_data.{} is not an index: {}", key, v))),
    }
}

fn goal_time(state: &AiState, key: &str) -> Result<Option<f64>, BehaviorError> {
    match state.memory.goal_data.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_float()
            .map(Some)
            .ok_or_else(|| BehaviorError(format!("goal_data.{} is not a time: {}", key, v))),
    }
}

fn patrol(state: &mut AiState, view: &Perception<'_>, waypoints: &[Vec2], tolerance: f64) -> Outcome {
    if waypoints.is_empty() {
        return Ok(Steer::Clear);
    }
    let mut index = goal_index(state, "current_waypoint")? % waypoints.len();
    if view.position.distance(waypoints[index]) <= tolerance {
        index = (index + 1) % waypoints.len();
    }
    state
        .memory
        .goal_data
        .insert("current_waypoint".into(), index.into());
    Ok(Steer::To(waypoints[index]))
}

fn trade(
    state: &mut AiState,
    view: &Perception<'_>,
    routes: &[Vec<Vec2>],
    tolerance: f64,
    wait_time: f64,
    now: f64,
) -> Outcome {
    if routes.is_empty() {
        return Ok(Steer::Clear);
    }
    let mut route = goal_index(state, "current_route")?;
    let mut point = goal_index(state, "current_point")?;
    let mut wait_until = goal_time(state, "wait_until")?;

    if route >= routes.len() {
        route = 0;
        point = 0;
    }
    if point >= routes[route].len() {
        route = (route + 1) % routes.len();
        point = 0;
    }

    let steer = match wait_until {
        Some(until) if now < until => Steer::Clear,
        _ => match routes[route].get(point) {
            Some(&stop) if view.position.distance(stop) <= tolerance => {
                point += 1;
                wait_until = Some(now + wait_time);
                Steer::Clear
            }
            Some(&stop) => Steer::To(stop),
            None => Steer::Clear,
        },
    };

    let goal = &mut state.memory.goal_data;
    goal.insert("current_route".into(), route.into());
    goal.insert("current_point".into(), point.into());
    goal.insert("wait_until".into(), wait_until.into());
    Ok(steer)
}
