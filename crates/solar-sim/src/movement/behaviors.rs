//! Per-kind movement steps
//!
//! Each step is a function of the current state, the entity's position and
//! the tick delta. Steps return the new position and update the state in
//! place; the caller validates and commits the position.

use super::state::MovementState;
use solar_core::math::{clamp_speed, heading, move_towards};
use solar_core::{EntityId, EntitySummary, GameRng, Vec2};
use solar_script::MovementKind;
use std::f64::consts::TAU;

/// Read-only inputs shared by the steps of one entity
pub(crate) struct StepContext<'a> {
    pub entity: EntityId,
    pub dt: f64,
    /// Positions of every entity at the start of the pass
    pub world: &'a [EntitySummary],
    pub rng: GameRng,
}

/// Advance one entity by one tick
pub(crate) fn step(
    kind: &MovementKind,
    state: &mut MovementState,
    position: Vec2,
    ctx: &mut StepContext<'_>,
) -> Vec2 {
    match kind {
        MovementKind::Linear { max_speed } => {
            let cap = state.speed_cap(*max_speed);
            match state.target_position {
                Some(target) => follow_target(state, position, target, cap, 0.0, ctx.dt),
                None => {
                    state.velocity = clamp_speed(state.velocity, cap);
                    position + state.velocity * ctx.dt
                }
            }
        }
        MovementKind::Circular {
            center,
            radius,
            angular_speed,
        } => {
            let cap = state.speed_cap(f64::INFINITY);
            circle(state, position, *center, *radius, *angular_speed, cap, ctx.dt)
        }
        MovementKind::Orbit {
            target_type,
            radius,
            angular_speed,
            fallback_center,
        } => {
            let center = orbit_center(state, position, target_type.as_deref(), ctx)
                .unwrap_or(*fallback_center);
            let cap = state.speed_cap(f64::INFINITY);
            circle(state, position, center, *radius, *angular_speed, cap, ctx.dt)
        }
        MovementKind::Patrol {
            waypoints,
            speed,
            arrival_tolerance,
        } => {
            let cap = state.speed_cap(*speed);
            if let Some(target) = state.target_position {
                return follow_target(state, position, target, cap, *arrival_tolerance, ctx.dt);
            }
            let route = state.waypoints.clone().unwrap_or_else(|| waypoints.clone());
            patrol(state, position, &route, cap, *arrival_tolerance, ctx.dt)
        }
        MovementKind::Wander {
            speed,
            direction_change_interval,
            max_direction_change,
        } => {
            let cap = state.speed_cap(*speed);
            if let Some(target) = state.target_position {
                return follow_target(state, position, target, cap, 0.0, ctx.dt);
            }
            wander(
                state,
                position,
                cap,
                *direction_change_interval,
                *max_direction_change,
                ctx,
            )
        }
        MovementKind::Seek {
            speed,
            max_force,
            arrival_tolerance,
        } => {
            let cap = state.speed_cap(*speed);
            seek(state, position, cap, *max_force, *arrival_tolerance, ctx.dt)
        }
    }
}

/// Move straight at `target` at `cap`, snapping and clearing it on arrival
fn follow_target(
    state: &mut MovementState,
    position: Vec2,
    target: Vec2,
    cap: f64,
    tolerance: f64,
    dt: f64,
) -> Vec2 {
    if position.distance(target) <= tolerance {
        return arrive(state, target);
    }
    let (next, arrived) = move_towards(position, target, cap * dt);
    if arrived {
        return arrive(state, target);
    }
    state.velocity = (target - position).normalize_or_zero() * cap;
    next
}

fn arrive(state: &mut MovementState, target: Vec2) -> Vec2 {
    state.target_position = None;
    state.velocity = Vec2::ZERO;
    target
}

/// Place the entity on a circle from its accumulated angle
///
/// The angular step is limited to `cap / radius` so the tangent speed
/// never exceeds the entity's speed limit.
fn circle(
    state: &mut MovementState,
    position: Vec2,
    center: Vec2,
    radius: f64,
    angular_speed: f64,
    cap: f64,
    dt: f64,
) -> Vec2 {
    let angular_speed = if radius > 0.0 {
        let limit = cap.max(0.0) / radius;
        angular_speed.clamp(-limit, limit)
    } else {
        angular_speed
    };
    let start = state.angle.unwrap_or_else(|| {
        let offset = position - center;
        if offset == Vec2::ZERO {
            0.0
        } else {
            offset.y.atan2(offset.x)
        }
    });
    let angle = (start + angular_speed * dt).rem_euclid(TAU);
    state.angle = Some(angle);
    state.velocity = clamp_speed(
        Vec2::new(-angle.sin(), angle.cos()) * (radius * angular_speed),
        cap,
    );
    center + heading(angle) * radius
}

/// Resolve the orbit center: explicit target, then nearest of a type
fn orbit_center(
    state: &MovementState,
    position: Vec2,
    target_type: Option<&str>,
    ctx: &StepContext<'_>,
) -> Option<Vec2> {
    if let Some(target) = state.orbit_target {
        if let Some(found) = ctx.world.iter().find(|e| e.id == target) {
            return Some(found.position);
        }
    }
    let target_type = target_type?;
    ctx.world
        .iter()
        .filter(|e| e.id != ctx.entity && e.kind.as_str() == target_type)
        .min_by(|a, b| {
            position
                .distance_squared(a.position)
                .total_cmp(&position.distance_squared(b.position))
        })
        .map(|e| e.position)
}

fn patrol(
    state: &mut MovementState,
    position: Vec2,
    waypoints: &[Vec2],
    cap: f64,
    tolerance: f64,
    dt: f64,
) -> Vec2 {
    if waypoints.is_empty() {
        state.velocity = Vec2::ZERO;
        return position;
    }
    let index = state.waypoint_index.unwrap_or(0) % waypoints.len();
    let waypoint = waypoints[index];

    if position.distance(waypoint) <= tolerance {
        // Advance exactly one waypoint; movement resumes next tick
        state.waypoint_index = Some((index + 1) % waypoints.len());
        state.velocity = Vec2::ZERO;
        return position;
    }

    state.waypoint_index = Some(index);
    let (next, _) = move_towards(position, waypoint, cap * dt);
    state.velocity = if dt > 0.0 {
        (next - position) / dt
    } else {
        Vec2::ZERO
    };
    next
}

fn wander(
    state: &mut MovementState,
    position: Vec2,
    cap: f64,
    interval: f64,
    max_change: f64,
    ctx: &mut StepContext<'_>,
) -> Vec2 {
    let rng = &mut ctx.rng;
    let (angle, timer) = match (state.heading, state.heading_timer) {
        (Some(angle), Some(timer)) if timer - ctx.dt > 0.0 => (angle, timer - ctx.dt),
        (Some(angle), _) => (
            angle + rng.range_f64(-max_change, max_change),
            interval * rng.range_f64(0.5, 1.5),
        ),
        (None, _) => (rng.angle(), interval * rng.range_f64(0.5, 1.5)),
    };
    let angle = angle.rem_euclid(TAU);

    state.heading = Some(angle);
    state.heading_timer = Some(timer);
    state.velocity = heading(angle) * cap;
    position + state.velocity * ctx.dt
}

fn seek(
    state: &mut MovementState,
    position: Vec2,
    cap: f64,
    max_force: f64,
    tolerance: f64,
    dt: f64,
) -> Vec2 {
    let Some(target) = state.target_position else {
        state.velocity = Vec2::ZERO;
        return position;
    };

    let distance = position.distance(target);
    if distance <= tolerance {
        return arrive(state, target);
    }

    let desired = (target - position).normalize_or_zero() * cap;
    let steering = clamp_speed(desired - state.velocity, max_force * dt);
    state.velocity = clamp_speed(state.velocity + steering, cap);

    if state.velocity.length() * dt >= distance {
        return arrive(state, target);
    }
    position + state.velocity * dt
}

#[cfg(test)]
mod tests {
    use super::*;
    use solar_core::DefId;

    fn ctx(world: &[EntitySummary]) -> StepContext<'_> {
        StepContext {
            entity: EntityId(0),
            dt: 1.0,
            world,
            rng: GameRng::new(1),
        }
    }

    fn close(a: Vec2, b: Vec2) -> bool {
        a.distance(b) < 1e-9
    }

    #[test]
    fn test_linear_integrates_and_clamps() {
        let kind = MovementKind::Linear { max_speed: 10.0 };
        let mut state = MovementState {
            velocity: Vec2::new(30.0, 40.0),
            ..Default::default()
        };
        let next = step(&kind, &mut state, Vec2::ZERO, &mut ctx(&[]));
        assert!(close(next, Vec2::new(6.0, 8.0)));
        assert!((state.velocity.length() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_linear_steers_and_snaps() {
        let kind = MovementKind::Linear { max_speed: 10.0 };
        let mut state = MovementState {
            target_position: Some(Vec2::new(15.0, 0.0)),
            ..Default::default()
        };

        let next = step(&kind, &mut state, Vec2::ZERO, &mut ctx(&[]));
        assert!(close(next, Vec2::new(10.0, 0.0)));
        assert!(close(state.velocity, Vec2::new(10.0, 0.0)));

        let next = step(&kind, &mut state, next, &mut ctx(&[]));
        assert_eq!(next, Vec2::new(15.0, 0.0));
        assert_eq!(state.target_position, None);
        assert_eq!(state.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_circular_from_angle() {
        let kind = MovementKind::Circular {
            center: Vec2::new(10.0, 10.0),
            radius: 5.0,
            angular_speed: std::f64::consts::FRAC_PI_2,
        };
        let mut state = MovementState {
            angle: Some(0.0),
            ..Default::default()
        };
        let next = step(&kind, &mut state, Vec2::ZERO, &mut ctx(&[]));
        assert!(close(next, Vec2::new(10.0, 15.0)));
        assert!((state.velocity.length() - 5.0 * std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_circular_respects_max_speed() {
        let kind = MovementKind::Circular {
            center: Vec2::ZERO,
            radius: 100.0,
            angular_speed: 1.0,
        };
        let mut state = MovementState {
            angle: Some(0.0),
            max_speed: Some(5.0),
            ..Default::default()
        };
        let mut ctx = ctx(&[]);
        ctx.dt = 0.05;
        let next = step(&kind, &mut state, Vec2::new(100.0, 0.0), &mut ctx);

        assert!(state.velocity.length() <= 5.0 + 1e-9);
        assert!((next.length() - 100.0).abs() < 1e-9);
        // 5 / 100 rad per second over 0.05 s
        assert!((state.angle.unwrap() - 0.0025).abs() < 1e-12);
    }

    #[test]
    fn test_circular_starts_from_current_bearing() {
        let kind = MovementKind::Circular {
            center: Vec2::ZERO,
            radius: 10.0,
            angular_speed: 0.0,
        };
        let mut state = MovementState::default();
        let next = step(&kind, &mut state, Vec2::new(0.0, 10.0), &mut ctx(&[]));
        assert!(close(next, Vec2::new(0.0, 10.0)));
    }

    #[test]
    fn test_orbit_tracks_nearest_of_type() {
        let kind = MovementKind::Orbit {
            target_type: Some("planet".into()),
            radius: 10.0,
            angular_speed: 0.0,
            fallback_center: Vec2::ZERO,
        };
        let world = vec![
            EntitySummary {
                id: EntityId(5),
                kind: DefId::new("planet"),
                position: Vec2::new(100.0, 0.0),
                faction: None,
            },
            EntitySummary {
                id: EntityId(6),
                kind: DefId::new("planet"),
                position: Vec2::new(1000.0, 0.0),
                faction: None,
            },
        ];
        let mut state = MovementState {
            angle: Some(0.0),
            ..Default::default()
        };
        let next = step(&kind, &mut state, Vec2::new(90.0, 0.0), &mut ctx(&world));
        assert!(close(next, Vec2::new(110.0, 0.0)));

        state.orbit_target = Some(EntityId(6));
        let next = step(&kind, &mut state, next, &mut ctx(&world));
        assert!(close(next, Vec2::new(1010.0, 0.0)));

        let mut lonely = MovementState {
            angle: Some(0.0),
            ..Default::default()
        };
        let next = step(&kind, &mut lonely, Vec2::ZERO, &mut ctx(&[]));
        assert!(close(next, Vec2::new(10.0, 0.0)));
    }

    #[test]
    fn test_patrol_advances_one_waypoint() {
        let kind = MovementKind::Patrol {
            waypoints: vec![Vec2::ZERO, Vec2::new(10.0, 0.0)],
            speed: 4.0,
            arrival_tolerance: 1.0,
        };
        let mut state = MovementState::default();

        // Already at waypoint 0: advance, hold position
        let p = step(&kind, &mut state, Vec2::new(0.5, 0.0), &mut ctx(&[]));
        assert_eq!(p, Vec2::new(0.5, 0.0));
        assert_eq!(state.waypoint_index, Some(1));

        let p = step(&kind, &mut state, p, &mut ctx(&[]));
        assert!(close(p, Vec2::new(4.5, 0.0)));
        assert_eq!(state.waypoint_index, Some(1));
    }

    #[test]
    fn test_patrol_per_entity_waypoints() {
        let kind = MovementKind::Patrol {
            waypoints: vec![],
            speed: 4.0,
            arrival_tolerance: 1.0,
        };
        let mut state = MovementState::default();
        assert_eq!(step(&kind, &mut state, Vec2::ZERO, &mut ctx(&[])), Vec2::ZERO);

        state.waypoints = Some(vec![Vec2::new(0.0, 8.0)]);
        let p = step(&kind, &mut state, Vec2::ZERO, &mut ctx(&[]));
        assert!(close(p, Vec2::new(0.0, 4.0)));
    }

    #[test]
    fn test_wander_moves_at_cap() {
        let kind = MovementKind::Wander {
            speed: 20.0,
            direction_change_interval: 2.0,
            max_direction_change: 0.5,
        };
        let mut state = MovementState {
            max_speed: Some(5.0),
            ..Default::default()
        };
        let p = step(&kind, &mut state, Vec2::ZERO, &mut ctx(&[]));
        assert!((p.length() - 5.0).abs() < 1e-9);
        assert!(state.heading.is_some());
        let timer = state.heading_timer.unwrap();
        assert!((1.0..3.0).contains(&timer));
    }

    #[test]
    fn test_wander_keeps_heading_until_timer() {
        let kind = MovementKind::Wander {
            speed: 1.0,
            direction_change_interval: 10.0,
            max_direction_change: 0.5,
        };
        let mut state = MovementState {
            heading: Some(1.0),
            heading_timer: Some(5.0),
            ..Default::default()
        };
        step(&kind, &mut state, Vec2::ZERO, &mut ctx(&[]));
        assert_eq!(state.heading, Some(1.0));
        assert_eq!(state.heading_timer, Some(4.0));

        state.heading_timer = Some(0.5);
        step(&kind, &mut state, Vec2::ZERO, &mut ctx(&[]));
        let changed = state.heading.unwrap();
        assert!((changed - 1.0).abs() <= 0.5);
    }

    #[test]
    fn test_seek_without_target_holds() {
        let kind = MovementKind::Seek {
            speed: 10.0,
            max_force: 5.0,
            arrival_tolerance: 1.0,
        };
        let mut state = MovementState {
            velocity: Vec2::new(3.0, 0.0),
            ..Default::default()
        };
        let p = step(&kind, &mut state, Vec2::new(2.0, 2.0), &mut ctx(&[]));
        assert_eq!(p, Vec2::new(2.0, 2.0));
        assert_eq!(state.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_seek_accelerates_then_arrives() {
        let kind = MovementKind::Seek {
            speed: 10.0,
            max_force: 5.0,
            arrival_tolerance: 1.0,
        };
        let mut state = MovementState {
            target_position: Some(Vec2::new(20.0, 0.0)),
            ..Default::default()
        };

        let p = step(&kind, &mut state, Vec2::ZERO, &mut ctx(&[]));
        assert!(close(state.velocity, Vec2::new(5.0, 0.0)));
        assert!(close(p, Vec2::new(5.0, 0.0)));

        let p = step(&kind, &mut state, p, &mut ctx(&[]));
        assert!(close(state.velocity, Vec2::new(10.0, 0.0)));
        assert!(close(p, Vec2::new(15.0, 0.0)));

        let p = step(&kind, &mut state, p, &mut ctx(&[]));
        assert_eq!(p, Vec2::new(20.0, 0.0));
        assert_eq!(state.target_position, None);
    }
}
