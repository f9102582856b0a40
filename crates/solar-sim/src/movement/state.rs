//! Decoded view of the `movement` component

use crate::component::{
    opt_entity, opt_f64, opt_index, opt_point, opt_points, opt_string, set_or_remove, Malformed,
};
use solar_core::{EntityId, Value, ValueMap, Vec2};

/// Name of the component owned by the movement system
pub const MOVEMENT_COMPONENT: &str = "movement";

/// Kinematic state of one entity
///
/// Decoded from the component at the start of each tick and encoded back
/// at the end, so the component always mirrors live state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovementState {
    /// Assigned behavior name; `None` leaves the entity untouched
    pub behavior: Option<String>,
    pub velocity: Vec2,
    /// Steering target written by the AI intent step
    pub target_position: Option<Vec2>,
    /// Per-entity speed limit, applied on top of the behavior's speed
    pub max_speed: Option<f64>,
    /// Current angle around the center (circular, orbit)
    pub angle: Option<f64>,
    /// Active waypoint (patrol)
    pub waypoint_index: Option<usize>,
    /// Per-entity waypoints overriding the behavior's (patrol)
    pub waypoints: Option<Vec<Vec2>>,
    /// Current heading in radians (wander)
    pub heading: Option<f64>,
    /// Seconds until the next heading change (wander)
    pub heading_timer: Option<f64>,
    /// Entity to orbit, overriding the behavior's target type (orbit)
    pub orbit_target: Option<EntityId>,
}

impl MovementState {
    /// Decode from a component map
    pub fn decode(map: &ValueMap) -> Result<Self, Malformed> {
        Ok(Self {
            behavior: opt_string(map, "behavior")?,
            velocity: opt_point(map, "velocity")?.unwrap_or(Vec2::ZERO),
            target_position: opt_point(map, "target_position")?,
            max_speed: opt_f64(map, "max_speed")?.map(|s| s.max(0.0)),
            angle: opt_f64(map, "angle")?,
            waypoint_index: opt_index(map, "waypoint_index")?,
            waypoints: opt_points(map, "waypoints")?,
            heading: opt_f64(map, "heading")?,
            heading_timer: opt_f64(map, "heading_timer")?,
            orbit_target: opt_entity(map, "orbit_target")?,
        })
    }

    /// Write the live fields back into the component
    ///
    /// Keys the movement system does not manage (e.g. `fuel`) are kept.
    /// `max_speed`, `waypoints` and `orbit_target` are inputs and are
    /// never rewritten.
    pub fn encode(&self, map: &mut ValueMap) {
        map.insert(
            "behavior".into(),
            self.behavior.as_deref().map(Value::from).unwrap_or_default(),
        );
        map.insert("velocity".into(), Value::Point(self.velocity));
        map.insert("target_position".into(), self.target_position.into());
        set_or_remove(map, "angle", self.angle);
        set_or_remove(map, "waypoint_index", self.waypoint_index);
        set_or_remove(map, "heading", self.heading);
        set_or_remove(map, "heading_timer", self.heading_timer);
    }

    /// Effective speed limit for a behavior cruising at `speed`
    pub fn speed_cap(&self, speed: f64) -> f64 {
        match self.max_speed {
            Some(limit) => speed.min(limit),
            None => speed,
        }
    }
}
