//! Movement behavior definition schema

use super::params::{points_value, Params};
use crate::error::{Error, Result};
use solar_core::{Value, ValueMap, Vec2};
use std::f64::consts::FRAC_PI_4;

/// A named, configured movement behavior
#[derive(Debug, Clone, PartialEq)]
pub struct MovementBehaviorDef {
    /// Unique name entities refer to (e.g. "fast_patrol")
    pub name: String,
    /// Disabled definitions stay registered but never move anything
    pub enabled: bool,
    /// Behavior kind and its parameters
    pub kind: MovementKind,
}

/// The closed set of movement behaviors
#[derive(Debug, Clone, PartialEq)]
pub enum MovementKind {
    /// Integrate velocity; steer straight at a target when one is set
    Linear { max_speed: f64 },
    /// Orbit a fixed center at constant angular speed
    Circular {
        center: Vec2,
        radius: f64,
        angular_speed: f64,
    },
    /// Orbit another entity's current position
    Orbit {
        target_type: Option<String>,
        radius: f64,
        angular_speed: f64,
        fallback_center: Vec2,
    },
    /// Cycle through an ordered waypoint list
    Patrol {
        waypoints: Vec<Vec2>,
        speed: f64,
        arrival_tolerance: f64,
    },
    /// Drift along a heading that changes at random intervals
    Wander {
        speed: f64,
        direction_change_interval: f64,
        max_direction_change: f64,
    },
    /// Accelerate toward the movement target
    Seek {
        speed: f64,
        max_force: f64,
        arrival_tolerance: f64,
    },
}

impl MovementKind {
    /// The `type` discriminator used in behavior files
    pub fn type_name(&self) -> &'static str {
        match self {
            MovementKind::Linear { .. } => "linear",
            MovementKind::Circular { .. } => "circular",
            MovementKind::Orbit { .. } => "orbit",
            MovementKind::Patrol { .. } => "patrol",
            MovementKind::Wander { .. } => "wander",
            MovementKind::Seek { .. } => "seek",
        }
    }
}

impl MovementBehaviorDef {
    /// Create an enabled definition
    pub fn new(name: impl Into<String>, kind: MovementKind) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            kind,
        }
    }

    /// Disable this definition
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Parse and validate a definition from its raw map
    pub fn from_map(map: &ValueMap) -> Result<Self> {
        let p = Params::new(map)?;
        let kind = match p.kind()? {
            "linear" => MovementKind::Linear {
                max_speed: p.non_negative_or("max_speed", 50.0)?,
            },
            "circular" => MovementKind::Circular {
                center: p.point_or("center", Vec2::ZERO)?,
                radius: p.positive_or("radius", 100.0)?,
                angular_speed: p.f64_or("angular_speed", 1.0)?,
            },
            "orbit" => MovementKind::Orbit {
                target_type: p.optional_string("target_type")?,
                radius: p.positive_or("radius", 100.0)?,
                angular_speed: p.f64_or("angular_speed", 0.5)?,
                fallback_center: p.point_or("fallback_center", Vec2::ZERO)?,
            },
            "patrol" => MovementKind::Patrol {
                waypoints: p.points_or_empty("waypoints")?,
                speed: p.non_negative_or("speed", 30.0)?,
                arrival_tolerance: p.non_negative_or("arrival_tolerance", 5.0)?,
            },
            "wander" => MovementKind::Wander {
                speed: p.non_negative_or("speed", 20.0)?,
                direction_change_interval: p.positive_or("direction_change_interval", 2.0)?,
                max_direction_change: p.non_negative_or("max_direction_change", FRAC_PI_4)?,
            },
            "seek" => MovementKind::Seek {
                speed: p.non_negative_or("speed", 40.0)?,
                max_force: p.positive_or("max_force", 100.0)?,
                arrival_tolerance: p.non_negative_or("arrival_tolerance", 1.0)?,
            },
            other => {
                return Err(Error::UnknownBehaviorType {
                    definition: p.name().to_string(),
                    kind: other.to_string(),
                })
            }
        };

        Ok(Self {
            name: p.name().to_string(),
            enabled: p.bool_or("enabled", true)?,
            kind,
        })
    }

    /// Encode back into the file representation
    pub fn to_map(&self) -> ValueMap {
        let mut map = ValueMap::new();
        map.insert("name".into(), self.name.as_str().into());
        map.insert("type".into(), self.kind.type_name().into());
        match &self.kind {
            MovementKind::Linear { max_speed } => {
                map.insert("max_speed".into(), (*max_speed).into());
            }
            MovementKind::Circular {
                center,
                radius,
                angular_speed,
            } => {
                map.insert("center".into(), (*center).into());
                map.insert("radius".into(), (*radius).into());
                map.insert("angular_speed".into(), (*angular_speed).into());
            }
            MovementKind::Orbit {
                target_type,
                radius,
                angular_speed,
                fallback_center,
            } => {
                if let Some(target_type) = target_type {
                    map.insert("target_type".into(), target_type.as_str().into());
                }
                map.insert("radius".into(), (*radius).into());
                map.insert("angular_speed".into(), (*angular_speed).into());
                map.insert("fallback_center".into(), (*fallback_center).into());
            }
            MovementKind::Patrol {
                waypoints,
                speed,
                arrival_tolerance,
            } => {
                map.insert("waypoints".into(), points_value(waypoints));
                map.insert("speed".into(), (*speed).into());
                map.insert("arrival_tolerance".into(), (*arrival_tolerance).into());
            }
            MovementKind::Wander {
                speed,
                direction_change_interval,
                max_direction_change,
            } => {
                map.insert("speed".into(), (*speed).into());
                map.insert(
                    "direction_change_interval".into(),
                    (*direction_change_interval).into(),
                );
                map.insert("max_direction_change".into(), (*max_direction_change).into());
            }
            MovementKind::Seek {
                speed,
                max_force,
                arrival_tolerance,
            } => {
                map.insert("speed".into(), (*speed).into());
                map.insert("max_force".into(), (*max_force).into());
                map.insert("arrival_tolerance".into(), (*arrival_tolerance).into());
            }
        }
        map.insert("enabled".into(), Value::Bool(self.enabled));
        map
    }
}
