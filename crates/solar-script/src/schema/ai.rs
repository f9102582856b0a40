//! AI behavior definition schema

use super::params::{points_value, strings_value, Params};
use crate::error::{Error, Result};
use solar_core::{Value, ValueMap, Vec2};

/// A named, prioritized AI behavior
#[derive(Debug, Clone, PartialEq)]
pub struct AiBehaviorDef {
    /// Unique name (e.g. "pirate_hunt")
    pub name: String,
    /// Disabled definitions are never candidates
    pub enabled: bool,
    /// Higher wins; ties go to the earlier declaration
    pub priority: i32,
    /// Entity types this behavior applies to; empty means all
    pub entity_types: Vec<String>,
    /// Energy required before the behavior is applicable
    pub min_energy: f64,
    /// Energy spent per second while executing
    pub energy_cost: f64,
    /// Behavior kind and its parameters
    pub kind: AiKind,
}

/// The closed set of AI behaviors
#[derive(Debug, Clone, PartialEq)]
pub enum AiKind {
    /// Rest: recover energy, calm down
    Idle {
        energy_recovery_rate: f64,
        alertness_decay: f64,
    },
    /// Walk a waypoint loop
    Patrol {
        waypoints: Vec<Vec2>,
        arrival_tolerance: f64,
    },
    /// Chase the closest matching target, remembering where it was seen
    Hunt {
        detection_range: f64,
        target_types: Vec<String>,
        memory_duration: f64,
    },
    /// Run from the threats in range
    Flee {
        detection_range: f64,
        threat_types: Vec<String>,
        flee_range: f64,
    },
    /// Hold a post and intercept intruders
    Guard {
        guard_position: Vec2,
        guard_radius: f64,
        alert_range: f64,
        threat_types: Vec<String>,
        memory_duration: f64,
    },
    /// Work through trade routes, waiting at each stop
    Trade {
        trade_routes: Vec<Vec<Vec2>>,
        arrival_tolerance: f64,
        wait_time: f64,
    },
}

impl AiKind {
    /// The `type` discriminator used in behavior files
    pub fn type_name(&self) -> &'static str {
        match self {
            AiKind::Idle { .. } => "idle",
            AiKind::Patrol { .. } => "patrol",
            AiKind::Hunt { .. } => "hunt",
            AiKind::Flee { .. } => "flee",
            AiKind::Guard { .. } => "guard",
            AiKind::Trade { .. } => "trade",
        }
    }

    /// How long targets seen by this behavior are remembered
    pub fn memory_duration(&self) -> Option<f64> {
        match self {
            AiKind::Hunt {
                memory_duration, ..
            }
            | AiKind::Guard {
                memory_duration, ..
            } => Some(*memory_duration),
            _ => None,
        }
    }
}

/// Energy a behavior type needs unless the definition says otherwise
fn default_min_energy(kind: &str) -> f64 {
    match kind {
        "patrol" => 20.0,
        "hunt" => 30.0,
        "guard" => 40.0,
        "trade" => 25.0,
        _ => 0.0,
    }
}

/// Energy a behavior type spends per second unless the definition says otherwise
fn default_energy_cost(kind: &str) -> f64 {
    match kind {
        "patrol" => 2.0,
        "hunt" => 5.0,
        "flee" => 8.0,
        "guard" => 3.0,
        "trade" => 1.5,
        _ => 0.0,
    }
}

impl AiBehaviorDef {
    /// Create an enabled definition with the type's default energy rules
    pub fn new(name: impl Into<String>, priority: i32, kind: AiKind) -> Self {
        let type_name = kind.type_name();
        Self {
            name: name.into(),
            enabled: true,
            priority,
            entity_types: Vec::new(),
            min_energy: default_min_energy(type_name),
            energy_cost: default_energy_cost(type_name),
            kind,
        }
    }

    /// Restrict to the given entity types
    pub fn for_types(mut self, types: &[&str]) -> Self {
        self.entity_types = types.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Override the energy cost
    pub fn with_energy_cost(mut self, cost: f64) -> Self {
        self.energy_cost = cost;
        self
    }

    /// Override the energy requirement
    pub fn with_min_energy(mut self, min_energy: f64) -> Self {
        self.min_energy = min_energy;
        self
    }

    /// Disable this definition
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Whether an entity of `kind` may run this behavior
    pub fn applies_to(&self, kind: &str) -> bool {
        self.entity_types.is_empty() || self.entity_types.iter().any(|t| t == kind)
    }

    /// Parse and validate a definition from its raw map
    pub fn from_map(map: &ValueMap) -> Result<Self> {
        let p = Params::new(map)?;
        let type_name = p.kind()?;
        let kind = match type_name {
            "idle" => AiKind::Idle {
                energy_recovery_rate: p.non_negative_or("energy_recovery_rate", 10.0)?,
                alertness_decay: p.non_negative_or("alertness_decay", 0.1)?,
            },
            "patrol" => AiKind::Patrol {
                waypoints: p.required_points("waypoints")?,
                arrival_tolerance: p.non_negative_or("arrival_tolerance", 10.0)?,
            },
            "hunt" => AiKind::Hunt {
                detection_range: p.non_negative_or("detection_range", 100.0)?,
                target_types: p.required_strings("target_types")?,
                memory_duration: p.non_negative_or("memory_duration", 10.0)?,
            },
            "flee" => AiKind::Flee {
                detection_range: p.non_negative_or("detection_range", 80.0)?,
                threat_types: p.required_strings("threat_types")?,
                flee_range: p.positive_or("flee_range", 200.0)?,
            },
            "guard" => AiKind::Guard {
                guard_position: p.point_or("guard_position", Vec2::ZERO)?,
                guard_radius: p.non_negative_or("guard_radius", 100.0)?,
                alert_range: p.non_negative_or("alert_range", 150.0)?,
                threat_types: p.strings_or_empty("threat_types")?,
                memory_duration: p.non_negative_or("memory_duration", 10.0)?,
            },
            "trade" => AiKind::Trade {
                trade_routes: p.required_routes("trade_routes")?,
                arrival_tolerance: p.non_negative_or("arrival_tolerance", 15.0)?,
                wait_time: p.non_negative_or("wait_time", 2.0)?,
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
            priority: p.i32_or("priority", 0)?,
            entity_types: p.strings_or_empty("entity_types")?,
            min_energy: p.non_negative_or("min_energy", default_min_energy(type_name))?,
            energy_cost: p.non_negative_or("energy_cost", default_energy_cost(type_name))?,
            kind,
        })
    }

    /// Encode back into the file representation
    pub fn to_map(&self) -> ValueMap {
        let mut map = ValueMap::new();
        map.insert("name".into(), self.name.as_str().into());
        map.insert("type".into(), self.kind.type_name().into());
        map.insert("priority".into(), Value::Int(self.priority as i64));
        if !self.entity_types.is_empty() {
            map.insert("entity_types".into(), strings_value(&self.entity_types));
        }
        match &self.kind {
            AiKind::Idle {
                energy_recovery_rate,
                alertness_decay,
            } => {
                map.insert("energy_recovery_rate".into(), (*energy_recovery_rate).into());
                map.insert("alertness_decay".into(), (*alertness_decay).into());
            }
            AiKind::Patrol {
                waypoints,
                arrival_tolerance,
            } => {
                map.insert("waypoints".into(), points_value(waypoints));
                map.insert("arrival_tolerance".into(), (*arrival_tolerance).into());
            }
            AiKind::Hunt {
                detection_range,
                target_types,
                memory_duration,
            } => {
                map.insert("detection_range".into(), (*detection_range).into());
                map.insert("target_types".into(), strings_value(target_types));
                map.insert("memory_duration".into(), (*memory_duration).into());
            }
            AiKind::Flee {
                detection_range,
                threat_types,
                flee_range,
            } => {
                map.insert("detection_range".into(), (*detection_range).into());
                map.insert("threat_types".into(), strings_value(threat_types));
                map.insert("flee_range".into(), (*flee_range).into());
            }
            AiKind::Guard {
                guard_position,
                guard_radius,
                alert_range,
                threat_types,
                memory_duration,
            } => {
                map.insert("guard_position".into(), (*guard_position).into());
                map.insert("guard_radius".into(), (*guard_radius).into());
                map.insert("alert_range".into(), (*alert_range).into());
                map.insert("threat_types".into(), strings_value(threat_types));
                map.insert("memory_duration".into(), (*memory_duration).into());
            }
            AiKind::Trade {
                trade_routes,
                arrival_tolerance,
                wait_time,
            } => {
                map.insert(
                    "trade_routes".into(),
                    Value::List(trade_routes.iter().map(|r| points_value(r)).collect()),
                );
                map.insert("arrival_tolerance".into(), (*arrival_tolerance).into());
                map.insert("wait_time".into(), (*wait_time).into());
            }
        }
        map.insert("min_energy".into(), self.min_energy.into());
        map.insert("energy_cost".into(), self.energy_cost.into());
        map.insert("enabled".into(), Value::Bool(self.enabled));
        map
    }
}
