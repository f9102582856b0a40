//! Decoded view of the `ai` component

use crate::component::{opt_entity, opt_f64, opt_map, opt_point, opt_string, Malformed};
use crate::config::AiConfig;
use indexmap::IndexMap;
use solar_core::{EntityId, Value, ValueMap, Vec2};

/// Name of the component owned by the AI system
pub const AI_COMPONENT: &str = "ai";

/// Per-entity scratch state that survives across ticks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AiMemory {
    /// Where each remembered entity was last seen
    pub last_seen_targets: IndexMap<EntityId, Vec2>,
    /// Game time each remembered entity was last seen
    pub last_seen_times: IndexMap<EntityId, f64>,
    pub current_target: Option<EntityId>,
    pub current_goal: Option<String>,
    /// Behavior progress (waypoint indices, trade route, wait timers)
    pub goal_data: ValueMap,
    /// Free-form scratch space for external tooling
    pub blackboard: ValueMap,
}

impl AiMemory {
    /// Record a sighting
    pub fn remember(&mut self, id: EntityId, position: Vec2, now: f64) {
        self.last_seen_targets.insert(id, position);
        self.last_seen_times.insert(id, now);
    }

    /// Drop sightings older than `duration`
    ///
    /// A target seen at `t` is kept while `now <= t + duration`.
    pub fn forget_older_than(&mut self, now: f64, duration: f64) {
        let expired: Vec<EntityId> = self
            .last_seen_times
            .iter()
            .filter(|(_, &seen)| now > seen + duration)
            .map(|(&id, _)| id)
            .collect();
        for id in expired {
            self.forget(id);
        }
        // Positions without a timestamp cannot age, so they are dropped too
        let times = &self.last_seen_times;
        self.last_seen_targets.retain(|id, _| times.contains_key(id));
    }

    /// Forget one target
    pub fn forget(&mut self, id: EntityId) {
        self.last_seen_targets.shift_remove(&id);
        self.last_seen_times.shift_remove(&id);
        if self.current_target == Some(id) {
            self.current_target = None;
        }
    }

    /// The most recently seen target still within `duration`
    pub fn latest_sighting(&self, now: f64, duration: f64) -> Option<(EntityId, Vec2)> {
        self.last_seen_times
            .iter()
            .filter(|(_, &seen)| now <= seen + duration)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .and_then(|(&id, _)| self.last_seen_targets.get(&id).map(|&p| (id, p)))
    }

    fn decode(map: &ValueMap) -> Result<Self, Malformed> {
        let mut memory = AiMemory {
            current_target: opt_entity(map, "current_target")?,
            current_goal: opt_string(map, "current_goal")?,
            goal_data: opt_map(map, "goal_data")?.unwrap_or_default(),
            blackboard: opt_map(map, "blackboard")?.unwrap_or_default(),
            ..Default::default()
        };

        let targets = opt_map(map, "last_seen_targets")?.unwrap_or_default();
        for key in targets.keys() {
            let id = key
                .parse::<EntityId>()
                .map_err(|_| Malformed("memory.last_seen_targets".to_string()))?;
            let position = opt_point(&targets, key)?
                .ok_or_else(|| Malformed("memory.last_seen_targets".to_string()))?;
            memory.last_seen_targets.insert(id, position);
        }

        let times = opt_map(map, "last_seen_times")?.unwrap_or_default();
        for key in times.keys() {
            let id = key
                .parse::<EntityId>()
                .map_err(|_| Malformed("memory.last_seen_times".to_string()))?;
            let seen = opt_f64(&times, key)?
                .ok_or_else(|| Malformed("memory.last_seen_times".to_string()))?;
            memory.last_seen_times.insert(id, seen);
        }

        Ok(memory)
    }

    fn encode(&self) -> ValueMap {
        let targets: ValueMap = self
            .last_seen_targets
            .iter()
            .map(|(id, p)| (id.key(), Value::Point(*p)))
            .collect();
        let times: ValueMap = self
            .last_seen_times
            .iter()
            .map(|(id, t)| (id.key(), Value::Float(*t)))
            .collect();

        let mut map = ValueMap::new();
        map.insert("last_seen_targets".into(), Value::Map(targets));
        map.insert("last_seen_times".into(), Value::Map(times));
        map.insert("current_target".into(), self.current_target.into());
        map.insert(
            "current_goal".into(),
            self.current_goal.as_deref().map(Value::from).unwrap_or_default(),
        );
        map.insert("goal_data".into(), Value::Map(self.goal_data.clone()));
        map.insert("blackboard".into(), Value::Map(self.blackboard.clone()));
        map
    }
}

/// Decision state of one entity
#[derive(Debug, Clone, PartialEq)]
pub struct AiState {
    /// Behavior selected on the previous tick
    pub behavior: Option<String>,
    /// Temperament tag (aggressive, defensive, merchant, ...)
    pub ai_type: Option<String>,
    pub energy: f64,
    pub alertness: f64,
    /// Seconds spent in the current behavior
    pub state_time: f64,
    pub memory: AiMemory,
}

/// Starting energy and alertness for a temperament
pub fn temperament(ai_type: Option<&str>) -> (f64, f64) {
    match ai_type {
        Some("aggressive") => (80.0, 60.0),
        Some("defensive") => (90.0, 30.0),
        Some("merchant") => (70.0, 20.0),
        _ => (100.0, 0.0),
    }
}

impl AiState {
    /// Fresh state for a temperament
    pub fn new(ai_type: Option<&str>) -> Self {
        let (energy, alertness) = temperament(ai_type);
        Self {
            behavior: None,
            ai_type: ai_type.map(str::to_string),
            energy,
            alertness,
            state_time: 0.0,
            memory: AiMemory::default(),
        }
    }

    /// Decode from a component map
    ///
    /// Missing energy and alertness start from the temperament.
    pub fn decode(map: &ValueMap, config: &AiConfig) -> Result<Self, Malformed> {
        let ai_type = opt_string(map, "ai_type")?;
        let mut state = Self::new(ai_type.as_deref());
        state.behavior = opt_string(map, "behavior")?;
        if let Some(energy) = opt_f64(map, "energy")? {
            state.energy = energy;
        }
        if let Some(alertness) = opt_f64(map, "alertness")? {
            state.alertness = alertness;
        }
        state.state_time = opt_f64(map, "state_time")?.unwrap_or(0.0).max(0.0);
        if let Some(memory) = opt_map(map, "memory")? {
            state.memory = AiMemory::decode(&memory)?;
        }
        state.clamp(config);
        Ok(state)
    }

    /// Write the live fields back into the component
    ///
    /// Keys the AI system does not manage (e.g. `aggression_level`) are kept.
    pub fn encode(&self, map: &mut ValueMap) {
        map.insert(
            "behavior".into(),
            self.behavior.as_deref().map(Value::from).unwrap_or_default(),
        );
        map.insert("energy".into(), self.energy.into());
        map.insert("alertness".into(), self.alertness.into());
        map.insert("state_time".into(), self.state_time.into());
        map.insert(
            "current_goal".into(),
            self.memory.current_goal.as_deref().map(Value::from).unwrap_or_default(),
        );
        map.insert("memory".into(), Value::Map(self.memory.encode()));
    }

    /// Force energy and alertness into their ranges
    pub fn clamp(&mut self, config: &AiConfig) {
        self.energy = clamp_finite(self.energy, config.energy_max);
        self.alertness = clamp_finite(self.alertness, config.alertness_max);
    }

    /// Change alertness by `amount`, staying within range
    pub fn adjust_alertness(&mut self, amount: f64, config: &AiConfig) {
        self.alertness = clamp_finite(self.alertness + amount, config.alertness_max);
    }

    /// Spend energy, never going below zero
    pub fn spend_energy(&mut self, amount: f64) {
        self.energy = (self.energy - amount).max(0.0);
    }
}

fn clamp_finite(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperament_defaults() {
        let config = AiConfig::default();
        let map: ValueMap = serde_json::from_str(r#"{"ai_type": "merchant"}"#).unwrap();
        let state = AiState::decode(&map, &config).unwrap();
        assert_eq!((state.energy, state.alertness), (70.0, 20.0));

        let state = AiState::decode(&ValueMap::new(), &config).unwrap();
        assert_eq!((state.energy, state.alertness), (100.0, 0.0));
    }

    #[test]
    fn test_decode_clamps() {
        let config = AiConfig::default();
        let map: ValueMap = serde_json::from_str(r#"{"energy": 250, "alertness": -3}"#).unwrap();
        let state = AiState::decode(&map, &config).unwrap();
        assert_eq!(state.energy, 100.0);
        assert_eq!(state.alertness, 0.0);
    }

    #[test]
    fn test_component_round_trip() {
        let config = AiConfig::default();
        let mut state = AiState::new(Some("aggressive"));
        state.behavior = Some("pirate_hunt".into());
        state.memory.remember(EntityId(4), Vec2::new(10.0, -5.0), 2.5);
        state.memory.current_target = Some(EntityId(4));
        state.memory.current_goal = Some("pirate_hunt".into());
        state.memory.goal_data.insert("current_waypoint".into(), 2i64.into());

        let mut map: ValueMap = serde_json::from_str(r#"{"ai_type": "aggressive", "aggression_level": 0.8}"#).unwrap();
        state.encode(&mut map);

        let json = serde_json::to_string(&map).unwrap();
        let restored: ValueMap = serde_json::from_str(&json).unwrap();
        let back = AiState::decode(&restored, &config).unwrap();

        assert_eq!(back, state);
        assert_eq!(restored.get("aggression_level"), Some(&Value::Float(0.8)));
        assert_eq!(restored.get("current_goal"), Some(&Value::from("pirate_hunt")));
    }

    #[test]
    fn test_memory_expiry_boundary() {
        let mut memory = AiMemory::default();
        memory.remember(EntityId(1), Vec2::ZERO, 5.0);
        memory.current_target = Some(EntityId(1));

        memory.forget_older_than(15.0, 10.0);
        assert!(memory.last_seen_targets.contains_key(&EntityId(1)));

        memory.forget_older_than(15.0 + 1e-9, 10.0);
        assert!(memory.last_seen_targets.is_empty());
        assert!(memory.last_seen_times.is_empty());
        assert_eq!(memory.current_target, None);
    }

    #[test]
    fn test_latest_sighting() {
        let mut memory = AiMemory::default();
        memory.remember(EntityId(1), Vec2::new(1.0, 0.0), 1.0);
        memory.remember(EntityId(2), Vec2::new(2.0, 0.0), 3.0);
        assert_eq!(
            memory.latest_sighting(4.0, 10.0),
            Some((EntityId(2), Vec2::new(2.0, 0.0)))
        );
        assert_eq!(memory.latest_sighting(20.0, 10.0), None);
    }

    #[test]
    fn test_malformed_memory() {
        let config = AiConfig::default();
        let map: ValueMap =
            serde_json::from_str(r#"{"memory": {"last_seen_targets": {"ship": [1, 2]}}}"#).unwrap();
        assert!(AiState::decode(&map, &config).is_err());
    }
}
