//! Behavior registry
//!
//! Name-indexed movement and AI definitions. The registry is built once
//! by the loader and is read-only afterwards, so the simulation shares it
//! behind an `Arc`.

use crate::error::{Error, Result};
use crate::schema::{AiBehaviorDef, MovementBehaviorDef};
use indexmap::IndexMap;
use solar_core::{Value, ValueMap};

/// All loaded behavior definitions, in declaration order
#[derive(Debug, Clone, Default)]
pub struct BehaviorRegistry {
    movement: IndexMap<String, MovementBehaviorDef>,
    ai: IndexMap<String, AiBehaviorDef>,
}

impl BehaviorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in behavior catalogue
    pub fn with_defaults() -> Self {
        crate::defaults::registry()
    }

    /// Register a movement behavior
    pub fn register_movement(&mut self, def: MovementBehaviorDef) -> Result<()> {
        if self.movement.contains_key(&def.name) {
            return Err(Error::DuplicateDefinition(def.name));
        }
        self.movement.insert(def.name.clone(), def);
        Ok(())
    }

    /// Register an AI behavior
    pub fn register_ai(&mut self, def: AiBehaviorDef) -> Result<()> {
        if self.ai.contains_key(&def.name) {
            return Err(Error::DuplicateDefinition(def.name));
        }
        self.ai.insert(def.name.clone(), def);
        Ok(())
    }

    /// Get a movement behavior by name
    pub fn movement(&self, name: &str) -> Option<&MovementBehaviorDef> {
        self.movement.get(name)
    }

    /// Get an AI behavior by name
    pub fn ai(&self, name: &str) -> Option<&AiBehaviorDef> {
        self.ai.get(name)
    }

    /// Movement behaviors in declaration order
    pub fn movement_defs(&self) -> impl Iterator<Item = &MovementBehaviorDef> {
        self.movement.values()
    }

    /// AI behaviors in declaration order
    pub fn ai_defs(&self) -> impl Iterator<Item = &AiBehaviorDef> {
        self.ai.values()
    }

    /// Enabled AI behaviors usable by `entity_kind`, highest priority first
    ///
    /// The sort is stable, so equal priorities keep declaration order.
    pub fn ai_candidates(&self, entity_kind: &str) -> Vec<&AiBehaviorDef> {
        let mut candidates: Vec<&AiBehaviorDef> = self
            .ai
            .values()
            .filter(|def| def.enabled && def.applies_to(entity_kind))
            .collect();
        candidates.sort_by(|a, b| b.priority.cmp(&a.priority));
        candidates
    }

    /// Number of movement behaviors
    pub fn movement_count(&self) -> usize {
        self.movement.len()
    }

    /// Number of AI behaviors
    pub fn ai_count(&self) -> usize {
        self.ai.len()
    }

    /// Combined document `{ "movement": [...], "ai": [...] }`
    pub fn to_document(&self) -> Value {
        let mut doc = ValueMap::new();
        doc.insert(
            "movement".into(),
            Value::List(self.movement.values().map(|d| Value::Map(d.to_map())).collect()),
        );
        doc.insert(
            "ai".into(),
            Value::List(self.ai.values().map(|d| Value::Map(d.to_map())).collect()),
        );
        Value::Map(doc)
    }

    /// Pretty JSON form of [`BehaviorRegistry::to_document`]
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AiKind, MovementKind};

    fn idle(name: &str, priority: i32) -> AiBehaviorDef {
        AiBehaviorDef::new(
            name,
            priority,
            AiKind::Idle {
                energy_recovery_rate: 10.0,
                alertness_decay: 0.1,
            },
        )
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = BehaviorRegistry::new();
        registry
            .register_movement(MovementBehaviorDef::new(
                "cruise",
                MovementKind::Linear { max_speed: 30.0 },
            ))
            .unwrap();
        registry.register_ai(idle("rest", 0)).unwrap();

        assert!(registry.movement("cruise").is_some());
        assert!(registry.ai("rest").is_some());
        assert!(registry.movement("rest").is_none());
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = BehaviorRegistry::new();
        registry.register_ai(idle("rest", 0)).unwrap();
        let err = registry.register_ai(idle("rest", 5)).unwrap_err();
        assert!(matches!(err, Error::DuplicateDefinition(ref name) if name == "rest"));
        assert_eq!(registry.ai("rest").map(|d| d.priority), Some(0));
    }

    #[test]
    fn test_candidates_sorted_stably() {
        let mut registry = BehaviorRegistry::new();
        registry.register_ai(idle("low", 0)).unwrap();
        registry.register_ai(idle("first_ten", 10)).unwrap();
        registry.register_ai(idle("high", 20)).unwrap();
        registry.register_ai(idle("second_ten", 10)).unwrap();
        registry.register_ai(idle("off", 50).disabled()).unwrap();
        registry
            .register_ai(idle("stations_only", 40).for_types(&["space_station"]))
            .unwrap();

        let names: Vec<&str> = registry
            .ai_candidates("fighter")
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["high", "first_ten", "second_ten", "low"]);
    }

    #[test]
    fn test_document_reloads() {
        let registry = BehaviorRegistry::with_defaults();
        let json = registry.to_json().unwrap();

        let mut loader = crate::Loader::new();
        loader
            .load_str(&json, crate::Format::Json, crate::Section::Ai)
            .unwrap();
        let (reloaded, report) = loader.finish();

        assert!(report.rejected.is_empty());
        assert_eq!(reloaded.movement_count(), registry.movement_count());
        assert_eq!(reloaded.ai_count(), registry.ai_count());
        assert_eq!(reloaded.ai("pirate_hunt"), registry.ai("pirate_hunt"));
    }
}
