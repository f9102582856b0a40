//! AI system
//!
//! Each tick every entity with an `ai` component walks its candidate
//! behaviors in priority order and runs the first applicable one. The
//! system never moves anything itself: it returns [`MovementIntent`]s for
//! the caller to apply before the movement pass.

mod behaviors;
mod perception;
mod state;

pub use state::{temperament, AiMemory, AiState, AI_COMPONENT};

use crate::config::AiConfig;
use crate::error::SimWarning;
use crate::intent::MovementIntent;
use behaviors::Steer;
use perception::Perception;
use solar_core::EntityStore;
use solar_script::{AiBehaviorDef, BehaviorRegistry};
use std::sync::Arc;
use tracing::{debug, warn};

/// Behavior name recorded when no candidate applies
pub const IMPLICIT_IDLE: &str = "idle";

/// Everything an AI pass produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AiOutcome {
    pub intents: Vec<MovementIntent>,
    pub warnings: Vec<SimWarning>,
}

/// Drives the AI behaviors
#[derive(Debug, Clone)]
pub struct AiSystem {
    registry: Arc<BehaviorRegistry>,
    config: AiConfig,
}

impl AiSystem {
    /// Create an AI system over a shared registry
    pub fn new(registry: Arc<BehaviorRegistry>, config: AiConfig) -> Self {
        Self {
            registry,
            config: config.sanitized(),
        }
    }

    /// Get the active configuration
    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Run one decision pass
    ///
    /// `now` is the game time at the end of this tick; memory timestamps
    /// and trade wait timers are expressed in it.
    pub fn update(&self, store: &mut EntityStore, dt: f64, now: f64) -> AiOutcome {
        let world = store.summaries();
        let mut outcome = AiOutcome::default();

        for entity in store.iter_mut() {
            let Some(component) = entity.component(AI_COMPONENT) else {
                continue;
            };
            let mut state = match AiState::decode(component, &self.config) {
                Ok(state) => state,
                Err(malformed) => {
                    warn!(entity = %entity.id, field = %malformed.0, "malformed ai component");
                    outcome.warnings.push(SimWarning::MalformedComponent {
                        entity: entity.id,
                        component: AI_COMPONENT.to_string(),
                        field: malformed.0,
                    });
                    continue;
                }
            };

            let candidates = self.registry.ai_candidates(entity.kind().as_str());
            let window = candidates
                .iter()
                .filter_map(|def| def.kind.memory_duration())
                .reduce(f64::max)
                .unwrap_or(self.config.memory_duration);
            state.memory.forget_older_than(now, window);

            let view = Perception::new(entity.id, entity.position(), &world);
            let selected: Option<&AiBehaviorDef> = candidates
                .into_iter()
                .find(|def| behaviors::is_applicable(def, &state, &view, now));
            let name = selected.map_or(IMPLICIT_IDLE, |def| def.name.as_str());
            let mut ran = name;
            let (previous, previous_time) = (state.behavior.clone(), state.state_time);

            if state.behavior.as_deref() != Some(name) {
                debug!(entity = %entity.id, from = ?state.behavior, to = %name, "behavior changed");
                state.state_time = 0.0;
                state.behavior = Some(name.to_string());
            }
            state.state_time += dt;

            let steer = match selected {
                Some(def) => {
                    let mut next = state.clone();
                    match behaviors::execute(def, &mut next, &view, now, dt, &self.config) {
                        Ok(steer) => {
                            state = next;
                            steer
                        }
                        Err(reason) => {
                            warn!(entity = %entity.id, behavior = %name, %reason, "ai behavior failed, idling");
                            outcome.warnings.push(SimWarning::AiBehaviorFailed {
                                entity: entity.id,
                                behavior: name.to_string(),
                                reason: reason.0,
                            });
                            ran = IMPLICIT_IDLE;
                            state.behavior = Some(IMPLICIT_IDLE.to_string());
                            state.state_time = if previous.as_deref() == Some(IMPLICIT_IDLE) {
                                previous_time + dt
                            } else {
                                dt
                            };
                            self.idle(&mut state, dt)
                        }
                    }
                }
                None => self.idle(&mut state, dt),
            };

            state.clamp(&self.config);
            state.memory.current_goal = Some(ran.to_string());

            outcome.intents.push(match steer {
                Steer::To(target) => MovementIntent::SteerTo {
                    entity: entity.id,
                    target,
                },
                Steer::Clear => MovementIntent::Clear { entity: entity.id },
            });

            if let Some(component) = entity.component_mut(AI_COMPONENT) {
                state.encode(component);
            }
        }

        outcome
    }

    fn idle(&self, state: &mut AiState, dt: f64) -> Steer {
        behaviors::idle(
            state,
            self.config.idle_energy_recovery,
            self.config.idle_alertness_decay,
            dt,
            &self.config,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solar_core::{EntityId, Value, ValueMap, Vec2};
    use solar_script::AiKind;

    fn ai_component(json: &str) -> ValueMap {
        serde_json::from_str(json).unwrap()
    }

    fn system(defs: Vec<AiBehaviorDef>) -> AiSystem {
        let mut registry = BehaviorRegistry::new();
        for def in defs {
            registry.register_ai(def).unwrap();
        }
        AiSystem::new(Arc::new(registry), AiConfig::default())
    }

    fn spawn(store: &mut EntityStore, kind: &str, position: Vec2, ai: Option<&str>) -> EntityId {
        let entity = store.create(kind, position);
        if let Some(json) = ai {
            entity.add_component(AI_COMPONENT, ai_component(json));
        }
        entity.id
    }

    fn ai_state(store: &EntityStore, id: EntityId) -> AiState {
        let component = store.get(id).unwrap().component(AI_COMPONENT).unwrap();
        AiState::decode(component, &AiConfig::default()).unwrap()
    }

    #[test]
    fn test_priority_selection() {
        let system = system(vec![
            AiBehaviorDef::new(
                "sweep",
                10,
                AiKind::Patrol {
                    waypoints: vec![Vec2::new(500.0, 0.0)],
                    arrival_tolerance: 1.0,
                },
            )
            .with_energy_cost(1.0),
            AiBehaviorDef::new(
                "raid",
                20,
                AiKind::Hunt {
                    detection_range: 100.0,
                    target_types: vec!["cargo_ship".into()],
                    memory_duration: 10.0,
                },
            )
            .with_energy_cost(4.0),
        ]);
        let mut store = EntityStore::new();
        let hunter = spawn(&mut store, "fighter", Vec2::ZERO, Some(r#"{"energy": 80}"#));
        let prey = spawn(&mut store, "cargo_ship", Vec2::new(50.0, 0.0), None);

        let outcome = system.update(&mut store, 1.0, 1.0);

        let state = ai_state(&store, hunter);
        assert_eq!(state.behavior.as_deref(), Some("raid"));
        assert_eq!(state.energy, 76.0);
        assert_eq!(state.memory.current_target, Some(prey));
        assert!(!state.memory.goal_data.contains_key("current_waypoint"));
        assert_eq!(
            outcome.intents,
            vec![MovementIntent::SteerTo {
                entity: hunter,
                target: Vec2::new(50.0, 0.0)
            }]
        );
    }

    #[test]
    fn test_implicit_idle_recovers() {
        let system = system(vec![]);
        let mut store = EntityStore::new();
        let id = spawn(
            &mut store,
            "fighter",
            Vec2::ZERO,
            Some(r#"{"energy": 50, "alertness": 10}"#),
        );

        let outcome = system.update(&mut store, 1.0, 1.0);

        let state = ai_state(&store, id);
        assert_eq!(state.behavior.as_deref(), Some(IMPLICIT_IDLE));
        assert_eq!(state.energy, 60.0);
        assert!((state.alertness - 9.9).abs() < 1e-9);
        assert_eq!(state.state_time, 1.0);
        assert_eq!(outcome.intents, vec![MovementIntent::Clear { entity: id }]);
    }

    #[test]
    fn test_state_time_resets_on_change() {
        let system = system(vec![]);
        let mut store = EntityStore::new();
        let id = spawn(
            &mut store,
            "fighter",
            Vec2::ZERO,
            Some(r#"{"behavior": "patrol", "state_time": 12.0}"#),
        );

        system.update(&mut store, 0.5, 0.5);
        assert_eq!(ai_state(&store, id).state_time, 0.5);
        system.update(&mut store, 0.5, 1.0);
        assert_eq!(ai_state(&store, id).state_time, 1.0);
    }

    #[test]
    fn test_flee_target_opposite_threat() {
        let system = system(vec![AiBehaviorDef::new(
            "scatter",
            30,
            AiKind::Flee {
                detection_range: 100.0,
                threat_types: vec!["fighter".into()],
                flee_range: 200.0,
            },
        )]);
        let mut store = EntityStore::new();
        let runner = spawn(&mut store, "cargo_ship", Vec2::new(10.0, 0.0), Some("{}"));
        spawn(&mut store, "fighter", Vec2::ZERO, None);

        let outcome = system.update(&mut store, 0.1, 0.1);

        match outcome.intents.as_slice() {
            [MovementIntent::SteerTo { entity, target }] => {
                assert_eq!(*entity, runner);
                assert!(target.distance(Vec2::new(200.0, 0.0)) < 1e-9);
            }
            other => panic!("unexpected intents {:?}", other),
        }
        assert!(ai_state(&store, runner).alertness > 0.0);
    }

    #[test]
    fn test_hunt_memory_decays() {
        let system = system(vec![AiBehaviorDef::new(
            "raid",
            20,
            AiKind::Hunt {
                detection_range: 100.0,
                target_types: vec!["cargo_ship".into()],
                memory_duration: 10.0,
            },
        )
        .with_energy_cost(0.0)]);
        let mut store = EntityStore::new();
        let hunter = spawn(&mut store, "fighter", Vec2::ZERO, Some("{}"));
        let prey = spawn(&mut store, "cargo_ship", Vec2::new(50.0, 0.0), None);

        system.update(&mut store, 1.0, 1.0);
        store.get_mut(prey).unwrap().set_position(Vec2::new(500.0, 0.0)).unwrap();

        // Still remembered up to and including t + duration
        system.update(&mut store, 1.0, 11.0);
        let state = ai_state(&store, hunter);
        assert_eq!(state.behavior.as_deref(), Some("raid"));
        assert_eq!(state.memory.current_target, Some(prey));

        system.update(&mut store, 1.0, 11.5);
        let state = ai_state(&store, hunter);
        assert_eq!(state.behavior.as_deref(), Some(IMPLICIT_IDLE));
        assert!(state.memory.last_seen_targets.is_empty());
        assert_eq!(state.memory.current_target, None);
    }

    #[test]
    fn test_failed_behavior_falls_back_to_idle() {
        let system = system(vec![AiBehaviorDef::new(
            "haul",
            8,
            AiKind::Trade {
                trade_routes: vec![vec![Vec2::new(100.0, 0.0)]],
                arrival_tolerance: 1.0,
                wait_time: 1.0,
            },
        )]);
        let mut store = EntityStore::new();
        let id = spawn(
            &mut store,
            "cargo_ship",
            Vec2::ZERO,
            Some(r#"{"energy": 50, "memory": {"goal_data": {"current_point": "first"}}}"#),
        );

        let outcome = system.update(&mut store, 1.0, 1.0);

        assert!(matches!(
            outcome.warnings.as_slice(),
            [SimWarning::AiBehaviorFailed { behavior, .. }] if behavior == "haul"
        ));
        assert_eq!(outcome.intents, vec![MovementIntent::Clear { entity: id }]);
        let state = ai_state(&store, id);
        assert_eq!(state.energy, 60.0);
        assert_eq!(
            state.memory.goal_data.get("current_point"),
            Some(&Value::from("first"))
        );
        // The stored component names what actually ran
        assert_eq!(state.behavior.as_deref(), Some(IMPLICIT_IDLE));
        assert_eq!(state.memory.current_goal.as_deref(), Some(IMPLICIT_IDLE));
        assert_eq!(state.state_time, 1.0);

        system.update(&mut store, 1.0, 2.0);
        let state = ai_state(&store, id);
        assert_eq!(state.behavior.as_deref(), Some(IMPLICIT_IDLE));
        assert_eq!(state.state_time, 2.0);
    }

    #[test]
    fn test_malformed_component_skipped() {
        let system = system(vec![]);
        let mut store = EntityStore::new();
        let id = spawn(&mut store, "fighter", Vec2::ZERO, Some(r#"{"energy": "full"}"#));

        let outcome = system.update(&mut store, 1.0, 1.0);
        assert!(outcome.intents.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].entity(), id);
    }
}
