//! Simulation manager
//!
//! Owns the entity store and both systems, and runs them in a fixed order
//! each tick: AI pass, intent application, movement pass.

use crate::ai::{AiSystem, AI_COMPONENT};
use crate::config::SimConfig;
use crate::error::{Error, Result, SimWarning};
use crate::intent::apply_intents;
use crate::movement::{MovementSystem, MOVEMENT_COMPONENT};
use indexmap::IndexMap;
use solar_core::{DefId, Entity, EntityId, EntityStore, SimClock, Tick, Value};
use solar_script::BehaviorRegistry;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of one simulation tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Tick number after the update
    pub tick: Tick,
    /// Game time after the update
    pub game_time: f64,
    /// Recoverable per-entity problems, AI pass first
    pub warnings: Vec<SimWarning>,
}

impl TickReport {
    /// True when nothing needed a fallback
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Read-only view of the world handed to renderers
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub entities: Arc<Vec<Entity>>,
    pub tick: Tick,
    pub game_time: f64,
}

impl Frame {
    /// Find an entity by id
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Default behavior names per entity kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeAssignments {
    entries: IndexMap<DefId, (Option<String>, Option<String>)>,
}

impl TypeAssignments {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock sector layout
    ///
    /// Stars and planets are listed with no behaviors so they are known
    /// kinds that stay static.
    pub fn standard() -> Self {
        Self::new()
            .with("fighter", Some("fast_patrol"), Some("pirate_hunt"))
            .with("cargo_ship", Some("cargo_route"), Some("trade_run"))
            .with("mining_ship", Some("exploration"), Some("resource_hunter"))
            .with("space_station", None, Some("station_guard"))
            .with("star", None, None)
            .with("planet", None, None)
    }

    /// Add or replace the entry for `kind`
    pub fn with(mut self, kind: &str, movement: Option<&str>, ai: Option<&str>) -> Self {
        self.entries.insert(
            DefId::new(kind),
            (movement.map(str::to_string), ai.map(str::to_string)),
        );
        self
    }

    /// Behavior names for `kind`
    pub fn get(&self, kind: &DefId) -> Option<(Option<&str>, Option<&str>)> {
        self.entries
            .get(kind)
            .map(|(movement, ai)| (movement.as_deref(), ai.as_deref()))
    }
}

/// Temperament implied by an AI behavior name
fn infer_ai_type(behavior: &str) -> Option<&'static str> {
    let name = behavior.to_ascii_lowercase();
    if name.contains("hunt") || name.contains("pirate") {
        Some("aggressive")
    } else if name.contains("guard") || name.contains("defend") {
        Some("defensive")
    } else if name.contains("trade") || name.contains("merchant") {
        Some("merchant")
    } else {
        None
    }
}

/// The game manager
#[derive(Debug)]
pub struct Simulation {
    store: EntityStore,
    registry: Arc<BehaviorRegistry>,
    movement: MovementSystem,
    ai: AiSystem,
    clock: SimClock,
    config: SimConfig,
}

impl Simulation {
    /// Create an empty simulation over a registry
    pub fn new(registry: Arc<BehaviorRegistry>, config: SimConfig) -> Self {
        info!(
            seed = config.seed,
            movement_behaviors = registry.movement_count(),
            ai_behaviors = registry.ai_count(),
            "simulation created"
        );
        Self {
            store: EntityStore::new(),
            movement: MovementSystem::new(Arc::clone(&registry), config.seed),
            ai: AiSystem::new(Arc::clone(&registry), config.ai.clone()),
            registry,
            clock: SimClock::new(),
            config,
        }
    }

    /// Simulation over the built-in behavior catalogue
    pub fn with_defaults(config: SimConfig) -> Self {
        Self::new(Arc::new(BehaviorRegistry::with_defaults()), config)
    }

    /// Continue from saved state
    ///
    /// The clock must come along with the store: random streams and AI
    /// memory timestamps are keyed on it.
    pub fn restore(mut self, store: EntityStore, clock: SimClock) -> Self {
        self.store = store;
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    pub fn clock(&self) -> SimClock {
        self.clock
    }

    pub fn registry(&self) -> &Arc<BehaviorRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Advance the world by one tick of `dt` seconds
    ///
    /// A negative or non-finite `dt` is treated as zero.
    pub fn update(&mut self, dt: f64) -> TickReport {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            warn!(dt, "invalid tick delta, using 0");
            0.0
        };

        self.clock.advance(dt);
        let tick = self.clock.tick;
        let now = self.clock.game_time;

        let outcome = self.ai.update(&mut self.store, dt, now);
        let applied = apply_intents(&mut self.store, &outcome.intents);
        let mut warnings = outcome.warnings;
        warnings.extend(self.movement.update(&mut self.store, dt, tick));

        debug!(
            tick,
            game_time = now,
            intents = applied,
            warnings = warnings.len(),
            "tick complete"
        );

        TickReport {
            tick,
            game_time: now,
            warnings,
        }
    }

    /// Set the movement behavior of an entity
    ///
    /// Creates the `movement` component when missing. The name is not
    /// checked here; an unknown name is reported on the next tick.
    pub fn assign_movement(&mut self, id: EntityId, behavior: &str) -> Result<()> {
        let entity = self.store.get_mut(id).ok_or(Error::EntityNotFound(id))?;
        let component = entity.component_or_default(MOVEMENT_COMPONENT);
        component.insert("behavior".into(), behavior.into());
        component.shift_remove("waypoint_index");
        component.shift_remove("angle");
        debug!(entity = %id, behavior, "movement assigned");
        Ok(())
    }

    /// Set the AI behavior of an entity
    ///
    /// Creates the `ai` component when missing and fills in a temperament
    /// from the behavior name if none is set.
    pub fn assign_ai(&mut self, id: EntityId, behavior: &str) -> Result<()> {
        let entity = self.store.get_mut(id).ok_or(Error::EntityNotFound(id))?;
        let component = entity.component_or_default(AI_COMPONENT);
        component.insert("behavior".into(), behavior.into());
        if component.get("ai_type").map_or(true, Value::is_null) {
            if let Some(ai_type) = infer_ai_type(behavior) {
                component.insert("ai_type".into(), ai_type.into());
            }
        }
        debug!(entity = %id, behavior, "ai assigned");
        Ok(())
    }

    /// Apply per-kind defaults to every matching entity
    ///
    /// Returns how many entities received at least one behavior.
    pub fn assign_by_type(&mut self, assignments: &TypeAssignments) -> usize {
        let plan: Vec<(EntityId, Option<String>, Option<String>)> = self
            .store
            .iter()
            .filter_map(|entity| {
                let (movement, ai) = assignments.get(entity.kind())?;
                if movement.is_none() && ai.is_none() {
                    return None;
                }
                Some((entity.id, movement.map(str::to_string), ai.map(str::to_string)))
            })
            .collect();

        let mut assigned = 0;
        for (id, movement, ai) in plan {
            let mut ok = true;
            if let Some(name) = movement {
                ok &= self.assign_movement(id, &name).is_ok();
            }
            if let Some(name) = ai {
                ok &= self.assign_ai(id, &name).is_ok();
            }
            if ok {
                assigned += 1;
            }
        }
        info!(assigned, "behaviors assigned by type");
        assigned
    }

    /// Copy the current world into a render frame
    pub fn snapshot(&self) -> Frame {
        Frame {
            entities: Arc::new(self.store.iter().cloned().collect()),
            tick: self.clock.tick,
            game_time: self.clock.game_time,
        }
    }
}
