//! Movement system
//!
//! Advances position and velocity of every entity carrying a `movement`
//! component with an assigned behavior. Unassigned entities are left
//! untouched; there is no implicit default motion.

mod behaviors;
mod state;

pub use state::{MovementState, MOVEMENT_COMPONENT};

use crate::error::SimWarning;
use behaviors::StepContext;
use solar_core::{EntityStore, GameRng, Tick};
use solar_script::BehaviorRegistry;
use std::sync::Arc;
use tracing::{trace, warn};

/// Drives the movement behaviors
#[derive(Debug, Clone)]
pub struct MovementSystem {
    registry: Arc<BehaviorRegistry>,
    seed: u64,
}

impl MovementSystem {
    /// Create a movement system over a shared registry
    pub fn new(registry: Arc<BehaviorRegistry>, seed: u64) -> Self {
        Self { registry, seed }
    }

    /// Advance every assigned entity by `dt` seconds
    ///
    /// `tick` seeds the per-entity random streams, so results do not depend
    /// on iteration order.
    pub fn update(&self, store: &mut EntityStore, dt: f64, tick: Tick) -> Vec<SimWarning> {
        let world = store.summaries();
        let mut warnings = Vec::new();

        for entity in store.iter_mut() {
            let Some(component) = entity.component(MOVEMENT_COMPONENT) else {
                continue;
            };
            let mut state = match MovementState::decode(component) {
                Ok(state) => state,
                Err(malformed) => {
                    warn!(entity = %entity.id, field = %malformed.0, "malformed movement component");
                    warnings.push(SimWarning::MalformedComponent {
                        entity: entity.id,
                        component: MOVEMENT_COMPONENT.to_string(),
                        field: malformed.0,
                    });
                    continue;
                }
            };
            let Some(name) = state.behavior.clone() else {
                continue;
            };
            let Some(def) = self.registry.movement(&name) else {
                warn!(entity = %entity.id, behavior = %name, "unknown movement behavior");
                warnings.push(SimWarning::UnknownMovementBehavior {
                    entity: entity.id,
                    behavior: name,
                });
                continue;
            };
            if !def.enabled {
                continue;
            }

            let mut ctx = StepContext {
                entity: entity.id,
                dt,
                world: &world,
                rng: GameRng::derive(self.seed, entity.id, tick),
            };
            let before = state.clone();
            let next = behaviors::step(&def.kind, &mut state, entity.position(), &mut ctx);

            if !next.is_finite() || !state.velocity.is_finite() || entity.set_position(next).is_err() {
                warn!(entity = %entity.id, behavior = %name, "non-finite movement result, keeping previous state");
                warnings.push(SimWarning::NonFiniteMovement {
                    entity: entity.id,
                    behavior: name,
                });
                state = before;
            } else {
                trace!(entity = %entity.id, behavior = %name, x = next.x, y = next.y, "moved");
            }

            if let Some(component) = entity.component_mut(MOVEMENT_COMPONENT) {
                state.encode(component);
            }
        }

        warnings
    }
}
