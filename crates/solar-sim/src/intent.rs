//! AI to movement synchronization
//!
//! The AI pass never touches the `movement` component directly. It returns
//! intents, and [`apply_intents`] writes them as `target_position` before
//! the movement pass runs. This is the only write across system ownership.

use crate::movement::MOVEMENT_COMPONENT;
use solar_core::{EntityId, EntityStore, Value, Vec2};
use tracing::debug;

/// A steering request from the AI system
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementIntent {
    /// Set the movement target
    SteerTo { entity: EntityId, target: Vec2 },
    /// Remove the movement target
    Clear { entity: EntityId },
}

impl MovementIntent {
    /// The entity the intent is for
    pub fn entity(&self) -> EntityId {
        match self {
            MovementIntent::SteerTo { entity, .. } | MovementIntent::Clear { entity } => *entity,
        }
    }

    /// The target to write, `None` for a clear
    pub fn target(&self) -> Option<Vec2> {
        match self {
            MovementIntent::SteerTo { target, .. } => Some(*target),
            MovementIntent::Clear { .. } => None,
        }
    }
}

/// Write intents into the movement components
///
/// Intents for missing entities, or entities without a movement component,
/// are dropped. Returns how many were applied.
pub fn apply_intents(store: &mut EntityStore, intents: &[MovementIntent]) -> usize {
    let mut applied = 0;
    for intent in intents {
        let entity = intent.entity();
        let Some(component) = store
            .get_mut(entity)
            .and_then(|e| e.component_mut(MOVEMENT_COMPONENT))
        else {
            debug!(%entity, "dropping movement intent, no movement component");
            continue;
        };
        component.insert("target_position".into(), Value::from(intent.target()));
        applied += 1;
    }
    applied
}
