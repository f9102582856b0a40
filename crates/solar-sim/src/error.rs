//! Error and warning types for solar-sim

use solar_core::EntityId;
use thiserror::Error;

/// Simulation API error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error(transparent)]
    Core(#[from] solar_core::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// A per-entity problem that was handled during a tick
///
/// Warnings never stop the tick; the affected entity falls back to its
/// system's safe default (no movement, or idle AI) for that tick only.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimWarning {
    #[error("{entity}: unknown movement behavior '{behavior}'")]
    UnknownMovementBehavior { entity: EntityId, behavior: String },

    #[error("{entity}: AI behavior '{behavior}' failed: {reason}")]
    AiBehaviorFailed {
        entity: EntityId,
        behavior: String,
        reason: String,
    },

    #[error("{entity}: movement behavior '{behavior}' produced a non-finite position")]
    NonFiniteMovement { entity: EntityId, behavior: String },

    #[error("{entity}: malformed '{component}' component field '{field}'")]
    MalformedComponent {
        entity: EntityId,
        component: String,
        field: String,
    },
}

impl SimWarning {
    /// The entity the warning is about
    pub fn entity(&self) -> EntityId {
        match self {
            SimWarning::UnknownMovementBehavior { entity, .. }
            | SimWarning::AiBehaviorFailed { entity, .. }
            | SimWarning::NonFiniteMovement { entity, .. }
            | SimWarning::MalformedComponent { entity, .. } => *entity,
        }
    }
}
