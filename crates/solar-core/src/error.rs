//! Error types for solar-core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Type error: expected {expected}, got {got}")]
    TypeError { expected: String, got: String },

    #[error("Property not found: {0}")]
    PropertyNotFound(String),

    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Invalid entity id: {0}")]
    InvalidEntityId(String),

    #[error("Non-finite position ({x}, {y})")]
    NonFinitePosition { x: f64, y: f64 },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
