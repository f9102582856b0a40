//! Error types for solar-script

use thiserror::Error;

/// Behavior loading error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("Unsupported behavior file format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Unknown behavior type '{kind}' in definition '{definition}'")]
    UnknownBehaviorType { definition: String, kind: String },

    #[error("Missing required field '{field}' in definition '{definition}'")]
    MissingField { definition: String, field: String },

    #[error("Invalid field '{field}' in definition '{definition}': {reason}")]
    InvalidField {
        definition: String,
        field: String,
        reason: String,
    },

    #[error("Duplicate definition: {0}")]
    DuplicateDefinition(String),
}

impl Error {
    /// True for errors scoped to a single definition
    ///
    /// The loader skips such definitions and keeps going; anything else
    /// aborts loading of the whole file.
    pub fn is_definition_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownBehaviorType { .. }
                | Error::MissingField { .. }
                | Error::InvalidField { .. }
                | Error::DuplicateDefinition(_)
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
