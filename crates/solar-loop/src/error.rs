//! Error types for solar-loop

use thiserror::Error;

/// Result type for solar-loop operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving the loop
#[derive(Debug, Error)]
pub enum Error {
    /// A loop thread could not be started
    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// What an update or render callback returns
///
/// An `Err` is logged with the callback's name and the loop carries on.
pub type CallbackResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;
