//! Solar Sim - Behavior systems and the simulation manager
//!
//! Two systems act on the entity store every tick:
//! - [`AiSystem`] picks the highest priority applicable AI behavior for
//!   each entity, updates its memory and emits [`MovementIntent`]s
//! - [`MovementSystem`] advances positions and velocities from the
//!   assigned movement behaviors
//!
//! [`Simulation`] owns the store and runs them as one tick:
//!
//! ```text
//! clock.advance(dt) -> AI pass -> apply_intents -> movement pass
//! ```
//!
//! Per-entity problems never abort a tick. They fall back to a safe
//! default and are reported as [`SimWarning`]s in the [`TickReport`].

pub mod ai;
mod component;
pub mod config;
mod error;
pub mod intent;
pub mod movement;
mod world;

pub use ai::{AiOutcome, AiState, AiSystem};
pub use config::{AiConfig, SimConfig};
pub use error::{Error, Result, SimWarning};
pub use intent::{apply_intents, MovementIntent};
pub use movement::{MovementState, MovementSystem};
pub use world::{Frame, Simulation, TickReport, TypeAssignments};
