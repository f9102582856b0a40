//! Solar Script - Behavior definitions and loader
//!
//! Loads movement and AI behavior definitions from JSON or RON files:
//! - Typed, validated definitions (`MovementBehaviorDef`, `AiBehaviorDef`)
//! - A read-only `BehaviorRegistry` shared by the simulation systems
//! - The built-in default catalogue
//!
//! The `type` discriminator of each definition is resolved to a closed enum
//! at load time; unknown types and missing parameters reject that one
//! definition, never the whole file.

mod defaults;
mod error;
mod loader;
mod registry;
mod schema;

pub use defaults::{ai_behaviors, default_config_json, movement_behaviors};
pub use error::{Error, Result};
pub use loader::{Format, LoadReport, Loader, Rejected, Section};
pub use registry::BehaviorRegistry;
pub use schema::{AiBehaviorDef, AiKind, MovementBehaviorDef, MovementKind};
