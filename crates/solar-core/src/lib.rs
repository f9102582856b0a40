//! Solar Core - Entity data model for the Solar Factions simulation
//!
//! This crate provides the leaf types every other crate builds on:
//! - Dynamic value types (`Value`, `ValueMap`) for properties and components
//! - Entity and definition identifiers
//! - `Entity` records and the ordered `EntityStore`
//! - 2D vector helpers on top of `glam::DVec2`
//! - Tick time, speed multiplier and loop state
//! - Deterministic RNG
//!
//! ## Components
//!
//! Components are plain `ValueMap` data bags keyed by name. Each one is
//! owned by a single system (`"movement"` by the movement system, `"ai"` by
//! the AI system) and always holds serializable values only, so an entity
//! can be snapshotted to JSON and restored without help from the systems.

mod entity;
mod error;
mod identity;
pub mod math;
mod rng;
pub mod time;
mod value;

pub use entity::{Entity, EntityStore, EntitySummary};
pub use error::{Error, Result};
pub use identity::{DefId, EntityId};
pub use math::Vec2;
pub use rng::GameRng;
pub use time::{LoopState, SimClock, Speed, Tick};
pub use value::{Value, ValueMap};

// Re-export for downstream crates that build component maps
pub use indexmap::IndexMap;
