//! Schema definitions for behavior files

pub mod ai;
pub mod movement;
pub(crate) mod params;

pub use ai::{AiBehaviorDef, AiKind};
pub use movement::{MovementBehaviorDef, MovementKind};
