//! Solar Loop - Fixed-step game loop for the Solar Factions simulation
//!
//! The loop keeps two cadences apart:
//!
//! ```text
//! logic thread:  wall time -> FixedStep -> N x update(1/tps)   (N <= catch-up cap)
//! render thread: every 1/fps -> render(real frame delta)
//! ```
//!
//! ## Key Components
//!
//! - [`GameLoop`]: start, stop, pause, resume, speed and single-step control
//! - [`FixedStep`]: the accumulator, usable without threads
//! - [`SharedSimulation`]: a `Simulation` plus its published render frame
//! - [`LoopStats`]: tick, time and rate statistics

mod config;
mod error;
mod fixed_step;
mod game_loop;
mod shared;
mod stats;

pub use config::LoopConfig;
pub use error::{CallbackResult, Error, Result};
pub use fixed_step::FixedStep;
pub use game_loop::{GameLoop, SystemHandle};
pub use shared::SharedSimulation;
pub use stats::{LoopStats, RateMeter};

// Re-exported so callers can match on loop state and speed directly
pub use solar_core::{LoopState, Speed};
