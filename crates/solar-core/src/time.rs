//! Time system for tick-based simulation
//!
//! Provides discrete time management for the fixed-step simulation:
//! - `Tick` - Logical time unit
//! - `Speed` - Clamped game speed multiplier
//! - `SimClock` - Tick counter plus accumulated game time
//! - `LoopState` - Stopped / Running / Paused

use serde::{Deserialize, Serialize};
use std::fmt;

/// A discrete tick identifier (logical time unit)
pub type Tick = u64;

/// Game speed multiplier, always within `[Speed::MIN, Speed::MAX]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Speed(f64);

impl Speed {
    /// Slowest accepted multiplier
    pub const MIN: f64 = 0.1;
    /// Fastest accepted multiplier
    pub const MAX: f64 = 10.0;
    /// Real-time speed
    pub const NORMAL: Speed = Speed(1.0);

    /// Create a speed, clamping out-of-range values
    ///
    /// Infinities clamp like any other out-of-range value; NaN falls back
    /// to normal speed.
    pub fn new(multiplier: f64) -> Self {
        if multiplier.is_nan() {
            Self::NORMAL
        } else {
            Self(multiplier.clamp(Self::MIN, Self::MAX))
        }
    }

    /// The multiplier value
    pub fn multiplier(&self) -> f64 {
        self.0
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl From<f64> for Speed {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Speed> for f64 {
    fn from(speed: Speed) -> Self {
        speed.0
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}x", self.0)
    }
}

/// Simulation clock state
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    /// Number of logic ticks executed
    pub tick: Tick,
    /// Total simulated seconds
    pub game_time: f64,
}

impl SimClock {
    /// Create a new clock at tick zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one tick of `dt` seconds
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.game_time += dt;
    }
}

/// Lifecycle of the game loop
///
/// `Stopped` is both the initial and the terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LoopState {
    #[default]
    Stopped,
    Running,
    Paused,
}

impl LoopState {
    /// True while the loop threads are alive (running or paused)
    pub fn is_active(&self) -> bool {
        !matches!(self, LoopState::Stopped)
    }

    /// Check if the loop is paused
    pub fn is_paused(&self) -> bool {
        matches!(self, LoopState::Paused)
    }
}
