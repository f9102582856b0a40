//! Loop configuration - tick and frame rates, catch-up cap, stats window

use serde::{Deserialize, Serialize};

/// Configuration for a [`crate::GameLoop`]
///
/// Every field is clamped into a usable range on construction and when
/// deserialized through [`LoopConfig::sanitized`].
///
/// # Example
///
/// ```
/// use solar_loop::LoopConfig;
///
/// let config = LoopConfig::new(0, 60);
/// assert_eq!(config.target_tps, 1);
/// assert_eq!(config.tick_interval(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Logic ticks per second
    pub target_tps: u32,
    /// Render frames per second
    pub target_fps: u32,
    /// Most ticks run for a single accumulator drain
    ///
    /// Accumulated time beyond this is dropped.
    pub max_catch_up_ticks: u32,
    /// Number of intervals averaged for the actual tps and fps
    pub stats_window: usize,
}

impl LoopConfig {
    pub const MAX_RATE: u32 = 1000;
    pub const MAX_CATCH_UP: u32 = 100;
    pub const MAX_STATS_WINDOW: usize = 10_000;

    /// Create a configuration with the given rates and default limits
    pub fn new(target_tps: u32, target_fps: u32) -> Self {
        Self {
            target_tps,
            target_fps,
            ..Self::default()
        }
        .sanitized()
    }

    /// Set the catch-up cap
    pub fn with_max_catch_up(mut self, ticks: u32) -> Self {
        self.max_catch_up_ticks = ticks;
        self.sanitized()
    }

    /// Set the stats window
    pub fn with_stats_window(mut self, window: usize) -> Self {
        self.stats_window = window;
        self.sanitized()
    }

    /// Clamp every field into range
    pub fn sanitized(self) -> Self {
        Self {
            target_tps: self.target_tps.clamp(1, Self::MAX_RATE),
            target_fps: self.target_fps.clamp(1, Self::MAX_RATE),
            max_catch_up_ticks: self.max_catch_up_ticks.clamp(1, Self::MAX_CATCH_UP),
            stats_window: self.stats_window.clamp(1, Self::MAX_STATS_WINDOW),
        }
    }

    /// Simulated seconds per tick
    pub fn tick_interval(&self) -> f64 {
        1.0 / f64::from(self.target_tps)
    }

    /// Real seconds between render frames
    pub fn frame_interval(&self) -> f64 {
        1.0 / f64::from(self.target_fps)
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 20,
            target_fps: 60,
            max_catch_up_ticks: 5,
            stats_window: 100,
        }
    }
}
