//! Loop statistics

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Rolling average rate over the last `window` intervals
#[derive(Debug, Clone)]
pub struct RateMeter {
    intervals: VecDeque<f64>,
    window: usize,
    sum: f64,
}

impl RateMeter {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            intervals: VecDeque::with_capacity(window),
            window,
            sum: 0.0,
        }
    }

    /// Record one interval in seconds; non-positive intervals are ignored
    pub fn record(&mut self, interval: f64) {
        if !(interval.is_finite() && interval > 0.0) {
            return;
        }
        if self.intervals.len() == self.window {
            if let Some(old) = self.intervals.pop_front() {
                self.sum -= old;
            }
        }
        self.intervals.push_back(interval);
        self.sum += interval;
    }

    /// Events per second, 0 with no samples
    pub fn rate(&self) -> f64 {
        if self.intervals.is_empty() || self.sum <= 0.0 {
            0.0
        } else {
            self.intervals.len() as f64 / self.sum
        }
    }

    pub fn clear(&mut self) {
        self.intervals.clear();
        self.sum = 0.0;
    }
}

/// Snapshot of the loop's timing and registration state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoopStats {
    pub tick: u64,
    /// Simulated seconds
    pub game_time: f64,
    /// Wall seconds spent running or paused
    pub real_time: f64,
    /// `game_time / real_time`, 0 before any real time has passed
    pub time_ratio: f64,
    pub running: bool,
    pub paused: bool,
    pub speed: f64,
    pub target_tps: u32,
    pub actual_tps: f64,
    pub target_fps: u32,
    pub actual_fps: f64,
    pub update_systems: usize,
    pub render_systems: usize,
}

impl fmt::Display for LoopStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match (self.running, self.paused) {
            (_, true) => "paused",
            (true, false) => "running",
            (false, false) => "stopped",
        };
        write!(
            f,
            "tick {} | game {:.2}s real {:.2}s (x{:.2}) | {} at {:.1}x | tps {:.1}/{} fps {:.1}/{} | systems {}u {}r",
            self.tick,
            self.game_time,
            self.real_time,
            self.time_ratio,
            status,
            self.speed,
            self.actual_tps,
            self.target_tps,
            self.actual_fps,
            self.target_fps,
            self.update_systems,
            self.render_systems
        )
    }
}
