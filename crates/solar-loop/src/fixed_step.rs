//! Fixed-timestep accumulator
//!
//! Real time goes in, whole ticks of `1/tps` come out. The accumulator is
//! a plain value with no clock or thread of its own, so the tick schedule
//! for a given sequence of frame times is fully reproducible.

use crate::config::LoopConfig;
use solar_core::Speed;
use tracing::debug;

/// Converts elapsed real time into fixed logic ticks
#[derive(Debug, Clone, PartialEq)]
pub struct FixedStep {
    dt: f64,
    max_catch_up: u32,
    accumulator: f64,
    dropped: u64,
}

impl FixedStep {
    /// Create an accumulator for a loop configuration
    pub fn new(config: &LoopConfig) -> Self {
        Self {
            dt: config.tick_interval(),
            max_catch_up: config.max_catch_up_ticks,
            accumulator: 0.0,
            dropped: 0,
        }
    }

    /// Seconds per tick
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Scaled time not yet turned into ticks
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Total ticks discarded by the catch-up cap
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Feed `real_dt` seconds of wall time and return how many ticks to run
    ///
    /// Non-positive or non-finite input adds nothing.
    pub fn advance(&mut self, real_dt: f64, speed: Speed) -> u32 {
        if real_dt.is_finite() && real_dt > 0.0 {
            self.accumulator += real_dt * speed.multiplier();
        }

        let mut ticks = 0;
        while self.accumulator >= self.dt && ticks < self.max_catch_up {
            self.accumulator -= self.dt;
            ticks += 1;
        }

        if self.accumulator >= self.dt {
            let excess = (self.accumulator / self.dt).floor();
            self.accumulator -= excess * self.dt;
            // Rounding can leave the remainder a hair over one tick
            if self.accumulator >= self.dt || self.accumulator < 0.0 {
                self.accumulator = 0.0;
            }
            self.dropped += excess as u64;
            debug!(dropped = excess as u64, ran = ticks, "catch-up cap reached, dropping ticks");
        }

        ticks
    }

    /// Forget any partial tick
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
