//! Deterministic random number generator
//!
//! Uses xorshift64 so the same seed produces the same sequence on every
//! platform. Per-entity streams are derived from `(seed, entity, tick)`
//! with a fixed splitmix64 mix, which keeps results independent of the
//! order entities are visited in and of the toolchain.

use crate::identity::EntityId;
use crate::time::Tick;
use serde::{Deserialize, Serialize};

/// A deterministic random number generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRng {
    state: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        // xorshift requires a non-zero state
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Derive the RNG for one entity at one tick
    ///
    /// Folds `seed`, `entity` and `tick` through splitmix64.
    pub fn derive(seed: u64, entity: EntityId, tick: Tick) -> Self {
        let mixed = splitmix64(splitmix64(splitmix64(seed) ^ entity.0) ^ tick);
        Self::new(mixed)
    }

    /// Get the current state
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Generate the next raw u64 value
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Generate a random f64 in range [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Generate a random f64 in range [min, max)
    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Generate a random angle in [0, 2π)
    pub fn angle(&mut self) -> f64 {
        self.range_f64(0.0, std::f64::consts::TAU)
    }

    /// Generate a random bool with given probability of true
    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    /// Pick a random element from a slice
    pub fn pick<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            None
        } else {
            let i = (self.next_u64() % slice.len() as u64) as usize;
            slice.get(i)
        }
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(12345)
    }
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
