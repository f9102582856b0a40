//! Simulation configuration

use serde::{Deserialize, Serialize};

/// Tunables for the AI system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Upper bound for energy
    pub energy_max: f64,
    /// Upper bound for alertness
    pub alertness_max: f64,
    /// Memory window when no candidate behavior declares one
    pub memory_duration: f64,
    /// Energy recovered per second by the implicit idle
    pub idle_energy_recovery: f64,
    /// Alertness lost per second by the implicit idle
    pub idle_alertness_decay: f64,
}

impl AiConfig {
    /// Replace non-finite or negative values with the defaults
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let pick = |value: f64, fallback: f64| {
            if value.is_finite() && value >= 0.0 {
                value
            } else {
                fallback
            }
        };
        Self {
            energy_max: pick(self.energy_max, defaults.energy_max),
            alertness_max: pick(self.alertness_max, defaults.alertness_max),
            memory_duration: pick(self.memory_duration, defaults.memory_duration),
            idle_energy_recovery: pick(self.idle_energy_recovery, defaults.idle_energy_recovery),
            idle_alertness_decay: pick(self.idle_alertness_decay, defaults.idle_alertness_decay),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            energy_max: 100.0,
            alertness_max: 100.0,
            memory_duration: 10.0,
            idle_energy_recovery: 10.0,
            idle_alertness_decay: 0.1,
        }
    }
}

/// Configuration for a [`crate::Simulation`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Base seed for per-entity random streams
    pub seed: u64,
    pub ai: AiConfig,
}

impl SimConfig {
    /// Default configuration with a specific seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            ai: AiConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized() {
        let config = AiConfig {
            energy_max: f64::NAN,
            alertness_max: -5.0,
            memory_duration: 3.0,
            ..AiConfig::default()
        }
        .sanitized();

        assert_eq!(config.energy_max, 100.0);
        assert_eq!(config.alertness_max, 100.0);
        assert_eq!(config.memory_duration, 3.0);
    }

    #[test]
    fn test_partial_config() {
        let config: SimConfig = serde_json::from_str(r#"{"seed": 7, "ai": {"energy_max": 50.0}}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.ai.energy_max, 50.0);
        assert_eq!(config.ai.alertness_max, 100.0);
    }
}
