//! Episode configuration.

use attackgame_core::{GameError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Horizon T; an episode plays rounds 0..=T
    pub num_time_steps: usize,

    /// Per-step payoff discount, in (0, 1]
    pub discount_factor: f64,

    /// Master seed for the episode RNG
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_time_steps: 10,
            discount_factor: 0.9,
            seed: 42,
        }
    }
}

impl SimulationConfig {
    pub fn with_time_steps(mut self, steps: usize) -> Self {
        self.num_time_steps = steps;
        self
    }

    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount_factor = discount;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Rejects a discount factor outside (0, 1].
    pub fn validate(&self) -> Result<()> {
        let d = self.discount_factor;
        if d.is_finite() && d > 0.0 && d <= 1.0 {
            Ok(())
        } else {
            Err(GameError::InvalidDiscount(d))
        }
    }

    /// Seed for the `index`-th independent run derived from this config.
    pub fn derived_seed(&self, index: u64) -> u64 {
        self.seed
            .wrapping_mul(0x9e3779b97f4a7c15)
            .wrapping_add(index.wrapping_mul(0x517cc1b727220a95))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_discount_bounds() {
        let config = SimulationConfig::default();
        assert!(config.clone().with_discount(1.0).validate().is_ok());
        assert_eq!(
            config.clone().with_discount(0.0).validate(),
            Err(GameError::InvalidDiscount(0.0))
        );
        assert!(config.with_discount(1.01).validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SimulationConfig = serde_json::from_str(r#"{"num_time_steps": 3}"#).unwrap();
        assert_eq!(config.num_time_steps, 3);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_derived_seeds_differ() {
        let config = SimulationConfig::default();
        assert_ne!(config.derived_seed(0), config.derived_seed(1));
        assert_eq!(config.derived_seed(3), config.clone().derived_seed(3));
    }
}
