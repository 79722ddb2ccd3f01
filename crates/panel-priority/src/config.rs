//! Optimizer configuration
//!
//! Every weighting constant and threshold of the objective functions lives
//! here so tests can pin expected outputs against the defaults.

use serde::{Deserialize, Serialize};

/// Priority-balance optimizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Survivors kept per generation
    pub population_size: usize,
    /// Generational rounds
    pub generations: usize,
    /// Upper bound on slot swaps per mutation (also capped at N-1)
    pub max_swaps: usize,
    /// Alert items must rank at or above this
    pub alert_rank_limit: usize,
    /// KPI-like items should rank at or above this
    pub kpi_rank_limit: usize,
    /// Rank displacement from baseline that counts as a risky shift
    pub shift_threshold: usize,
    /// Penalty per rank an alert item sits below its limit
    pub alert_penalty: f64,
    /// Penalty per rank a KPI item sits below its limit
    pub kpi_penalty: f64,
    /// Penalty per item shifted by at least `shift_threshold`
    pub shift_penalty: f64,
    /// Size of the top band (overload and readability)
    pub top_band: usize,
    /// Lower edge of the overload second band
    pub overload_band: usize,
    /// Lower edge of the readability mid band
    pub readability_band: usize,
    /// Weight of load in the top band
    pub top_band_weight: f64,
    /// Weight of load in the second band
    pub second_band_weight: f64,
}

impl OptimizerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With population size
    #[inline]
    #[must_use]
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size.max(2);
        self
    }

    /// With generation count
    #[inline]
    #[must_use]
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            population_size: 12,
            generations: 3,
            max_swaps: 3,
            alert_rank_limit: 2,
            kpi_rank_limit: 4,
            shift_threshold: 3,
            alert_penalty: 3.0,
            kpi_penalty: 1.5,
            shift_penalty: 0.5,
            top_band: 3,
            overload_band: 5,
            readability_band: 6,
            top_band_weight: 1.0,
            second_band_weight: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = OptimizerConfig::new();
        assert_eq!(config.generations, 3);
        assert_eq!(config.alert_rank_limit, 2);
        assert_eq!(config.kpi_rank_limit, 4);
    }

    #[test]
    fn population_size_has_floor() {
        assert_eq!(OptimizerConfig::new().with_population_size(0).population_size, 2);
    }
}
