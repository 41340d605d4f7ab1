//! Comparison configuration.

use serde::{Deserialize, Serialize};

/// Percent per year applied when a group has no data for a later year.
pub const DEFAULT_GROWTH_RATE: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    pub growth_rate: f64,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            growth_rate: DEFAULT_GROWTH_RATE,
        }
    }
}

impl CompareConfig {
    pub fn with_growth_rate(mut self, rate: f64) -> Self {
        self.growth_rate = rate;
        self
    }

    /// Multiplier for one projected year.
    pub fn growth_factor(&self) -> f64 {
        1.0 + self.growth_rate / 100.0
    }
}
