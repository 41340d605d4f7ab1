//! Grid configuration.

use geoimpact_core::{Resolution, CANONICAL_RESOLUTION};
use serde::{Deserialize, Serialize};

/// Configuration for region expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Resolution for aggregations with no material grid to follow
    /// (water-stress layers). Default: 6
    pub canonical_resolution: Resolution,

    /// Maximum cached `(region, resolution)` expansions. Default: 512
    pub cache_capacity: usize,

    /// Upper bound on cells produced by one expansion. Default: 5,000,000
    pub max_expanded_cells: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            canonical_resolution: CANONICAL_RESOLUTION,
            cache_capacity: 512,
            max_expanded_cells: 5_000_000,
        }
    }
}

impl GridConfig {
    pub fn with_canonical_resolution(mut self, resolution: Resolution) -> Self {
        self.canonical_resolution = resolution;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_max_expanded_cells(mut self, limit: usize) -> Self {
        self.max_expanded_cells = limit;
        self
    }
}
