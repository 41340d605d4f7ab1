//! Error types for region expansion.

use crate::cell::CellIndex;
use geoimpact_core::{GeoRegionId, InvalidResolution};
use thiserror::Error;

/// Grid and region errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error(transparent)]
    InvalidResolution(#[from] InvalidResolution),

    /// Malformed cell index (bad mode, base cell or digits).
    #[error("invalid cell index: {0}")]
    InvalidCell(String),

    /// Region id unknown to the region store.
    #[error("geo-region not found: {0}")]
    RegionNotFound(GeoRegionId),

    /// Region already present in the store.
    #[error("geo-region already exists: {0}")]
    DuplicateRegion(GeoRegionId),

    /// Compact set stores a cell together with one of its ancestors, which
    /// would produce duplicate leaves on expansion.
    #[error("geo-region {region} stores cell {cell} together with its ancestor {ancestor}")]
    OverlappingCells {
        region: GeoRegionId,
        cell: CellIndex,
        ancestor: CellIndex,
    },

    /// Expansion would exceed the configured cell budget.
    #[error("expanding geo-region {region} to resolution {resolution} yields {cells} cells, above the limit of {limit}")]
    ExpansionLimit {
        region: GeoRegionId,
        resolution: u8,
        cells: u64,
        limit: usize,
    },
}

impl GridError {
    pub fn invalid_cell(msg: impl Into<String>) -> Self {
        Self::InvalidCell(msg.into())
    }
}

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
