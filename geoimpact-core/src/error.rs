//! Error types for the registry and catalog layer.

use crate::dataset::DatasetKey;
use crate::indicator::IndicatorCode;
use crate::ids::{AdminRegionId, MaterialId};
use crate::resolution::InvalidResolution;
use thiserror::Error;

/// Registry and catalog errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// No non-deleted descriptor resolves for the key.
    #[error("dataset not found for {key}{}", year_suffix(.year))]
    DatasetNotFound { key: DatasetKey, year: Option<i32> },

    /// Two live descriptors claim the same key and year.
    #[error("duplicate dataset descriptor for {key}{}: '{existing}' and '{duplicate}'", year_suffix(.year))]
    DuplicateDescriptor {
        key: DatasetKey,
        year: Option<i32>,
        existing: String,
        duplicate: String,
    },

    /// Dated and undated descriptors mixed under one key.
    #[error("dataset key {key} mixes dated and undated descriptors")]
    MixedYears { key: DatasetKey },

    /// Two coefficient rows for the same lookup key.
    #[error("duplicate coefficient for {indicator} / material {material} / admin region {}", admin_label(.admin_region))]
    DuplicateCoefficient {
        indicator: IndicatorCode,
        material: MaterialId,
        admin_region: Option<AdminRegionId>,
    },

    /// Name code not known to the engine.
    #[error("unknown indicator name code: {0}")]
    UnknownIndicator(String),

    /// Raw-value name not known to the engine.
    #[error("unknown raw value name: {0}")]
    UnknownRawValue(String),

    #[error(transparent)]
    InvalidResolution(#[from] InvalidResolution),

    /// Catalog document could not be parsed.
    #[error("catalog parse error: {0}")]
    Parse(String),
}

impl RegistryError {
    pub fn not_found(key: DatasetKey, year: Option<i32>) -> Self {
        Self::DatasetNotFound { key, year }
    }

    /// True for a registry miss, as opposed to a malformed catalog.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DatasetNotFound { .. })
    }
}

fn year_suffix(year: &Option<i32>) -> String {
    match year {
        Some(y) => format!(" (year {y})"),
        None => String::new(),
    }
}

fn admin_label(admin: &Option<AdminRegionId>) -> String {
    match admin {
        Some(a) => a.to_string(),
        None => "<default>".to_string(),
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
