//! Error types for composition, resolution and execution.
//!
//! Failures are scoped. [`RawValueError`] belongs to one raw value and
//! poisons only the indicators that consume it; [`IndicatorError`] is what
//! a batch caller sees, always naming the indicator and the missing input.

use crate::binder::ParamSlot;
use geoimpact_core::{
    AdminRegionId, DatasetKey, IndicatorCode, InvalidResolution, MaterialId, RawValueName,
    RegistryError, Resolution,
};
use geoimpact_grid::GridError;
use std::fmt;
use thiserror::Error;

/// An input an indicator could not obtain.
#[derive(Debug, Clone, PartialEq)]
pub enum Dependency {
    Dataset(DatasetKey),
    Coefficient {
        indicator: IndicatorCode,
        material: MaterialId,
        admin_region: Option<AdminRegionId>,
    },
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dataset(key) => write!(f, "dataset {key}"),
            Self::Coefficient {
                indicator,
                material,
                admin_region: Some(admin),
            } => write!(f, "{indicator} coefficient for material {material} in {admin} (or its default)"),
            Self::Coefficient {
                indicator,
                material,
                admin_region: None,
            } => write!(f, "{indicator} default coefficient for material {material}"),
        }
    }
}

/// Errors raised while composing or binding a batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// No strategy registered for the indicator.
    #[error("no strategy registered for indicator {0}")]
    UnsupportedIndicator(IndicatorCode),

    /// A column binding met an external parameter list, or vice versa.
    #[error("parameter ${position} is bound as {bound} but the arguments came from {supplied}")]
    ContextMismatch {
        position: usize,
        bound: &'static str,
        supplied: &'static str,
    },

    /// External parameter of the wrong type at a position.
    #[error("parameter ${position} must be a {expected}")]
    ParameterType { position: usize, expected: ParamSlot },
}

/// Execution-layer failure for one sub-query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    /// The store has no such table/column pair.
    #[error("unknown grid column {table}.{column}")]
    UnknownColumn { table: String, column: String },

    #[error("backend error: {0}")]
    Backend(String),
}

/// Failure to produce one raw value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RawValueError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Grid(#[from] GridError),

    /// A joined dataset is keyed at a different resolution than the plan.
    #[error("dataset '{dataset}' is native at resolution {native} but the {name} plan runs at {plan}")]
    ResolutionMismatch {
        name: RawValueName,
        dataset: String,
        native: Resolution,
        plan: Resolution,
    },

    /// Required positional parameter absent from the arguments.
    #[error("parameter ${} ({slot}) was not supplied", slot_position(.slot))]
    MissingParameter { slot: ParamSlot },

    /// Both coefficient tiers missed.
    #[error("no coefficient for {indicator} / material {material}")]
    MissingCoefficient {
        indicator: IndicatorCode,
        material: MaterialId,
        admin_region: Option<AdminRegionId>,
    },

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

fn slot_position(slot: &ParamSlot) -> usize {
    slot.position()
}

impl RawValueError {
    /// Attribute the failure to `indicator`.
    pub fn into_indicator_error(self, indicator: IndicatorCode) -> IndicatorError {
        match self {
            Self::Registry(RegistryError::InvalidResolution(source))
            | Self::Grid(GridError::InvalidResolution(source)) => {
                IndicatorError::InvalidResolution { indicator, source }
            }
            Self::Registry(source) => IndicatorError::DatasetNotFound { indicator, source },
            Self::Grid(source) => IndicatorError::Region { indicator, source },
            Self::MissingCoefficient {
                indicator: coefficient,
                material,
                admin_region,
            } => IndicatorError::MissingDependency {
                indicator,
                dependency: Dependency::Coefficient {
                    indicator: coefficient,
                    material,
                    admin_region,
                },
            },
            Self::Execution(e) => IndicatorError::Execution {
                indicator,
                message: e.to_string(),
            },
            other @ (Self::ResolutionMismatch { .. } | Self::MissingParameter { .. }) => {
                IndicatorError::Plan {
                    indicator,
                    message: other.to_string(),
                }
            }
        }
    }
}

/// Per-indicator failure reported by a batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    /// Registry miss while resolving a plan.
    #[error("indicator {indicator}: {source}")]
    DatasetNotFound {
        indicator: IndicatorCode,
        #[source]
        source: RegistryError,
    },

    /// Required grid or coefficient absent for the subject.
    #[error("indicator {indicator} is missing required {dependency}")]
    MissingDependency {
        indicator: IndicatorCode,
        dependency: Dependency,
    },

    #[error("indicator {indicator}: {source}")]
    InvalidResolution {
        indicator: IndicatorCode,
        #[source]
        source: InvalidResolution,
    },

    /// Region lookup or expansion failed.
    #[error("indicator {indicator}: {source}")]
    Region {
        indicator: IndicatorCode,
        #[source]
        source: GridError,
    },

    /// The batch could not be bound or planned.
    #[error("indicator {indicator}: {message}")]
    Plan {
        indicator: IndicatorCode,
        message: String,
    },

    #[error("indicator {indicator}: execution failed: {message}")]
    Execution {
        indicator: IndicatorCode,
        message: String,
    },

    #[error("no strategy registered for indicator {0}")]
    UnsupportedIndicator(IndicatorCode),
}

impl IndicatorError {
    pub fn indicator(&self) -> IndicatorCode {
        match self {
            Self::DatasetNotFound { indicator, .. }
            | Self::MissingDependency { indicator, .. }
            | Self::InvalidResolution { indicator, .. }
            | Self::Region { indicator, .. }
            | Self::Plan { indicator, .. }
            | Self::Execution { indicator, .. } => *indicator,
            Self::UnsupportedIndicator(indicator) => *indicator,
        }
    }

    pub fn missing_dataset(indicator: IndicatorCode, key: DatasetKey) -> Self {
        Self::MissingDependency {
            indicator,
            dependency: Dependency::Dataset(key),
        }
    }

    pub fn plan(indicator: IndicatorCode, message: impl Into<String>) -> Self {
        Self::Plan {
            indicator,
            message: message.into(),
        }
    }
}
