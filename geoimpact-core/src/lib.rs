//! Core types for the geoimpact aggregation engine.
//!
//! This crate holds everything the other engine crates agree on:
//!
//! - **Identifiers** for materials, geo-regions, admin regions and scenarios
//! - **Indicator name codes** and the **raw-value names** their formulas consume
//! - **Grid dataset descriptors** and the [`DatasetRegistry`] that resolves a
//!   logical `(subject, kind)` key to the physical dataset holding its values
//! - **Coefficient tables** for lookup-style indicators that bypass the grid
//!
//! # Modules
//!
//! - [`ids`]: Cheap-clone identifier newtypes
//! - [`resolution`]: Validated grid resolution
//! - [`indicator`]: Indicator codes and raw-value names
//! - [`dataset`]: Dataset subjects, kinds, keys and descriptors
//! - [`registry`]: Registry trait and the in-memory [`DatasetCatalog`]
//! - [`coefficient`]: Two-tier coefficient lookup
//! - [`error`]: Error types

pub mod coefficient;
pub mod dataset;
pub mod error;
pub mod ids;
pub mod indicator;
pub mod registry;
pub mod resolution;

pub use coefficient::{CoefficientMatch, CoefficientRow, CoefficientTable, CoefficientTier};
pub use dataset::{AuxiliaryLayer, DatasetDescriptor, DatasetKey, DatasetSubject, GridKind};
pub use error::{RegistryError, Result};
pub use ids::{AdminRegionId, GeoRegionId, MaterialId, ScenarioId};
pub use indicator::{IndicatorCode, RawValueName};
pub use registry::{DatasetCatalog, DatasetRegistry};
pub use resolution::{InvalidResolution, Resolution, CANONICAL_RESOLUTION, MAX_RESOLUTION};
