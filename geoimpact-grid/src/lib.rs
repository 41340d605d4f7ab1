//! Region-to-cell expansion for the geoimpact engine.
//!
//! Geo-regions are stored as compact, mixed-resolution sets of hexagonal
//! cells. Every grid aggregation joins a single-resolution dataset on cell
//! identity, so a region has to be expanded ("uncompacted") to a uniform
//! resolution first.
//!
//! ```text
//!   RegionStore ──compact cells──► RegionCellResolver ──► Arc<UniformCellSet>
//!                                        │    ▲
//!                                        ▼    │
//!                                    CellSetCache
//!                                 (region, resolution)
//! ```
//!
//! # Modules
//!
//! - [`cell`]: 64-bit hierarchical hexagonal cell index
//! - [`cell_set`]: Sorted, de-duplicated uniform cell sets
//! - [`region`]: Geo-regions and the region store
//! - [`resolver`]: Expansion algorithm and resolver
//! - [`cache`]: Read-through expansion cache
//! - [`config`]: Grid configuration
//! - [`error`]: Error types

pub mod cache;
pub mod cell;
pub mod cell_set;
pub mod config;
pub mod error;
pub mod region;
pub mod resolver;

pub use cache::{CacheStats, CellSetCache, CellSetKey};
pub use cell::CellIndex;
pub use cell_set::UniformCellSet;
pub use config::GridConfig;
pub use error::{GridError, Result};
pub use region::{GeoRegion, InMemoryRegionStore, RegionStore};
pub use resolver::{expand_compact, RegionCellResolver};
