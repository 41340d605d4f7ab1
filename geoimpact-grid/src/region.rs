//! Geo-regions and their compact cell storage.

use crate::cell::CellIndex;
use crate::error::{GridError, Result};
use geoimpact_core::GeoRegionId;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A geo-region with its precomputed compact cell set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoRegion {
    pub id: GeoRegionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Mixed-resolution cells; coarse cells stand in for uniform areas.
    #[serde(default, alias = "cells")]
    pub compact_cells: Vec<CellIndex>,
}

impl GeoRegion {
    pub fn new(id: impl Into<GeoRegionId>, compact_cells: Vec<CellIndex>) -> Self {
        Self {
            id: id.into(),
            name: None,
            compact_cells,
        }
    }
}

/// Read access to stored regions.
pub trait RegionStore: Send + Sync {
    /// Compact cells of `region`, or [`GridError::RegionNotFound`].
    fn compact_cells(&self, region: &GeoRegionId) -> Result<Arc<[CellIndex]>>;
}

/// Check that no cell is stored alongside one of its ancestors.
pub fn validate_compact(region: &GeoRegionId, cells: &[CellIndex]) -> Result<()> {
    let present: FxHashSet<CellIndex> = cells.iter().copied().collect();
    for &cell in cells {
        for res in 0..cell.resolution() {
            if let Some(ancestor) = cell.parent(res).filter(|a| present.contains(a)) {
                return Err(GridError::OverlappingCells {
                    region: region.clone(),
                    cell,
                    ancestor,
                });
            }
        }
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct InMemoryRegionStore {
    regions: FxHashMap<GeoRegionId, Arc<[CellIndex]>>,
}

impl InMemoryRegionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_regions(regions: impl IntoIterator<Item = GeoRegion>) -> Result<Self> {
        let mut store = Self::new();
        for r in regions {
            store.insert(r)?;
        }
        Ok(store)
    }

    /// Insert a validated region. Repeated identical cells are collapsed.
    pub fn insert(&mut self, region: GeoRegion) -> Result<()> {
        if self.regions.contains_key(&region.id) {
            return Err(GridError::DuplicateRegion(region.id));
        }
        let mut cells = region.compact_cells;
        cells.sort_unstable();
        cells.dedup();
        validate_compact(&region.id, &cells)?;
        self.regions.insert(region.id, cells.into());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn contains(&self, region: &GeoRegionId) -> bool {
        self.regions.contains_key(region)
    }
}

impl RegionStore for InMemoryRegionStore {
    fn compact_cells(&self, region: &GeoRegionId) -> Result<Arc<[CellIndex]>> {
        self.regions
            .get(region)
            .cloned()
            .ok_or_else(|| GridError::RegionNotFound(region.clone()))
    }
}
