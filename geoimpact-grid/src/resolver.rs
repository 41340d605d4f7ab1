//! Region cell resolver.
//!
//! Expansion rule for a target resolution `R`:
//!
//! - a stored cell coarser than `R` is subdivided into all its descendants
//!   at `R`
//! - a stored cell at or finer than `R` is truncated upward to its ancestor
//!   at `R`; finer detail is never invented
//!
//! The union is sorted and de-duplicated. An empty compact set expands to an
//! empty set, which callers must treat as "no cells", not "no filter".

use crate::cache::{CellSetCache, CellSetKey};
use crate::cell::CellIndex;
use crate::cell_set::UniformCellSet;
use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::region::RegionStore;
use geoimpact_core::{GeoRegionId, Resolution};
use std::sync::Arc;
use tracing::{debug, trace};

/// Expand a compact cell set to `resolution`.
pub fn expand_compact(cells: &[CellIndex], resolution: Resolution) -> Result<UniformCellSet> {
    let target = resolution.get();
    let mut out = Vec::with_capacity(cells.len());
    for &cell in cells {
        if cell.resolution() < target {
            out.extend(cell.children(target));
        } else if let Some(ancestor) = cell.parent(target) {
            out.push(ancestor);
        }
    }
    UniformCellSet::from_cells(resolution, out)
}

/// Number of cells `expand_compact` would emit before de-duplication.
fn expansion_size(cells: &[CellIndex], target: u8) -> u64 {
    cells
        .iter()
        .map(|c| {
            if c.resolution() < target {
                c.children_count(target)
            } else {
                1
            }
        })
        .fold(0u64, u64::saturating_add)
}

/// Expands stored regions to uniform resolutions, through a shared cache.
pub struct RegionCellResolver {
    store: Arc<dyn RegionStore>,
    cache: CellSetCache,
    config: GridConfig,
}

impl RegionCellResolver {
    pub fn new(store: Arc<dyn RegionStore>, config: GridConfig) -> Self {
        Self {
            store,
            cache: CellSetCache::new(config.cache_capacity),
            config,
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn canonical_resolution(&self) -> Resolution {
        self.config.canonical_resolution
    }

    pub fn cache(&self) -> &CellSetCache {
        &self.cache
    }

    /// Expand `region` to `resolution`, validating the resolution first.
    ///
    /// # Errors
    ///
    /// - [`GridError::InvalidResolution`] when `resolution` is not in
    ///   `1..=MAX_RESOLUTION`
    /// - [`GridError::RegionNotFound`] for an unknown region
    /// - [`GridError::ExpansionLimit`] when the result would exceed
    ///   `max_expanded_cells`
    pub fn expand(&self, region: &GeoRegionId, resolution: i64) -> Result<Arc<UniformCellSet>> {
        let resolution = Resolution::new(resolution)?;
        self.expand_at(region, resolution)
    }

    /// Expand with an already validated resolution.
    pub fn expand_at(&self, region: &GeoRegionId, resolution: Resolution) -> Result<Arc<UniformCellSet>> {
        let key = CellSetKey::new(region.clone(), resolution);
        self.cache.get_or_try_insert_with(&key, || {
            let compact = self.store.compact_cells(region)?;
            let estimate = expansion_size(&compact, resolution.get());
            if estimate > self.config.max_expanded_cells as u64 {
                return Err(GridError::ExpansionLimit {
                    region: region.clone(),
                    resolution: resolution.get(),
                    cells: estimate,
                    limit: self.config.max_expanded_cells,
                });
            }
            let set = expand_compact(&compact, resolution)?;
            debug!(
                region = %region,
                resolution = resolution.get(),
                compact = compact.len(),
                cells = set.len(),
                "expanded geo-region"
            );
            trace!(fingerprint = set.fingerprint(), "cell set fingerprint");
            Ok(set)
        })
    }
}

impl std::fmt::Debug for RegionCellResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionCellResolver")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn res(r: i64) -> Resolution {
        Resolution::new(r).unwrap()
    }

    #[test]
    fn coarse_cells_subdivide_and_fine_cells_truncate() {
        let coarse = CellIndex::from_parts(20, &[1]).unwrap();
        let fine = CellIndex::from_parts(21, &[2, 3, 4]).unwrap();
        let set = expand_compact(&[coarse, fine], res(2)).unwrap();

        assert_eq!(set.len(), 7 + 1);
        assert!(set.contains(CellIndex::from_parts(21, &[2, 3]).unwrap()));
        assert!(coarse.children(2).into_iter().all(|c| set.contains(c)));
    }

    #[test]
    fn sibling_fine_cells_collapse_to_one_ancestor() {
        let parent = CellIndex::from_parts(40, &[6, 6]).unwrap();
        let kids = parent.children(4);
        let set = expand_compact(&kids, res(2)).unwrap();
        assert_eq!(set.as_slice(), &[parent]);
    }

    #[test]
    fn empty_compact_set_expands_to_empty() {
        assert!(expand_compact(&[], res(9)).unwrap().is_empty());
    }

    #[test]
    fn expansion_size_counts_pentagons() {
        let pent = CellIndex::from_parts(4, &[]).unwrap();
        let hex = CellIndex::from_parts(5, &[]).unwrap();
        let fine = CellIndex::from_parts(5, &[1, 1, 1]).unwrap();
        assert_eq!(expansion_size(&[pent, hex, fine], 2), 41 + 49 + 1);
    }
}
