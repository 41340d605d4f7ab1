//! Uniform-resolution cell sets.

use crate::cell::CellIndex;
use crate::error::{GridError, Result};
use geoimpact_core::Resolution;
use rustc_hash::FxHasher;
use std::hash::Hasher;

/// Cells of a single resolution, sorted ascending with no duplicates.
///
/// Two sets built from the same cells in any order are byte-identical, which
/// is what makes expansion results safe to cache and to join on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniformCellSet {
    resolution: Resolution,
    cells: Box<[CellIndex]>,
}

impl UniformCellSet {
    pub fn empty(resolution: Resolution) -> Self {
        Self {
            resolution,
            cells: Box::default(),
        }
    }

    /// Sort and de-duplicate `cells`. Every cell must be at `resolution`.
    pub fn from_cells(resolution: Resolution, cells: impl IntoIterator<Item = CellIndex>) -> Result<Self> {
        let mut cells: Vec<CellIndex> = cells.into_iter().collect();
        if let Some(stray) = cells.iter().find(|c| c.resolution() != resolution.get()) {
            return Err(GridError::invalid_cell(format!(
                "cell {stray} has resolution {}, expected {resolution}",
                stray.resolution()
            )));
        }
        cells.sort_unstable();
        cells.dedup();
        Ok(Self {
            resolution,
            cells: cells.into_boxed_slice(),
        })
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: CellIndex) -> bool {
        self.cells.binary_search(&cell).is_ok()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = CellIndex> + '_ {
        self.cells.iter().copied()
    }

    pub fn as_slice(&self) -> &[CellIndex] {
        &self.cells
    }

    /// Stable content hash, for logging and cache diagnostics.
    pub fn fingerprint(&self) -> u64 {
        let mut h = FxHasher::default();
        h.write_u8(self.resolution.get());
        for c in self.cells.iter() {
            h.write_u64(c.raw());
        }
        h.finish()
    }
}

impl<'a> IntoIterator for &'a UniformCellSet {
    type Item = CellIndex;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, CellIndex>>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter().copied()
    }
}
