//! Grid dataset registry.
//!
//! The registry is a read-only catalog lookup: engine code only ever asks it
//! to resolve keys. Population happens when the catalog is built, by the data
//! ingestion side, and the result is shared immutably behind an `Arc`.

use crate::dataset::{DatasetDescriptor, DatasetKey, DatasetSubject, GridKind};
use crate::error::{RegistryError, Result};
use rustc_hash::FxHashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Resolves logical dataset keys to physical descriptors.
pub trait DatasetRegistry: Send + Sync {
    /// Resolve `key`, choosing the descriptor closest to `year` when the
    /// dataset is versioned by year.
    ///
    /// Fails with [`RegistryError::DatasetNotFound`] rather than returning an
    /// empty answer: plan construction assumes every key it asks for exists.
    fn resolve_for_year(
        &self,
        key: &DatasetKey,
        year: Option<i32>,
    ) -> Result<Arc<DatasetDescriptor>>;

    fn resolve(&self, subject: &DatasetSubject, kind: GridKind) -> Result<Arc<DatasetDescriptor>> {
        self.resolve_for_year(&DatasetKey::new(subject.clone(), kind), None)
    }

    /// Batched resolution keyed by input key, so callers never depend on
    /// result ordering.
    fn resolve_many(
        &self,
        keys: &[DatasetKey],
        year: Option<i32>,
    ) -> HashMap<DatasetKey, Result<Arc<DatasetDescriptor>>> {
        keys.iter()
            .map(|k| (k.clone(), self.resolve_for_year(k, year)))
            .collect()
    }
}

/// In-memory, immutable-after-build dataset catalog.
///
/// Descriptors for one key are kept sorted by year. Deleted descriptors are
/// retained for diagnostics but never resolve.
#[derive(Debug, Default, Clone)]
pub struct DatasetCatalog {
    entries: FxHashMap<DatasetKey, Vec<Arc<DatasetDescriptor>>>,
}

impl DatasetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_descriptors(descriptors: impl IntoIterator<Item = DatasetDescriptor>) -> Result<Self> {
        let mut catalog = Self::new();
        for d in descriptors {
            catalog.insert(d)?;
        }
        Ok(catalog)
    }

    /// Parse a JSON array of descriptors.
    pub fn from_json(json: &str) -> Result<Self> {
        let descriptors: Vec<DatasetDescriptor> = serde_json::from_str(json)?;
        Self::from_descriptors(descriptors)
    }

    /// Add a descriptor, enforcing one live descriptor per `(key, year)`.
    pub fn insert(&mut self, descriptor: DatasetDescriptor) -> Result<()> {
        let key = descriptor.key();
        let slot = self.entries.entry(key.clone()).or_default();

        if !descriptor.deleted {
            let mut live = slot.iter().filter(|d| !d.deleted);
            if let Some(existing) = live.clone().find(|d| d.year == descriptor.year) {
                return Err(RegistryError::DuplicateDescriptor {
                    key,
                    year: descriptor.year,
                    existing: existing.id.clone(),
                    duplicate: descriptor.id,
                });
            }
            if live.any(|d| d.year.is_none() != descriptor.year.is_none()) {
                return Err(RegistryError::MixedYears { key });
            }
        }

        slot.push(Arc::new(descriptor));
        slot.sort_by_key(|d| d.year);
        Ok(())
    }

    /// Number of live descriptors.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .map(|v| v.iter().filter(|d| !d.deleted).count())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every live descriptor, ordered by key then year.
    pub fn descriptors(&self) -> Vec<Arc<DatasetDescriptor>> {
        let mut keys: Vec<&DatasetKey> = self.entries.keys().collect();
        keys.sort();
        keys.into_iter()
            .flat_map(|k| self.entries[k].iter().filter(|d| !d.deleted).cloned())
            .collect()
    }
}

/// Pick the live descriptor closest to `year`.
///
/// Ties prefer the earlier year; no requested year picks the latest.
fn select_by_year(candidates: &[Arc<DatasetDescriptor>], year: Option<i32>) -> Option<&Arc<DatasetDescriptor>> {
    let live = candidates.iter().filter(|d| !d.deleted);
    match year {
        None => live.last(),
        Some(requested) => live.min_by_key(|d| match d.year {
            Some(y) => (i64::from(y) - i64::from(requested)).abs(),
            None => 0,
        }),
    }
}

impl DatasetRegistry for DatasetCatalog {
    fn resolve_for_year(&self, key: &DatasetKey, year: Option<i32>) -> Result<Arc<DatasetDescriptor>> {
        let resolved = self
            .entries
            .get(key)
            .and_then(|candidates| select_by_year(candidates, year))
            .cloned();
        match resolved {
            Some(d) => {
                debug!(%key, ?year, dataset = %d.id, "resolved dataset");
                Ok(d)
            }
            None => Err(RegistryError::not_found(key.clone(), year)),
        }
    }
}
