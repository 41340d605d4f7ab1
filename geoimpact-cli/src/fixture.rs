//! JSON fixture workspaces.
//!
//! ```json
//! {
//!   "regions":      [{"id": "R", "cells": ["86283082fffffff"]}],
//!   "datasets":     [{"id": "cotton-prod", "subject": {"material": "cotton"}, ...}],
//!   "grids":        [{"table": "grid", "column": "cotton_prod", "values": {"86283082fffffff": 10}}],
//!   "coefficients": [{"indicator": "WU", "material": "cotton", "value": 0.5}]
//! }
//! ```

use crate::config::EngineConfig;
use crate::error::{CliError, CliResult};
use geoimpact_core::{CoefficientRow, CoefficientTable, DatasetCatalog, DatasetDescriptor};
use geoimpact_grid::{CellIndex, GeoRegion, InMemoryRegionStore, RegionCellResolver};
use geoimpact_query::{ImpactEngine, InMemoryGridStore, StrategyRegistry};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub regions: Vec<GeoRegion>,
    pub datasets: Vec<DatasetDescriptor>,
    pub grids: Vec<GridColumn>,
    pub coefficients: Vec<CoefficientRow>,
}

/// One value column of a physical grid table.
#[derive(Debug, Clone, Deserialize)]
pub struct GridColumn {
    pub table: String,
    pub column: String,
    pub values: HashMap<CellIndex, f64>,
}

/// A loaded fixture, ready to serve commands.
pub struct Workspace {
    pub regions: Arc<RegionCellResolver>,
    pub catalog: Arc<DatasetCatalog>,
    pub store: Arc<InMemoryGridStore>,
}

impl Fixture {
    pub fn from_json(json: &str) -> CliResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn read(path: &Path) -> CliResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CliError::Input(format!("cannot read fixture {}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    pub fn into_workspace(self, config: &EngineConfig) -> CliResult<Workspace> {
        let (n_regions, n_datasets, n_grids) =
            (self.regions.len(), self.datasets.len(), self.grids.len());

        let regions = InMemoryRegionStore::from_regions(self.regions)?;
        let catalog = DatasetCatalog::from_descriptors(self.datasets)?;
        let coefficients = CoefficientTable::from_rows(self.coefficients)?;

        let mut store = InMemoryGridStore::new().with_coefficients(coefficients);
        for grid in self.grids {
            store.insert_column(grid.table, grid.column, grid.values);
        }

        info!(
            regions = n_regions,
            datasets = n_datasets,
            grids = n_grids,
            "fixture loaded"
        );
        Ok(Workspace {
            regions: Arc::new(RegionCellResolver::new(Arc::new(regions), config.grid.clone())),
            catalog: Arc::new(catalog),
            store: Arc::new(store),
        })
    }
}

impl Workspace {
    /// Load the fixture `config` points at.
    pub fn load(config: &EngineConfig) -> CliResult<Self> {
        Fixture::read(config.require_fixture()?)?.into_workspace(config)
    }

    pub fn engine(&self) -> ImpactEngine {
        ImpactEngine::new(
            Arc::new(StrategyRegistry::standard()),
            self.catalog.clone(),
            self.regions.clone(),
            self.store.clone(),
        )
    }
}
