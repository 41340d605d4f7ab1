//! Execution of resolved plans.
//!
//! The engine never performs I/O itself; a [`PlanExecutor`] does. The
//! [`InMemoryGridStore`] is the reference executor, used by tests and the
//! CLI.

use crate::error::ExecutionError;
use crate::plan::{GridAggregate, ResolvedPlan, ResolvedSubQuery};
use async_trait::async_trait;
use futures::future::join_all;
use geoimpact_core::CoefficientTable;
use geoimpact_grid::CellIndex;
use rustc_hash::FxHashMap;
use tracing::warn;

/// Executes resolved sub-queries against a backing store.
#[async_trait]
pub trait PlanExecutor: Send + Sync {
    /// Scalar result of one sub-query; `None` for a null aggregate or a
    /// coefficient miss.
    async fn execute(&self, query: &ResolvedSubQuery) -> Result<Option<f64>, ExecutionError>;

    /// Results in the same order as `queries`.
    async fn execute_batch(&self, queries: &[ResolvedSubQuery]) -> Vec<Result<Option<f64>, ExecutionError>> {
        join_all(queries.iter().map(|q| self.execute(q))).await
    }
}

/// Cell-keyed value columns plus a coefficient table, all in memory.
#[derive(Debug, Default)]
pub struct InMemoryGridStore {
    columns: FxHashMap<(String, String), FxHashMap<CellIndex, f64>>,
    coefficients: CoefficientTable,
}

impl InMemoryGridStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coefficients(mut self, coefficients: CoefficientTable) -> Self {
        self.coefficients = coefficients;
        self
    }

    /// Add or extend `table.column`. Later values for a cell overwrite
    /// earlier ones.
    pub fn insert_column(
        &mut self,
        table: impl Into<String>,
        column: impl Into<String>,
        values: impl IntoIterator<Item = (CellIndex, f64)>,
    ) {
        self.columns
            .entry((table.into(), column.into()))
            .or_default()
            .extend(values);
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn coefficients(&self) -> &CoefficientTable {
        &self.coefficients
    }

    fn aggregate(&self, grid: &GridAggregate) -> Result<Option<f64>, ExecutionError> {
        let columns = grid
            .joins
            .iter()
            .map(|j| {
                self.columns
                    .get(&(j.table().to_string(), j.column().to_string()))
                    .ok_or_else(|| ExecutionError::UnknownColumn {
                        table: j.table().to_string(),
                        column: j.column().to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut acc = grid.combinator.accumulator();
        let mut row = Vec::with_capacity(columns.len());
        'cells: for cell in grid.cells.iter() {
            row.clear();
            for column in &columns {
                match column.get(&cell) {
                    Some(v) => row.push(*v),
                    // inner join: a cell missing from any input contributes nothing
                    None => continue 'cells,
                }
            }
            if row.iter().all(|v| v.is_finite()) {
                acc.push(&row);
            } else {
                warn!(%cell, "skipping non-finite grid value");
            }
        }
        Ok(acc.finish())
    }
}

#[async_trait]
impl PlanExecutor for InMemoryGridStore {
    async fn execute(&self, query: &ResolvedSubQuery) -> Result<Option<f64>, ExecutionError> {
        match &query.plan {
            ResolvedPlan::Grid(grid) => self.aggregate(grid),
            ResolvedPlan::Coefficient(lookup) => Ok(self
                .coefficients
                .lookup(lookup.indicator, lookup.admin_region.as_ref(), &lookup.material)
                .map(|m| m.value)),
        }
    }
}
