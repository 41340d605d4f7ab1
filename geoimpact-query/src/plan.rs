//! Query batches and typed plans.
//!
//! A [`QueryBatch`] is what the composer produces: named sub-queries with
//! bound parameters, still independent of concrete datasets and cells. A
//! [`ResolvedBatch`] is the same batch after registry and region resolution:
//! concrete dataset descriptors, value columns and a uniform cell set per
//! grid aggregate. Neither is ever rendered to query text for execution.

use crate::binder::{ArgumentSource, BoundArguments, BoundParam, CalculationContext, ParamSlot, RowSource};
use crate::error::{QueryError, RawValueError};
use crate::raw_value::{Combinator, GridInput, RawValueSpec};
use geoimpact_core::{AdminRegionId, DatasetDescriptor, IndicatorCode, MaterialId, RawValueName};
use geoimpact_grid::UniformCellSet;
use std::sync::Arc;

/// One named sub-query with its positional bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct SubQuery {
    pub name: RawValueName,
    pub spec: RawValueSpec,
    /// `(slot, binding)` in position order.
    pub params: Vec<(ParamSlot, BoundParam)>,
}

impl SubQuery {
    pub(crate) fn bind(name: RawValueName, context: &CalculationContext) -> Self {
        let spec = RawValueSpec::of(name);
        let params = spec
            .params()
            .iter()
            .map(|&slot| (slot, context.bind(slot)))
            .collect();
        Self { name, spec, params }
    }

    /// Parameterised text; identical across contexts.
    pub fn text(&self) -> String {
        self.spec.plan_text()
    }
}

/// Which raw values an indicator reads from the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputBinding {
    pub indicator: IndicatorCode,
    pub raw_values: &'static [RawValueName],
}

/// Flat, ordered, de-duplicated set of sub-queries plus per-indicator
/// output bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBatch {
    pub(crate) context: CalculationContext,
    pub(crate) subqueries: Vec<SubQuery>,
    pub(crate) outputs: Vec<OutputBinding>,
}

impl QueryBatch {
    pub fn context(&self) -> &CalculationContext {
        &self.context
    }

    pub fn row_source(&self) -> RowSource {
        self.context.row_source()
    }

    pub fn subqueries(&self) -> &[SubQuery] {
        &self.subqueries
    }

    pub fn outputs(&self) -> &[OutputBinding] {
        &self.outputs
    }

    pub fn get(&self, name: RawValueName) -> Option<&SubQuery> {
        self.subqueries.iter().find(|q| q.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = RawValueName> + '_ {
        self.subqueries.iter().map(|q| q.name)
    }

    pub fn len(&self) -> usize {
        self.subqueries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subqueries.is_empty()
    }

    /// Apply every sub-query's bindings against `source`.
    ///
    /// Slots nobody reads stay unset; a slot read but not supplied is left
    /// for plan resolution to report against the raw values that need it.
    pub fn arguments(&self, source: ArgumentSource<'_>) -> Result<BoundArguments, QueryError> {
        let mut args = BoundArguments::default();
        for q in &self.subqueries {
            for &(slot, bound) in &q.params {
                if args.has(slot) {
                    continue;
                }
                if let Some(value) = source.read(slot, bound)? {
                    args.set(value);
                }
            }
        }
        Ok(args)
    }
}

/// A dataset joined on cell identity.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinTarget {
    pub input: GridInput,
    pub dataset: Arc<DatasetDescriptor>,
}

impl JoinTarget {
    pub fn table(&self) -> &str {
        &self.dataset.physical_table
    }

    pub fn column(&self) -> &str {
        &self.dataset.value_column
    }
}

/// Inner join of `joins` over `cells`, folded by `combinator`.
#[derive(Debug, Clone, PartialEq)]
pub struct GridAggregate {
    pub cells: Arc<UniformCellSet>,
    pub joins: Vec<JoinTarget>,
    pub combinator: Combinator,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientLookup {
    pub indicator: IndicatorCode,
    pub material: MaterialId,
    pub admin_region: Option<AdminRegionId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedPlan {
    Grid(GridAggregate),
    Coefficient(CoefficientLookup),
}

/// A sub-query ready for the execution layer, keyed by its raw-value name.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSubQuery {
    pub name: RawValueName,
    pub plan: ResolvedPlan,
}

impl ResolvedSubQuery {
    /// A null result here is a missing dependency, not an empty aggregate.
    pub fn missing_value_error(&self) -> Option<RawValueError> {
        match &self.plan {
            ResolvedPlan::Coefficient(c) => Some(RawValueError::MissingCoefficient {
                indicator: c.indicator,
                material: c.material.clone(),
                admin_region: c.admin_region.clone(),
            }),
            ResolvedPlan::Grid(_) => None,
        }
    }
}

/// Outcome of resolving a batch: executable sub-queries plus per-raw-value
/// failures.
#[derive(Debug, Clone, Default)]
pub struct ResolvedBatch {
    pub queries: Vec<ResolvedSubQuery>,
    pub failures: Vec<(RawValueName, RawValueError)>,
    /// Some grid aggregate runs over an empty cell set.
    pub empty_region: bool,
}
