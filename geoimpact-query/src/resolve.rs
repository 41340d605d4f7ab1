//! Registry and region resolution of a composed batch.
//!
//! Dataset keys for the whole batch are resolved in one `resolve_many` call
//! and the region is expanded once per distinct resolution. Failures are
//! collected per raw value so that one unresolved dataset only affects the
//! indicators that consume it.

use crate::binder::{BoundArguments, ParamSlot};
use crate::error::RawValueError;
use crate::plan::{
    CoefficientLookup, GridAggregate, JoinTarget, QueryBatch, ResolvedBatch, ResolvedPlan,
    ResolvedSubQuery, SubQuery,
};
use crate::raw_value::{GridInput, GridSpec, RawValueSpec, ResolutionPolicy};
use geoimpact_core::{DatasetDescriptor, DatasetKey, DatasetRegistry, RegistryError, Resolution};
use geoimpact_grid::{GridError, RegionCellResolver, UniformCellSet};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

type ResolvedDatasets = HashMap<DatasetKey, Result<Arc<DatasetDescriptor>, RegistryError>>;
type CellSets = BTreeMap<Resolution, Result<Arc<UniformCellSet>, GridError>>;

/// Turns a [`QueryBatch`] into executable plans.
#[derive(Clone)]
pub struct PlanResolver {
    registry: Arc<dyn DatasetRegistry>,
    regions: Arc<RegionCellResolver>,
}

impl PlanResolver {
    pub fn new(registry: Arc<dyn DatasetRegistry>, regions: Arc<RegionCellResolver>) -> Self {
        Self { registry, regions }
    }

    pub fn regions(&self) -> &Arc<RegionCellResolver> {
        &self.regions
    }

    pub fn resolve(&self, batch: &QueryBatch, args: &BoundArguments, year: Option<i32>) -> ResolvedBatch {
        let keys = batch_keys(batch, args);
        let datasets = if keys.is_empty() {
            ResolvedDatasets::new()
        } else {
            self.registry.resolve_many(&keys, year)
        };

        let mut cell_sets = CellSets::new();
        let mut out = ResolvedBatch::default();
        for q in batch.subqueries() {
            match self.resolve_one(q, args, &datasets, &mut cell_sets) {
                Ok(resolved) => {
                    if let ResolvedPlan::Grid(g) = &resolved.plan {
                        out.empty_region |= g.cells.is_empty();
                    }
                    out.queries.push(resolved);
                }
                Err(e) => {
                    debug!(raw_value = %q.name, error = %e, "raw value unresolved");
                    out.failures.push((q.name, e));
                }
            }
        }
        out
    }

    fn resolve_one(
        &self,
        q: &SubQuery,
        args: &BoundArguments,
        datasets: &ResolvedDatasets,
        cell_sets: &mut CellSets,
    ) -> Result<ResolvedSubQuery, RawValueError> {
        for &(slot, _) in &q.params {
            if !args.has(slot) {
                return Err(RawValueError::MissingParameter { slot });
            }
        }
        let plan = match q.spec {
            RawValueSpec::Coefficient(indicator) => ResolvedPlan::Coefficient(CoefficientLookup {
                indicator,
                material: args
                    .material
                    .clone()
                    .ok_or(RawValueError::MissingParameter {
                        slot: ParamSlot::Material,
                    })?,
                admin_region: args.admin_region.clone().flatten(),
            }),
            RawValueSpec::Grid(spec) => {
                ResolvedPlan::Grid(self.resolve_grid(q, &spec, args, datasets, cell_sets)?)
            }
        };
        Ok(ResolvedSubQuery { name: q.name, plan })
    }

    fn resolve_grid(
        &self,
        q: &SubQuery,
        spec: &GridSpec,
        args: &BoundArguments,
        datasets: &ResolvedDatasets,
        cell_sets: &mut CellSets,
    ) -> Result<GridAggregate, RawValueError> {
        let region = args.geo_region.as_ref().ok_or(RawValueError::MissingParameter {
            slot: ParamSlot::GeoRegion,
        })?;

        let mut joins = Vec::with_capacity(spec.inputs.len());
        for &input in spec.inputs {
            let key = input_key(input, args)?;
            let dataset = match datasets.get(&key) {
                Some(Ok(d)) => d.clone(),
                Some(Err(e)) => return Err(e.clone().into()),
                None => return Err(RegistryError::not_found(key, None).into()),
            };
            joins.push(JoinTarget { input, dataset });
        }

        let resolution = match spec.resolution {
            ResolutionPolicy::MaterialNative(kind) => joins
                .iter()
                .find(|j| j.input == GridInput::Material(kind))
                .map(|j| j.dataset.resolution)
                .ok_or(RawValueError::MissingParameter {
                    slot: ParamSlot::Material,
                })?,
            ResolutionPolicy::Canonical => self.regions.canonical_resolution(),
        };

        if let Some(off) = joins.iter().find(|j| j.dataset.resolution != resolution) {
            warn!(
                raw_value = %q.name,
                dataset = %off.dataset.id,
                native = off.dataset.resolution.get(),
                plan = resolution.get(),
                "joined dataset resolution differs from plan resolution"
            );
            return Err(RawValueError::ResolutionMismatch {
                name: q.name,
                dataset: off.dataset.id.clone(),
                native: off.dataset.resolution,
                plan: resolution,
            });
        }

        let cells = cell_sets
            .entry(resolution)
            .or_insert_with(|| self.regions.expand_at(region, resolution))
            .clone()?;

        Ok(GridAggregate {
            cells,
            joins,
            combinator: spec.combinator,
        })
    }
}

impl std::fmt::Debug for PlanResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanResolver")
            .field("regions", &self.regions)
            .finish_non_exhaustive()
    }
}

fn input_key(input: GridInput, args: &BoundArguments) -> Result<DatasetKey, RawValueError> {
    match input {
        GridInput::Material(kind) => args
            .material
            .as_ref()
            .map(|m| DatasetKey::material(m.clone(), kind))
            .ok_or(RawValueError::MissingParameter {
                slot: ParamSlot::Material,
            }),
        GridInput::Indicator(code) => Ok(DatasetKey::indicator(code)),
        GridInput::Layer(layer) => Ok(DatasetKey::layer(layer)),
    }
}

/// Distinct dataset keys the batch's grid sub-queries join.
fn batch_keys(batch: &QueryBatch, args: &BoundArguments) -> Vec<DatasetKey> {
    let mut keys = Vec::new();
    for q in batch.subqueries() {
        if let RawValueSpec::Grid(spec) = q.spec {
            for &input in spec.inputs {
                if let Ok(key) = input_key(input, args) {
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
            }
        }
    }
    keys
}
