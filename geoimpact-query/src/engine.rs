//! The `ImpactEngine` facade.
//!
//! `compute_indicator_batch` runs the whole pipeline for one sourcing
//! location:
//!
//! 1. look up each requested indicator's strategy
//! 2. validate its grid dependencies against the registry
//! 3. compose one batch for the surviving indicators
//! 4. bind arguments and resolve datasets and cell sets
//! 5. execute the resolved sub-queries (the only await point)
//! 6. finalize each indicator from the raw-value bundle
//!
//! Failures are attributed per indicator; siblings still produce values.

use crate::binder::{ArgumentSource, CalculationContext, SourcingLocation};
use crate::bundle::RawValueBundle;
use crate::composer::QueryComposer;
use crate::error::{IndicatorError, RawValueError};
use crate::execute::PlanExecutor;
use crate::resolve::PlanResolver;
use crate::strategy::{IndicatorParams, IndicatorStrategy, StrategyRegistry};
use geoimpact_core::{DatasetRegistry, IndicatorCode, MaterialId, RawValueName};
use geoimpact_grid::RegionCellResolver;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, Instrument};

/// Result of a batch: values for indicators that computed, failures for
/// those that did not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    /// `None` is a legitimate null, e.g. over an empty region.
    pub values: BTreeMap<IndicatorCode, Option<f64>>,
    pub failures: Vec<IndicatorError>,
    /// Some grid aggregate ran over an empty cell set. Not a failure.
    pub empty_region: bool,
}

impl BatchOutcome {
    pub fn value(&self, code: IndicatorCode) -> Option<Option<f64>> {
        self.values.get(&code).copied()
    }

    pub fn failure(&self, code: IndicatorCode) -> Option<&IndicatorError> {
        self.failures.iter().find(|f| f.indicator() == code)
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail_all(&mut self, codes: &[IndicatorCode], make: impl Fn(IndicatorCode) -> IndicatorError) {
        self.failures.extend(codes.iter().map(|&c| make(c)));
    }
}

/// Computes indicators for sourcing locations.
///
/// Holds only immutable shared state (strategies, registry, resolver and
/// executor handles), so one engine serves concurrent batches.
pub struct ImpactEngine {
    composer: QueryComposer,
    registry: Arc<dyn DatasetRegistry>,
    planner: PlanResolver,
    executor: Arc<dyn PlanExecutor>,
}

impl ImpactEngine {
    pub fn new(
        strategies: Arc<StrategyRegistry>,
        registry: Arc<dyn DatasetRegistry>,
        regions: Arc<RegionCellResolver>,
        executor: Arc<dyn PlanExecutor>,
    ) -> Self {
        Self {
            composer: QueryComposer::new(strategies),
            planner: PlanResolver::new(registry.clone(), regions),
            registry,
            executor,
        }
    }

    pub fn strategies(&self) -> &Arc<StrategyRegistry> {
        self.composer.strategies()
    }

    pub fn composer(&self) -> &QueryComposer {
        &self.composer
    }

    pub fn regions(&self) -> &Arc<RegionCellResolver> {
        self.planner.regions()
    }

    /// Check that every grid dataset `strategy` joins exists for `material`.
    pub fn validate_dependencies(
        &self,
        strategy: &dyn IndicatorStrategy,
        material: &MaterialId,
        year: Option<i32>,
    ) -> Result<(), IndicatorError> {
        for key in strategy.required_datasets(material) {
            match self.registry.resolve_for_year(&key, year) {
                Ok(_) => {}
                Err(e) if e.is_not_found() => {
                    return Err(IndicatorError::missing_dataset(strategy.code(), key));
                }
                Err(e) => {
                    return Err(RawValueError::Registry(e).into_indicator_error(strategy.code()));
                }
            }
        }
        Ok(())
    }

    /// Compute one indicator. A failure is returned as the error rather than
    /// collapsed into a null.
    pub async fn compute_indicator(
        &self,
        location: &SourcingLocation,
        code: IndicatorCode,
        context: &CalculationContext,
        params: &IndicatorParams,
    ) -> Result<Option<f64>, IndicatorError> {
        let mut outcome = self
            .compute_indicator_batch(location, &[code], context, params)
            .await;
        if let Some(err) = outcome.failures.pop() {
            return Err(err);
        }
        Ok(outcome.values.remove(&code).flatten())
    }

    /// Compute several indicators with one composed batch.
    pub async fn compute_indicator_batch(
        &self,
        location: &SourcingLocation,
        codes: &[IndicatorCode],
        context: &CalculationContext,
        params: &IndicatorParams,
    ) -> BatchOutcome {
        let span = tracing::debug_span!(
            "compute_indicator_batch",
            geo_region = %location.geo_region,
            material = %location.material,
            context = context.name(),
            indicators = codes.len(),
            subqueries = tracing::field::Empty,
            failures = tracing::field::Empty,
        );
        async {
            let span = tracing::Span::current();
            let mut outcome = BatchOutcome::default();

            let accepted = self.accept(location, codes, params.year, &mut outcome);
            if accepted.is_empty() {
                span.record("failures", outcome.failures.len());
                return outcome;
            }

            let batch = match self.composer.compose(&accepted, context) {
                Ok(b) => b,
                Err(e) => {
                    outcome.fail_all(&accepted, |c| IndicatorError::plan(c, e.to_string()));
                    return outcome;
                }
            };
            span.record("subqueries", batch.len());

            let external;
            let source = match context {
                CalculationContext::Intervention => {
                    external = location.external_params();
                    ArgumentSource::External(&external)
                }
                CalculationContext::Import | CalculationContext::ScenarioBaseline { .. } => {
                    ArgumentSource::Row(location)
                }
            };
            let args = match batch.arguments(source) {
                Ok(a) => a,
                Err(e) => {
                    outcome.fail_all(&accepted, |c| IndicatorError::plan(c, e.to_string()));
                    return outcome;
                }
            };

            let resolved = self.planner.resolve(&batch, &args, params.year);
            outcome.empty_region = resolved.empty_region;
            let mut raw_failures: FxHashMap<RawValueName, RawValueError> =
                resolved.failures.into_iter().collect();

            let results = self.executor.execute_batch(&resolved.queries).await;
            let mut bundle = RawValueBundle::new();
            for (query, result) in resolved.queries.iter().zip(results) {
                match result {
                    Ok(None) => match query.missing_value_error() {
                        Some(e) => {
                            raw_failures.insert(query.name, e);
                        }
                        None => bundle.insert(query.name, None),
                    },
                    Ok(value) => bundle.insert(query.name, value),
                    Err(e) => {
                        raw_failures.insert(query.name, e.into());
                    }
                }
            }

            for binding in batch.outputs() {
                let failed = binding
                    .raw_values
                    .iter()
                    .find_map(|name| raw_failures.get(name));
                if let Some(err) = failed {
                    outcome
                        .failures
                        .push(err.clone().into_indicator_error(binding.indicator));
                    continue;
                }
                let Some(strategy) = self.strategies().get(binding.indicator) else {
                    outcome
                        .failures
                        .push(IndicatorError::UnsupportedIndicator(binding.indicator));
                    continue;
                };
                let value = strategy.finalize(&bundle, params);
                outcome.values.insert(binding.indicator, value);
            }

            span.record("failures", outcome.failures.len());
            debug!(
                values = outcome.values.len(),
                failures = outcome.failures.len(),
                empty_region = outcome.empty_region,
                "indicator batch computed"
            );
            outcome
        }
        .instrument(span)
        .await
    }

    /// Strategy lookup and dependency validation; returns the indicators
    /// that may proceed, recording failures for the rest.
    fn accept(
        &self,
        location: &SourcingLocation,
        codes: &[IndicatorCode],
        year: Option<i32>,
        outcome: &mut BatchOutcome,
    ) -> Vec<IndicatorCode> {
        let mut seen = FxHashSet::default();
        let mut accepted = Vec::with_capacity(codes.len());
        for &code in codes {
            if !seen.insert(code) {
                continue;
            }
            let Some(strategy) = self.strategies().get(code) else {
                outcome.failures.push(IndicatorError::UnsupportedIndicator(code));
                continue;
            };
            match self.validate_dependencies(strategy.as_ref(), &location.material, year) {
                Ok(()) => accepted.push(code),
                Err(e) => {
                    debug!(indicator = %code, error = %e, "dependency validation failed");
                    outcome.failures.push(e);
                }
            }
        }
        accepted
    }
}

impl std::fmt::Debug for ImpactEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImpactEngine")
            .field("strategies", &self.strategies().codes())
            .field("planner", &self.planner)
            .finish_non_exhaustive()
    }
}
