//! Dependency-driven batch composition.

use crate::binder::CalculationContext;
use crate::error::QueryError;
use crate::plan::{OutputBinding, QueryBatch, SubQuery};
use crate::strategy::StrategyRegistry;
use geoimpact_core::{IndicatorCode, RawValueName};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::debug;

/// Builds the minimal sub-query set for a list of indicators.
#[derive(Debug, Clone)]
pub struct QueryComposer {
    strategies: Arc<StrategyRegistry>,
}

impl QueryComposer {
    pub fn new(strategies: Arc<StrategyRegistry>) -> Self {
        Self { strategies }
    }

    pub fn strategies(&self) -> &Arc<StrategyRegistry> {
        &self.strategies
    }

    /// Compose a batch for `requested` under `context`.
    ///
    /// Raw values shared between indicators produce one sub-query. Repeated
    /// indicators collapse. Sub-queries appear in first-use order, so the
    /// batch is deterministic for a given request.
    pub fn compose(&self, requested: &[IndicatorCode], context: &CalculationContext) -> Result<QueryBatch, QueryError> {
        let mut seen_indicators = FxHashSet::default();
        let mut seen_raw: FxHashSet<RawValueName> = FxHashSet::default();
        let mut subqueries = Vec::new();
        let mut outputs = Vec::new();

        for &code in requested {
            if !seen_indicators.insert(code) {
                continue;
            }
            let strategy = self
                .strategies
                .get(code)
                .ok_or(QueryError::UnsupportedIndicator(code))?;
            let raw_values = strategy.raw_values();
            for &name in raw_values {
                if seen_raw.insert(name) {
                    subqueries.push(SubQuery::bind(name, context));
                }
            }
            outputs.push(OutputBinding {
                indicator: code,
                raw_values,
            });
        }

        debug!(
            context = context.name(),
            indicators = outputs.len(),
            subqueries = subqueries.len(),
            "composed query batch"
        );
        Ok(QueryBatch {
            context: context.clone(),
            subqueries,
            outputs,
        })
    }
}
