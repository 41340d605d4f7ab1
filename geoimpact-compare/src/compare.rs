//! Building comparison tables.

use crate::config::{CompareConfig, DEFAULT_GROWTH_RATE};
use crate::error::{CompareError, Result};
use crate::record::{split_intervention, GroupBy, GroupKey, ImpactRecord};
use crate::table::{
    ComparisonMode, ComparisonRow, ComparisonTable, ComparisonValue, IndicatorComparison,
    PurchasedTonnes,
};
use geoimpact_core::IndicatorCode;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRequest {
    pub group_by: GroupBy,
    pub mode: ComparisonMode,
    /// Inclusive year range; `None` uses every year present in the records.
    pub years: Option<RangeInclusive<i32>>,
    /// Percent per year for projected years.
    pub growth_rate: f64,
}

impl ComparisonRequest {
    pub fn new(group_by: GroupBy) -> Self {
        Self {
            group_by,
            mode: ComparisonMode::Absolute,
            years: None,
            growth_rate: DEFAULT_GROWTH_RATE,
        }
    }

    pub fn with_mode(mut self, mode: ComparisonMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_years(mut self, start: i32, end: i32) -> Self {
        self.years = Some(start..=end);
        self
    }

    pub fn with_config(mut self, config: &CompareConfig) -> Self {
        self.growth_rate = config.growth_rate;
        self
    }

    fn validate(&self) -> Result<()> {
        if let Some(range) = &self.years {
            if range.start() > range.end() {
                return Err(CompareError::InvalidYearRange {
                    start: *range.start(),
                    end: *range.end(),
                });
            }
        }
        if !self.growth_rate.is_finite() {
            return Err(CompareError::InvalidGrowthRate(self.growth_rate));
        }
        Ok(())
    }

    fn includes(&self, year: i32) -> bool {
        self.years.as_ref().map_or(true, |r| r.contains(&year))
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Pair {
    new: f64,
    canceled: f64,
}

/// Compare two sides of impact records.
///
/// Baseline values become `canceled_impact`, intervention values become
/// `new_impact`. A group present on only one side still gets a row, with
/// the other side at zero.
pub fn compare(
    baseline: &[ImpactRecord],
    intervention: &[ImpactRecord],
    request: &ComparisonRequest,
) -> Result<ComparisonTable> {
    request.validate()?;

    let mut groups: BTreeMap<IndicatorCode, BTreeMap<GroupKey, BTreeMap<i32, Pair>>> = BTreeMap::new();
    let mut tonnes: BTreeMap<IndicatorCode, BTreeMap<i32, f64>> = BTreeMap::new();
    let mut seen_years = BTreeSet::new();

    for (records, is_baseline) in [(baseline, true), (intervention, false)] {
        for r in records.iter().filter(|r| request.includes(r.year)) {
            if !r.value.is_finite() || !r.tonnes.is_finite() {
                return Err(CompareError::NonFiniteValue {
                    indicator: r.indicator,
                    year: r.year,
                });
            }
            seen_years.insert(r.year);
            let pair = groups
                .entry(r.indicator)
                .or_default()
                .entry(r.group_key(request.group_by))
                .or_default()
                .entry(r.year)
                .or_default();
            if is_baseline {
                pair.canceled += r.value;
                *tonnes.entry(r.indicator).or_default().entry(r.year).or_default() += r.tonnes;
            } else {
                pair.new += r.value;
            }
        }
    }

    let years: Vec<i32> = match &request.years {
        Some(range) => range.clone().collect(),
        None => seen_years.into_iter().collect(),
    };
    let factor = 1.0 + request.growth_rate / 100.0;

    let indicators: Vec<IndicatorComparison> = groups
        .into_iter()
        .map(|(indicator, by_group)| {
            let rows: Vec<ComparisonRow> = by_group
                .into_iter()
                .map(|(group, cells)| ComparisonRow {
                    group,
                    values: row_values(&cells, &years, factor, request.mode),
                })
                .collect();
            let year_sum = sum_rows(&rows, &years, request.mode);
            IndicatorComparison {
                indicator,
                rows,
                year_sum,
            }
        })
        .collect();

    // Every indicator's records describe the same purchases, so tonnage is
    // read from one indicator only.
    let tonnes_by_year = tonnes.into_values().next().unwrap_or_default();
    let purchased_tonnes = project(&tonnes_by_year, &years, 0.0, |t| t * factor)
        .into_iter()
        .map(|(year, value, is_projected)| PurchasedTonnes {
            year,
            value,
            is_projected,
        })
        .collect();

    debug!(
        group_by = %request.group_by,
        mode = %request.mode,
        indicators = indicators.len(),
        years = years.len(),
        "comparison table built"
    );

    Ok(ComparisonTable {
        group_by: request.group_by,
        mode: request.mode,
        years,
        indicators,
        purchased_tonnes,
    })
}

/// Compare two scenarios against each other: each is split into its sides
/// and the first scenario's intervention side plays the baseline.
pub fn compare_scenarios(
    first: &[ImpactRecord],
    second: &[ImpactRecord],
    request: &ComparisonRequest,
) -> Result<ComparisonTable> {
    let first = split_intervention(first);
    let second = split_intervention(second);
    compare(&first.intervention, &second.intervention, request)
}

fn row_values(
    cells: &BTreeMap<i32, Pair>,
    years: &[i32],
    factor: f64,
    mode: ComparisonMode,
) -> Vec<ComparisonValue> {
    let grow = |p: Pair| Pair {
        new: p.new * factor,
        canceled: p.canceled * factor,
    };
    project(cells, years, Pair::default(), grow)
        .into_iter()
        .map(|(year, pair, projected)| {
            let mut value = ComparisonValue::new(year, pair.new, pair.canceled, projected);
            value.apply_mode(mode);
            value
        })
        .collect()
}

/// Lay `cells` out on `years`. A year without data after one with data is
/// grown from the previous year; it is flagged projected only once past the
/// last year with data. Leading gaps are `zero`.
fn project<T: Copy>(
    cells: &BTreeMap<i32, T>,
    years: &[i32],
    zero: T,
    grow: impl Fn(T) -> T,
) -> Vec<(i32, T, bool)> {
    let last_data_year = cells.keys().next_back().copied();
    let mut last = None;
    years
        .iter()
        .map(|&year| match (cells.get(&year), last) {
            (Some(&v), _) => {
                last = Some(v);
                (year, v, false)
            }
            (None, Some(prev)) => {
                let v = grow(prev);
                last = Some(v);
                (year, v, last_data_year.is_some_and(|y| year > y))
            }
            (None, None) => (year, zero, false),
        })
        .collect()
}

/// Column sums. `impact_result` is summed directly rather than recomputed
/// from the summed sides so the totals match the rows exactly.
fn sum_rows(rows: &[ComparisonRow], years: &[i32], mode: ComparisonMode) -> Vec<ComparisonValue> {
    years
        .iter()
        .enumerate()
        .map(|(i, &year)| {
            let mut total = ComparisonValue::new(year, 0.0, 0.0, false);
            for v in rows.iter().filter_map(|r| r.values.get(i)) {
                total.new_impact += v.new_impact;
                total.canceled_impact += v.canceled_impact;
                total.impact_result += v.impact_result;
                total.is_projected |= v.is_projected;
            }
            total.apply_mode(mode);
            total
        })
        .collect()
}
