//! Comparison table shapes.

use crate::record::{GroupBy, GroupKey};
use geoimpact_core::IndicatorCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComparisonMode {
    #[default]
    Absolute,
    /// Adds `percentage` relative to the canceled (baseline) impact.
    Relative,
}

impl ComparisonMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonMode::Absolute => "absolute",
            ComparisonMode::Relative => "relative",
        }
    }
}

impl fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparisonMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "absolute" => Ok(ComparisonMode::Absolute),
            "relative" => Ok(ComparisonMode::Relative),
            other => Err(format!("unknown comparison mode: {other}")),
        }
    }
}

/// One (group, year) cell of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonValue {
    pub year: i32,
    pub new_impact: f64,
    pub canceled_impact: f64,
    /// `new_impact - canceled_impact`, absolute in every mode.
    pub impact_result: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    pub is_projected: bool,
}

impl ComparisonValue {
    pub(crate) fn new(year: i32, new_impact: f64, canceled_impact: f64, is_projected: bool) -> Self {
        Self {
            year,
            new_impact,
            canceled_impact,
            impact_result: new_impact - canceled_impact,
            percentage: None,
            is_projected,
        }
    }

    /// Fill `percentage` for relative mode; null when nothing was canceled.
    pub(crate) fn apply_mode(&mut self, mode: ComparisonMode) {
        self.percentage = match mode {
            ComparisonMode::Absolute => None,
            ComparisonMode::Relative if self.canceled_impact == 0.0 => None,
            ComparisonMode::Relative => Some(100.0 * self.impact_result / self.canceled_impact),
        };
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    pub group: GroupKey,
    /// One entry per year on the table's axis, ascending.
    pub values: Vec<ComparisonValue>,
}

impl ComparisonRow {
    pub fn value(&self, year: i32) -> Option<&ComparisonValue> {
        self.values.iter().find(|v| v.year == year)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorComparison {
    pub indicator: IndicatorCode,
    pub rows: Vec<ComparisonRow>,
    pub year_sum: Vec<ComparisonValue>,
}

impl IndicatorComparison {
    pub fn row(&self, group: &GroupKey) -> Option<&ComparisonRow> {
        self.rows.iter().find(|r| &r.group == group)
    }

    pub fn year_sum(&self, year: i32) -> Option<&ComparisonValue> {
        self.year_sum.iter().find(|v| v.year == year)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasedTonnes {
    pub year: i32,
    pub value: f64,
    pub is_projected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonTable {
    pub group_by: GroupBy,
    pub mode: ComparisonMode,
    /// The shared year axis, ascending.
    pub years: Vec<i32>,
    /// Sorted by indicator code.
    pub indicators: Vec<IndicatorComparison>,
    pub purchased_tonnes: Vec<PurchasedTonnes>,
}

impl ComparisonTable {
    pub fn indicator(&self, code: IndicatorCode) -> Option<&IndicatorComparison> {
        self.indicators.iter().find(|i| i.indicator == code)
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_mode_divides_by_canceled() {
        let mut v = ComparisonValue::new(2020, 1500.0, 2000.0, false);
        v.apply_mode(ComparisonMode::Relative);
        assert_eq!(v.impact_result, -500.0);
        assert_eq!(v.percentage, Some(-25.0));

        let mut fresh = ComparisonValue::new(2020, 600.0, 0.0, false);
        fresh.apply_mode(ComparisonMode::Relative);
        assert_eq!(fresh.percentage, None);
    }

    #[test]
    fn value_serializes_camel_case() {
        let v = ComparisonValue::new(2021, 1.0, 0.5, true);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["newImpact"], 1.0);
        assert_eq!(json["canceledImpact"], 0.5);
        assert_eq!(json["impactResult"], 0.5);
        assert_eq!(json["isProjected"], true);
        assert!(json.get("percentage").is_none());
    }

    #[test]
    fn mode_parses() {
        assert_eq!("Relative".parse::<ComparisonMode>(), Ok(ComparisonMode::Relative));
        assert!("percent".parse::<ComparisonMode>().is_err());
    }
}
