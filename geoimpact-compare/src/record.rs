//! Impact records and grouping dimensions.

use geoimpact_core::{AdminRegionId, IndicatorCode, MaterialId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a record takes part in a scenario.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImpactRole {
    /// Recorded sourcing, unaffected by any intervention.
    #[default]
    Actual,
    /// Sourcing an intervention removes.
    Canceled,
    /// Sourcing an intervention adds in place of canceled records.
    Replacing,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<MaterialId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    /// Admin region of origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<AdminRegionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_type: Option<String>,
}

impl Dimensions {
    pub fn get(&self, by: GroupBy) -> Option<&str> {
        match by {
            GroupBy::Material => self.material.as_ref().map(|m| m.as_str()),
            GroupBy::Supplier => self.supplier.as_deref(),
            GroupBy::Origin => self.origin.as_ref().map(|o| o.as_str()),
            GroupBy::BusinessUnit => self.business_unit.as_deref(),
            GroupBy::LocationType => self.location_type.as_deref(),
        }
    }
}

/// One computed impact value for one sourcing line and year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactRecord {
    pub indicator: IndicatorCode,
    pub year: i32,
    pub value: f64,
    /// Purchased tonnage behind the value.
    #[serde(default)]
    pub tonnes: f64,
    #[serde(default)]
    pub role: ImpactRole,
    #[serde(flatten)]
    pub dimensions: Dimensions,
}

impl ImpactRecord {
    pub fn new(indicator: IndicatorCode, year: i32, value: f64) -> Self {
        Self {
            indicator,
            year,
            value,
            tonnes: 0.0,
            role: ImpactRole::Actual,
            dimensions: Dimensions::default(),
        }
    }

    pub fn with_tonnes(mut self, tonnes: f64) -> Self {
        self.tonnes = tonnes;
        self
    }

    pub fn with_role(mut self, role: ImpactRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn group_key(&self, by: GroupBy) -> GroupKey {
        match self.dimensions.get(by) {
            Some(name) => GroupKey::Named(name.to_string()),
            None => GroupKey::Unassigned,
        }
    }
}

/// Dimension a comparison table is grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupBy {
    Material,
    Supplier,
    Origin,
    BusinessUnit,
    LocationType,
}

impl GroupBy {
    pub const ALL: [GroupBy; 5] = [
        GroupBy::Material,
        GroupBy::Supplier,
        GroupBy::Origin,
        GroupBy::BusinessUnit,
        GroupBy::LocationType,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GroupBy::Material => "material",
            GroupBy::Supplier => "supplier",
            GroupBy::Origin => "origin",
            GroupBy::BusinessUnit => "businessUnit",
            GroupBy::LocationType => "locationType",
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GroupBy::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown group-by dimension: {s}"))
    }
}

/// A row of a comparison table. Records without the grouped dimension
/// share the `Unassigned` row, which sorts last.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum GroupKey {
    Named(String),
    Unassigned,
}

const UNASSIGNED: &str = "Unassigned";

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Named(name) => f.write_str(name),
            GroupKey::Unassigned => f.write_str(UNASSIGNED),
        }
    }
}

impl From<GroupKey> for String {
    fn from(key: GroupKey) -> String {
        key.to_string()
    }
}

impl From<String> for GroupKey {
    fn from(s: String) -> Self {
        if s == UNASSIGNED {
            GroupKey::Unassigned
        } else {
            GroupKey::Named(s)
        }
    }
}

/// The two sides of a comparison.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonSides {
    pub baseline: Vec<ImpactRecord>,
    pub intervention: Vec<ImpactRecord>,
}

/// Split a scenario's records: actual records appear on both sides,
/// canceled ones only in the baseline and replacing ones only in the
/// intervention.
pub fn split_intervention(records: &[ImpactRecord]) -> ComparisonSides {
    let mut sides = ComparisonSides::default();
    for record in records {
        match record.role {
            ImpactRole::Actual => {
                sides.baseline.push(record.clone());
                sides.intervention.push(record.clone());
            }
            ImpactRole::Canceled => sides.baseline.push(record.clone()),
            ImpactRole::Replacing => sides.intervention.push(record.clone()),
        }
    }
    sides
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_json_uses_flat_dimensions() {
        let json = r#"{
            "indicator": "DF_LUC_T",
            "year": 2020,
            "value": 12.5,
            "tonnes": 40,
            "role": "replacing",
            "supplier": "Supplier A",
            "businessUnit": "Textiles"
        }"#;
        let record: ImpactRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.indicator, IndicatorCode::Deforestation);
        assert_eq!(record.role, ImpactRole::Replacing);
        assert_eq!(record.dimensions.get(GroupBy::BusinessUnit), Some("Textiles"));
        assert_eq!(record.group_key(GroupBy::Supplier), GroupKey::Named("Supplier A".into()));
        assert_eq!(record.group_key(GroupBy::Material), GroupKey::Unassigned);
    }

    #[test]
    fn role_defaults_to_actual() {
        let record: ImpactRecord =
            serde_json::from_str(r#"{"indicator":"LF","year":2021,"value":1}"#).unwrap();
        assert_eq!(record.role, ImpactRole::Actual);
        assert_eq!(record.tonnes, 0.0);
    }

    #[test]
    fn unassigned_sorts_last() {
        let mut keys = vec![
            GroupKey::Unassigned,
            GroupKey::Named("b".into()),
            GroupKey::Named("a".into()),
        ];
        keys.sort();
        assert_eq!(keys.last(), Some(&GroupKey::Unassigned));
        assert_eq!(serde_json::to_string(&GroupKey::Unassigned).unwrap(), "\"Unassigned\"");
    }

    #[test]
    fn split_routes_by_role() {
        let records = [
            ImpactRecord::new(IndicatorCode::LandUse, 2020, 1.0),
            ImpactRecord::new(IndicatorCode::LandUse, 2020, 2.0).with_role(ImpactRole::Canceled),
            ImpactRecord::new(IndicatorCode::LandUse, 2020, 3.0).with_role(ImpactRole::Replacing),
        ];
        let sides = split_intervention(&records);
        let values = |v: &[ImpactRecord]| v.iter().map(|r| r.value).collect::<Vec<_>>();
        assert_eq!(values(&sides.baseline), vec![1.0, 2.0]);
        assert_eq!(values(&sides.intervention), vec![1.0, 3.0]);
    }

    #[test]
    fn group_by_parses_case_insensitively() {
        assert_eq!("BUSINESSUNIT".parse::<GroupBy>(), Ok(GroupBy::BusinessUnit));
        assert!("region".parse::<GroupBy>().is_err());
    }
}
