//! Calculation contexts and positional parameter binding.
//!
//! Every sub-query addresses its inputs through the same three positional
//! slots: `$1` geo-region, `$2` material, `$3` admin region. The context only
//! decides where a slot's value comes from:
//!
//! | Context            | `$n` bound to                          |
//! |--------------------|----------------------------------------|
//! | `Import`           | sourcing-record column                 |
//! | `ScenarioBaseline` | sourcing-record column, scenario rows  |
//! | `Intervention`     | external parameter at position `n`     |
//!
//! So a sub-query's shape is identical in every context and only its
//! [`BoundParam`]s differ.

use crate::error::QueryError;
use geoimpact_core::{AdminRegionId, GeoRegionId, MaterialId, ScenarioId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Positional parameter of a sub-query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamSlot {
    GeoRegion,
    Material,
    AdminRegion,
}

impl ParamSlot {
    pub const ALL: [ParamSlot; 3] = [ParamSlot::GeoRegion, ParamSlot::Material, ParamSlot::AdminRegion];

    /// One-based position (`$1`, `$2`, `$3`).
    pub fn position(self) -> usize {
        match self {
            Self::GeoRegion => 1,
            Self::Material => 2,
            Self::AdminRegion => 3,
        }
    }

    pub fn column(self) -> SourcingColumn {
        match self {
            Self::GeoRegion => SourcingColumn::GeoRegionId,
            Self::Material => SourcingColumn::MaterialId,
            Self::AdminRegion => SourcingColumn::AdminRegionId,
        }
    }
}

impl fmt::Display for ParamSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::GeoRegion => "geo-region",
            Self::Material => "material",
            Self::AdminRegion => "admin-region",
        })
    }
}

/// Sourcing-record column a slot reads in record-backed contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourcingColumn {
    GeoRegionId,
    MaterialId,
    AdminRegionId,
}

impl SourcingColumn {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GeoRegionId => "geoRegionId",
            Self::MaterialId => "materialId",
            Self::AdminRegionId => "adminRegionId",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum CalculationContext {
    /// Persisted sourcing records.
    Import,
    /// Sourcing records of one scenario.
    ScenarioBaseline { scenario: ScenarioId },
    /// Hypothetical location supplied as parameters, not yet persisted.
    Intervention,
}

impl CalculationContext {
    /// The single substitution rule shared by every sub-query.
    pub fn bind(&self, slot: ParamSlot) -> BoundParam {
        match self {
            Self::Import | Self::ScenarioBaseline { .. } => BoundParam::Column(slot.column()),
            Self::Intervention => BoundParam::External(slot.position()),
        }
    }

    pub fn row_source(&self) -> RowSource {
        match self {
            Self::Import => RowSource::SourcingRecords,
            Self::ScenarioBaseline { scenario } => RowSource::Scenario(scenario.clone()),
            Self::Intervention => RowSource::Parameters,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::ScenarioBaseline { .. } => "scenarioBaseline",
            Self::Intervention => "intervention",
        }
    }
}

/// Where a batch's rows come from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowSource {
    SourcingRecords,
    Scenario(ScenarioId),
    Parameters,
}

/// How one slot of one sub-query is satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundParam {
    Column(SourcingColumn),
    /// External parameter at a one-based position.
    External(usize),
}

impl fmt::Display for BoundParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(c) => write!(f, "{}", c.as_str()),
            Self::External(n) => write!(f, "${n}"),
        }
    }
}

/// A typed parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamValue {
    GeoRegion(GeoRegionId),
    Material(MaterialId),
    AdminRegion(Option<AdminRegionId>),
}

impl ParamValue {
    pub fn slot(&self) -> ParamSlot {
        match self {
            Self::GeoRegion(_) => ParamSlot::GeoRegion,
            Self::Material(_) => ParamSlot::Material,
            Self::AdminRegion(_) => ParamSlot::AdminRegion,
        }
    }
}

/// The `(geo-region, material, admin region)` triple a bundle is keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcingLocation {
    pub geo_region: GeoRegionId,
    pub material: MaterialId,
    #[serde(default)]
    pub admin_region: Option<AdminRegionId>,
}

impl SourcingLocation {
    pub fn new(geo_region: impl Into<GeoRegionId>, material: impl Into<MaterialId>) -> Self {
        Self {
            geo_region: geo_region.into(),
            material: material.into(),
            admin_region: None,
        }
    }

    pub fn with_admin_region(mut self, admin: impl Into<AdminRegionId>) -> Self {
        self.admin_region = Some(admin.into());
        self
    }

    /// Value of a sourcing-record column.
    pub fn column(&self, column: SourcingColumn) -> ParamValue {
        match column {
            SourcingColumn::GeoRegionId => ParamValue::GeoRegion(self.geo_region.clone()),
            SourcingColumn::MaterialId => ParamValue::Material(self.material.clone()),
            SourcingColumn::AdminRegionId => ParamValue::AdminRegion(self.admin_region.clone()),
        }
    }

    /// Positional parameter list `[$1, $2, $3]`.
    pub fn external_params(&self) -> Vec<ParamValue> {
        ParamSlot::ALL
            .iter()
            .map(|slot| self.column(slot.column()))
            .collect()
    }
}

/// Where bound parameters read their values.
#[derive(Debug, Clone, Copy)]
pub enum ArgumentSource<'a> {
    Row(&'a SourcingLocation),
    External(&'a [ParamValue]),
}

impl ArgumentSource<'_> {
    fn label(&self) -> &'static str {
        match self {
            Self::Row(_) => "a sourcing record",
            Self::External(_) => "external parameters",
        }
    }

    /// Read the value behind `bound` for `slot`.
    pub fn read(&self, slot: ParamSlot, bound: BoundParam) -> Result<Option<ParamValue>, QueryError> {
        let value = match (bound, self) {
            (BoundParam::Column(column), Self::Row(row)) => Some(row.column(column)),
            (BoundParam::External(position), Self::External(params)) => {
                params.get(position.wrapping_sub(1)).cloned()
            }
            (bound, source) => {
                return Err(QueryError::ContextMismatch {
                    position: slot.position(),
                    bound: match bound {
                        BoundParam::Column(_) => "a column",
                        BoundParam::External(_) => "an external parameter",
                    },
                    supplied: source.label(),
                })
            }
        };
        match value {
            Some(v) if v.slot() != slot => Err(QueryError::ParameterType {
                position: slot.position(),
                expected: slot,
            }),
            other => Ok(other),
        }
    }
}

/// Slot values after binding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArguments {
    pub geo_region: Option<GeoRegionId>,
    pub material: Option<MaterialId>,
    /// `Some(None)` when the slot was bound to an absent admin region.
    pub admin_region: Option<Option<AdminRegionId>>,
}

impl BoundArguments {
    pub(crate) fn set(&mut self, value: ParamValue) {
        match value {
            ParamValue::GeoRegion(g) => self.geo_region = Some(g),
            ParamValue::Material(m) => self.material = Some(m),
            ParamValue::AdminRegion(a) => self.admin_region = Some(a),
        }
    }

    pub fn has(&self, slot: ParamSlot) -> bool {
        match slot {
            ParamSlot::GeoRegion => self.geo_region.is_some(),
            ParamSlot::Material => self.material.is_some(),
            ParamSlot::AdminRegion => self.admin_region.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> SourcingLocation {
        SourcingLocation::new("region-1", "cotton").with_admin_region("IN")
    }

    #[test]
    fn record_contexts_bind_columns() {
        let ctx = CalculationContext::ScenarioBaseline {
            scenario: ScenarioId::new("s1"),
        };
        assert_eq!(
            ctx.bind(ParamSlot::Material),
            BoundParam::Column(SourcingColumn::MaterialId)
        );
        assert_eq!(ctx.row_source(), RowSource::Scenario(ScenarioId::new("s1")));
        assert_eq!(
            CalculationContext::Import.bind(ParamSlot::GeoRegion),
            BoundParam::Column(SourcingColumn::GeoRegionId)
        );
    }

    #[test]
    fn intervention_binds_positions() {
        let ctx = CalculationContext::Intervention;
        for slot in ParamSlot::ALL {
            assert_eq!(ctx.bind(slot), BoundParam::External(slot.position()));
        }
        assert_eq!(ctx.bind(ParamSlot::AdminRegion).to_string(), "$3");
    }

    #[test]
    fn row_and_external_sources_agree() {
        let loc = location();
        let params = loc.external_params();
        for slot in ParamSlot::ALL {
            let from_row = ArgumentSource::Row(&loc)
                .read(slot, CalculationContext::Import.bind(slot))
                .unwrap();
            let from_params = ArgumentSource::External(&params)
                .read(slot, CalculationContext::Intervention.bind(slot))
                .unwrap();
            assert_eq!(from_row, from_params);
        }
    }

    #[test]
    fn mismatched_sources_are_rejected() {
        let loc = location();
        let err = ArgumentSource::Row(&loc)
            .read(ParamSlot::Material, BoundParam::External(2))
            .unwrap_err();
        assert!(matches!(err, QueryError::ContextMismatch { position: 2, .. }));

        let swapped = vec![
            ParamValue::Material(MaterialId::new("cotton")),
            ParamValue::GeoRegion(GeoRegionId::new("region-1")),
        ];
        let err = ArgumentSource::External(&swapped)
            .read(ParamSlot::GeoRegion, BoundParam::External(1))
            .unwrap_err();
        assert_eq!(
            err,
            QueryError::ParameterType {
                position: 1,
                expected: ParamSlot::GeoRegion
            }
        );

        let short = ArgumentSource::External(&swapped[..1])
            .read(ParamSlot::AdminRegion, BoundParam::External(3))
            .unwrap();
        assert_eq!(short, None);
    }
}
