//! Per-material, per-admin-region coefficients.
//!
//! Lookup-style indicators (water use, nutrient load) do not aggregate cell
//! grids. Their raw value is a scalar factor found by a two-tier lookup:
//!
//! 1. the exact `(admin region, material)` row with a non-null value
//! 2. the `(no admin region, material)` default row with a non-null value
//!
//! A miss after both tiers is reported as `None`; the engine turns it into a
//! hard failure, never a zero.
//!
//! Coefficients are undated and stored in the unit the grid strategies
//! multiply by tonnage directly (m3 per tonne for water use). A row carrying
//! a `year` is rejected when parsed.

use crate::error::{RegistryError, Result};
use crate::ids::{AdminRegionId, MaterialId};
use crate::indicator::IndicatorCode;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// One catalog row. A `None` value is a known gap and never matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CoefficientRow {
    pub indicator: IndicatorCode,
    pub material: MaterialId,
    #[serde(default)]
    pub admin_region: Option<AdminRegionId>,
    #[serde(default)]
    pub value: Option<f64>,
}

/// Which tier satisfied a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CoefficientTier {
    Exact,
    MaterialDefault,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoefficientMatch {
    pub value: f64,
    pub tier: CoefficientTier,
}

type CoefficientKey = (IndicatorCode, MaterialId, Option<AdminRegionId>);

#[derive(Debug, Default, Clone)]
pub struct CoefficientTable {
    rows: FxHashMap<CoefficientKey, CoefficientRow>,
}

impl CoefficientTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: impl IntoIterator<Item = CoefficientRow>) -> Result<Self> {
        let mut table = Self::new();
        for row in rows {
            table.insert(row)?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, row: CoefficientRow) -> Result<()> {
        let key = (row.indicator, row.material.clone(), row.admin_region.clone());
        if self.rows.contains_key(&key) {
            return Err(RegistryError::DuplicateCoefficient {
                indicator: row.indicator,
                material: row.material,
                admin_region: row.admin_region,
            });
        }
        self.rows.insert(key, row);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn value_at(&self, key: &CoefficientKey) -> Option<f64> {
        self.rows
            .get(key)
            .and_then(|r| r.value)
            .filter(|v| v.is_finite())
    }

    /// Two-tier lookup; first non-null match wins.
    pub fn lookup(
        &self,
        indicator: IndicatorCode,
        admin_region: Option<&AdminRegionId>,
        material: &MaterialId,
    ) -> Option<CoefficientMatch> {
        if let Some(admin) = admin_region {
            let exact = (indicator, material.clone(), Some(admin.clone()));
            if let Some(value) = self.value_at(&exact) {
                return Some(CoefficientMatch {
                    value,
                    tier: CoefficientTier::Exact,
                });
            }
        }
        self.value_at(&(indicator, material.clone(), None))
            .map(|value| CoefficientMatch {
                value,
                tier: CoefficientTier::MaterialDefault,
            })
    }
}
