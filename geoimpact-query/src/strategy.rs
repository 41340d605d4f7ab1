//! Indicator formula strategies.
//!
//! A strategy declares the raw values it needs and turns a bundle of them
//! into the indicator value for a sourced tonnage. The standard families
//! are variants of [`IndicatorFormula`]; the [`StrategyRegistry`] is built
//! once and handed to the composer and engine explicitly.

use crate::bundle::RawValueBundle;
use crate::raw_value::RawValueSpec;
use geoimpact_core::{DatasetKey, IndicatorCode, MaterialId, RawValueName};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Per-request inputs to a formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    /// Sourced tonnes. Default: 1
    pub tonnage: f64,
    /// Reference year for dataset selection.
    pub year: Option<i32>,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            tonnage: 1.0,
            year: None,
        }
    }
}

impl IndicatorParams {
    pub fn with_tonnage(mut self, tonnage: f64) -> Self {
        self.tonnage = tonnage;
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }
}

pub trait IndicatorStrategy: Send + Sync + fmt::Debug {
    fn code(&self) -> IndicatorCode;

    /// Raw values `finalize` reads. Exactly these appear in a batch composed
    /// for this indicator alone.
    fn raw_values(&self) -> &'static [RawValueName];

    /// Combine the bundle into the indicator value.
    ///
    /// Returns `None` for a legitimate null (no data, zero denominator);
    /// never a non-finite number.
    fn finalize(&self, bundle: &RawValueBundle, params: &IndicatorParams) -> Option<f64>;

    /// Grid datasets that must exist before a plan is built.
    fn required_datasets(&self, material: &MaterialId) -> Vec<DatasetKey> {
        let mut keys: Vec<DatasetKey> = Vec::new();
        for name in self.raw_values() {
            for key in RawValueSpec::of(*name).required_datasets(material) {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        keys
    }
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        None
    } else {
        finite(numerator / denominator)
    }
}

/// The standard indicator families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorFormula {
    /// `t · harvestedArea / production`.
    LandUse,
    /// `t · raw / weightedAllHarvest`, where `raw_values[0]` is the
    /// production-weighted indicator aggregate.
    Landscape {
        code: IndicatorCode,
        raw_values: &'static [RawValueName],
    },
    /// `t · coefficient`.
    Coefficient {
        code: IndicatorCode,
        raw_values: &'static [RawValueName],
    },
    /// `t · rawWater · waterStressPercentage`.
    WaterStress,
    /// `t · waterStressArea`.
    StressArea,
}

impl IndicatorFormula {
    pub const DEFORESTATION: Self = Self::Landscape {
        code: IndicatorCode::Deforestation,
        raw_values: &[RawValueName::RawDeforestation, RawValueName::WeightedAllHarvest],
    };
    pub const CARBON: Self = Self::Landscape {
        code: IndicatorCode::Carbon,
        raw_values: &[RawValueName::RawCarbon, RawValueName::WeightedAllHarvest],
    };
    pub const BIODIVERSITY: Self = Self::Landscape {
        code: IndicatorCode::Biodiversity,
        raw_values: &[RawValueName::RawBiodiversity, RawValueName::WeightedAllHarvest],
    };
    pub const NATURAL_CONVERSION: Self = Self::Landscape {
        code: IndicatorCode::NaturalConversion,
        raw_values: &[RawValueName::RawNaturalConversion, RawValueName::WeightedAllHarvest],
    };
    pub const WATER_USE: Self = Self::Coefficient {
        code: IndicatorCode::WaterUse,
        raw_values: &[RawValueName::RawWater],
    };
    pub const NUTRIENT_LOAD: Self = Self::Coefficient {
        code: IndicatorCode::NutrientLoad,
        raw_values: &[RawValueName::RawWaterQuality],
    };

    /// Every standard formula, one per known indicator.
    pub const STANDARD: [Self; 9] = [
        Self::LandUse,
        Self::DEFORESTATION,
        Self::CARBON,
        Self::BIODIVERSITY,
        Self::NATURAL_CONVERSION,
        Self::WATER_USE,
        Self::WaterStress,
        Self::StressArea,
        Self::NUTRIENT_LOAD,
    ];
}

impl IndicatorStrategy for IndicatorFormula {
    fn code(&self) -> IndicatorCode {
        match self {
            Self::LandUse => IndicatorCode::LandUse,
            Self::Landscape { code, .. } | Self::Coefficient { code, .. } => *code,
            Self::WaterStress => IndicatorCode::UnsustainableWaterUse,
            Self::StressArea => IndicatorCode::ExcessWaterUse,
        }
    }

    fn raw_values(&self) -> &'static [RawValueName] {
        match self {
            Self::LandUse => &[RawValueName::HarvestedArea, RawValueName::Production],
            Self::Landscape { raw_values, .. } | Self::Coefficient { raw_values, .. } => *raw_values,
            Self::WaterStress => &[RawValueName::RawWater, RawValueName::WaterStressPercentage],
            Self::StressArea => &[RawValueName::WaterStressArea],
        }
    }

    fn finalize(&self, bundle: &RawValueBundle, params: &IndicatorParams) -> Option<f64> {
        let t = params.tonnage;
        match self {
            Self::LandUse => {
                let harvested = bundle.get(RawValueName::HarvestedArea)?;
                let production = bundle.get(RawValueName::Production)?;
                ratio(t * harvested, production)
            }
            Self::Landscape { raw_values, .. } => {
                let raw = bundle.get(*raw_values.first()?)?;
                let weight = bundle.get(RawValueName::WeightedAllHarvest)?;
                ratio(t * raw, weight)
            }
            Self::Coefficient { raw_values, .. } => {
                let coefficient = bundle.get(*raw_values.first()?)?;
                finite(t * coefficient)
            }
            Self::WaterStress => {
                let water = bundle.get(RawValueName::RawWater)?;
                let stressed = bundle.get(RawValueName::WaterStressPercentage)?;
                finite(t * water * stressed)
            }
            Self::StressArea => finite(t * bundle.get(RawValueName::WaterStressArea)?),
        }
    }
}

/// Strategies by indicator code.
#[derive(Debug, Clone, Default)]
pub struct StrategyRegistry {
    strategies: FxHashMap<IndicatorCode, Arc<dyn IndicatorStrategy>>,
}

impl StrategyRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// One [`IndicatorFormula`] per known indicator.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for formula in IndicatorFormula::STANDARD {
            registry.register(Arc::new(formula));
        }
        registry
    }

    /// Register a strategy, replacing any previous one for its code.
    pub fn register(&mut self, strategy: Arc<dyn IndicatorStrategy>) -> Option<Arc<dyn IndicatorStrategy>> {
        self.strategies.insert(strategy.code(), strategy)
    }

    pub fn get(&self, code: IndicatorCode) -> Option<&Arc<dyn IndicatorStrategy>> {
        self.strategies.get(&code)
    }

    /// Registered codes in declaration order.
    pub fn codes(&self) -> Vec<IndicatorCode> {
        let mut codes: Vec<_> = self.strategies.keys().copied().collect();
        codes.sort();
        codes
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}
