//! Indicator name codes and raw-value names.

use crate::error::RegistryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Environmental indicator, identified on the wire by its name code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IndicatorCode {
    /// Land use (`LF`).
    #[serde(rename = "LF")]
    LandUse,
    /// Deforestation risk (`DF_LUC_T`).
    #[serde(rename = "DF_LUC_T")]
    Deforestation,
    /// Climate risk from land-use-change carbon loss (`GHG_LUC_T`).
    #[serde(rename = "GHG_LUC_T")]
    Carbon,
    /// Biodiversity loss (`BL_LUC_T`).
    #[serde(rename = "BL_LUC_T")]
    Biodiversity,
    /// Natural ecosystem conversion risk (`NCE`).
    #[serde(rename = "NCE")]
    NaturalConversion,
    /// Blue water footprint (`WU`).
    #[serde(rename = "WU")]
    WaterUse,
    /// Unsustainable water use (`UWU_T`).
    #[serde(rename = "UWU_T")]
    UnsustainableWaterUse,
    /// Excess water withdrawal in stressed areas (`UWU`).
    #[serde(rename = "UWU")]
    ExcessWaterUse,
    /// Nutrient load, a water quality indicator (`NL`).
    #[serde(rename = "NL")]
    NutrientLoad,
}

impl IndicatorCode {
    /// Every indicator known to the engine, in name-code order of the catalog.
    pub const ALL: [IndicatorCode; 9] = [
        IndicatorCode::LandUse,
        IndicatorCode::Deforestation,
        IndicatorCode::Carbon,
        IndicatorCode::Biodiversity,
        IndicatorCode::NaturalConversion,
        IndicatorCode::WaterUse,
        IndicatorCode::UnsustainableWaterUse,
        IndicatorCode::ExcessWaterUse,
        IndicatorCode::NutrientLoad,
    ];

    pub fn name_code(self) -> &'static str {
        match self {
            Self::LandUse => "LF",
            Self::Deforestation => "DF_LUC_T",
            Self::Carbon => "GHG_LUC_T",
            Self::Biodiversity => "BL_LUC_T",
            Self::NaturalConversion => "NCE",
            Self::WaterUse => "WU",
            Self::UnsustainableWaterUse => "UWU_T",
            Self::ExcessWaterUse => "UWU",
            Self::NutrientLoad => "NL",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::LandUse => "Land use",
            Self::Deforestation => "Deforestation risk",
            Self::Carbon => "Climate risk",
            Self::Biodiversity => "Biodiversity loss",
            Self::NaturalConversion => "Natural ecosystem conversion risk",
            Self::WaterUse => "Water use",
            Self::UnsustainableWaterUse => "Unsustainable water use",
            Self::ExcessWaterUse => "Excess water withdrawal",
            Self::NutrientLoad => "Nutrient load",
        }
    }
}

impl fmt::Display for IndicatorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name_code())
    }
}

impl FromStr for IndicatorCode {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name_code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RegistryError::UnknownIndicator(s.to_string()))
    }
}

/// Intermediate scalar aggregate consumed by one or more indicator formulas.
///
/// Declaration order is the canonical order used when a batch lists raw
/// values, so `Ord` is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RawValueName {
    Production,
    HarvestedArea,
    WeightedAllHarvest,
    RawDeforestation,
    RawCarbon,
    RawBiodiversity,
    RawNaturalConversion,
    RawWater,
    RawWaterQuality,
    WaterStressPercentage,
    WaterStressArea,
}

impl RawValueName {
    pub const ALL: [RawValueName; 11] = [
        RawValueName::Production,
        RawValueName::HarvestedArea,
        RawValueName::WeightedAllHarvest,
        RawValueName::RawDeforestation,
        RawValueName::RawCarbon,
        RawValueName::RawBiodiversity,
        RawValueName::RawNaturalConversion,
        RawValueName::RawWater,
        RawValueName::RawWaterQuality,
        RawValueName::WaterStressPercentage,
        RawValueName::WaterStressArea,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::HarvestedArea => "harvestedArea",
            Self::WeightedAllHarvest => "weightedAllHarvest",
            Self::RawDeforestation => "rawDeforestation",
            Self::RawCarbon => "rawCarbon",
            Self::RawBiodiversity => "rawBiodiversity",
            Self::RawNaturalConversion => "rawNaturalConversion",
            Self::RawWater => "rawWater",
            Self::RawWaterQuality => "rawWaterQuality",
            Self::WaterStressPercentage => "waterStressPercentage",
            Self::WaterStressArea => "waterStressArea",
        }
    }
}

impl fmt::Display for RawValueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RawValueName {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| RegistryError::UnknownRawValue(s.to_string()))
    }
}
