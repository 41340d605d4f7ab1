//! Grid dataset descriptors.
//!
//! A descriptor is the registry's answer to "where do the values for this
//! subject live": a physical table, a value column within it, and the native
//! resolution of the cells the table is keyed by.

use crate::ids::MaterialId;
use crate::indicator::IndicatorCode;
use crate::resolution::Resolution;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Global layers that are neither material- nor indicator-specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuxiliaryLayer {
    /// Harvested area of all crops combined. Denominator of the landscape
    /// indicators' production weighting.
    AllCropsHarvestedArea,
}

impl AuxiliaryLayer {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AllCropsHarvestedArea => "allCropsHarvestedArea",
        }
    }
}

/// What a dataset describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DatasetSubject {
    Material(MaterialId),
    Indicator(IndicatorCode),
    Layer(AuxiliaryLayer),
}

impl fmt::Display for DatasetSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Material(m) => write!(f, "material {m}"),
            Self::Indicator(c) => write!(f, "indicator {c}"),
            Self::Layer(l) => write!(f, "layer {}", l.as_str()),
        }
    }
}

/// Role a dataset plays for its subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GridKind {
    /// Tonnes produced per cell.
    Production,
    /// Hectares harvested per cell.
    Harvest,
    /// Per-cell indicator value.
    IndicatorValue,
    Auxiliary,
}

impl GridKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Harvest => "harvest",
            Self::IndicatorValue => "indicatorValue",
            Self::Auxiliary => "auxiliary",
        }
    }
}

impl fmt::Display for GridKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical registry key: `(subject, kind)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DatasetKey {
    pub subject: DatasetSubject,
    pub kind: GridKind,
}

impl DatasetKey {
    pub fn new(subject: DatasetSubject, kind: GridKind) -> Self {
        Self { subject, kind }
    }

    pub fn material(material: MaterialId, kind: GridKind) -> Self {
        Self::new(DatasetSubject::Material(material), kind)
    }

    pub fn indicator(code: IndicatorCode) -> Self {
        Self::new(DatasetSubject::Indicator(code), GridKind::IndicatorValue)
    }

    pub fn layer(layer: AuxiliaryLayer) -> Self {
        Self::new(DatasetSubject::Layer(layer), GridKind::Auxiliary)
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.subject, self.kind)
    }
}

/// Physical location of a grid dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetDescriptor {
    pub id: String,
    pub subject: DatasetSubject,
    pub kind: GridKind,
    pub physical_table: String,
    pub value_column: String,
    /// Native resolution of the table's cell keys.
    pub resolution: Resolution,
    /// Reference year of the data, if the dataset is versioned by year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default)]
    pub deleted: bool,
}

impl DatasetDescriptor {
    pub fn key(&self) -> DatasetKey {
        DatasetKey::new(self.subject.clone(), self.kind)
    }
}
