//! Raw-value specs.
//!
//! Each [`RawValueName`] has exactly one [`RawValueSpec`], the single
//! description used by every calculation context. A spec says which
//! datasets to inner-join on cell identity, how to fold the joined rows, and
//! at which resolution to expand the region; or, for coefficient-backed
//! values, which coefficient to look up.

use crate::binder::ParamSlot;
use geoimpact_core::{AuxiliaryLayer, DatasetKey, GridKind, IndicatorCode, MaterialId, RawValueName};
use std::fmt::Write;

/// Hectares to grid unit area (`1 / 0.0001`), applied to biodiversity loss.
pub const HECTARE_TO_UNIT_AREA: f64 = 1.0 / 0.0001;

/// Scale applied to the water-stress area grid.
pub const WATER_STRESS_AREA_SCALE: f64 = 0.0001;

/// Water-stress classes above this value count as stressed.
pub const WATER_STRESS_CLASS_THRESHOLD: f64 = 2.0;

/// A dataset joined into a grid aggregate, by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridInput {
    /// The sourced material's grid of the given kind.
    Material(GridKind),
    /// An indicator's value grid.
    Indicator(IndicatorCode),
    Layer(AuxiliaryLayer),
}

impl GridInput {
    pub fn dataset_key(self, material: &MaterialId) -> DatasetKey {
        match self {
            Self::Material(kind) => DatasetKey::material(material.clone(), kind),
            Self::Indicator(code) => DatasetKey::indicator(code),
            Self::Layer(layer) => DatasetKey::layer(layer),
        }
    }

    pub fn needs_material(self) -> bool {
        matches!(self, Self::Material(_))
    }

    /// Role name used in rendered plans.
    pub fn role(self) -> String {
        match self {
            Self::Material(kind) => format!("material_{}", kind.as_str()),
            Self::Indicator(code) => format!("indicator_{}", code.name_code()),
            Self::Layer(layer) => format!("layer_{}", layer.as_str()),
        }
    }
}

/// Fold over the inner-joined row set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Combinator {
    /// `sum(Π inputs)`.
    Sum,
    /// `sum(Π inputs) · k`.
    ScaledSum(f64),
    /// Share of rows whose first input exceeds the threshold.
    FractionAbove(f64),
}

impl Combinator {
    pub fn accumulator(self) -> Accumulator {
        Accumulator {
            combinator: self,
            sum: 0.0,
            rows: 0,
            above: 0,
        }
    }

    fn render(self, operands: &str) -> String {
        match self {
            Self::Sum => format!("sum({operands})"),
            Self::ScaledSum(k) => format!("sum({operands} * {k})"),
            Self::FractionAbove(t) => format!("count({operands} > {t}) / count(*)"),
        }
    }
}

/// Streaming fold for a [`Combinator`].
///
/// Zero rows finish as `None`, matching SQL aggregate semantics over an
/// empty join. Non-finite results also finish as `None`.
#[derive(Debug, Clone)]
pub struct Accumulator {
    combinator: Combinator,
    sum: f64,
    rows: u64,
    above: u64,
}

impl Accumulator {
    /// Add one joined row, one value per input in join order.
    pub fn push(&mut self, row: &[f64]) {
        self.rows += 1;
        match self.combinator {
            Combinator::Sum | Combinator::ScaledSum(_) => {
                self.sum += row.iter().product::<f64>();
            }
            Combinator::FractionAbove(threshold) => {
                if row.first().is_some_and(|v| *v > threshold) {
                    self.above += 1;
                }
            }
        }
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn finish(self) -> Option<f64> {
        if self.rows == 0 {
            return None;
        }
        let value = match self.combinator {
            Combinator::Sum => self.sum,
            Combinator::ScaledSum(k) => self.sum * k,
            Combinator::FractionAbove(_) => self.above as f64 / self.rows as f64,
        };
        value.is_finite().then_some(value)
    }
}

/// Resolution a grid aggregate expands the region to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPolicy {
    /// Native resolution of the material's grid of this kind.
    MaterialNative(GridKind),
    /// The configured canonical resolution; used when no material grid is
    /// joined.
    Canonical,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub inputs: &'static [GridInput],
    pub combinator: Combinator,
    pub resolution: ResolutionPolicy,
}

impl GridSpec {
    pub fn needs_material(&self) -> bool {
        self.inputs.iter().any(|i| i.needs_material())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValueSpec {
    Grid(GridSpec),
    /// Two-tier coefficient lookup for an indicator.
    Coefficient(IndicatorCode),
}

const PRODUCTION: GridInput = GridInput::Material(GridKind::Production);
const HARVEST: GridInput = GridInput::Material(GridKind::Harvest);
const ALL_CROPS: GridInput = GridInput::Layer(AuxiliaryLayer::AllCropsHarvestedArea);

const fn production_weighted(inputs: &'static [GridInput], combinator: Combinator) -> RawValueSpec {
    RawValueSpec::Grid(GridSpec {
        inputs,
        combinator,
        resolution: ResolutionPolicy::MaterialNative(GridKind::Production),
    })
}

const GRID_PARAMS_WITH_MATERIAL: &[ParamSlot] = &[ParamSlot::GeoRegion, ParamSlot::Material];
const GRID_PARAMS: &[ParamSlot] = &[ParamSlot::GeoRegion];
const COEFFICIENT_PARAMS: &[ParamSlot] = &[ParamSlot::Material, ParamSlot::AdminRegion];

impl RawValueSpec {
    /// Sub-query description for `name`.
    pub const fn of(name: RawValueName) -> RawValueSpec {
        match name {
            RawValueName::Production => production_weighted(&[PRODUCTION], Combinator::Sum),
            RawValueName::HarvestedArea => RawValueSpec::Grid(GridSpec {
                inputs: &[HARVEST],
                combinator: Combinator::Sum,
                resolution: ResolutionPolicy::MaterialNative(GridKind::Harvest),
            }),
            RawValueName::WeightedAllHarvest => production_weighted(&[PRODUCTION, ALL_CROPS], Combinator::Sum),
            RawValueName::RawDeforestation => production_weighted(
                &[PRODUCTION, GridInput::Indicator(IndicatorCode::Deforestation)],
                Combinator::Sum,
            ),
            // the carbon grid already carries the deforestation factor
            RawValueName::RawCarbon => production_weighted(
                &[PRODUCTION, GridInput::Indicator(IndicatorCode::Carbon)],
                Combinator::Sum,
            ),
            RawValueName::RawBiodiversity => production_weighted(
                &[PRODUCTION, GridInput::Indicator(IndicatorCode::Biodiversity)],
                Combinator::ScaledSum(HECTARE_TO_UNIT_AREA),
            ),
            RawValueName::RawNaturalConversion => production_weighted(
                &[PRODUCTION, GridInput::Indicator(IndicatorCode::NaturalConversion)],
                Combinator::Sum,
            ),
            RawValueName::RawWater => RawValueSpec::Coefficient(IndicatorCode::WaterUse),
            RawValueName::RawWaterQuality => RawValueSpec::Coefficient(IndicatorCode::NutrientLoad),
            RawValueName::WaterStressPercentage => RawValueSpec::Grid(GridSpec {
                inputs: &[GridInput::Indicator(IndicatorCode::UnsustainableWaterUse)],
                combinator: Combinator::FractionAbove(WATER_STRESS_CLASS_THRESHOLD),
                resolution: ResolutionPolicy::Canonical,
            }),
            RawValueName::WaterStressArea => RawValueSpec::Grid(GridSpec {
                inputs: &[GridInput::Indicator(IndicatorCode::ExcessWaterUse)],
                combinator: Combinator::ScaledSum(WATER_STRESS_AREA_SCALE),
                resolution: ResolutionPolicy::Canonical,
            }),
        }
    }

    /// Slots the sub-query reads, in position order.
    pub fn params(&self) -> &'static [ParamSlot] {
        match self {
            Self::Grid(g) if g.needs_material() => GRID_PARAMS_WITH_MATERIAL,
            Self::Grid(_) => GRID_PARAMS,
            Self::Coefficient(_) => COEFFICIENT_PARAMS,
        }
    }

    /// Grid datasets this value joins, for `material`.
    pub fn required_datasets(&self, material: &MaterialId) -> Vec<DatasetKey> {
        match self {
            Self::Grid(g) => g.inputs.iter().map(|i| i.dataset_key(material)).collect(),
            Self::Coefficient(_) => Vec::new(),
        }
    }

    pub fn is_coefficient(&self) -> bool {
        matches!(self, Self::Coefficient(_))
    }

    /// Parameterised rendering for logs and the CLI. Datasets appear by role
    /// and parameters by position, so the text is the same in every context.
    pub fn plan_text(&self) -> String {
        match self {
            Self::Grid(g) => {
                let operands = g
                    .inputs
                    .iter()
                    .map(|i| format!("{}.value", i.role()))
                    .collect::<Vec<_>>()
                    .join(" * ");
                let mut text = g.combinator.render(&operands);
                let at = match g.resolution {
                    ResolutionPolicy::MaterialNative(kind) => format!("native(material_{})", kind.as_str()),
                    ResolutionPolicy::Canonical => "canonical".to_string(),
                };
                let _ = write!(text, " over cells($1 @ {at})");
                for input in g.inputs {
                    let _ = write!(text, " join {} on cell", input.role());
                    if input.needs_material() {
                        text.push_str(" where material = $2");
                    }
                }
                text
            }
            Self::Coefficient(code) => {
                format!("coefficient({}, material = $2, admin_region = $3 | default)", code.name_code())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fold_is_null() {
        for c in [Combinator::Sum, Combinator::ScaledSum(3.0), Combinator::FractionAbove(2.0)] {
            assert_eq!(c.accumulator().finish(), None);
        }
    }

    #[test]
    fn sum_of_products() {
        let mut acc = Combinator::Sum.accumulator();
        for row in [[10.0, 1.0], [5.0, 0.0], [0.0, 2.0]] {
            acc.push(&row);
        }
        assert_eq!(acc.rows(), 3);
        assert_eq!(acc.finish(), Some(10.0));
    }

    #[test]
    fn scaled_sum_and_fraction() {
        let mut acc = Combinator::ScaledSum(HECTARE_TO_UNIT_AREA).accumulator();
        acc.push(&[2.0, 0.5]);
        assert!((acc.finish().unwrap() - 10_000.0).abs() < 1e-6);

        let mut acc = Combinator::FractionAbove(WATER_STRESS_CLASS_THRESHOLD).accumulator();
        for class in [1.0, 2.0, 3.0, 4.0] {
            acc.push(&[class]);
        }
        assert_eq!(acc.finish(), Some(0.5));
    }

    #[test]
    fn overflow_is_null_not_infinite() {
        let mut acc = Combinator::Sum.accumulator();
        acc.push(&[f64::MAX, 10.0]);
        assert_eq!(acc.finish(), None);
    }

    #[test]
    fn carbon_is_not_remultiplied_by_deforestation() {
        let RawValueSpec::Grid(g) = RawValueSpec::of(RawValueName::RawCarbon) else {
            panic!("carbon is a grid aggregate");
        };
        assert_eq!(g.inputs.len(), 2);
        assert!(!g
            .inputs
            .contains(&GridInput::Indicator(IndicatorCode::Deforestation)));
    }

    #[test]
    fn water_use_and_water_stress_are_distinct_bindings() {
        let water = RawValueSpec::of(RawValueName::RawWater);
        let stress = RawValueSpec::of(RawValueName::WaterStressPercentage);
        assert_eq!(water, RawValueSpec::Coefficient(IndicatorCode::WaterUse));
        assert!(matches!(
            stress,
            RawValueSpec::Grid(GridSpec {
                resolution: ResolutionPolicy::Canonical,
                combinator: Combinator::FractionAbove(_),
                ..
            })
        ));
        assert_ne!(water.plan_text(), stress.plan_text());
    }

    #[test]
    fn params_follow_material_dependence() {
        assert_eq!(
            RawValueSpec::of(RawValueName::RawDeforestation).params(),
            &[ParamSlot::GeoRegion, ParamSlot::Material]
        );
        assert_eq!(
            RawValueSpec::of(RawValueName::WaterStressArea).params(),
            &[ParamSlot::GeoRegion]
        );
        assert_eq!(
            RawValueSpec::of(RawValueName::RawWaterQuality).params(),
            &[ParamSlot::Material, ParamSlot::AdminRegion]
        );
    }

    #[test]
    fn plan_text_names_roles_and_positions() {
        let text = RawValueSpec::of(RawValueName::WeightedAllHarvest).plan_text();
        assert_eq!(
            text,
            "sum(material_production.value * layer_allCropsHarvestedArea.value) \
             over cells($1 @ native(material_production)) \
             join material_production on cell where material = $2 \
             join layer_allCropsHarvestedArea on cell"
        );
    }
}
