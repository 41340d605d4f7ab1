//! Scenario comparison for geoimpact.
//!
//! Impact records (one value per indicator, year and sourcing line) are
//! split into a baseline side and an intervention side, grouped by one
//! sourcing dimension and laid out on a year axis. Every table satisfies the
//! row-sum law: per indicator and year, `year_sum.impact_result` equals the
//! sum of the rows' `impact_result`.

pub mod compare;
pub mod config;
pub mod error;
pub mod record;
pub mod table;

pub use compare::{compare, compare_scenarios, ComparisonRequest};
pub use config::CompareConfig;
pub use error::{CompareError, Result};
pub use record::{split_intervention, ComparisonSides, Dimensions, GroupBy, GroupKey, ImpactRecord, ImpactRole};
pub use table::{
    ComparisonMode, ComparisonRow, ComparisonTable, ComparisonValue, IndicatorComparison,
    PurchasedTonnes,
};
