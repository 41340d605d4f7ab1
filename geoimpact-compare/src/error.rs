use geoimpact_core::IndicatorCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompareError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompareError {
    #[error("invalid year range {start}..={end}")]
    InvalidYearRange { start: i32, end: i32 },

    #[error("growth rate must be finite, got {0}")]
    InvalidGrowthRate(f64),

    /// A record carries NaN or infinity; it would poison every sum it joins.
    #[error("non-finite impact value for indicator {indicator} in {year}")]
    NonFiniteValue { indicator: IndicatorCode, year: i32 },
}
