//! Validated hexagonal grid resolution.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Finest subdivision level of the hexagonal grid.
pub const MAX_RESOLUTION: u8 = 15;

/// Resolution used by grids that carry no material distribution and so have
/// no native material resolution to follow.
pub const CANONICAL_RESOLUTION: Resolution = Resolution(6);

/// A resolution outside `1..=MAX_RESOLUTION`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid resolution {requested}: must be between 1 and {max}")]
pub struct InvalidResolution {
    pub requested: i64,
    pub max: u8,
}

/// Grid resolution in `1..=MAX_RESOLUTION`.
///
/// Level 0 (the base cells) is a valid cell resolution but never a valid
/// aggregation target, so it is rejected here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Resolution(u8);

impl Resolution {
    pub fn new(level: i64) -> Result<Self, InvalidResolution> {
        if (1..=MAX_RESOLUTION as i64).contains(&level) {
            Ok(Self(level as u8))
        } else {
            Err(InvalidResolution {
                requested: level,
                max: MAX_RESOLUTION,
            })
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Resolution {
    type Error = InvalidResolution;

    fn try_from(level: i64) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<Resolution> for u8 {
    fn from(r: Resolution) -> Self {
        r.0
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_enforced() {
        assert!(Resolution::new(0).is_err());
        assert!(Resolution::new(-3).is_err());
        assert!(Resolution::new(16).is_err());
        assert_eq!(Resolution::new(1).unwrap().get(), 1);
        assert_eq!(Resolution::new(15).unwrap().get(), 15);

        let err = Resolution::new(20).unwrap_err();
        assert_eq!(err.requested, 20);
        assert_eq!(err.max, MAX_RESOLUTION);
    }

    #[test]
    fn deserialization_validates() {
        let r: Resolution = serde_json::from_str("6").unwrap();
        assert_eq!(r.get(), 6);
        assert!(serde_json::from_str::<Resolution>("0").is_err());
        assert_eq!(serde_json::to_string(&r).unwrap(), "6");
    }
}
