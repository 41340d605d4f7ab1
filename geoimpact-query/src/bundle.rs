//! Raw-value bundles.

use geoimpact_core::RawValueName;
use std::collections::BTreeMap;

/// Named scalar aggregates for one sourcing location.
///
/// A present name with a `None` value is a legitimate null (no joined rows);
/// an absent name was never produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawValueBundle {
    values: BTreeMap<RawValueName, Option<f64>>,
}

impl RawValueBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: RawValueName, value: Option<f64>) {
        self.values.insert(name, value.filter(|v| v.is_finite()));
    }

    /// Value of `name`; `None` when null or absent.
    pub fn get(&self, name: RawValueName) -> Option<f64> {
        self.values.get(&name).copied().flatten()
    }

    pub fn contains(&self, name: RawValueName) -> bool {
        self.values.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RawValueName, Option<f64>)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }
}

impl FromIterator<(RawValueName, Option<f64>)> for RawValueBundle {
    fn from_iter<I: IntoIterator<Item = (RawValueName, Option<f64>)>>(iter: I) -> Self {
        let mut bundle = Self::new();
        for (name, value) in iter {
            bundle.insert(name, value);
        }
        bundle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_and_absent_are_distinguishable() {
        let bundle: RawValueBundle = [(RawValueName::Production, None), (RawValueName::RawWater, Some(f64::NAN))]
            .into_iter()
            .collect();
        assert!(bundle.contains(RawValueName::Production));
        assert!(!bundle.contains(RawValueName::HarvestedArea));
        assert_eq!(bundle.get(RawValueName::Production), None);
        assert_eq!(bundle.get(RawValueName::RawWater), None);
    }
}
