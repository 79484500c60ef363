use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of a tradable commodity (`"currency"`, `"wood1"`, ...).
///
/// The set of valid names is configured per ledger, see
/// [`LedgerConfig`](crate::config::LedgerConfig).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Commodity(String);

impl Commodity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Commodity {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for Commodity {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum CommodityCategory {
    Currency,
    Agricultural,
    Manufactured,
}

string_enum!(CommodityCategory {
    Currency => "currency",
    Agricultural => "agricultural",
    Manufactured => "manufactured",
});

/// A multiset of commodity quantities.
///
/// Stored sparsely: a commodity that is absent has quantity zero, and
/// arithmetic drops entries that come back to zero, so two bundles holding
/// the same quantities always compare equal.
///
/// `add`/`subtract` never check bounds and saturate at the `i64` limits.
/// Callers that must not go negative check [`covers`](Self::covers) first;
/// callers that must not lose value check
/// [`first_overflow`](Self::first_overflow).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceBundle(BTreeMap<Commodity, i64>);

impl ResourceBundle {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style setter: `ResourceBundle::new().with("currency", 100)`.
    pub fn with(mut self, commodity: impl Into<Commodity>, quantity: i64) -> Self {
        self.set(commodity, quantity);
        self
    }

    pub fn get(&self, commodity: &str) -> i64 {
        self.0.get(commodity).copied().unwrap_or(0)
    }

    pub fn set(&mut self, commodity: impl Into<Commodity>, quantity: i64) {
        let commodity = commodity.into();
        if quantity == 0 {
            self.0.remove(&commodity);
        } else {
            self.0.insert(commodity, quantity);
        }
    }

    /// True if the bundle holds a positive quantity of `commodity`.
    pub fn has(&self, commodity: &str) -> bool {
        self.get(commodity) > 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Commodity, i64)> {
        self.0.iter().map(|(c, q)| (c, *q))
    }

    pub fn commodities(&self) -> impl Iterator<Item = &Commodity> {
        self.0.keys()
    }

    /// True iff every quantity in `self` is at least the matching one in `other`.
    pub fn covers(&self, other: &ResourceBundle) -> bool {
        self.union_keys(other)
            .all(|c| self.get(c.as_str()) >= other.get(c.as_str()))
    }

    /// Per-commodity amounts by which `self` falls short of `other`.
    /// Empty exactly when `self.covers(other)`.
    pub fn shortfall(&self, other: &ResourceBundle) -> ResourceBundle {
        let mut missing = ResourceBundle::new();
        for c in self.union_keys(other) {
            let gap = other.get(c.as_str()) - self.get(c.as_str());
            if gap > 0 {
                missing.set(c.clone(), gap);
            }
        }
        missing
    }

    pub fn add(&mut self, other: &ResourceBundle) {
        for (c, q) in other.iter() {
            let total = self.get(c.as_str()).saturating_add(q);
            self.set(c.clone(), total);
        }
    }

    pub fn subtract(&mut self, other: &ResourceBundle) {
        for (c, q) in other.iter() {
            let total = self.get(c.as_str()).saturating_sub(q);
            self.set(c.clone(), total);
        }
    }

    /// First commodity whose quantity would leave the `i64` range if
    /// `incoming` were added.
    pub fn first_overflow<'a>(&self, incoming: &'a ResourceBundle) -> Option<&'a Commodity> {
        incoming
            .iter()
            .find(|(c, q)| self.get(c.as_str()).checked_add(*q).is_none())
            .map(|(c, _)| c)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_zero_or_positive(&self) -> bool {
        self.0.values().all(|q| *q >= 0)
    }

    fn union_keys<'a>(&'a self, other: &'a ResourceBundle) -> impl Iterator<Item = &'a Commodity> {
        let mut keys: Vec<&Commodity> = self.0.keys().chain(other.0.keys()).collect();
        keys.sort();
        keys.dedup();
        keys.into_iter()
    }
}

impl<C: Into<Commodity>> FromIterator<(C, i64)> for ResourceBundle {
    fn from_iter<I: IntoIterator<Item = (C, i64)>>(iter: I) -> Self {
        let mut bundle = ResourceBundle::new();
        for (c, q) in iter {
            bundle.set(c, q);
        }
        bundle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(items: &[(&str, i64)]) -> ResourceBundle {
        items.iter().map(|(c, q)| (*c, *q)).collect()
    }

    #[test]
    fn covers_checks_every_commodity() {
        let wallet = bundle(&[("currency", 1000), ("wood1", 3)]);
        assert!(wallet.covers(&bundle(&[("currency", 1000)])));
        assert!(wallet.covers(&bundle(&[("currency", 10), ("wood1", 3)])));
        assert!(!wallet.covers(&bundle(&[("wood1", 4)])));
        assert!(!wallet.covers(&bundle(&[("coal", 1)])));
        assert!(wallet.covers(&ResourceBundle::new()));
    }

    #[test]
    fn covers_fails_when_self_is_negative() {
        let overdrawn = bundle(&[("currency", -1)]);
        assert!(!overdrawn.covers(&ResourceBundle::new()));
    }

    #[test]
    fn add_and_subtract_are_elementwise() {
        let mut wallet = bundle(&[("currency", 100), ("wood1", 5)]);
        wallet.add(&bundle(&[("currency", 50), ("coal", 2)]));
        assert_eq!(wallet, bundle(&[("currency", 150), ("wood1", 5), ("coal", 2)]));

        wallet.subtract(&bundle(&[("wood1", 5), ("currency", 150)]));
        assert_eq!(wallet, bundle(&[("coal", 2)]));
    }

    #[test]
    fn subtract_is_not_bounds_checked() {
        let mut wallet = bundle(&[("currency", 5)]);
        wallet.subtract(&bundle(&[("currency", 100)]));
        assert_eq!(wallet.get("currency"), -95);
        assert!(!wallet.is_zero_or_positive());
    }

    #[test]
    fn zero_entries_collapse_to_empty() {
        let b = bundle(&[("currency", 0), ("wood1", 0)]);
        assert!(b.is_empty());
        assert_eq!(b, ResourceBundle::new());
    }

    #[test]
    fn overflow_is_detected_before_adding() {
        let full = bundle(&[("currency", i64::MAX), ("coal", 1)]);
        let incoming = bundle(&[("coal", 5), ("currency", 1)]);
        assert_eq!(full.first_overflow(&incoming).map(Commodity::as_str), Some("currency"));
        assert_eq!(full.first_overflow(&bundle(&[("coal", 5)])), None);

        let mut saturated = full.clone();
        saturated.add(&incoming);
        assert_eq!(saturated.get("currency"), i64::MAX);
    }

    #[test]
    fn shortfall_lists_only_missing_amounts() {
        let wallet = bundle(&[("currency", 5), ("wood1", 20)]);
        let ask = bundle(&[("currency", 100), ("wood1", 10)]);
        assert_eq!(wallet.shortfall(&ask), bundle(&[("currency", 95)]));
        assert!(wallet.shortfall(&bundle(&[("wood1", 1)])).is_empty());
    }

    #[test]
    fn has_means_strictly_positive() {
        let b = bundle(&[("currency", 1), ("coal", -2)]);
        assert!(b.has("currency"));
        assert!(!b.has("coal"));
        assert!(!b.has("wood1"));
    }

    #[test]
    fn serializes_as_plain_map() {
        let json = serde_json::to_value(bundle(&[("wood1", 10), ("currency", 100)])).unwrap();
        assert_eq!(json, serde_json::json!({"currency": 100, "wood1": 10}));
    }
}
