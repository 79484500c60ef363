use serde::{Deserialize, Serialize};

use super::resources::{CommodityCategory, ResourceBundle};
use super::timestamp::GameTime;
use crate::config::LedgerConfig;
use crate::error::Party;
use crate::id::{BondId, PlayerId, TerritoryId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ExchangeState {
    /// Constructed but not yet offered. Never stored in a ledger.
    Unknown,
    Waiting,
    Accepted,
    Rejected,
    Canceled,
}

string_enum!(ExchangeState {
    Unknown => "unknown",
    Waiting => "waiting",
    Accepted => "accepted",
    Rejected => "rejected",
    Canceled => "canceled",
});

impl ExchangeState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExchangeState::Accepted | ExchangeState::Rejected | ExchangeState::Canceled
        )
    }
}

/// What one party puts into an exchange.
///
/// With `as_bond` set, the side's resources and territory are not handed
/// over on acceptance; a bond for them is issued instead, with this side as
/// borrower.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeSide {
    #[serde(default, skip_serializing_if = "ResourceBundle::is_empty")]
    pub resources: ResourceBundle,
    #[serde(default)]
    pub territory: Option<TerritoryId>,
    /// An existing bond whose debt this side passes on.
    #[serde(default)]
    pub bond: Option<BondId>,
    #[serde(default)]
    pub as_bond: bool,
    #[serde(default)]
    pub as_bond_maturity: i64,
}

impl ExchangeSide {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resources(mut self, resources: ResourceBundle) -> Self {
        self.resources = resources;
        self
    }

    pub fn territory(mut self, territory: TerritoryId) -> Self {
        self.territory = Some(territory);
        self
    }

    pub fn bond(mut self, bond: BondId) -> Self {
        self.bond = Some(bond);
        self
    }

    /// Deliver this side later, as a bond maturing in `maturity` turns
    /// (zero for a perpetual bond).
    pub fn as_bond(mut self, maturity: i64) -> Self {
        self.as_bond = true;
        self.as_bond_maturity = maturity;
        self
    }

    /// True if the side contributes nothing.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty() && self.territory.is_none() && self.bond.is_none()
    }

    /// Resources that leave the giver's ledger on settlement.
    pub(crate) fn transferred_resources(&self) -> Option<&ResourceBundle> {
        (!self.as_bond && !self.resources.is_empty()).then_some(&self.resources)
    }
}

/// A negotiated transfer between two players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub offeror: PlayerId,
    pub offeree: PlayerId,
    #[serde(default)]
    pub offeror_side: ExchangeSide,
    #[serde(default)]
    pub offeree_side: ExchangeSide,
    pub state: ExchangeState,
    pub offer_date: Option<GameTime>,
    pub answer_date: Option<GameTime>,
}

impl Exchange {
    pub fn new(offeror: PlayerId, offeree: PlayerId) -> Self {
        Self {
            offeror,
            offeree,
            offeror_side: ExchangeSide::default(),
            offeree_side: ExchangeSide::default(),
            state: ExchangeState::Unknown,
            offer_date: None,
            answer_date: None,
        }
    }

    pub fn with_offeror(mut self, side: ExchangeSide) -> Self {
        self.offeror_side = side;
        self
    }

    pub fn with_offeree(mut self, side: ExchangeSide) -> Self {
        self.offeree_side = side;
        self
    }

    pub fn side(&self, party: Party) -> &ExchangeSide {
        match party {
            Party::Offeror => &self.offeror_side,
            Party::Offeree => &self.offeree_side,
        }
    }

    pub fn player(&self, party: Party) -> PlayerId {
        match party {
            Party::Offeror => self.offeror,
            Party::Offeree => self.offeree,
        }
    }

    pub fn counterparty(&self, party: Party) -> PlayerId {
        self.player(party.other())
    }

    pub fn is_empty(&self) -> bool {
        self.offeror_side.is_empty() && self.offeree_side.is_empty()
    }

    /// Exactly one side gives something.
    pub fn is_gift(&self) -> bool {
        self.offeror_side.is_empty() != self.offeree_side.is_empty()
    }

    /// Resources debited from the offeror at offer time and not yet
    /// settled or refunded.
    pub fn escrow(&self) -> Option<&ResourceBundle> {
        if self.state == ExchangeState::Waiting {
            self.offeror_side.transferred_resources()
        } else {
            None
        }
    }

    pub fn includes_category(&self, config: &LedgerConfig, category: CommodityCategory) -> bool {
        config.bundle_has_category(&self.offeror_side.resources, category)
            || config.bundle_has_category(&self.offeree_side.resources, category)
    }

    pub fn includes_currency(&self, config: &LedgerConfig) -> bool {
        self.includes_category(config, CommodityCategory::Currency)
    }

    pub fn includes_agricultural(&self, config: &LedgerConfig) -> bool {
        self.includes_category(config, CommodityCategory::Agricultural)
    }

    pub fn includes_manufactured(&self, config: &LedgerConfig) -> bool {
        self.includes_category(config, CommodityCategory::Manufactured)
    }

    pub fn includes_territories(&self) -> bool {
        self.offeror_side.territory.is_some() || self.offeree_side.territory.is_some()
    }

    /// True if either side passes on an existing bond or issues a new one.
    pub fn includes_bonds(&self) -> bool {
        [&self.offeror_side, &self.offeree_side]
            .iter()
            .any(|s| s.bond.is_some() || s.as_bond)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn currency(n: i64) -> ResourceBundle {
        ResourceBundle::new().with("currency", n)
    }

    #[test]
    fn gift_is_exclusive_or_of_sides() {
        let a = PlayerId(1);
        let b = PlayerId(2);
        let donation = Exchange::new(a, b).with_offeror(ExchangeSide::new().resources(currency(1)));
        assert!(donation.is_gift());

        let ask = Exchange::new(a, b).with_offeree(ExchangeSide::new().territory(TerritoryId(5)));
        assert!(ask.is_gift());

        let barter = donation
            .clone()
            .with_offeree(ExchangeSide::new().resources(ResourceBundle::new().with("wood1", 10)));
        assert!(!barter.is_gift());

        assert!(!Exchange::new(a, b).is_gift());
    }

    #[test]
    fn zero_quantity_side_is_empty() {
        let ex = Exchange::new(PlayerId(1), PlayerId(2))
            .with_offeror(ExchangeSide::new().resources(currency(0)));
        assert!(ex.is_empty());
    }

    #[test]
    fn category_predicates_follow_schema() {
        let config = LedgerConfig::default();
        let ex = Exchange::new(PlayerId(1), PlayerId(2))
            .with_offeror(ExchangeSide::new().resources(currency(100)))
            .with_offeree(ExchangeSide::new().resources(ResourceBundle::new().with("tea", 4)));
        assert!(ex.includes_currency(&config));
        assert!(ex.includes_agricultural(&config));
        assert!(!ex.includes_manufactured(&config));
        assert!(!ex.includes_territories());
        assert!(!ex.includes_bonds());
    }

    #[test]
    fn as_bond_counts_as_including_bonds() {
        let ex = Exchange::new(PlayerId(1), PlayerId(2))
            .with_offeror(ExchangeSide::new().resources(currency(5)).as_bond(3));
        assert!(ex.includes_bonds());
        assert_eq!(ex.offeror_side.as_bond_maturity, 3);
    }

    #[test]
    fn escrow_only_while_waiting_and_not_as_bond() {
        let mut ex = Exchange::new(PlayerId(1), PlayerId(2))
            .with_offeror(ExchangeSide::new().resources(currency(100)));
        assert_eq!(ex.escrow(), None);
        ex.state = ExchangeState::Waiting;
        assert_eq!(ex.escrow(), Some(&currency(100)));
        ex.offeror_side.as_bond = true;
        assert_eq!(ex.escrow(), None);
    }

    #[test]
    fn terminal_states() {
        assert!(!ExchangeState::Unknown.is_terminal());
        assert!(!ExchangeState::Waiting.is_terminal());
        assert!(ExchangeState::Accepted.is_terminal());
        assert!(ExchangeState::Rejected.is_terminal());
        assert!(ExchangeState::Canceled.is_terminal());
    }
}
