use serde::{Deserialize, Serialize};

use super::resources::ResourceBundle;
use crate::id::{ExchangeId, PlayerId, TerritoryId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum BondState {
    Pending,
    Paid,
    Forgiven,
}

string_enum!(BondState {
    Pending => "pending",
    Paid => "paid",
    Forgiven => "forgiven",
});

/// A debt: `borrower` owes `holder` the attached resources and territory.
///
/// Issued when one side of an accepted exchange elected to deliver "as
/// bond". `borrower` moves when the debt itself is traded; `holder` never
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bond {
    pub holder: PlayerId,
    pub borrower: PlayerId,
    #[serde(default, skip_serializing_if = "ResourceBundle::is_empty")]
    pub resources: ResourceBundle,
    pub territory: Option<TerritoryId>,
    /// Turns until the bond is due. Zero means perpetual.
    pub maturity: i64,
    /// Turns elapsed since issue.
    #[serde(default)]
    pub age: i64,
    pub state: BondState,
    /// Exchange whose acceptance issued this bond.
    #[serde(default)]
    pub origin_exchange: Option<ExchangeId>,
    /// Settlement exchange created by a bond payment.
    #[serde(default)]
    pub payment_exchange: Option<ExchangeId>,
}

impl Bond {
    pub fn new(
        holder: PlayerId,
        borrower: PlayerId,
        resources: ResourceBundle,
        territory: Option<TerritoryId>,
        maturity: i64,
    ) -> Self {
        Self {
            holder,
            borrower,
            resources,
            territory,
            maturity,
            age: 0,
            state: BondState::Pending,
            origin_exchange: None,
            payment_exchange: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == BondState::Pending
    }

    pub fn is_perpetual(&self) -> bool {
        self.maturity == 0
    }

    /// Pending past its maturity.
    pub fn is_delinquent(&self) -> bool {
        self.is_pending() && !self.is_perpetual() && self.age >= self.maturity
    }
}
