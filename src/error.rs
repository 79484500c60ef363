use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::id::{BondId, ExchangeId, PlayerId, TerritoryId};
use crate::model::{Commodity, ExchangeState, ResourceBundle};

/// Which party of an exchange a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Offeror,
    Offeree,
}

impl Party {
    pub fn other(self) -> Party {
        match self {
            Party::Offeror => Party::Offeree,
            Party::Offeree => Party::Offeror,
        }
    }
}

impl std::fmt::Display for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Party::Offeror => "offeror",
            Party::Offeree => "offeree",
        })
    }
}

/// Every way a ledger operation can fail.
///
/// All variants except the `Unknown*` lookups are caller-recoverable
/// validation failures; the operation that returned them mutated nothing.
/// Messages are for logs only. The presentation layer renders its own text
/// from the structured fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // Authorization
    #[error("{user} is not the offeror of this exchange")]
    NotOfferor { user: PlayerId },
    #[error("{user} is not the offeree of this exchange")]
    NotOfferee { user: PlayerId },
    #[error("{user} is not the holder of {bond}")]
    NotHolder { user: PlayerId, bond: BondId },
    #[error("{user} is not the borrower of {bond}")]
    NotBorrower { user: PlayerId, bond: BondId },

    // State
    #[error("exchange is {state}, cannot {operation} it")]
    InvalidTransition {
        state: ExchangeState,
        operation: &'static str,
    },
    #[error("{bond} is no longer pending")]
    BondNotPending { bond: BondId },

    // Integrity
    #[error("offeror and offeree cannot be the same")]
    SelfTrade,
    #[error("empty exchange")]
    EmptyExchange,
    #[error("cannot build a bond of bond ({party} side)")]
    BondOfBond { party: Party },
    #[error("{holder} already holds {bond}; settle it with a bond payment instead")]
    HolderConflict { bond: BondId, holder: PlayerId },
    #[error("commodity {commodity} is not part of this ledger")]
    UnknownCommodity { commodity: Commodity },
    #[error("negative quantity of {commodity}")]
    NegativeQuantity { commodity: Commodity },
    #[error("bond maturity cannot be negative, got {maturity}")]
    InvalidMaturity { maturity: i64 },

    // Resource
    #[error("{party} {player} lacks resources for this exchange")]
    InsufficientResources {
        party: Party,
        player: PlayerId,
        shortfall: ResourceBundle,
    },
    #[error("{player}'s balance of {commodity} would overflow")]
    QuantityOverflow {
        player: PlayerId,
        commodity: Commodity,
    },
    #[error("{player} does not control {territory}")]
    NotController {
        player: PlayerId,
        territory: TerritoryId,
    },
    #[error("{territory} has {free}% of its land area available, requested {requested}%")]
    CapacityExceeded {
        territory: TerritoryId,
        free: i64,
        requested: i64,
    },
    #[error("grant size of {size}% is not within 1%-100%")]
    InvalidSize { size: i64 },
    #[error("{member} already has a charter in {territory}")]
    DuplicateCharter {
        member: PlayerId,
        territory: TerritoryId,
    },

    // Lookups
    #[error("unknown {0}")]
    UnknownPlayer(PlayerId),
    #[error("unknown {0}")]
    UnknownTerritory(TerritoryId),
    #[error("unknown {0}")]
    UnknownBond(BondId),
    #[error("unknown {0}")]
    UnknownExchange(ExchangeId),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config lists no commodities")]
    NoCommodities,
    #[error("commodity names cannot be empty")]
    EmptyCommodityName,
    #[error("commodity {0} is listed twice")]
    DuplicateCommodity(Commodity),
    #[error("default land area must be positive, got {0}")]
    InvalidLandArea(i64),
}
