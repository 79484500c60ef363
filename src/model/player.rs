use serde::{Deserialize, Serialize};

use super::resources::ResourceBundle;

/// A participant's ledger account.
///
/// `resources` is only ever written by exchange and bond settlement (and
/// by the external seed/faucet path, [`Ledger::grant_resources`](crate::Ledger::grant_resources)).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Username in the outer application.
    pub name: String,
    #[serde(default)]
    pub resources: ResourceBundle,
    /// Number of bonds this player let mature without paying.
    #[serde(default)]
    pub delinquency: i64,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resources: ResourceBundle::new(),
            delinquency: 0,
        }
    }
}

/// How a player takes part in the map, derived from what it controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PlayerRole {
    /// No territories and no charters.
    Privateer,
    /// No territories, at least one charter.
    CharteredCompany,
    /// Owns at least one territory.
    HeadOfState,
}

string_enum!(PlayerRole {
    Privateer => "privateer",
    CharteredCompany => "chartered_company",
    HeadOfState => "head_of_state",
});

impl PlayerRole {
    pub fn from_holdings(territories: usize, charters: usize) -> Self {
        if territories > 0 {
            PlayerRole::HeadOfState
        } else if charters > 0 {
            PlayerRole::CharteredCompany
        } else {
            PlayerRole::Privateer
        }
    }
}
