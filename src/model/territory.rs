use serde::{Deserialize, Serialize};

use crate::id::{PlayerId, TerritoryId};

/// A land parcel on the map.
///
/// Created by the map loader. `owner` only changes through an accepted
/// exchange or administrative assignment; there is no transfer method here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Territory {
    pub owner: Option<PlayerId>,
    pub name: String,
    /// Short map code (e.g. `"DK-84"`).
    pub code: String,
    pub land_area: i64,
}

impl Territory {
    pub fn new(name: impl Into<String>, code: impl Into<String>, land_area: i64) -> Self {
        Self {
            owner: None,
            name: name.into(),
            code: code.into(),
            land_area,
        }
    }

    pub fn is_controlled_by(&self, player: PlayerId) -> bool {
        self.owner == Some(player)
    }
}

/// A sub-lease of `size` percent of a territory's land area to `member`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charter {
    pub territory: TerritoryId,
    pub member: PlayerId,
    /// Percentage of land area, 1–100.
    pub size: i64,
}
