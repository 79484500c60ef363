use crate::config::LedgerConfig;
use crate::id::{BondId, CharterId, PlayerId, TerritoryId};
use crate::ledger::Ledger;
use crate::model::*;
use crate::shared::SharedLedger;

// -- Builder-style ref types --

/// A player being added to a [`Scenario`], enabling chained field setup.
///
/// Created by [`Scenario::player`]. Call [`.id()`](PlayerRef::id) to insert
/// the player and get its id.
#[must_use = "call .id() to insert the player"]
pub struct PlayerRef<'a> {
    scenario: &'a mut Scenario,
    player: Player,
}

impl PlayerRef<'_> {
    pub fn resources(mut self, v: ResourceBundle) -> Self { self.player.resources = v; self }
    pub fn give(mut self, commodity: &str, quantity: i64) -> Self {
        let current = self.player.resources.get(commodity);
        self.player.resources.set(commodity, current + quantity);
        self
    }
    pub fn delinquency(mut self, v: i64) -> Self { self.player.delinquency = v; self }

    /// Escape hatch: apply an arbitrary closure to the player record.
    pub fn with(mut self, f: impl FnOnce(&mut Player)) -> Self { f(&mut self.player); self }

    /// Insert the player and return its id.
    pub fn id(self) -> PlayerId {
        let id = PlayerId(self.scenario.ledger.id_gen.next_id());
        self.scenario.ledger.players.insert(id, self.player);
        id
    }
}

/// A territory being added to a [`Scenario`].
///
/// Created by [`Scenario::territory`]. Call [`.id()`](TerritoryRef::id) to
/// insert it.
#[must_use = "call .id() to insert the territory"]
pub struct TerritoryRef<'a> {
    scenario: &'a mut Scenario,
    territory: Territory,
}

impl TerritoryRef<'_> {
    pub fn owner(mut self, v: PlayerId) -> Self { self.territory.owner = Some(v); self }
    pub fn land_area(mut self, v: i64) -> Self { self.territory.land_area = v; self }

    pub fn id(self) -> TerritoryId {
        let id = TerritoryId(self.scenario.ledger.id_gen.next_id());
        self.scenario.ledger.territories.insert(id, self.territory);
        id
    }
}

/// A bond being added to a [`Scenario`] directly, without an originating exchange.
#[must_use = "call .id() to insert the bond"]
pub struct BondRef<'a> {
    scenario: &'a mut Scenario,
    bond: Bond,
}

impl BondRef<'_> {
    pub fn resources(mut self, v: ResourceBundle) -> Self { self.bond.resources = v; self }
    pub fn territory(mut self, v: TerritoryId) -> Self { self.bond.territory = Some(v); self }
    pub fn maturity(mut self, v: i64) -> Self { self.bond.maturity = v; self }
    pub fn age(mut self, v: i64) -> Self { self.bond.age = v; self }
    pub fn state(mut self, v: BondState) -> Self { self.bond.state = v; self }

    pub fn id(self) -> BondId {
        let id = BondId(self.scenario.ledger.id_gen.next_id());
        self.scenario.ledger.bonds.insert(id, self.bond);
        id
    }
}

// -- Scenario --

/// Seeds a [`Ledger`] with players, territories, bonds and charters for tests.
///
/// Records are written straight into the tables, skipping validation and the
/// journal, so a scenario can describe states the operations would refuse to
/// produce (a bond owed on a territory the borrower lost, say).
pub struct Scenario {
    ledger: Ledger,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario {
    /// A scenario over the full commodity schema, at turn 1.
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        let mut ledger = Ledger::new(config);
        ledger.set_time(GameTime::from_turn(1));
        Self { ledger }
    }

    pub fn at(mut self, time: GameTime) -> Self {
        self.ledger.set_time(time);
        self
    }

    pub fn player(&mut self, name: &str) -> PlayerRef<'_> {
        PlayerRef {
            scenario: self,
            player: Player::new(name),
        }
    }

    /// Shorthand for a player with an empty ledger.
    pub fn add_player(&mut self, name: &str) -> PlayerId {
        self.player(name).id()
    }

    pub fn territory(&mut self, name: &str, code: &str) -> TerritoryRef<'_> {
        let land_area = self.ledger.config.default_land_area;
        TerritoryRef {
            scenario: self,
            territory: Territory::new(name, code, land_area),
        }
    }

    /// Shorthand for a territory owned by `owner`.
    pub fn add_territory(&mut self, name: &str, code: &str, owner: PlayerId) -> TerritoryId {
        self.territory(name, code).owner(owner).id()
    }

    /// A pending, perpetual, empty bond of `borrower` to `holder`.
    pub fn bond(&mut self, holder: PlayerId, borrower: PlayerId) -> BondRef<'_> {
        BondRef {
            scenario: self,
            bond: Bond::new(holder, borrower, ResourceBundle::new(), None, 0),
        }
    }

    pub fn add_charter(&mut self, territory: TerritoryId, member: PlayerId, size: i64) -> CharterId {
        let id = CharterId(self.ledger.id_gen.next_id());
        self.ledger.charters.insert(
            id,
            Charter {
                territory,
                member,
                size,
            },
        );
        id
    }

    /// Consume the scenario and return the seeded ledger.
    pub fn build(self) -> Ledger {
        self.ledger
    }

    pub fn build_shared(self) -> SharedLedger {
        SharedLedger::new(self.ledger)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }
}
