use std::collections::BTreeMap;

use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::id::{BondId, CharterId, ExchangeId, IdGenerator, JournalEventId, PlayerId, TerritoryId};
use crate::model::{
    Bond, BondState, Charter, Exchange, ExchangeState, GameTime, JournalEffect, JournalEvent,
    JournalEventKind, Player, PlayerRole, ResourceBundle, StateChange, Territory,
};

/// The store behind every exchange, bond and charter operation.
///
/// Holds the player ledgers, the territory registry, the bond and exchange
/// records, and an append-only journal of committed changes. Operations
/// live in [`crate::engine`]; this type owns lookups, queries and the
/// administrative paths used by the map loader and turn advancement.
#[derive(Debug, Clone)]
pub struct Ledger {
    pub config: LedgerConfig,
    pub players: BTreeMap<PlayerId, Player>,
    pub territories: BTreeMap<TerritoryId, Territory>,
    pub charters: BTreeMap<CharterId, Charter>,
    pub bonds: BTreeMap<BondId, Bond>,
    pub exchanges: BTreeMap<ExchangeId, Exchange>,
    pub journal_events: BTreeMap<JournalEventId, JournalEvent>,
    pub journal_effects: Vec<JournalEffect>,
    pub id_gen: IdGenerator,
    pub current_time: GameTime,
    undo: UndoLog,
}

/// Prior versions of rows changed inside open transactions.
#[derive(Debug, Clone, Default)]
struct UndoLog {
    depth: usize,
    entries: Vec<UndoEntry>,
}

#[derive(Debug, Clone)]
enum UndoEntry {
    Player(PlayerId, Player),
    Territory(TerritoryId, Territory),
    Bond(BondId, Bond),
    Exchange(ExchangeId, Exchange),
}

/// Where a transaction started: rows and ids created after it are discarded
/// on rollback, and undo entries past `undo_len` are replayed.
#[derive(Debug, Clone, Copy)]
struct Savepoint {
    next_id: u64,
    undo_len: usize,
    effects_len: usize,
}

impl Ledger {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            players: BTreeMap::new(),
            territories: BTreeMap::new(),
            charters: BTreeMap::new(),
            bonds: BTreeMap::new(),
            exchanges: BTreeMap::new(),
            journal_events: BTreeMap::new(),
            journal_effects: Vec::new(),
            id_gen: IdGenerator::new(),
            current_time: GameTime::default(),
            undo: UndoLog::default(),
        }
    }

    /// Set the game time stamped on subsequent operations.
    pub fn set_time(&mut self, time: GameTime) {
        self.current_time = time;
    }

    /// Run `op` as one unit: if it returns `Err`, every table (and the id
    /// generator and journal) is restored to its state before the call.
    ///
    /// Only rows reached through the ledger's own operations are logged;
    /// writes made straight into the public tables inside `op` are not
    /// undone. Transactions nest: an inner rollback leaves the outer
    /// transaction's earlier changes in place.
    pub fn transaction<T>(&mut self, op: impl FnOnce(&mut Ledger) -> Result<T>) -> Result<T> {
        let savepoint = Savepoint {
            next_id: self.id_gen.peek(),
            undo_len: self.undo.entries.len(),
            effects_len: self.journal_effects.len(),
        };
        self.undo.depth += 1;
        let result = op(self);
        self.undo.depth -= 1;
        if result.is_err() {
            self.rollback(savepoint);
        } else if self.undo.depth == 0 {
            self.undo.entries.clear();
        }
        result
    }

    fn rollback(&mut self, to: Savepoint) {
        let entries: Vec<UndoEntry> = self.undo.entries.drain(to.undo_len..).collect();
        for entry in entries.into_iter().rev() {
            match entry {
                UndoEntry::Player(id, row) => {
                    self.players.insert(id, row);
                }
                UndoEntry::Territory(id, row) => {
                    self.territories.insert(id, row);
                }
                UndoEntry::Bond(id, row) => {
                    self.bonds.insert(id, row);
                }
                UndoEntry::Exchange(id, row) => {
                    self.exchanges.insert(id, row);
                }
            }
        }

        // Ids are monotonic, so everything created since the savepoint sorts last.
        let first_new = to.next_id;
        self.players.split_off(&PlayerId(first_new));
        self.territories.split_off(&TerritoryId(first_new));
        self.charters.split_off(&CharterId(first_new));
        self.bonds.split_off(&BondId(first_new));
        self.exchanges.split_off(&ExchangeId(first_new));
        self.journal_events.split_off(&JournalEventId(first_new));
        self.journal_effects.truncate(to.effects_len);
        self.id_gen = IdGenerator::starting_from(first_new);
    }

    // -- Lookups --

    pub fn player(&self, id: PlayerId) -> Result<&Player> {
        self.players.get(&id).ok_or(LedgerError::UnknownPlayer(id))
    }

    pub(crate) fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player> {
        let row = self.players.get_mut(&id).ok_or(LedgerError::UnknownPlayer(id))?;
        if self.undo.depth > 0 {
            self.undo.entries.push(UndoEntry::Player(id, row.clone()));
        }
        Ok(row)
    }

    pub fn territory(&self, id: TerritoryId) -> Result<&Territory> {
        self.territories
            .get(&id)
            .ok_or(LedgerError::UnknownTerritory(id))
    }

    pub(crate) fn territory_mut(&mut self, id: TerritoryId) -> Result<&mut Territory> {
        let row = self
            .territories
            .get_mut(&id)
            .ok_or(LedgerError::UnknownTerritory(id))?;
        if self.undo.depth > 0 {
            self.undo.entries.push(UndoEntry::Territory(id, row.clone()));
        }
        Ok(row)
    }

    pub fn bond(&self, id: BondId) -> Result<&Bond> {
        self.bonds.get(&id).ok_or(LedgerError::UnknownBond(id))
    }

    pub(crate) fn bond_mut(&mut self, id: BondId) -> Result<&mut Bond> {
        let row = self.bonds.get_mut(&id).ok_or(LedgerError::UnknownBond(id))?;
        if self.undo.depth > 0 {
            self.undo.entries.push(UndoEntry::Bond(id, row.clone()));
        }
        Ok(row)
    }

    pub fn exchange(&self, id: ExchangeId) -> Result<&Exchange> {
        self.exchanges
            .get(&id)
            .ok_or(LedgerError::UnknownExchange(id))
    }

    pub(crate) fn exchange_mut(&mut self, id: ExchangeId) -> Result<&mut Exchange> {
        let row = self
            .exchanges
            .get_mut(&id)
            .ok_or(LedgerError::UnknownExchange(id))?;
        if self.undo.depth > 0 {
            self.undo.entries.push(UndoEntry::Exchange(id, row.clone()));
        }
        Ok(row)
    }

    // -- Administrative paths (map loading, seeding, turn advancement) --

    pub fn add_player(&mut self, player: Player) -> PlayerId {
        let id = PlayerId(self.id_gen.next_id());
        self.players.insert(id, player);
        id
    }

    pub fn add_territory(&mut self, territory: Territory) -> TerritoryId {
        let id = TerritoryId(self.id_gen.next_id());
        self.territories.insert(id, territory);
        id
    }

    /// Register a territory with the configured default land area.
    pub fn add_default_territory(
        &mut self,
        name: impl Into<String>,
        code: impl Into<String>,
    ) -> TerritoryId {
        let land_area = self.config.default_land_area;
        self.add_territory(Territory::new(name, code, land_area))
    }

    /// Directly set a territory's owner, bypassing exchange negotiation.
    pub fn assign_territory(&mut self, id: TerritoryId, owner: Option<PlayerId>) -> Result<()> {
        if let Some(owner) = owner {
            self.player(owner)?;
        }
        let territory = self.territory_mut(id)?;
        let from = std::mem::replace(&mut territory.owner, owner);
        let event = self.record(JournalEventKind::TerritoryAssigned, None, None, None);
        self.record_effect(
            event,
            StateChange::TerritoryTransferred {
                territory: id,
                from,
                to: owner,
            },
        );
        Ok(())
    }

    /// Credit resources from outside the ledger (initial seed, faucets).
    pub fn grant_resources(&mut self, id: PlayerId, resources: &ResourceBundle) -> Result<()> {
        self.validate_bundle(resources)?;
        self.check_credit(id, resources)?;
        self.player_mut(id)?.resources.add(resources);
        let event = self.record(JournalEventKind::ResourcesGranted, None, None, None);
        self.record_effect(
            event,
            StateChange::ResourcesCredited {
                player: id,
                resources: resources.clone(),
            },
        );
        Ok(())
    }

    /// Persist a directly constructed bond.
    ///
    /// The bond must be payable in principle: two distinct known players,
    /// a valid bundle and a non-negative maturity.
    pub fn insert_bond(&mut self, bond: Bond) -> Result<BondId> {
        self.player(bond.holder)?;
        self.player(bond.borrower)?;
        if bond.holder == bond.borrower {
            return Err(LedgerError::SelfTrade);
        }
        self.validate_bundle(&bond.resources)?;
        if bond.maturity < 0 {
            return Err(LedgerError::InvalidMaturity {
                maturity: bond.maturity,
            });
        }
        if let Some(territory) = bond.territory {
            self.territory(territory)?;
        }
        let id = BondId(self.id_gen.next_id());
        let (holder, borrower) = (bond.holder, bond.borrower);
        self.bonds.insert(id, bond);
        let event = self.record(JournalEventKind::BondRegistered, None, None, Some(id));
        self.record_effect(
            event,
            StateChange::BondIssued {
                bond: id,
                holder,
                borrower,
            },
        );
        Ok(id)
    }

    // -- Journal --

    pub(crate) fn record(
        &mut self,
        kind: JournalEventKind,
        actor: Option<PlayerId>,
        exchange: Option<ExchangeId>,
        bond: Option<BondId>,
    ) -> JournalEventId {
        let id = JournalEventId(self.id_gen.next_id());
        self.journal_events.insert(
            id,
            JournalEvent {
                id,
                kind,
                timestamp: self.current_time,
                actor,
                exchange,
                bond,
            },
        );
        id
    }

    pub(crate) fn record_effect(&mut self, event_id: JournalEventId, change: StateChange) {
        self.journal_effects.push(JournalEffect { event_id, change });
    }

    /// Effects recorded for one journal event, in order.
    pub fn effects_of(&self, event_id: JournalEventId) -> impl Iterator<Item = &StateChange> {
        self.journal_effects
            .iter()
            .filter(move |e| e.event_id == event_id)
            .map(|e| &e.change)
    }

    // -- Queries for the presentation layer --

    /// Exchanges where `player` is offeror or offeree, optionally filtered by state.
    pub fn exchanges_involving(
        &self,
        player: PlayerId,
        state: Option<ExchangeState>,
    ) -> impl Iterator<Item = (ExchangeId, &Exchange)> {
        self.exchanges
            .iter()
            .filter(move |(_, ex)| ex.offeror == player || ex.offeree == player)
            .filter(move |(_, ex)| state.is_none_or(|s| ex.state == s))
            .map(|(id, ex)| (*id, ex))
    }

    pub fn bonds_held_by(
        &self,
        player: PlayerId,
        state: Option<BondState>,
    ) -> impl Iterator<Item = (BondId, &Bond)> {
        self.bonds
            .iter()
            .filter(move |(_, b)| b.holder == player)
            .filter(move |(_, b)| state.is_none_or(|s| b.state == s))
            .map(|(id, b)| (*id, b))
    }

    pub fn bonds_owed_by(
        &self,
        player: PlayerId,
        state: Option<BondState>,
    ) -> impl Iterator<Item = (BondId, &Bond)> {
        self.bonds
            .iter()
            .filter(move |(_, b)| b.borrower == player)
            .filter(move |(_, b)| state.is_none_or(|s| b.state == s))
            .map(|(id, b)| (*id, b))
    }

    pub fn territories_of(&self, player: PlayerId) -> impl Iterator<Item = (TerritoryId, &Territory)> {
        self.territories
            .iter()
            .filter(move |(_, t)| t.is_controlled_by(player))
            .map(|(id, t)| (*id, t))
    }

    /// Charters granted to `player`.
    pub fn charters_of(&self, player: PlayerId) -> impl Iterator<Item = (CharterId, &Charter)> {
        self.charters
            .iter()
            .filter(move |(_, c)| c.member == player)
            .map(|(id, c)| (*id, c))
    }

    pub fn charters_in(&self, territory: TerritoryId) -> impl Iterator<Item = (CharterId, &Charter)> {
        self.charters
            .iter()
            .filter(move |(_, c)| c.territory == territory)
            .map(|(id, c)| (*id, c))
    }

    pub fn role_of(&self, player: PlayerId) -> PlayerRole {
        PlayerRole::from_holdings(
            self.territories_of(player).count(),
            self.charters_of(player).count(),
        )
    }

    // -- Conservation --

    /// Resources debited from offerors and held by Waiting exchanges.
    pub fn escrowed(&self) -> ResourceBundle {
        let mut total = ResourceBundle::new();
        for escrow in self.exchanges.values().filter_map(Exchange::escrow) {
            total.add(escrow);
        }
        total
    }

    /// Player balances plus escrow. Exchange and bond operations never
    /// change this; only [`grant_resources`](Self::grant_resources) does.
    pub fn total_supply(&self) -> ResourceBundle {
        let mut total = self.escrowed();
        for player in self.players.values() {
            total.add(&player.resources);
        }
        total
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}
