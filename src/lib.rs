pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod flush;
pub mod id;
pub mod ledger;
pub mod model;
pub mod scenario;
pub mod shared;

pub use config::{CommodityDef, LedgerConfig};
pub use error::{ConfigError, LedgerError, Party, Result};
pub use id::{BondId, CharterId, ExchangeId, IdGenerator, JournalEventId, PlayerId, TerritoryId};
pub use ledger::Ledger;
pub use model::{
    Bond, BondState, Charter, Commodity, CommodityCategory, Exchange, ExchangeSide,
    ExchangeState, GameTime, JournalEffect, JournalEvent, JournalEventKind, Player, PlayerRole,
    ResourceBundle, StateChange, Territory,
};
pub use shared::SharedLedger;
