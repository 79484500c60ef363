#[macro_use]
mod macros;

pub mod bond;
pub mod exchange;
pub mod journal;
pub mod player;
pub mod resources;
pub mod territory;
pub mod timestamp;

pub use bond::{Bond, BondState};
pub use exchange::{Exchange, ExchangeSide, ExchangeState};
pub use journal::{JournalEffect, JournalEvent, JournalEventKind, StateChange};
pub use player::{Player, PlayerRole};
pub use resources::{Commodity, CommodityCategory, ResourceBundle};
pub use territory::{Charter, Territory};
pub use timestamp::GameTime;
