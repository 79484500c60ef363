//! Postgres export of ledger snapshots.

mod load;
mod migrate;

pub use load::load_ledger;
pub use migrate::migrate;
