//! Operations on a [`Ledger`](crate::ledger::Ledger): exchange negotiation,
//! bond settlement and aging, and territory charters.
//!
//! Every operation validates before it mutates; a returned error means the
//! ledger is unchanged.

mod bond;
mod charter;
mod exchange;

pub use charter::MAX_CHARTER_PERCENT;
