use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::Result;
use crate::id::{BondId, ExchangeId, PlayerId};
use crate::ledger::Ledger;
use crate::model::Exchange;

/// A ledger shared between request handlers.
///
/// Each call holds the lock for the whole operation, so two handlers racing
/// to accept offers of the same territory are serialized and the loser sees
/// the winner's result during validation.
#[derive(Debug, Clone, Default)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Lock the ledger for a multi-step critical section or a consistent read.
    pub fn lock(&self) -> MutexGuard<'_, Ledger> {
        // Operations never leave the ledger half-updated, so a poisoned lock
        // still guards a consistent ledger.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn offer(&self, exchange: Exchange, user: PlayerId) -> Result<ExchangeId> {
        self.lock().offer(exchange, user)
    }

    pub fn accept(&self, id: ExchangeId, user: PlayerId) -> Result<()> {
        self.lock().accept(id, user)
    }

    pub fn reject(&self, id: ExchangeId, user: PlayerId) -> Result<()> {
        self.lock().reject(id, user)
    }

    pub fn cancel(&self, id: ExchangeId, user: PlayerId) -> Result<()> {
        self.lock().cancel(id, user)
    }

    pub fn pay_bond(&self, id: BondId, user: PlayerId) -> Result<ExchangeId> {
        self.lock().pay_bond(id, user)
    }

    pub fn forgive_bond(&self, id: BondId, user: PlayerId) -> Result<()> {
        self.lock().forgive_bond(id, user)
    }

    /// Snapshot of the current ledger state.
    pub fn snapshot(&self) -> Ledger {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExchangeSide, Player, ResourceBundle};

    #[test]
    fn clones_share_one_ledger() {
        let mut ledger = Ledger::default();
        let arthur = ledger.add_player(Player::new("arthur"));
        let brian = ledger.add_player(Player::new("brian"));
        ledger
            .grant_resources(arthur, &ResourceBundle::new().with("currency", 10))
            .unwrap();

        let shared = SharedLedger::new(ledger);
        let handle = shared.clone();
        let id = handle
            .offer(
                Exchange::new(arthur, brian)
                    .with_offeror(ExchangeSide::new().resources(ResourceBundle::new().with("currency", 10))),
                arthur,
            )
            .unwrap();
        shared.accept(id, brian).unwrap();
        assert_eq!(
            handle.snapshot().player(brian).unwrap().resources.get("currency"),
            10
        );
    }
}
