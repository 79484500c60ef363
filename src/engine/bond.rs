use tracing::{debug, info, warn};

use crate::error::{LedgerError, Result};
use crate::id::{BondId, ExchangeId, PlayerId};
use crate::ledger::Ledger;
use crate::model::{
    Bond, BondState, Exchange, ExchangeSide, ExchangeState, JournalEventKind, StateChange,
};

impl Ledger {
    /// Settle a pending bond: the borrower hands the bonded resources and
    /// territory to the holder through a regular offer and accept.
    ///
    /// Failures from that inner exchange are returned unchanged, and any
    /// partial work (the escrow debit of the inner offer) is rolled back.
    pub fn pay_bond(&mut self, id: BondId, user: PlayerId) -> Result<ExchangeId> {
        let bond = self.bond(id)?;
        if bond.borrower != user {
            debug!(bond = %id, %user, "pay refused: not the borrower");
            return Err(LedgerError::NotBorrower { user, bond: id });
        }
        if !bond.is_pending() {
            return Err(LedgerError::BondNotPending { bond: id });
        }
        let holder = bond.holder;
        let settlement = settlement_exchange(bond);

        let exchange = self
            .transaction(|ledger| {
                let exchange = ledger.offer(settlement, user)?;
                ledger.accept(exchange, holder)?;

                let bond = ledger.bond_mut(id)?;
                bond.state = BondState::Paid;
                bond.payment_exchange = Some(exchange);
                let event = ledger.record(JournalEventKind::BondPaid, Some(user), Some(exchange), Some(id));
                ledger.record_effect(
                    event,
                    StateChange::BondStateChanged {
                        bond: id,
                        from: BondState::Pending,
                        to: BondState::Paid,
                    },
                );
                Ok(exchange)
            })
            .inspect_err(|err| debug!(bond = %id, %user, %err, "bond payment failed"))?;

        info!(bond = %id, borrower = %user, %holder, %exchange, "bond paid");
        Ok(exchange)
    }

    /// Waive a pending bond. Only the holder may forgive; nothing moves.
    pub fn forgive_bond(&mut self, id: BondId, user: PlayerId) -> Result<()> {
        let bond = self.bond_mut(id)?;
        if bond.holder != user {
            debug!(bond = %id, %user, "forgive refused: not the holder");
            return Err(LedgerError::NotHolder { user, bond: id });
        }
        if !bond.is_pending() {
            return Err(LedgerError::BondNotPending { bond: id });
        }
        bond.state = BondState::Forgiven;
        let borrower = bond.borrower;

        let event = self.record(JournalEventKind::BondForgiven, Some(user), None, Some(id));
        self.record_effect(
            event,
            StateChange::BondStateChanged {
                bond: id,
                from: BondState::Pending,
                to: BondState::Forgiven,
            },
        );
        info!(bond = %id, holder = %user, %borrower, "bond forgiven");
        Ok(())
    }

    /// Whether [`pay_bond`](Self::pay_bond) would currently succeed for
    /// `borrower` (the bond's own borrower when `None`). Never mutates.
    pub fn is_bond_payable(&self, id: BondId, borrower: Option<PlayerId>) -> bool {
        let Ok(bond) = self.bond(id) else {
            return false;
        };
        let payer = borrower.unwrap_or(bond.borrower);
        if payer != bond.borrower || !bond.is_pending() {
            return false;
        }
        let mut settlement = settlement_exchange(bond);
        if self.validate_offer(&settlement, payer).is_err() {
            return false;
        }
        settlement.state = ExchangeState::Waiting;
        self.validate_acceptance(&settlement).is_ok()
    }

    /// Advance every pending bond by one turn.
    ///
    /// A non-perpetual bond whose age reaches its maturity marks its
    /// borrower delinquent once; the bond stays pending and payable.
    /// Returns the bonds that became overdue on this call.
    pub fn age_bonds(&mut self) -> Vec<BondId> {
        let pending: Vec<BondId> = self
            .bonds
            .iter()
            .filter(|(_, b)| b.is_pending())
            .map(|(id, _)| *id)
            .collect();
        let mut overdue = Vec::new();
        for id in pending {
            let Ok(bond) = self.bond_mut(id) else {
                continue;
            };
            bond.age += 1;
            if !bond.is_perpetual() && bond.age == bond.maturity {
                overdue.push((id, bond.borrower));
            }
        }

        let mut delinquent = Vec::with_capacity(overdue.len());
        for (id, borrower) in overdue {
            let Ok(player) = self.player_mut(borrower) else {
                warn!(bond = %id, %borrower, "overdue bond names an unknown borrower");
                continue;
            };
            player.delinquency += 1;
            let delinquency = player.delinquency;
            let event = self.record(JournalEventKind::BondMatured, None, None, Some(id));
            self.record_effect(
                event,
                StateChange::DelinquencyIncreased {
                    player: borrower,
                    delinquency,
                },
            );
            info!(bond = %id, %borrower, delinquency, "bond matured unpaid");
            delinquent.push(id);
        }
        delinquent
    }
}

/// The exchange that settles `bond`: borrower gives the bonded assets to
/// the holder and asks for nothing back.
fn settlement_exchange(bond: &Bond) -> Exchange {
    let mut side = ExchangeSide::new().resources(bond.resources.clone());
    side.territory = bond.territory;
    Exchange::new(bond.borrower, bond.holder).with_offeror(side)
}
