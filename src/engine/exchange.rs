//! The exchange negotiation state machine.
//!
//! `Unknown --offer--> Waiting --accept/reject/cancel--> Accepted | Rejected | Canceled`
//!
//! Offeror resources are escrowed (debited) at offer time. Territories and
//! bonds are not: the same territory may be offered to several players at
//! once, and ownership is re-checked when an offer is accepted, so the first
//! acceptance wins and the others fail with `NotController`.

use tracing::{debug, info};

use crate::error::{LedgerError, Party, Result};
use crate::id::{BondId, ExchangeId, JournalEventId, PlayerId};
use crate::ledger::Ledger;
use crate::model::{
    Bond, Exchange, ExchangeState, JournalEventKind, ResourceBundle, StateChange,
};

const PARTIES: [Party; 2] = [Party::Offeror, Party::Offeree];

impl Ledger {
    /// Offer `exchange` on behalf of `user`, who must be its offeror.
    ///
    /// On success the exchange is stored in state `Waiting` and the
    /// offeror's resources (unless offered as bond) are held in escrow.
    pub fn offer(&mut self, mut exchange: Exchange, user: PlayerId) -> Result<ExchangeId> {
        self.validate_offer(&exchange, user)
            .inspect_err(|err| debug!(%user, %err, "offer refused"))?;

        let escrow = exchange.offeror_side.transferred_resources().cloned();
        let offeror = exchange.offeror;
        let offeree = exchange.offeree;
        if let Some(escrow) = &escrow {
            self.player_mut(offeror)?.resources.subtract(escrow);
        }

        let id = ExchangeId(self.id_gen.next_id());
        exchange.state = ExchangeState::Waiting;
        exchange.offer_date = Some(self.current_time);
        self.exchanges.insert(id, exchange);

        let event = self.record(JournalEventKind::ExchangeOffered, Some(user), Some(id), None);
        if let Some(resources) = escrow {
            self.record_effect(
                event,
                StateChange::ResourcesDebited {
                    player: offeror,
                    resources,
                },
            );
        }
        self.record_effect(
            event,
            StateChange::ExchangeStateChanged {
                exchange: id,
                from: ExchangeState::Unknown,
                to: ExchangeState::Waiting,
            },
        );
        info!(exchange = %id, %offeror, %offeree, "exchange offered");
        Ok(id)
    }

    /// Accept a waiting exchange on behalf of `user`, who must be its offeree.
    ///
    /// Every precondition is re-checked against current balances, territory
    /// owners and bond states before anything moves. Either the whole
    /// settlement happens or none of it does.
    pub fn accept(&mut self, id: ExchangeId, user: PlayerId) -> Result<()> {
        let exchange = self.exchange(id)?.clone();
        self.validate_accept(&exchange, user)
            .inspect_err(|err| debug!(exchange = %id, %user, %err, "accept refused"))?;

        self.transaction(|ledger| {
            let event =
                ledger.record(JournalEventKind::ExchangeAccepted, Some(user), Some(id), None);
            for party in PARTIES {
                ledger.settle_side(id, &exchange, party, event)?;
            }
            ledger.finish(id, ExchangeState::Accepted, event)
        })?;
        info!(exchange = %id, offeror = %exchange.offeror, offeree = %exchange.offeree, "exchange accepted");
        Ok(())
    }

    /// Decline a waiting exchange. Only the offeree may reject.
    pub fn reject(&mut self, id: ExchangeId, user: PlayerId) -> Result<()> {
        self.close(id, user, Party::Offeree, ExchangeState::Rejected)
    }

    /// Withdraw a waiting exchange. Only the offeror may cancel.
    pub fn cancel(&mut self, id: ExchangeId, user: PlayerId) -> Result<()> {
        self.close(id, user, Party::Offeror, ExchangeState::Canceled)
    }

    fn close(
        &mut self,
        id: ExchangeId,
        user: PlayerId,
        allowed: Party,
        outcome: ExchangeState,
    ) -> Result<()> {
        let (kind, operation) = match outcome {
            ExchangeState::Rejected => (JournalEventKind::ExchangeRejected, "reject"),
            _ => (JournalEventKind::ExchangeCanceled, "cancel"),
        };
        let exchange = self.exchange(id)?;
        check_role(exchange, user, allowed)
            .and_then(|()| check_state(exchange, ExchangeState::Waiting, operation))
            .inspect_err(|err| debug!(exchange = %id, %user, %err, "{operation} refused"))?;

        let refund = exchange.escrow().cloned();
        let offeror = exchange.offeror;
        if let Some(refund) = &refund {
            self.check_credit(offeror, refund)
                .inspect_err(|err| debug!(exchange = %id, %user, %err, "{operation} refused"))?;
            self.player_mut(offeror)?.resources.add(refund);
        }

        let event = self.record(kind, Some(user), Some(id), None);
        if let Some(resources) = refund {
            self.record_effect(
                event,
                StateChange::ResourcesCredited {
                    player: offeror,
                    resources,
                },
            );
        }
        self.finish(id, outcome, event)?;
        info!(exchange = %id, %user, state = %outcome, "exchange closed");
        Ok(())
    }

    fn finish(
        &mut self,
        id: ExchangeId,
        outcome: ExchangeState,
        event: JournalEventId,
    ) -> Result<()> {
        let now = self.current_time;
        let exchange = self.exchange_mut(id)?;
        let from = exchange.state;
        exchange.state = outcome;
        exchange.answer_date = Some(now);
        self.record_effect(
            event,
            StateChange::ExchangeStateChanged {
                exchange: id,
                from,
                to: outcome,
            },
        );
        Ok(())
    }

    /// Move one side's contribution to the counterparty, or issue a bond for it.
    fn settle_side(
        &mut self,
        id: ExchangeId,
        exchange: &Exchange,
        party: Party,
        event: JournalEventId,
    ) -> Result<()> {
        let side = exchange.side(party);
        let giver = exchange.player(party);
        let receiver = exchange.counterparty(party);

        if side.as_bond {
            // Nothing to owe.
            if side.resources.is_empty() && side.territory.is_none() {
                return Ok(());
            }
            let mut bond = Bond::new(
                receiver,
                giver,
                side.resources.clone(),
                side.territory,
                side.as_bond_maturity,
            );
            bond.origin_exchange = Some(id);
            let bond_id = BondId(self.id_gen.next_id());
            self.bonds.insert(bond_id, bond);
            self.record_effect(
                event,
                StateChange::BondIssued {
                    bond: bond_id,
                    holder: receiver,
                    borrower: giver,
                },
            );
            info!(bond = %bond_id, holder = %receiver, borrower = %giver, "bond issued");
            return Ok(());
        }

        if !side.resources.is_empty() {
            // The offeror's share left their ledger at offer time.
            if party == Party::Offeree {
                self.player_mut(giver)?.resources.subtract(&side.resources);
                self.record_effect(
                    event,
                    StateChange::ResourcesDebited {
                        player: giver,
                        resources: side.resources.clone(),
                    },
                );
            }
            self.player_mut(receiver)?.resources.add(&side.resources);
            self.record_effect(
                event,
                StateChange::ResourcesCredited {
                    player: receiver,
                    resources: side.resources.clone(),
                },
            );
        }

        if let Some(territory) = side.territory {
            let from = self.territory_mut(territory)?.owner.replace(receiver);
            self.record_effect(
                event,
                StateChange::TerritoryTransferred {
                    territory,
                    from,
                    to: Some(receiver),
                },
            );
        }

        if let Some(bond) = side.bond {
            let from = std::mem::replace(&mut self.bond_mut(bond)?.borrower, receiver);
            self.record_effect(
                event,
                StateChange::BondReassigned {
                    bond,
                    from,
                    to: receiver,
                },
            );
        }
        Ok(())
    }

    // -- Validation --

    pub(crate) fn validate_offer(&self, exchange: &Exchange, user: PlayerId) -> Result<()> {
        check_role(exchange, user, Party::Offeror)?;
        check_state(exchange, ExchangeState::Unknown, "offer")?;
        if exchange.offeror == exchange.offeree {
            return Err(LedgerError::SelfTrade);
        }
        if exchange.is_empty() {
            return Err(LedgerError::EmptyExchange);
        }
        self.validate_bonds(exchange)?;
        for party in PARTIES {
            self.player(exchange.player(party))?;
            let side = exchange.side(party);
            self.validate_bundle(&side.resources)?;
            if let Some(territory) = side.territory {
                self.territory(territory)?;
            }
        }
        self.validate_resources(exchange)
    }

    fn validate_accept(&self, exchange: &Exchange, user: PlayerId) -> Result<()> {
        check_role(exchange, user, Party::Offeree)?;
        check_state(exchange, ExchangeState::Waiting, "accept")?;
        self.validate_acceptance(exchange)
    }

    /// The checks that must still hold when a waiting exchange settles.
    pub(crate) fn validate_acceptance(&self, exchange: &Exchange) -> Result<()> {
        self.validate_bonds(exchange)?;
        self.validate_territories(exchange)?;
        self.validate_resources(exchange)?;
        self.validate_credits(exchange)
    }

    /// Bundles must name known commodities and hold no negative quantities.
    pub(crate) fn validate_bundle(&self, bundle: &ResourceBundle) -> Result<()> {
        if let Some(commodity) = self.config.first_unknown(bundle) {
            return Err(LedgerError::UnknownCommodity {
                commodity: commodity.clone(),
            });
        }
        if let Some((commodity, _)) = bundle.iter().find(|(_, q)| *q < 0) {
            return Err(LedgerError::NegativeQuantity {
                commodity: commodity.clone(),
            });
        }
        Ok(())
    }

    fn validate_bonds(&self, exchange: &Exchange) -> Result<()> {
        // Unwinding a half-built bond of a bond is not supported, so this
        // is refused before anything else about the bonds is looked at.
        for party in PARTIES {
            let side = exchange.side(party);
            if side.as_bond && side.bond.is_some() {
                return Err(LedgerError::BondOfBond { party });
            }
            if side.as_bond && side.as_bond_maturity < 0 {
                return Err(LedgerError::InvalidMaturity {
                    maturity: side.as_bond_maturity,
                });
            }
        }
        for party in PARTIES {
            let Some(id) = exchange.side(party).bond else {
                continue;
            };
            let bond = self.bond(id)?;
            let player = exchange.player(party);
            if bond.borrower != player {
                return Err(LedgerError::NotBorrower { user: player, bond: id });
            }
            let counterparty = exchange.counterparty(party);
            if bond.holder == counterparty {
                return Err(LedgerError::HolderConflict {
                    bond: id,
                    holder: counterparty,
                });
            }
            if !bond.is_pending() {
                return Err(LedgerError::BondNotPending { bond: id });
            }
        }
        Ok(())
    }

    fn validate_territories(&self, exchange: &Exchange) -> Result<()> {
        for party in PARTIES {
            let side = exchange.side(party);
            if side.as_bond {
                continue;
            }
            let Some(id) = side.territory else {
                continue;
            };
            let player = exchange.player(party);
            if !self.territory(id)?.is_controlled_by(player) {
                return Err(LedgerError::NotController {
                    player,
                    territory: id,
                });
            }
        }
        Ok(())
    }

    /// Offeror resources are checked while the exchange is still being
    /// offered (they are escrowed afterwards); offeree resources are checked
    /// once it is waiting, since they are only taken at acceptance.
    fn validate_resources(&self, exchange: &Exchange) -> Result<()> {
        let party = if exchange.state == ExchangeState::Unknown {
            Party::Offeror
        } else {
            Party::Offeree
        };
        let side = exchange.side(party);
        if side.as_bond || side.resources.is_empty() {
            return Ok(());
        }
        let player = exchange.player(party);
        let balance = &self.player(player)?.resources;
        if !balance.covers(&side.resources) {
            return Err(LedgerError::InsufficientResources {
                party,
                player,
                shortfall: balance.shortfall(&side.resources),
            });
        }
        Ok(())
    }

    /// Each receiver's balance must stay within `i64` after settlement.
    /// Credits land on current balances: the offeree is credited before its
    /// own side is debited, the offeror after its escrow left.
    fn validate_credits(&self, exchange: &Exchange) -> Result<()> {
        for party in PARTIES {
            if let Some(incoming) = exchange.side(party).transferred_resources() {
                self.check_credit(exchange.counterparty(party), incoming)?;
            }
        }
        Ok(())
    }

    pub(crate) fn check_credit(&self, player: PlayerId, incoming: &ResourceBundle) -> Result<()> {
        match self.player(player)?.resources.first_overflow(incoming) {
            Some(commodity) => Err(LedgerError::QuantityOverflow {
                player,
                commodity: commodity.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn check_role(exchange: &Exchange, user: PlayerId, party: Party) -> Result<()> {
    if exchange.player(party) == user {
        return Ok(());
    }
    Err(match party {
        Party::Offeror => LedgerError::NotOfferor { user },
        Party::Offeree => LedgerError::NotOfferee { user },
    })
}

fn check_state(exchange: &Exchange, expected: ExchangeState, operation: &'static str) -> Result<()> {
    if exchange.state == expected {
        Ok(())
    } else {
        Err(LedgerError::InvalidTransition {
            state: exchange.state,
            operation,
        })
    }
}
