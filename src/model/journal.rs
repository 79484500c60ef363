use serde::{Deserialize, Serialize};

use super::bond::BondState;
use super::exchange::ExchangeState;
use super::resources::ResourceBundle;
use super::timestamp::GameTime;
use crate::id::{BondId, CharterId, ExchangeId, JournalEventId, PlayerId, TerritoryId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum JournalEventKind {
    ExchangeOffered,
    ExchangeAccepted,
    ExchangeRejected,
    ExchangeCanceled,
    BondRegistered,
    BondPaid,
    BondForgiven,
    BondMatured,
    CharterGranted,
    ResourcesGranted,
    TerritoryAssigned,
}

string_enum!(JournalEventKind {
    ExchangeOffered => "exchange_offered",
    ExchangeAccepted => "exchange_accepted",
    ExchangeRejected => "exchange_rejected",
    ExchangeCanceled => "exchange_canceled",
    BondRegistered => "bond_registered",
    BondPaid => "bond_paid",
    BondForgiven => "bond_forgiven",
    BondMatured => "bond_matured",
    CharterGranted => "charter_granted",
    ResourcesGranted => "resources_granted",
    TerritoryAssigned => "territory_assigned",
});

/// One committed ledger operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEvent {
    pub id: JournalEventId,
    pub kind: JournalEventKind,
    pub timestamp: GameTime,
    /// Player whose call produced the event, `None` for administrative paths.
    pub actor: Option<PlayerId>,
    pub exchange: Option<ExchangeId>,
    pub bond: Option<BondId>,
}

/// A single state change caused by a journal event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEffect {
    pub event_id: JournalEventId,
    pub change: StateChange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateChange {
    ResourcesDebited {
        player: PlayerId,
        resources: ResourceBundle,
    },
    ResourcesCredited {
        player: PlayerId,
        resources: ResourceBundle,
    },
    TerritoryTransferred {
        territory: TerritoryId,
        from: Option<PlayerId>,
        to: Option<PlayerId>,
    },
    BondIssued {
        bond: BondId,
        holder: PlayerId,
        borrower: PlayerId,
    },
    BondReassigned {
        bond: BondId,
        from: PlayerId,
        to: PlayerId,
    },
    BondStateChanged {
        bond: BondId,
        from: BondState,
        to: BondState,
    },
    ExchangeStateChanged {
        exchange: ExchangeId,
        from: ExchangeState,
        to: ExchangeState,
    },
    CharterGranted {
        charter: CharterId,
        territory: TerritoryId,
        member: PlayerId,
        size: i64,
    },
    DelinquencyIncreased {
        player: PlayerId,
        delinquency: i64,
    },
}

impl StateChange {
    /// The serde tag for this variant, for the Postgres `change_type` column.
    pub fn change_type_str(&self) -> &'static str {
        match self {
            StateChange::ResourcesDebited { .. } => "resources_debited",
            StateChange::ResourcesCredited { .. } => "resources_credited",
            StateChange::TerritoryTransferred { .. } => "territory_transferred",
            StateChange::BondIssued { .. } => "bond_issued",
            StateChange::BondReassigned { .. } => "bond_reassigned",
            StateChange::BondStateChanged { .. } => "bond_state_changed",
            StateChange::ExchangeStateChanged { .. } => "exchange_state_changed",
            StateChange::CharterGranted { .. } => "charter_granted",
            StateChange::DelinquencyIncreased { .. } => "delinquency_increased",
        }
    }
}
