use tracing::{debug, info};

use crate::error::{LedgerError, Result};
use crate::id::{CharterId, PlayerId, TerritoryId};
use crate::ledger::Ledger;
use crate::model::{Charter, JournalEventKind, StateChange};

/// Charters in one territory can lease out at most this share of it.
pub const MAX_CHARTER_PERCENT: i64 = 100;

impl Ledger {
    /// Build a charter leasing `size` percent of `territory` to `member`.
    ///
    /// The result is not persisted; hand it to
    /// [`commit_charter`](Self::commit_charter) to record it.
    pub fn grant_charter(
        &self,
        leaser: PlayerId,
        territory: TerritoryId,
        member: PlayerId,
        size: i64,
    ) -> Result<Charter> {
        check_size(size)?;
        if !self.territory(territory)?.is_controlled_by(leaser) {
            debug!(%leaser, %territory, "charter refused: leaser does not control territory");
            return Err(LedgerError::NotController {
                player: leaser,
                territory,
            });
        }
        self.player(member)?;
        self.check_charter_room(territory, member, size)?;
        Ok(Charter {
            territory,
            member,
            size,
        })
    }

    /// Persist a charter, re-checking the territory's remaining room first.
    pub fn commit_charter(&mut self, charter: Charter) -> Result<CharterId> {
        check_size(charter.size)?;
        self.territory(charter.territory)?;
        self.player(charter.member)?;
        self.check_charter_room(charter.territory, charter.member, charter.size)?;

        let id = CharterId(self.id_gen.next_id());
        let (territory, member, size) = (charter.territory, charter.member, charter.size);
        self.charters.insert(id, charter);
        let event = self.record(JournalEventKind::CharterGranted, None, None, None);
        self.record_effect(
            event,
            StateChange::CharterGranted {
                charter: id,
                territory,
                member,
                size,
            },
        );
        info!(charter = %id, %territory, %member, size, "charter granted");
        Ok(id)
    }

    /// Percent of `territory` not yet leased out.
    pub fn free_charter_room(&self, territory: TerritoryId) -> i64 {
        let allotted: i64 = self.charters_in(territory).map(|(_, c)| c.size).sum();
        MAX_CHARTER_PERCENT - allotted
    }

    fn check_charter_room(&self, territory: TerritoryId, member: PlayerId, size: i64) -> Result<()> {
        if self.charters_in(territory).any(|(_, c)| c.member == member) {
            return Err(LedgerError::DuplicateCharter { member, territory });
        }
        let free = self.free_charter_room(territory);
        if free < size {
            return Err(LedgerError::CapacityExceeded {
                territory,
                free,
                requested: size,
            });
        }
        Ok(())
    }
}

fn check_size(size: i64) -> Result<()> {
    if (1..=MAX_CHARTER_PERCENT).contains(&size) {
        Ok(())
    } else {
        Err(LedgerError::InvalidSize { size })
    }
}
