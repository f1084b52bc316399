use crate::error::StoreError;
use crate::types::{CoachId, Lineup, LineupStatus, MatchId};

/// Defines the contract for lineup storage backends.
///
/// Methods take `&self`; backends keep their own short critical sections so
/// the store can be shared between request handlers and the sweeper.
/// Writes are conditional on the record the caller read, which keeps
/// read-check-write sequences atomic even across processes sharing one
/// backend. Within a process, [`crate::locks::KeyedLocks`] keeps callers
/// from racing in the first place.
pub trait LineupStore: Send + Sync {
    /// Look up the lineup a coach has for a match
    fn find_by_match_and_coach(
        &self,
        match_id: MatchId,
        coach_id: CoachId,
    ) -> Result<Option<Lineup>, StoreError>;

    /// All lineups currently in `status`
    fn find_by_status(&self, status: LineupStatus) -> Result<Vec<Lineup>, StoreError>;

    /// Write `lineup` if the record stored for its (match, coach) pair still
    /// equals `expected`, where `None` means no record exists yet.
    ///
    /// The check and the write are one atomic step. A `Locked` record is
    /// never rewritten. On any mismatch nothing is written and the error
    /// satisfies [`StoreError::is_write_conflict`].
    fn save(&self, expected: Option<&Lineup>, lineup: Lineup) -> Result<Lineup, StoreError>;
}

/// Shared precondition for [`LineupStore::save`], evaluated by backends
/// against the record they hold at write time.
pub(crate) fn check_expected(
    stored: Option<&Lineup>,
    expected: Option<&Lineup>,
    next: &Lineup,
) -> Result<(), StoreError> {
    let key = next.key();
    match (stored, expected) {
        (Some(stored), _) if stored.is_locked() => Err(StoreError::LockedRecord(stored.id.clone())),
        (None, None) => Ok(()),
        (Some(_), None) => Err(StoreError::DuplicateLineup {
            match_id: key.match_id,
            coach_id: key.coach_id,
        }),
        (Some(stored), Some(expected)) if stored == expected && stored.id == next.id => Ok(()),
        _ => Err(StoreError::Stale {
            match_id: key.match_id,
            coach_id: key.coach_id,
        }),
    }
}
