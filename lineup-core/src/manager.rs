//! Lineup state machine: validated submission, reads, and locking.
//!
//! Every read-check-write over a single lineup happens under the key lock
//! for its (match, coach) pair, so a submission racing a finalize observes
//! either the draft or the locked record, never a mix. The write itself is
//! conditional on the record that was read; when another process sharing
//! the store got there first, the whole decision is re-run against the
//! fresh record.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::directory::Directory;
use crate::error::{LineupError, Result};
use crate::infrastructure::LineupStore;
use crate::infrastructure_in_memory::InMemoryLineupStore;
use crate::locks::KeyedLocks;
use crate::types::*;

/// Size of the fallback starting eleven.
pub const DEFAULT_STARTING_PLAYERS: usize = 11;

/// Read-decide-write rounds before a contended write is reported.
const MAX_WRITE_ATTEMPTS: usize = 8;

/// Result of a finalize call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalizeOutcome {
    /// Lineup transitioned to `Locked`
    Locked { auto_filled: bool },
    /// Lineup was already locked; nothing was written
    AlreadyLocked,
}

pub struct LineupManager {
    store: Box<dyn LineupStore>,
    directory: Arc<dyn Directory>,
    locks: KeyedLocks<LineupKey>,
}

impl LineupManager {
    pub fn new(store: impl LineupStore + 'static, directory: Arc<dyn Directory>) -> Self {
        Self {
            store: Box::new(store),
            directory,
            locks: KeyedLocks::new(),
        }
    }

    /// Manager over an empty in-memory store.
    pub fn in_memory(directory: Arc<dyn Directory>) -> Self {
        Self::new(InMemoryLineupStore::new(), directory)
    }

    /// Manager over a SQLite database at `path`.
    /// Lineups persist across server restarts.
    #[cfg(feature = "sqlite")]
    pub fn with_sqlite(path: &str, directory: Arc<dyn Directory>) -> Result<Self> {
        let store = crate::infrastructure_sqlite::SqliteLineupStore::open(path)?;
        Ok(Self::new(store, directory))
    }

    pub fn directory(&self) -> &dyn Directory {
        self.directory.as_ref()
    }

    /// Create or revise the coach's draft for a match.
    ///
    /// Both lists are replaced wholesale; `substitutes` defaults to empty.
    /// Fails without writing anything if the coach, match or team checks
    /// fail, if the lineup is locked, or if any player is off-roster.
    pub fn submit_lineup(
        &self,
        coach_id: CoachId,
        match_id: MatchId,
        starting: Vec<PlayerId>,
        substitutes: Option<Vec<PlayerId>>,
    ) -> Result<Lineup> {
        let team_id = self.resolve_team(coach_id)?;
        let fixture = self
            .directory
            .fixture(match_id)
            .ok_or(LineupError::MatchNotFound(match_id))?;

        if !fixture.involves(team_id) {
            return Err(LineupError::TeamNotParticipating { team_id, match_id });
        }

        let _guard = self.locks.lock(LineupKey::new(match_id, coach_id));
        let substitutes = substitutes.unwrap_or_default();

        self.with_write_retry(match_id, coach_id, || {
            let stored = self.store.find_by_match_and_coach(match_id, coach_id)?;
            let lineup = match &stored {
                Some(existing) => existing.clone(),
                None => Lineup::draft(match_id, team_id, coach_id),
            };

            if lineup.is_locked() {
                return Err(LineupError::LineupLocked(lineup.id));
            }

            if lineup.team_id != team_id {
                return Err(LineupError::TeamReassigned {
                    match_id,
                    lineup_team_id: lineup.team_id,
                    team_id,
                });
            }

            self.validate_players(team_id, &starting, &substitutes)?;

            let next = lineup.with_selection(starting.clone(), substitutes.clone());
            let saved = self.store.save(stored.as_ref(), next)?;
            tracing::debug!(
                lineup_id = %saved.id,
                match_id,
                coach_id,
                starters = saved.starting_player_ids.len(),
                substitutes = saved.substitute_player_ids.len(),
                "Lineup draft saved"
            );
            Ok(saved)
        })
    }

    /// The coach's lineup for a match. The coach must exist but need not
    /// currently be assigned to a team.
    pub fn get_lineup(&self, coach_id: CoachId, match_id: MatchId) -> Result<Lineup> {
        self.directory
            .coach(coach_id)
            .ok_or(LineupError::CoachNotFound(coach_id))?;

        self.store
            .find_by_match_and_coach(match_id, coach_id)?
            .ok_or(LineupError::LineupNotFound { coach_id, match_id })
    }

    /// All lineups still in `Draft`.
    pub fn drafts(&self) -> Result<Vec<Lineup>> {
        Ok(self.store.find_by_status(LineupStatus::Draft)?)
    }

    /// Lock a lineup, filling in the fallback selection if no starters were
    /// ever chosen.
    ///
    /// Works from the stored record rather than `lineup` itself, so a
    /// selection written after the caller loaded its copy is kept. Calling
    /// this on a locked lineup is a no-op.
    pub fn finalize_lineup(&self, lineup: &Lineup, now: NaiveDateTime) -> Result<FinalizeOutcome> {
        let key = lineup.key();
        let _guard = self.locks.lock(key);

        self.with_write_retry(key.match_id, key.coach_id, || {
            let stored = self
                .store
                .find_by_match_and_coach(key.match_id, key.coach_id)?
                .ok_or(LineupError::LineupNotFound {
                    coach_id: key.coach_id,
                    match_id: key.match_id,
                })?;

            if stored.is_locked() {
                tracing::debug!(lineup_id = %stored.id, "Lineup already locked, skipping finalize");
                return Ok(FinalizeOutcome::AlreadyLocked);
            }

            let auto_filled = stored.starting_player_ids.is_empty();
            let next = if auto_filled {
                let (starting, substitutes) = self.fallback_selection(stored.team_id);
                stored.clone().with_selection(starting, substitutes)
            } else {
                stored.clone()
            };

            let saved = self.store.save(Some(&stored), next.locked(now, auto_filled))?;
            if auto_filled {
                tracing::warn!(
                    lineup_id = %saved.id,
                    match_id = saved.match_id,
                    team_id = saved.team_id,
                    starters = saved.starting_player_ids.len(),
                    "Lineup auto-filled with default players due to missing selection"
                );
            }
            tracing::info!(lineup_id = %saved.id, match_id = saved.match_id, "Lineup locked");
            Ok(FinalizeOutcome::Locked { auto_filled })
        })
    }

    // ─── Internals ──────────────────────────────────────────────────────────

    /// Re-runs `attempt` while its conditional write loses to another writer
    /// sharing the store. Each round re-reads, so a lock that landed in the
    /// meantime surfaces as `LineupLocked` or `AlreadyLocked`.
    fn with_write_retry<T>(
        &self,
        match_id: MatchId,
        coach_id: CoachId,
        mut attempt: impl FnMut() -> Result<T>,
    ) -> Result<T> {
        let mut round = 1;
        loop {
            match attempt() {
                Err(LineupError::Store(e)) if e.is_write_conflict() && round < MAX_WRITE_ATTEMPTS => {
                    tracing::debug!(match_id, coach_id, round, error = %e, "Lineup write lost a race, retrying");
                    round += 1;
                }
                result => return result,
            }
        }
    }

    fn resolve_team(&self, coach_id: CoachId) -> Result<TeamId> {
        let coach = self
            .directory
            .coach(coach_id)
            .ok_or(LineupError::CoachNotFound(coach_id))?;
        coach.team_id.ok_or(LineupError::CoachUnassigned(coach_id))
    }

    /// Rejects the submission if any listed player is not on the team,
    /// reporting each offending ID once in submission order.
    fn validate_players(
        &self,
        team_id: TeamId,
        starting: &[PlayerId],
        substitutes: &[PlayerId],
    ) -> Result<()> {
        if starting.is_empty() && substitutes.is_empty() {
            return Ok(());
        }

        let roster: HashSet<PlayerId> = self
            .directory
            .roster_of(team_id)
            .into_iter()
            .map(|p| p.id)
            .collect();

        let mut seen = HashSet::new();
        let invalid: Vec<PlayerId> = starting
            .iter()
            .chain(substitutes)
            .copied()
            .filter(|id| !roster.contains(id) && seen.insert(*id))
            .collect();

        if invalid.is_empty() {
            Ok(())
        } else {
            Err(LineupError::InvalidPlayers(invalid))
        }
    }

    /// First eleven by ascending player ID start, the rest sit on the bench.
    fn fallback_selection(&self, team_id: TeamId) -> (Vec<PlayerId>, Vec<PlayerId>) {
        let mut ids: Vec<PlayerId> = self
            .directory
            .roster_of(team_id)
            .into_iter()
            .map(|p| p.id)
            .collect();
        ids.sort_unstable();

        let substitutes = ids.split_off(ids.len().min(DEFAULT_STARTING_PLAYERS));
        (ids, substitutes)
    }
}
