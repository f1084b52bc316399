use crate::types::{CoachId, LineupId, MatchId, PlayerId, TeamId};

/// Broad failure classes surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Coach, match or lineup absent
    NotFound,
    /// Coach has no team, or the team does not play in the match
    PreconditionFailed,
    /// Lineup already locked
    Conflict,
    /// Submitted players outside the coach's roster
    Validation,
    /// Backend failure
    Storage,
}

/// Errors raised by lineup store backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("lineup already exists for match {match_id} and coach {coach_id}")]
    DuplicateLineup { match_id: MatchId, coach_id: CoachId },

    #[error("lineup for match {match_id} and coach {coach_id} changed since it was read")]
    Stale { match_id: MatchId, coach_id: CoachId },

    #[error("lineup {0} is locked and cannot be rewritten")]
    LockedRecord(LineupId),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[cfg(feature = "sqlite")]
    #[error("failed to encode player list: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum LineupError {
    #[error("coach {0} not found")]
    CoachNotFound(CoachId),

    #[error("coach {0} is not assigned to any team")]
    CoachUnassigned(CoachId),

    #[error("match {0} not found")]
    MatchNotFound(MatchId),

    #[error("team {team_id} does not participate in match {match_id}")]
    TeamNotParticipating { team_id: TeamId, match_id: MatchId },

    #[error("lineup for match {match_id} belongs to team {lineup_team_id}, coach is now assigned to team {team_id}")]
    TeamReassigned {
        match_id: MatchId,
        lineup_team_id: TeamId,
        team_id: TeamId,
    },

    #[error("lineup not found for coach {coach_id} and match {match_id}")]
    LineupNotFound { coach_id: CoachId, match_id: MatchId },

    #[error("lineup {0} already locked")]
    LineupLocked(LineupId),

    #[error("players do not belong to coach team: {0:?}")]
    InvalidPlayers(Vec<PlayerId>),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl StoreError {
    /// The write lost a race with another writer; re-reading and retrying
    /// may succeed.
    pub fn is_write_conflict(&self) -> bool {
        matches!(
            self,
            StoreError::DuplicateLineup { .. } | StoreError::Stale { .. } | StoreError::LockedRecord(_)
        )
    }
}

impl LineupError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LineupError::CoachNotFound(_)
            | LineupError::MatchNotFound(_)
            | LineupError::LineupNotFound { .. } => ErrorKind::NotFound,
            LineupError::CoachUnassigned(_)
            | LineupError::TeamNotParticipating { .. }
            | LineupError::TeamReassigned { .. } => ErrorKind::PreconditionFailed,
            LineupError::LineupLocked(_) => ErrorKind::Conflict,
            LineupError::Store(e) if e.is_write_conflict() => ErrorKind::Conflict,
            LineupError::InvalidPlayers(_) => ErrorKind::Validation,
            LineupError::Store(_) => ErrorKind::Storage,
        }
    }
}

pub type Result<T, E = LineupError> = std::result::Result<T, E>;
