use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{CoachId, LineupId, LineupKey, MatchId, PlayerId, TeamId};

/// Lineup states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineupStatus {
    /// Selection may still be revised by the coach
    Draft,
    /// Selection is final; no further writes
    Locked,
}

impl LineupStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LineupStatus::Draft => "DRAFT",
            LineupStatus::Locked => "LOCKED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(LineupStatus::Draft),
            "LOCKED" => Some(LineupStatus::Locked),
            _ => None,
        }
    }
}

impl std::fmt::Display for LineupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A coach's starting/substitute selection for one match.
///
/// Values are treated as snapshots: every transition consumes the lineup and
/// returns a new one rather than editing the player lists in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lineup {
    /// Unique lineup ID
    pub id: LineupId,
    pub match_id: MatchId,
    /// Team the selection is drawn from (home or away side of the match)
    pub team_id: TeamId,
    pub coach_id: CoachId,
    pub status: LineupStatus,
    pub starting_player_ids: Vec<PlayerId>,
    pub substitute_player_ids: Vec<PlayerId>,
    /// When the lineup was locked
    pub locked_at: Option<NaiveDateTime>,
    /// Whether the fallback selection was applied at lock time
    pub auto_filled: bool,
}

impl Lineup {
    /// Fresh `Draft` lineup with empty selections and a newly generated ID.
    pub fn draft(match_id: MatchId, team_id: TeamId, coach_id: CoachId) -> Self {
        Self {
            id: nanoid::nanoid!(),
            match_id,
            team_id,
            coach_id,
            status: LineupStatus::Draft,
            starting_player_ids: Vec::new(),
            substitute_player_ids: Vec::new(),
            locked_at: None,
            auto_filled: false,
        }
    }

    pub fn key(&self) -> LineupKey {
        LineupKey::new(self.match_id, self.coach_id)
    }

    pub fn is_locked(&self) -> bool {
        self.status == LineupStatus::Locked
    }

    /// Replaces both player lists wholesale.
    pub fn with_selection(self, starting: Vec<PlayerId>, substitutes: Vec<PlayerId>) -> Self {
        Self {
            starting_player_ids: starting,
            substitute_player_ids: substitutes,
            ..self
        }
    }

    pub fn locked(self, now: NaiveDateTime, auto_filled: bool) -> Self {
        Self {
            status: LineupStatus::Locked,
            locked_at: Some(now),
            auto_filled,
            ..self
        }
    }
}
