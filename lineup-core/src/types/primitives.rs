use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

pub type CoachId = u64;
pub type TeamId = u64;
pub type MatchId = u64;
pub type PlayerId = u64;
pub type LineupId = String;

/// A player as listed by the roster directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub team_id: TeamId,
    pub name: String,
    #[serde(default)]
    pub position: Option<String>,
}

impl Player {
    pub fn new(id: PlayerId, team_id: TeamId, name: impl Into<String>) -> Self {
        Self {
            id,
            team_id,
            name: name.into(),
            position: None,
        }
    }
}

/// A coach and the team they are currently assigned to, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coach {
    pub id: CoachId,
    #[serde(default)]
    pub team_id: Option<TeamId>,
}

/// Read-only view of a scheduled match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: MatchId,
    pub date: NaiveDate,
    /// Kickoff time. A fixture without one has no determinable start.
    #[serde(default)]
    pub time: Option<NaiveTime>,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
}

impl Fixture {
    /// Scheduled start instant, or `None` when no kickoff time is set.
    pub fn kickoff(&self) -> Option<NaiveDateTime> {
        self.time.map(|time| self.date.and_time(time))
    }

    /// Whether `team_id` plays in this match, home or away.
    pub fn involves(&self, team_id: TeamId) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }
}

/// Composite key identifying one coach's lineup for one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineupKey {
    pub match_id: MatchId,
    pub coach_id: CoachId,
}

impl LineupKey {
    pub fn new(match_id: MatchId, coach_id: CoachId) -> Self {
        Self { match_id, coach_id }
    }
}

impl std::fmt::Display for LineupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "match:{}/coach:{}", self.match_id, self.coach_id)
    }
}
