use crate::types::{Coach, CoachId, Fixture, MatchId, Player, TeamId};

// Read-only lookups owned by other services. Implementations are expected to
// answer promptly; the manager does not retry or cache them.

/// Resolves coaches to their assigned team.
pub trait CoachDirectory {
    fn coach(&self, coach_id: CoachId) -> Option<Coach>;
}

/// Resolves scheduled matches.
pub trait FixtureDirectory {
    fn fixture(&self, match_id: MatchId) -> Option<Fixture>;
}

/// Lists the players of a team, ascending by player ID.
pub trait RosterDirectory {
    fn roster_of(&self, team_id: TeamId) -> Vec<Player>;
}

/// Convenience bound for a single backend serving all three lookups.
pub trait Directory: CoachDirectory + FixtureDirectory + RosterDirectory + Send + Sync {}

impl<T> Directory for T where T: CoachDirectory + FixtureDirectory + RosterDirectory + Send + Sync {}
