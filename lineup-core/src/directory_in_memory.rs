use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::directory::{CoachDirectory, FixtureDirectory, RosterDirectory};
use crate::types::{Coach, CoachId, Fixture, MatchId, Player, PlayerId, TeamId};

/// Serializable snapshot used to seed an [`InMemoryDirectory`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectorySeed {
    #[serde(default)]
    pub coaches: Vec<Coach>,
    #[serde(default)]
    pub fixtures: Vec<Fixture>,
    #[serde(default)]
    pub players: Vec<Player>,
}

#[derive(Default)]
struct Tables {
    coaches: HashMap<CoachId, Coach>,
    fixtures: HashMap<MatchId, Fixture>,
    // Keyed by player ID so roster listings come out ascending.
    players: BTreeMap<PlayerId, Player>,
}

/// Directory backed by process memory. Serves coach, fixture and roster
/// lookups from one set of tables.
#[derive(Default)]
pub struct InMemoryDirectory {
    tables: RwLock<Tables>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: DirectorySeed) -> Self {
        let directory = Self::new();
        for coach in seed.coaches {
            directory.upsert_coach(coach);
        }
        for fixture in seed.fixtures {
            directory.upsert_fixture(fixture);
        }
        for player in seed.players {
            directory.upsert_player(player);
        }
        directory
    }

    pub fn upsert_coach(&self, coach: Coach) {
        self.tables.write().coaches.insert(coach.id, coach);
    }

    pub fn upsert_fixture(&self, fixture: Fixture) {
        self.tables.write().fixtures.insert(fixture.id, fixture);
    }

    pub fn upsert_player(&self, player: Player) {
        self.tables.write().players.insert(player.id, player);
    }

    pub fn remove_fixture(&self, match_id: MatchId) -> Option<Fixture> {
        self.tables.write().fixtures.remove(&match_id)
    }

    pub fn counts(&self) -> (usize, usize, usize) {
        let tables = self.tables.read();
        (tables.coaches.len(), tables.fixtures.len(), tables.players.len())
    }
}

impl CoachDirectory for InMemoryDirectory {
    fn coach(&self, coach_id: CoachId) -> Option<Coach> {
        self.tables.read().coaches.get(&coach_id).cloned()
    }
}

impl FixtureDirectory for InMemoryDirectory {
    fn fixture(&self, match_id: MatchId) -> Option<Fixture> {
        self.tables.read().fixtures.get(&match_id).cloned()
    }
}

impl RosterDirectory for InMemoryDirectory {
    fn roster_of(&self, team_id: TeamId) -> Vec<Player> {
        self.tables
            .read()
            .players
            .values()
            .filter(|p| p.team_id == team_id)
            .cloned()
            .collect()
    }
}
