use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::StoreError;
use crate::infrastructure::{check_expected, LineupStore};
use crate::types::{CoachId, Lineup, LineupId, LineupKey, LineupStatus, MatchId};

#[derive(Default)]
struct Tables {
    // Map of Lineup ID -> Lineup
    lineups: HashMap<LineupId, Lineup>,
    // Map of (match, coach) -> Lineup ID
    by_key: HashMap<LineupKey, LineupId>,
}

#[derive(Default)]
pub struct InMemoryLineupStore {
    tables: RwLock<Tables>,
}

impl InMemoryLineupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tables.read().lineups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LineupStore for InMemoryLineupStore {
    fn find_by_match_and_coach(
        &self,
        match_id: MatchId,
        coach_id: CoachId,
    ) -> Result<Option<Lineup>, StoreError> {
        let tables = self.tables.read();
        Ok(tables
            .by_key
            .get(&LineupKey::new(match_id, coach_id))
            .and_then(|id| tables.lineups.get(id))
            .cloned())
    }

    fn find_by_status(&self, status: LineupStatus) -> Result<Vec<Lineup>, StoreError> {
        let tables = self.tables.read();
        let mut lineups: Vec<Lineup> = tables
            .lineups
            .values()
            .filter(|l| l.status == status)
            .cloned()
            .collect();
        // HashMap order is arbitrary; keep listings stable across calls.
        lineups.sort_by_key(|l| (l.match_id, l.coach_id));
        Ok(lineups)
    }

    fn save(&self, expected: Option<&Lineup>, lineup: Lineup) -> Result<Lineup, StoreError> {
        let mut tables = self.tables.write();
        let key = lineup.key();

        let stored = tables.by_key.get(&key).and_then(|id| tables.lineups.get(id));
        check_expected(stored, expected, &lineup)?;

        tables.by_key.insert(key, lineup.id.clone());
        tables.lineups.insert(lineup.id.clone(), lineup.clone());
        Ok(lineup)
    }
}
