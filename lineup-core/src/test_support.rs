use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;

use crate::directory_in_memory::InMemoryDirectory;
use crate::manager::LineupManager;
use crate::types::{Coach, Fixture, Player};

pub const HOME_TEAM: u64 = 10;
pub const AWAY_TEAM: u64 = 20;
pub const OTHER_TEAM: u64 = 30;

/// Coach of the home side
pub const HOME_COACH: u64 = 1;
/// Second coach of the home side, never submits
pub const ASSISTANT_COACH: u64 = 2;
pub const AWAY_COACH: u64 = 3;
pub const FREE_AGENT_COACH: u64 = 4;
pub const OUTSIDER_COACH: u64 = 5;

pub const MATCH: u64 = 100;
pub const UNSCHEDULED_MATCH: u64 = 200;

pub fn kickoff() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 14)
        .and_then(|d| d.and_hms_opt(15, 0, 0))
        .expect("valid kickoff")
}

/// Home team players 1..=14, away team 101..=116, other team 201..=211.
pub fn seeded_directory() -> Arc<InMemoryDirectory> {
    let directory = InMemoryDirectory::new();

    for (id, team_id) in [
        (HOME_COACH, Some(HOME_TEAM)),
        (ASSISTANT_COACH, Some(HOME_TEAM)),
        (AWAY_COACH, Some(AWAY_TEAM)),
        (FREE_AGENT_COACH, None),
        (OUTSIDER_COACH, Some(OTHER_TEAM)),
    ] {
        directory.upsert_coach(Coach { id, team_id });
    }

    let kickoff = kickoff();
    directory.upsert_fixture(Fixture {
        id: MATCH,
        date: kickoff.date(),
        time: Some(kickoff.time()),
        home_team_id: HOME_TEAM,
        away_team_id: AWAY_TEAM,
    });
    directory.upsert_fixture(Fixture {
        id: UNSCHEDULED_MATCH,
        date: kickoff.date(),
        time: None,
        home_team_id: HOME_TEAM,
        away_team_id: AWAY_TEAM,
    });

    // Insert out of order; listings must still come back ascending.
    for id in (1..=14).rev() {
        directory.upsert_player(Player::new(id, HOME_TEAM, format!("Home {}", id)));
    }
    for id in 101..=116 {
        directory.upsert_player(Player::new(id, AWAY_TEAM, format!("Away {}", id)));
    }
    for id in 201..=211 {
        directory.upsert_player(Player::new(id, OTHER_TEAM, format!("Other {}", id)));
    }

    Arc::new(directory)
}

pub fn manager(directory: &Arc<InMemoryDirectory>) -> Arc<LineupManager> {
    Arc::new(LineupManager::in_memory(directory.clone()))
}
