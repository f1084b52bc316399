#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDateTime};

    use crate::sweeper::{AutoLockSweeper, SweeperConfig};
    use crate::test_support::*;
    use crate::types::{Fixture, LineupStatus};

    fn ids(range: std::ops::RangeInclusive<u64>) -> Vec<u64> {
        range.collect()
    }

    fn sweep_draft_at(now: NaiveDateTime) -> LineupStatus {
        let manager = manager(&seeded_directory());
        manager
            .submit_lineup(HOME_COACH, MATCH, ids(1..=11), None)
            .unwrap();

        let sweeper = AutoLockSweeper::new(manager.clone(), SweeperConfig::default());
        sweeper.sweep(now).unwrap();

        manager.get_lineup(HOME_COACH, MATCH).unwrap().status
    }

    #[test]
    fn test_locks_exactly_one_minute_before_kickoff() {
        assert_eq!(sweep_draft_at(kickoff() - Duration::minutes(1)), LineupStatus::Locked);
    }

    #[test]
    fn test_skips_one_minute_and_one_second_before_kickoff() {
        let now = kickoff() - Duration::minutes(1) - Duration::seconds(1);
        assert_eq!(sweep_draft_at(now), LineupStatus::Draft);
    }

    #[test]
    fn test_locks_thirty_minutes_after_kickoff() {
        assert_eq!(sweep_draft_at(kickoff() + Duration::minutes(30)), LineupStatus::Locked);
    }

    #[test]
    fn test_skips_after_window_closed() {
        let now = kickoff() + Duration::minutes(30) + Duration::seconds(1);
        assert_eq!(sweep_draft_at(now), LineupStatus::Draft);
    }

    #[test]
    fn test_catch_up_locks_missed_window() {
        let manager = manager(&seeded_directory());
        manager
            .submit_lineup(HOME_COACH, MATCH, ids(1..=11), None)
            .unwrap();

        let config = SweeperConfig {
            catch_up: true,
            ..SweeperConfig::default()
        };
        let sweeper = AutoLockSweeper::new(manager.clone(), config);

        // Still leaves windows that have not opened alone.
        let report = sweeper.sweep(kickoff() - Duration::hours(2)).unwrap();
        assert_eq!(report.not_due, 1);

        let report = sweeper.sweep(kickoff() + Duration::days(2)).unwrap();
        assert_eq!(report.locked.len(), 1);
        assert_eq!(
            manager.get_lineup(HOME_COACH, MATCH).unwrap().status,
            LineupStatus::Locked
        );
    }

    #[test]
    fn test_sweep_keeps_selection_and_auto_fills_missing_one() {
        let manager = manager(&seeded_directory());

        // Coach submits; the second coach of the same team drafts nothing.
        manager
            .submit_lineup(HOME_COACH, MATCH, ids(1..=11), Some(vec![12, 13]))
            .unwrap();
        let empty = manager
            .submit_lineup(ASSISTANT_COACH, MATCH, vec![], None)
            .unwrap();

        let sweeper = AutoLockSweeper::new(manager.clone(), SweeperConfig::default());
        let report = sweeper.sweep(kickoff() + Duration::minutes(10)).unwrap();

        assert_eq!(report.examined, 2);
        assert_eq!(report.locked.len(), 2);
        assert_eq!(report.auto_filled, vec![empty.id]);

        let submitted = manager.get_lineup(HOME_COACH, MATCH).unwrap();
        assert_eq!(submitted.status, LineupStatus::Locked);
        assert_eq!(submitted.starting_player_ids, ids(1..=11));
        assert_eq!(submitted.substitute_player_ids, vec![12, 13]);

        let filled = manager.get_lineup(ASSISTANT_COACH, MATCH).unwrap();
        assert_eq!(filled.status, LineupStatus::Locked);
        assert_eq!(filled.starting_player_ids, ids(1..=11));
        assert_eq!(filled.substitute_player_ids, vec![12, 13, 14]);
    }

    #[test]
    fn test_unscheduled_fixture_never_locks() {
        let manager = manager(&seeded_directory());
        manager
            .submit_lineup(HOME_COACH, UNSCHEDULED_MATCH, ids(1..=11), None)
            .unwrap();

        let sweeper = AutoLockSweeper::new(manager.clone(), SweeperConfig::default());
        let report = sweeper.sweep(kickoff()).unwrap();

        assert_eq!(report.unscheduled, 1);
        assert!(report.locked.is_empty());
        assert_eq!(
            manager.get_lineup(HOME_COACH, UNSCHEDULED_MATCH).unwrap().status,
            LineupStatus::Draft
        );
    }

    #[test]
    fn test_mixed_due_and_not_due() {
        let directory = seeded_directory();
        let later = kickoff() + Duration::hours(3);
        directory.upsert_fixture(Fixture {
            id: 300,
            date: later.date(),
            time: Some(later.time()),
            home_team_id: AWAY_TEAM,
            away_team_id: HOME_TEAM,
        });
        let manager = manager(&directory);

        let due = manager
            .submit_lineup(HOME_COACH, MATCH, ids(1..=11), None)
            .unwrap();
        manager
            .submit_lineup(HOME_COACH, 300, ids(1..=11), None)
            .unwrap();

        let sweeper = AutoLockSweeper::new(manager.clone(), SweeperConfig::default());
        let report = sweeper.sweep(kickoff()).unwrap();

        assert_eq!(report.locked, vec![due.id]);
        assert_eq!(report.not_due, 1);
        assert_eq!(manager.get_lineup(HOME_COACH, 300).unwrap().status, LineupStatus::Draft);
    }

    #[test]
    fn test_vanished_fixture_does_not_abort_sweep() {
        let directory = seeded_directory();
        let other = kickoff() + Duration::minutes(1);
        directory.upsert_fixture(Fixture {
            id: 301,
            date: other.date(),
            time: Some(other.time()),
            home_team_id: HOME_TEAM,
            away_team_id: OTHER_TEAM,
        });
        let manager = manager(&directory);

        let doomed = manager
            .submit_lineup(HOME_COACH, MATCH, ids(1..=11), None)
            .unwrap();
        let survivor = manager
            .submit_lineup(HOME_COACH, 301, ids(1..=11), None)
            .unwrap();
        directory.remove_fixture(MATCH);

        let sweeper = AutoLockSweeper::new(manager.clone(), SweeperConfig::default());
        let report = sweeper.sweep(kickoff()).unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].lineup_id, doomed.id);
        assert_eq!(report.locked, vec![survivor.id]);

        // Next cycle still runs and still reports the same lineup.
        let report = sweeper.sweep(kickoff()).unwrap();
        assert_eq!(report.examined, 1);
        assert_eq!(report.failures.len(), 1);
    }

    #[test]
    fn test_locked_lineups_are_not_examined_again() {
        let manager = manager(&seeded_directory());
        manager
            .submit_lineup(HOME_COACH, MATCH, ids(1..=11), None)
            .unwrap();

        let sweeper = AutoLockSweeper::new(manager.clone(), SweeperConfig::default());
        let first = sweeper.sweep(kickoff()).unwrap();
        let second = sweeper.sweep(kickoff() + Duration::minutes(1)).unwrap();

        assert_eq!(first.locked.len(), 1);
        assert_eq!(second.examined, 0);
        assert_eq!(
            manager.get_lineup(HOME_COACH, MATCH).unwrap().locked_at,
            Some(kickoff())
        );
    }
}
