//! SQLite-backed LineupStore implementation.
//! Provides persistent lineup storage across server restarts.
//!
//! Enable with the `sqlite` feature flag:
//! ```toml
//! lineup-core = { path = "../lineup-core", features = ["sqlite"] }
//! ```

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::time::Duration;

use crate::error::StoreError;
use crate::infrastructure::{check_expected, LineupStore};
use crate::types::*;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SELECT_COLUMNS: &str = "SELECT id, match_id, team_id, coach_id, status, starting, substitutes, locked_at, auto_filled FROM lineups";

/// A persistent lineup store backed by SQLite.
///
/// Uses WAL mode for concurrent read performance. The connection sits behind
/// a mutex. Each `save` runs in a `BEGIN IMMEDIATE` transaction that
/// re-reads the row, so processes sharing the file cannot interleave a
/// check with another writer's update.
pub struct SqliteLineupStore {
    conn: Mutex<Connection>,
}

impl SqliteLineupStore {
    /// Open (or create) a SQLite database at the given path.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent read performance
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        // Wait for a competing writer instead of failing with SQLITE_BUSY
        conn.busy_timeout(BUSY_TIMEOUT)?;

        Self::with_connection(conn)
    }

    /// Private in-memory database, mainly for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS lineups (
                id          TEXT PRIMARY KEY,
                match_id    INTEGER NOT NULL,
                team_id     INTEGER NOT NULL,
                coach_id    INTEGER NOT NULL,
                status      TEXT NOT NULL DEFAULT 'DRAFT',
                starting    TEXT NOT NULL DEFAULT '[]',
                substitutes TEXT NOT NULL DEFAULT '[]',
                locked_at   TEXT,
                auto_filled INTEGER NOT NULL DEFAULT 0,
                UNIQUE (match_id, coach_id)
            );
            CREATE INDEX IF NOT EXISTS idx_lineups_status ON lineups(status);",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn row_to_lineup(row: &rusqlite::Row) -> rusqlite::Result<Lineup> {
        let status_str: String = row.get(4)?;
        let starting_json: String = row.get(5)?;
        let substitutes_json: String = row.get(6)?;

        Ok(Lineup {
            id: row.get(0)?,
            match_id: row.get(1)?,
            team_id: row.get(2)?,
            coach_id: row.get(3)?,
            status: LineupStatus::parse(&status_str).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    4,
                    rusqlite::types::Type::Text,
                    format!("unknown lineup status '{}'", status_str).into(),
                )
            })?,
            starting_player_ids: Self::decode_ids(5, &starting_json)?,
            substitute_player_ids: Self::decode_ids(6, &substitutes_json)?,
            locked_at: row.get(7)?,
            auto_filled: row.get(8)?,
        })
    }

    fn find_in(
        conn: &Connection,
        match_id: MatchId,
        coach_id: CoachId,
    ) -> rusqlite::Result<Option<Lineup>> {
        conn.query_row(
            &format!("{} WHERE match_id = ?1 AND coach_id = ?2", SELECT_COLUMNS),
            params![match_id, coach_id],
            Self::row_to_lineup,
        )
        .optional()
    }

    fn decode_ids(column: usize, json: &str) -> rusqlite::Result<Vec<PlayerId>> {
        serde_json::from_str(json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
        })
    }
}

impl LineupStore for SqliteLineupStore {
    fn find_by_match_and_coach(
        &self,
        match_id: MatchId,
        coach_id: CoachId,
    ) -> Result<Option<Lineup>, StoreError> {
        let conn = self.conn.lock();
        Ok(Self::find_in(&conn, match_id, coach_id)?)
    }

    fn find_by_status(&self, status: LineupStatus) -> Result<Vec<Lineup>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "{} WHERE status = ?1 ORDER BY match_id, coach_id",
            SELECT_COLUMNS
        ))?;

        let lineups = stmt
            .query_map(params![status.as_str()], Self::row_to_lineup)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lineups)
    }

    fn save(&self, expected: Option<&Lineup>, lineup: Lineup) -> Result<Lineup, StoreError> {
        let starting = serde_json::to_string(&lineup.starting_player_ids)?;
        let substitutes = serde_json::to_string(&lineup.substitute_player_ids)?;

        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let stored = Self::find_in(&tx, lineup.match_id, lineup.coach_id)?;
        check_expected(stored.as_ref(), expected, &lineup)?;

        tx.execute(
            "INSERT INTO lineups (id, match_id, team_id, coach_id, status, starting, substitutes, locked_at, auto_filled)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET
                status = excluded.status,
                starting = excluded.starting,
                substitutes = excluded.substitutes,
                locked_at = excluded.locked_at,
                auto_filled = excluded.auto_filled",
            params![
                lineup.id,
                lineup.match_id,
                lineup.team_id,
                lineup.coach_id,
                lineup.status.as_str(),
                starting,
                substitutes,
                lineup.locked_at,
                lineup.auto_filled,
            ],
        )?;
        tx.commit()?;

        Ok(lineup)
    }
}
