//! SQLite-based storage.
//!
//! Provides persistent storage for:
//! - Workout history (newest [`HISTORY_LIMIT`] stopwatch sessions)
//! - Key-value store for host state (serialized engines between CLI runs)

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use super::data_dir;
use super::history::{HistoryLog, WorkoutRecord, HISTORY_LIMIT};
use crate::error::{DatabaseError, Result};

/// SQLite database for workout history and host state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/splitclock.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("splitclock.db"))
    }

    /// Open (or create) a database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS workouts (
                seq           INTEGER PRIMARY KEY AUTOINCREMENT,
                id            TEXT NOT NULL UNIQUE,
                recorded_at   TEXT NOT NULL,
                total_time_ms INTEGER NOT NULL,
                laps          TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    // ── Key-value ────────────────────────────────────────────────────

    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    // ── Workouts ─────────────────────────────────────────────────────

    fn decode_row(
        id: String,
        recorded_at: String,
        total_time_ms: i64,
        laps: String,
    ) -> Result<WorkoutRecord> {
        let corrupt = |message: String| DatabaseError::CorruptRow {
            table: "workouts".into(),
            message,
        };
        Ok(WorkoutRecord {
            id: Uuid::parse_str(&id).map_err(|e| corrupt(e.to_string()))?,
            recorded_at: DateTime::parse_from_rfc3339(&recorded_at)
                .map_err(|e| corrupt(e.to_string()))?
                .with_timezone(&Utc),
            total_time_ms: u64::try_from(total_time_ms).map_err(|e| corrupt(e.to_string()))?,
            laps: serde_json::from_str(&laps).map_err(|e| corrupt(e.to_string()))?,
        })
    }
}

impl HistoryLog for Database {
    fn commit(&mut self, record: WorkoutRecord) -> Result<()> {
        let laps = serde_json::to_string(&record.laps)?;
        let total = i64::try_from(record.total_time_ms).map_err(|e| {
            DatabaseError::QueryFailed(format!(
                "total_time_ms {} out of range: {e}",
                record.total_time_ms
            ))
        })?;
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO workouts (id, recorded_at, total_time_ms, laps)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.id.to_string(),
                record.recorded_at.to_rfc3339(),
                total,
                laps
            ],
        )?;
        let evicted = tx.execute(
            "DELETE FROM workouts WHERE seq NOT IN
                (SELECT seq FROM workouts ORDER BY seq DESC LIMIT ?1)",
            params![HISTORY_LIMIT as i64],
        )?;
        tx.commit()?;
        debug!(id = %record.id, evicted, "workout stored");
        Ok(())
    }

    fn list(&self) -> Result<Vec<WorkoutRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, recorded_at, total_time_ms, laps
             FROM workouts
             ORDER BY seq DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![HISTORY_LIMIT as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, recorded_at, total, laps) = row?;
            records.push(Self::decode_row(id, recorded_at, total, laps)?);
        }
        Ok(records)
    }

    fn clear(&mut self) -> Result<()> {
        self.conn.execute("DELETE FROM workouts", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn kv_roundtrip_and_overwrite() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.kv_get("k").unwrap(), None);
        db.kv_set("k", "one").unwrap();
        db.kv_set("k", "two").unwrap();
        assert_eq!(db.kv_get("k").unwrap().as_deref(), Some("two"));
        db.kv_delete("k").unwrap();
        assert_eq!(db.kv_get("k").unwrap(), None);
    }

    #[test]
    fn commit_and_list_newest_first() {
        let mut db = Database::open_memory().unwrap();
        let first = WorkoutRecord::new(Utc::now(), 1000, vec![400, 1000]);
        let second = WorkoutRecord::new(Utc::now(), 2000, vec![2000]);
        db.commit(first.clone()).unwrap();
        db.commit(second.clone()).unwrap();

        let list = db.list().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, second.id);
        assert_eq!(list[1].laps, first.laps);
    }

    #[test]
    fn history_is_capped() {
        let mut db = Database::open_memory().unwrap();
        for total in 1..=(HISTORY_LIMIT as u64 + 3) {
            db.commit(WorkoutRecord::new(Utc::now(), total, vec![total]))
                .unwrap();
        }
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM workouts", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, HISTORY_LIMIT as i64);
        assert_eq!(db.list().unwrap()[0].total_time_ms, HISTORY_LIMIT as u64 + 3);
    }

    #[test]
    fn commit_rejects_total_beyond_sqlite_range() {
        let mut db = Database::open_memory().unwrap();
        let record = WorkoutRecord::new(Utc::now(), u64::MAX, vec![1000]);
        let err = db.commit(record).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Database(DatabaseError::QueryFailed(_))
        ));
        assert!(db.list().unwrap().is_empty());
    }

    #[test]
    fn clear_removes_workouts_but_not_kv() {
        let mut db = Database::open_memory().unwrap();
        db.kv_set("engine", "{}").unwrap();
        db.commit(WorkoutRecord::new(Utc::now(), 10, vec![10]))
            .unwrap();
        db.clear().unwrap();
        assert!(db.list().unwrap().is_empty());
        assert!(db.kv_get("engine").unwrap().is_some());
    }
}
