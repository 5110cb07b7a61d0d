//! SQLite-backed property bag, checkpoint store and snapshot store.
//!
//! One database file holds everything durable:
//! - `kv`: credentials, endpoints and per-calendar sync tokens
//! - `event_snapshots`: last known full detail per event, rebuilt in
//!   bulk after each successful run

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use super::{data_dir, CheckpointStore, PropertyBag, SnapshotStore};
use crate::error::{Result, StoreError};
use crate::event::EventSnapshot;

/// SQLite database backing all durable state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/calwatch/calwatch.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("calwatch.db");
        Self::open_at(&path)
    }

    /// Open the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database. Used by tests.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StoreError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS event_snapshots (
                    id       TEXT PRIMARY KEY,
                    summary  TEXT NOT NULL DEFAULT '',
                    start_at TEXT NOT NULL DEFAULT '',
                    end_at   TEXT NOT NULL DEFAULT ''
                );",
            )
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))
    }

    fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn checkpoint_key(calendar_id: &str) -> String {
        format!("sync_token:{calendar_id}")
    }
}

impl PropertyBag for Database {
    fn get_property(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.kv_get(key)
    }

    fn set_property(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.kv_set(key, value)
    }
}

impl CheckpointStore for Database {
    fn checkpoint(&self, calendar_id: &str) -> Result<Option<String>, StoreError> {
        self.kv_get(&Self::checkpoint_key(calendar_id))
    }

    fn set_checkpoint(&self, calendar_id: &str, token: &str) -> Result<(), StoreError> {
        self.kv_set(&Self::checkpoint_key(calendar_id), token)
    }

    fn clear_checkpoint(&self, calendar_id: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "DELETE FROM kv WHERE key = ?1",
            params![Self::checkpoint_key(calendar_id)],
        )?;
        Ok(())
    }
}

impl SnapshotStore for Database {
    fn lookup(&self, id: &str) -> Result<Option<EventSnapshot>, StoreError> {
        let snapshot = self
            .conn
            .query_row(
                "SELECT id, summary, start_at, end_at FROM event_snapshots WHERE id = ?1",
                params![id],
                |row| {
                    Ok(EventSnapshot {
                        id: row.get(0)?,
                        summary: row.get(1)?,
                        start: row.get(2)?,
                        end: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(snapshot)
    }

    fn replace_all(&self, snapshots: &[EventSnapshot]) -> Result<(), StoreError> {
        // Delete-then-insert in one transaction; the on-disk set never
        // mixes rows from two different listings.
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM event_snapshots", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO event_snapshots (id, summary, start_at, end_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for snapshot in snapshots {
                stmt.execute(params![
                    snapshot.id,
                    snapshot.summary,
                    snapshot.start,
                    snapshot.end
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn snapshot_count(&self) -> Result<usize, StoreError> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM event_snapshots", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: &str, summary: &str) -> EventSnapshot {
        EventSnapshot {
            id: id.to_string(),
            summary: summary.to_string(),
            start: "2024-01-10 09:00".to_string(),
            end: "2024-01-10 09:30".to_string(),
        }
    }

    #[test]
    fn test_checkpoint_roundtrip_is_per_calendar() {
        let db = Database::open_memory().unwrap();

        assert_eq!(db.checkpoint("cal-a").unwrap(), None);
        db.set_checkpoint("cal-a", "tok-1").unwrap();
        db.set_checkpoint("cal-b", "tok-2").unwrap();

        assert_eq!(db.checkpoint("cal-a").unwrap().as_deref(), Some("tok-1"));
        assert_eq!(db.checkpoint("cal-b").unwrap().as_deref(), Some("tok-2"));

        db.set_checkpoint("cal-a", "tok-3").unwrap();
        assert_eq!(db.checkpoint("cal-a").unwrap().as_deref(), Some("tok-3"));

        db.clear_checkpoint("cal-a").unwrap();
        assert_eq!(db.checkpoint("cal-a").unwrap(), None);
        assert_eq!(db.checkpoint("cal-b").unwrap().as_deref(), Some("tok-2"));
    }

    #[test]
    fn test_property_roundtrip() {
        let db = Database::open_memory().unwrap();

        assert_eq!(db.get_property("LINE_TOKEN").unwrap(), None);
        db.set_property("LINE_TOKEN", "secret").unwrap();
        assert_eq!(
            db.get_property("LINE_TOKEN").unwrap().as_deref(),
            Some("secret")
        );
    }

    #[test]
    fn test_replace_all_wipes_previous_snapshots() {
        let db = Database::open_memory().unwrap();

        db.replace_all(&[snapshot("e1", "Standup"), snapshot("e2", "Review")])
            .unwrap();
        assert_eq!(db.snapshot_count().unwrap(), 2);
        assert_eq!(db.lookup("e1").unwrap().unwrap().summary, "Standup");

        db.replace_all(&[snapshot("e3", "Planning")]).unwrap();
        assert_eq!(db.snapshot_count().unwrap(), 1);
        assert_eq!(db.lookup("e1").unwrap(), None);
        assert_eq!(db.lookup("e3").unwrap().unwrap().summary, "Planning");
    }

    #[test]
    fn test_open_at_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calwatch.db");

        let db = Database::open_at(&path).unwrap();
        db.set_checkpoint("cal", "tok").unwrap();
        drop(db);

        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.checkpoint("cal").unwrap().as_deref(), Some("tok"));
    }
}
