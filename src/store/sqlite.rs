use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use rusqlite_migration::{Migrations, M};

use crate::app::{DailyTopError, Result};
use crate::domain::{DayKey, ItemRecord};
use crate::store::Store;

const MARKER_KEY: &str = "current_day";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|e| DailyTopError::Storage(format!("Migration failed: {}", e)))?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            DailyTopError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn upsert(conn: &Connection, day: &DayKey, record: &ItemRecord) -> Result<usize> {
        let encoded = serde_json::to_string(record)?;
        let changed = conn.execute(
            "INSERT INTO day_records (day, item_id, record) VALUES (?1, ?2, ?3)
             ON CONFLICT(day, item_id) DO UPDATE SET record = excluded.record",
            params![day.storage_key(), record.id, encoded],
        )?;
        Ok(changed)
    }
}

impl Store for SqliteStore {
    fn put(&self, day: &DayKey, record: &ItemRecord) -> Result<()> {
        let conn = self.conn()?;
        Self::upsert(&conn, day, record)?;
        Ok(())
    }

    fn put_all(&self, day: &DayKey, records: &[ItemRecord]) -> Result<usize> {
        let mut conn = self.conn()?;

        // Dropping the transaction without commit rolls every write back.
        let tx = conn.transaction()?;
        let mut count = 0;
        for record in records {
            count += Self::upsert(&tx, day, record)?;
        }
        tx.commit()?;

        Ok(count)
    }

    fn get(&self, day: &DayKey, id: &str) -> Result<Option<ItemRecord>> {
        let conn = self.conn()?;

        let encoded: Option<String> = conn
            .query_row(
                "SELECT record FROM day_records WHERE day = ?1 AND item_id = ?2",
                params![day.storage_key(), id],
                |row| row.get(0),
            )
            .optional()?;

        match encoded {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    fn contains(&self, day: &DayKey, id: &str) -> Result<bool> {
        let conn = self.conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM day_records WHERE day = ?1 AND item_id = ?2",
            params![day.storage_key(), id],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    fn for_each(&self, day: &DayKey, f: &mut dyn FnMut(ItemRecord) -> Result<()>) -> Result<()> {
        // Rows are collected first so the callback runs without holding the lock.
        let rows = {
            let conn = self.conn()?;
            let mut stmt =
                conn.prepare("SELECT record FROM day_records WHERE day = ?1 ORDER BY seq")?;
            let rows = stmt
                .query_map(params![day.storage_key()], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        };

        for encoded in rows {
            f(serde_json::from_str(&encoded)?)?;
        }

        Ok(())
    }

    fn has_bucket(&self, day: &DayKey) -> Result<bool> {
        Ok(self.bucket_len(day)? > 0)
    }

    fn bucket_days(&self) -> Result<Vec<DayKey>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare("SELECT DISTINCT day FROM day_records ORDER BY day")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        keys.iter().map(|k| DayKey::parse(k)).collect()
    }

    fn bucket_len(&self, day: &DayKey) -> Result<usize> {
        let conn = self.conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM day_records WHERE day = ?1",
            params![day.storage_key()],
            |row| row.get(0),
        )?;

        Ok(count as usize)
    }

    fn get_marker(&self) -> Result<Option<DayKey>> {
        let conn = self.conn()?;

        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM meta WHERE key = ?1",
                params![MARKER_KEY],
                |row| row.get(0),
            )
            .optional()?;

        value.map(|v| DayKey::parse(&v)).transpose()
    }

    fn set_marker(&self, day: &DayKey) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![MARKER_KEY, day.storage_key()],
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::{day, record};

    #[test]
    fn test_put_and_get() {
        let store = SqliteStore::in_memory().unwrap();
        store.put(&day(1), &record("abc", 10, 2)).unwrap();

        let retrieved = store.get(&day(1), "abc").unwrap().unwrap();
        assert_eq!(retrieved.score, 10);
        assert_eq!(retrieved.rank, 2);
    }

    #[test]
    fn test_get_is_scoped_to_day() {
        let store = SqliteStore::in_memory().unwrap();
        store.put(&day(1), &record("abc", 10, 2)).unwrap();

        assert!(store.get(&day(2), "abc").unwrap().is_none());
        assert!(store.contains(&day(1), "abc").unwrap());
        assert!(!store.contains(&day(2), "abc").unwrap());
    }

    #[test]
    fn test_get_nonexistent() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.get(&day(1), "nope").unwrap().is_none());
    }

    #[test]
    fn test_put_overwrites_record() {
        let store = SqliteStore::in_memory().unwrap();
        store.put(&day(1), &record("abc", 10, 2)).unwrap();
        store.put(&day(1), &record("abc", 25, 1)).unwrap();

        let retrieved = store.get(&day(1), "abc").unwrap().unwrap();
        assert_eq!(retrieved.score, 25);
        assert_eq!(store.bucket_len(&day(1)).unwrap(), 1);
    }

    #[test]
    fn test_for_each_keeps_insertion_order() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .put_all(
                &day(1),
                &[record("c", 1, 1), record("a", 2, 2), record("b", 3, 3)],
            )
            .unwrap();
        // Updating an existing record must not move it.
        store.put(&day(1), &record("c", 50, 1)).unwrap();

        let ids: Vec<String> = store
            .records(&day(1))
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_for_each_propagates_callback_error() {
        let store = SqliteStore::in_memory().unwrap();
        store.put(&day(1), &record("a", 1, 1)).unwrap();

        let result = store.for_each(&day(1), &mut |_| Err(DailyTopError::Other("stop".into())));
        assert!(result.is_err());
    }

    #[test]
    fn test_put_all_rolls_back_on_failure() {
        let store = SqliteStore::in_memory().unwrap();
        {
            let conn = store.conn().unwrap();
            conn.execute_batch(
                "CREATE TRIGGER reject_bad BEFORE INSERT ON day_records
                 WHEN NEW.item_id = 'bad'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();
        }

        let result = store.put_all(&day(1), &[record("a", 1, 1), record("bad", 2, 2)]);

        assert!(result.is_err());
        assert!(!store.has_bucket(&day(1)).unwrap());
        assert!(store.get(&day(1), "a").unwrap().is_none());
    }

    #[test]
    fn test_has_bucket_and_days() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(!store.has_bucket(&day(3)).unwrap());

        store.put(&day(3), &record("a", 1, 1)).unwrap();
        store.put(&day(1), &record("b", 1, 1)).unwrap();

        assert!(store.has_bucket(&day(3)).unwrap());
        assert_eq!(store.bucket_days().unwrap(), vec![day(1), day(3)]);
    }

    #[test]
    fn test_marker_roundtrip() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.get_marker().unwrap().is_none());

        store.set_marker(&day(4)).unwrap();
        assert_eq!(store.get_marker().unwrap(), Some(day(4)));

        store.set_marker(&day(5)).unwrap();
        assert_eq!(store.get_marker().unwrap(), Some(day(5)));
    }

    #[test]
    fn test_marker_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dailytop.db");

        {
            let store = SqliteStore::new(&path).unwrap();
            store.set_marker(&day(7)).unwrap();
            store.put(&day(7), &record("a", 3, 1)).unwrap();
        }

        let store = SqliteStore::new(&path).unwrap();
        assert_eq!(store.get_marker().unwrap(), Some(day(7)));
        assert_eq!(store.get(&day(7), "a").unwrap().unwrap().score, 3);
    }

    #[test]
    fn test_stored_json_has_top_position() {
        let store = SqliteStore::in_memory().unwrap();
        store.put(&day(1), &record("abc", 10, 4)).unwrap();

        let conn = store.conn().unwrap();
        let encoded: String = conn
            .query_row(
                "SELECT record FROM day_records WHERE item_id = 'abc'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value["topPosition"], 4);
        assert_eq!(value["score"], 10);
    }
}
