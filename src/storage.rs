use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection};

use crate::error::{LedgerError, LedgerResult};
use crate::model::{StoredRecord, TestRecord};

/// Persistence seam for the publisher.
///
/// Implementations must tolerate being called once per record; a failed
/// insert affects only that record (the publisher logs and continues).
pub trait ResultStore {
    fn insert(&self, record: &TestRecord) -> LedgerResult<()>;
}

// ---------------------------------------------------------------------------
// SQLite ledger
// ---------------------------------------------------------------------------

pub struct SqliteStore {
    connection: Connection,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> LedgerResult<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let connection = Connection::open(db_path)
            .map_err(|error| LedgerError::Storage(error.to_string()))?;

        let store = Self { connection };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> LedgerResult<()> {
        // WAL so a publisher and a reader can coexist on the same file.
        let _: String = self
            .connection
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .map_err(|error| LedgerError::Storage(error.to_string()))?;
        self.connection
            .pragma_update(None, "busy_timeout", 5000)
            .map_err(|error| LedgerError::Storage(error.to_string()))?;

        self.connection
            .execute_batch(
                r#"
CREATE TABLE IF NOT EXISTS test_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    component TEXT NOT NULL,
    version TEXT NOT NULL,
    build_number INTEGER NOT NULL,
    platform TEXT NOT NULL,
    test_key TEXT NOT NULL,
    duration_millis INTEGER NOT NULL,
    status TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_test_results_component
    ON test_results (component, version, build_number);
"#,
            )
            .map_err(|error| LedgerError::Storage(error.to_string()))?;

        Ok(())
    }

    /// Most recently inserted records first.
    pub fn list_recent(&self, limit: usize) -> LedgerResult<Vec<StoredRecord>> {
        let mut statement = self
            .connection
            .prepare(
                "SELECT id, recorded_at, component, version, build_number, platform, \
                 test_key, duration_millis, status \
                 FROM test_results ORDER BY id DESC LIMIT ?1",
            )
            .map_err(|error| LedgerError::Storage(error.to_string()))?;

        let rows = statement
            .query_map(params![limit as i64], |row| {
                Ok(StoredRecord {
                    id: row.get(0)?,
                    recorded_at_rfc3339: row.get(1)?,
                    record: TestRecord {
                        component: row.get(2)?,
                        version: row.get(3)?,
                        build_number: row.get(4)?,
                        platform: row.get(5)?,
                        test_key: row.get(6)?,
                        duration_millis: row.get(7)?,
                        status: row.get(8)?,
                    },
                })
            })
            .map_err(|error| LedgerError::Storage(error.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|error| LedgerError::Storage(error.to_string()))
    }

    /// Per-status record counts, optionally filtered to one component.
    pub fn count_by_status(&self, component: Option<&str>) -> LedgerResult<Vec<(String, i64)>> {
        let (sql, filter) = match component {
            Some(name) => (
                "SELECT status, COUNT(*) FROM test_results WHERE component = ?1 \
                 GROUP BY status ORDER BY status",
                Some(name.to_owned()),
            ),
            None => (
                "SELECT status, COUNT(*) FROM test_results GROUP BY status ORDER BY status",
                None,
            ),
        };

        let mut statement = self
            .connection
            .prepare(sql)
            .map_err(|error| LedgerError::Storage(error.to_string()))?;

        let map_row = |row: &rusqlite::Row<'_>| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?));
        let rows = match filter {
            Some(name) => statement
                .query_map(params![name], map_row)
                .map_err(|error| LedgerError::Storage(error.to_string()))?
                .collect::<Result<Vec<_>, _>>(),
            None => statement
                .query_map([], map_row)
                .map_err(|error| LedgerError::Storage(error.to_string()))?
                .collect::<Result<Vec<_>, _>>(),
        };

        rows.map_err(|error| LedgerError::Storage(error.to_string()))
    }
}

impl ResultStore for SqliteStore {
    fn insert(&self, record: &TestRecord) -> LedgerResult<()> {
        let recorded_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        self.connection
            .execute(
                "INSERT INTO test_results \
                 (component, version, build_number, platform, test_key, duration_millis, status, recorded_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.component,
                    record.version,
                    record.build_number,
                    record.platform,
                    record.test_key,
                    record.duration_millis,
                    record.status,
                    recorded_at,
                ],
            )
            .map_err(|error| LedgerError::Storage(error.to_string()))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory ledger (tests, --dry-run)
// ---------------------------------------------------------------------------

/// Vec-backed store used by `--dry-run` and by unit tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<TestRecord>>,
    fail_on: Mutex<HashSet<String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent inserts of this test key fail, to exercise the
    /// publisher's per-record fault tolerance.
    pub fn fail_on(&self, test_key: &str) {
        self.fail_on
            .lock()
            .expect("memory store poisoned")
            .insert(test_key.to_owned());
    }

    pub fn records(&self) -> Vec<TestRecord> {
        self.records
            .lock()
            .expect("memory store poisoned")
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().expect("memory store poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultStore for MemoryStore {
    fn insert(&self, record: &TestRecord) -> LedgerResult<()> {
        if self
            .fail_on
            .lock()
            .expect("memory store poisoned")
            .contains(&record.test_key)
        {
            return Err(LedgerError::Storage(format!(
                "injected failure for {}",
                record.test_key
            )));
        }
        self.records
            .lock()
            .expect("memory store poisoned")
            .push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(key: &str, status: &str) -> TestRecord {
        TestRecord {
            component: "identity".to_owned(),
            version: "5.4.0".to_owned(),
            build_number: 7,
            platform: "DEFAULT".to_owned(),
            test_key: key.to_owned(),
            duration_millis: 120,
            status: status.to_owned(),
        }
    }

    #[test]
    fn sqlite_store_round_trips_records() {
        let dir = tempdir().expect("tempdir");
        let store = SqliteStore::open(&dir.path().join("ledger.sqlite3")).expect("open");

        store
            .insert(&record("org.acme.A#one", "PASSED"))
            .expect("insert one");
        store
            .insert(&record("org.acme.A#two", "FAILED"))
            .expect("insert two");

        let recent = store.list_recent(10).expect("list");
        assert_eq!(recent.len(), 2);
        // Newest first.
        assert_eq!(recent[0].record.test_key, "org.acme.A#two");
        assert_eq!(recent[1].record.test_key, "org.acme.A#one");
        assert!(!recent[0].recorded_at_rfc3339.is_empty());
    }

    #[test]
    fn sqlite_store_creates_parent_directories() {
        let dir = tempdir().expect("tempdir");
        let nested = dir.path().join("a").join("b").join("ledger.sqlite3");
        SqliteStore::open(&nested).expect("open nested");
        assert!(nested.exists());
    }

    #[test]
    fn count_by_status_groups_and_filters() {
        let dir = tempdir().expect("tempdir");
        let store = SqliteStore::open(&dir.path().join("ledger.sqlite3")).expect("open");

        store.insert(&record("a#1", "PASSED")).expect("insert");
        store.insert(&record("a#2", "PASSED")).expect("insert");
        store.insert(&record("a#3", "SKIPPED")).expect("insert");
        let mut other = record("b#1", "FAILED");
        other.component = "gateway".to_owned();
        store.insert(&other).expect("insert");

        let all = store.count_by_status(None).expect("count all");
        assert_eq!(
            all,
            vec![
                ("FAILED".to_owned(), 1),
                ("PASSED".to_owned(), 2),
                ("SKIPPED".to_owned(), 1)
            ]
        );

        let identity = store.count_by_status(Some("identity")).expect("count");
        assert_eq!(
            identity,
            vec![("PASSED".to_owned(), 2), ("SKIPPED".to_owned(), 1)]
        );
    }

    #[test]
    fn memory_store_injected_failure() {
        let store = MemoryStore::new();
        store.fail_on("a#2");

        assert!(store.insert(&record("a#1", "PASSED")).is_ok());
        assert!(store.insert(&record("a#2", "PASSED")).is_err());
        assert!(store.insert(&record("a#3", "PASSED")).is_ok());
        assert_eq!(store.len(), 2);
    }
}
