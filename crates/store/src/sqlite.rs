//! SQLite-backed engine
//!
//! One writer connection guarded by a mutex; every scan opens its own
//! read-only connection and runs a single statement, which SQLite serves
//! from a consistent WAL snapshot.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use tracing::{debug, warn};

use crate::engine::{KvEngine, ReclaimReport, ScanVisitor, WriteEntry, WriteReport};
use crate::{Result, StoreError};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS entries (
        key BLOB PRIMARY KEY NOT NULL,
        value BLOB NOT NULL,
        expires_at INTEGER
    ) WITHOUT ROWID;
    CREATE INDEX IF NOT EXISTS idx_entries_expires_at ON entries(expires_at)
        WHERE expires_at IS NOT NULL;
    CREATE TABLE IF NOT EXISTS sequences (
        name TEXT PRIMARY KEY NOT NULL,
        next INTEGER NOT NULL
    );
";

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Persistent engine over a single SQLite database file
pub struct SqliteEngine {
    path: PathBuf,
    writer: Mutex<Option<Connection>>,
}

impl std::fmt::Debug for SqliteEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteEngine")
            .field("path", &self.path)
            .finish()
    }
}

impl SqliteEngine {
    /// Open or create the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;
        // must precede table creation to take effect on a fresh file
        conn.pragma_update(None, "auto_vacuum", "INCREMENTAL")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.execute_batch(SCHEMA)?;

        debug!(path = %path.display(), "sqlite engine opened");

        Ok(Self {
            path,
            writer: Mutex::new(Some(conn)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_writer<T>(&self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut guard = self.writer.lock();
        let conn = guard.as_mut().ok_or(StoreError::Closed)?;
        f(conn)
    }

    fn reader(&self) -> Result<Connection> {
        if self.writer.lock().is_none() {
            return Err(StoreError::Closed);
        }
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }
}

impl KvEngine for SqliteEngine {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn write_batch(&self, entries: &[WriteEntry]) -> Result<WriteReport> {
        self.with_writer(|conn| {
            let now = now_millis();
            let mut report = WriteReport::default();
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare_cached(
                    "INSERT OR REPLACE INTO entries (key, value, expires_at) VALUES (?1, ?2, ?3)",
                )?;
                for entry in entries {
                    let expires_at = entry.ttl.map(|ttl| now + ttl.as_millis() as i64);
                    match stmt.execute(params![entry.key, entry.value, expires_at]) {
                        Ok(_) => report.written += 1,
                        Err(e) => {
                            warn!(key = %hex::encode(&entry.key), error = %e, "entry write failed");
                            report.failed += 1;
                        }
                    }
                }
            }
            tx.commit()?;
            Ok(report)
        })
    }

    fn scan(&self, start: &[u8], visitor: &mut ScanVisitor<'_>) -> Result<()> {
        let conn = self.reader()?;
        let mut stmt = conn.prepare(
            "SELECT key, value FROM entries
             WHERE key >= ?1 AND (expires_at IS NULL OR expires_at > ?2)
             ORDER BY key",
        )?;
        let mut rows = stmt.query(params![start, now_millis()])?;
        while let Some(row) = rows.next()? {
            let key: Vec<u8> = row.get(0)?;
            let value: Vec<u8> = row.get(1)?;
            if visitor(&key, &value).is_break() {
                break;
            }
        }
        Ok(())
    }

    fn lease_sequence(&self, name: &str, count: u64) -> Result<u64> {
        self.with_writer(|conn| {
            let tx = conn.transaction()?;
            let current: Option<i64> = tx
                .query_row(
                    "SELECT next FROM sequences WHERE name = ?1",
                    params![name],
                    |row| row.get(0),
                )
                .optional()?;
            let start = current.unwrap_or(0) as u64;
            tx.execute(
                "INSERT INTO sequences (name, next) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET next = excluded.next",
                params![name, (start + count) as i64],
            )?;
            tx.commit()?;
            Ok(start)
        })
    }

    fn return_sequence(&self, name: &str, leased_end: u64, next: u64) -> Result<bool> {
        self.with_writer(|conn| {
            let changed = conn.execute(
                "UPDATE sequences SET next = ?3 WHERE name = ?1 AND next = ?2",
                params![name, leased_end as i64, next as i64],
            )?;
            Ok(changed == 1)
        })
    }

    fn reclaim(&self) -> Result<ReclaimReport> {
        self.with_writer(|conn| {
            let expired = conn.execute(
                "DELETE FROM entries WHERE expires_at IS NOT NULL AND expires_at <= ?1",
                params![now_millis()],
            )?;
            conn.execute_batch("PRAGMA incremental_vacuum;")?;
            conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
            Ok(ReclaimReport {
                expired: expired as u64,
            })
        })
    }

    fn close(&self) -> Result<()> {
        let Some(conn) = self.writer.lock().take() else {
            return Ok(());
        };
        conn.close().map_err(|(_, e)| StoreError::Sqlite(e))?;
        debug!(path = %self.path.display(), "sqlite engine closed");
        Ok(())
    }
}
