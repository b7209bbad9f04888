//! SQLite-backed baseline store
//!
//! Each batch is one `IMMEDIATE` transaction, so overlapping runs serialize on
//! the write lock (bounded by the busy timeout). Every row is written inside
//! its own savepoint: a failing row is rolled back alone and the rest of the
//! batch still commits.

use std::path::Path;

use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use sispoll_core::baseline::{BaselineBatch, BaselineStore};
use sispoll_core::model::{Baseline, SnapshotRecord, Timestamp};

use crate::db;
use crate::errors::{from_rusqlite, Result};
use crate::migrations::apply_migrations;

/// Baseline store over the `xml_update` table
pub struct SqliteBaselineStore {
    conn: Connection,
}

impl SqliteBaselineStore {
    /// Open a database that was previously initialized
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_connection(db::open_existing(path)?)
    }

    /// Open a database, creating the file and schema if needed
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_connection(db::open_or_create(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(db::open_in_memory()?)
    }

    /// Wrap a configured connection, applying pending migrations
    pub fn from_connection(mut conn: Connection) -> Result<Self> {
        apply_migrations(&mut conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Number of rows in the baseline
    pub fn count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM xml_update", [], |row| row.get(0))
            .map_err(from_rusqlite)?;
        Ok(n.max(0) as usize)
    }
}

impl BaselineStore for SqliteBaselineStore {
    fn get_all(&self) -> Result<Baseline> {
        let mut stmt = self
            .conn
            .prepare("SELECT xml_file, last_modified FROM xml_update ORDER BY xml_file")
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(SnapshotRecord::new(
                    row.get::<_, String>(0)?,
                    Timestamp::from_unix_seconds(row.get(1)?),
                ))
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| from_rusqlite(e).with_op("get_all"))?;

        tracing::debug!(rows = rows.len(), "Loaded baseline");
        Ok(rows.into_iter().collect())
    }

    fn begin(&mut self) -> Result<Box<dyn BaselineBatch + '_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| from_rusqlite(e).with_op("begin"))?;
        Ok(Box::new(SqliteBatch { tx }))
    }
}

struct SqliteBatch<'c> {
    tx: Transaction<'c>,
}

impl BaselineBatch for SqliteBatch<'_> {
    fn insert(&mut self, record: &SnapshotRecord) -> Result<()> {
        let sp = self.tx.savepoint().map_err(from_rusqlite)?;
        sp.execute(
            "INSERT INTO xml_update (xml_file, last_modified) VALUES (?1, ?2)",
            params![record.resource_id, record.last_modified.as_unix_seconds()],
        )
        .map_err(|e| {
            from_rusqlite(e)
                .with_op("insert")
                .with_resource_id(record.resource_id.clone())
        })?;
        sp.commit().map_err(from_rusqlite)?;
        Ok(())
    }

    fn upsert_if_newer(&mut self, record: &SnapshotRecord) -> Result<bool> {
        let sp = self.tx.savepoint().map_err(from_rusqlite)?;
        let changed = sp
            .execute(
                "INSERT INTO xml_update (xml_file, last_modified) VALUES (?1, ?2)
                 ON CONFLICT(xml_file) DO UPDATE SET last_modified = excluded.last_modified
                 WHERE excluded.last_modified > xml_update.last_modified",
                params![record.resource_id, record.last_modified.as_unix_seconds()],
            )
            .map_err(|e| {
                from_rusqlite(e)
                    .with_op("upsert_if_newer")
                    .with_resource_id(record.resource_id.clone())
            })?;
        sp.commit().map_err(from_rusqlite)?;
        Ok(changed > 0)
    }

    fn clear_all(&mut self) -> Result<usize> {
        self.tx
            .execute("DELETE FROM xml_update", [])
            .map_err(|e| from_rusqlite(e).with_op("clear_all"))
    }

    fn commit(self: Box<Self>) -> Result<()> {
        self.tx
            .commit()
            .map_err(|e| from_rusqlite(e).with_op("commit"))
    }
}
