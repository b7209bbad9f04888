//! PostgreSQL-backed baseline store
//!
//! Each batch is one transaction and every row is written inside its own
//! savepoint, so a failing row rolls back alone. Overlapping runs converge on
//! the maximum timestamp through the conditional upsert.

use std::cell::RefCell;

use postgres::{Client, NoTls, Transaction};
use sispoll_core::baseline::{BaselineBatch, BaselineStore};
use sispoll_core::model::{Baseline, SnapshotRecord, Timestamp};

use super::config::{quote_ident, PgSettings};
use crate::errors::{from_postgres, store_unavailable, Result};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS xml_update (
    xml_file TEXT PRIMARY KEY NOT NULL,
    last_modified TIMESTAMP NOT NULL
)";

const UPSERT_IF_NEWER: &str = "INSERT INTO xml_update (xml_file, last_modified)
     VALUES ($1, TO_TIMESTAMP($2))
     ON CONFLICT (xml_file) DO UPDATE SET last_modified = EXCLUDED.last_modified
     WHERE EXCLUDED.last_modified > xml_update.last_modified";

/// Baseline store over a Postgres `xml_update` table
pub struct PgBaselineStore {
    // Reads take `&self`; the client needs `&mut` for every query.
    client: RefCell<Client>,
}

impl PgBaselineStore {
    /// Connect to a database whose `xml_update` table already exists
    pub fn open(settings: &PgSettings) -> Result<Self> {
        let store = Self::connect(settings)?;
        if !store.table_exists()? {
            return Err(store_unavailable(
                &settings.describe(),
                "table xml_update does not exist (run init first)",
            ));
        }
        Ok(store)
    }

    /// Connect, creating the `xml_update` table if needed
    pub fn create(settings: &PgSettings) -> Result<Self> {
        let store = Self::connect(settings)?;
        store.ensure_table()?;
        Ok(store)
    }

    /// Create the `xml_update` table in the current schema if it is missing
    pub fn ensure_table(&self) -> Result<()> {
        self.client
            .borrow_mut()
            .batch_execute(CREATE_TABLE)
            .map_err(|e| from_postgres(e).with_op("create_table"))
    }

    fn connect(settings: &PgSettings) -> Result<Self> {
        let target = settings.describe();
        let client = settings
            .to_config()
            .connect(NoTls)
            .map_err(|e| store_unavailable(&target, e))?;
        let store = Self::from_client(client, settings.schema.as_deref())
            .map_err(|e| store_unavailable(&target, e))?;
        tracing::info!(db = %target, "Connected to postgres baseline");
        Ok(store)
    }

    /// Wrap a connected client: pin the session to UTC and apply `schema`
    pub fn from_client(mut client: Client, schema: Option<&str>) -> Result<Self> {
        let mut setup = String::from("SET TIME ZONE 'UTC';");
        if let Some(schema) = schema {
            setup.push_str(&format!(" SET search_path TO {};", quote_ident(schema)));
        }
        client
            .batch_execute(&setup)
            .map_err(|e| from_postgres(e).with_op("configure_session"))?;
        Ok(Self {
            client: RefCell::new(client),
        })
    }

    fn table_exists(&self) -> Result<bool> {
        let row = self
            .client
            .borrow_mut()
            .query_one("SELECT to_regclass('xml_update')::text", &[])
            .map_err(from_postgres)?;
        let name: Option<String> = row.get(0);
        Ok(name.is_some())
    }

    /// Number of rows in the baseline
    pub fn count(&self) -> Result<usize> {
        let row = self
            .client
            .borrow_mut()
            .query_one("SELECT COUNT(*) FROM xml_update", &[])
            .map_err(from_postgres)?;
        let n: i64 = row.get(0);
        Ok(n.max(0) as usize)
    }
}

impl BaselineStore for PgBaselineStore {
    fn get_all(&self) -> Result<Baseline> {
        let rows = self
            .client
            .borrow_mut()
            .query(
                "SELECT xml_file, EXTRACT(EPOCH FROM last_modified)::bigint
                 FROM xml_update ORDER BY xml_file",
                &[],
            )
            .map_err(|e| from_postgres(e).with_op("get_all"))?;

        tracing::debug!(rows = rows.len(), "Loaded baseline");
        Ok(rows
            .iter()
            .map(|row| {
                SnapshotRecord::new(
                    row.get::<_, String>(0),
                    Timestamp::from_unix_seconds(row.get(1)),
                )
            })
            .collect())
    }

    fn begin(&mut self) -> Result<Box<dyn BaselineBatch + '_>> {
        let tx = self
            .client
            .get_mut()
            .transaction()
            .map_err(|e| from_postgres(e).with_op("begin"))?;
        Ok(Box::new(PgBatch { tx }))
    }
}

struct PgBatch<'c> {
    tx: Transaction<'c>,
}

fn epoch_param(ts: Timestamp) -> f64 {
    ts.as_unix_seconds() as f64
}

impl BaselineBatch for PgBatch<'_> {
    fn insert(&mut self, record: &SnapshotRecord) -> Result<()> {
        let mut sp = self.tx.savepoint("row_write").map_err(from_postgres)?;
        sp.execute(
            "INSERT INTO xml_update (xml_file, last_modified) VALUES ($1, TO_TIMESTAMP($2))",
            &[&record.resource_id, &epoch_param(record.last_modified)],
        )
        .map_err(|e| {
            from_postgres(e)
                .with_op("insert")
                .with_resource_id(record.resource_id.clone())
        })?;
        sp.commit().map_err(from_postgres)?;
        Ok(())
    }

    fn upsert_if_newer(&mut self, record: &SnapshotRecord) -> Result<bool> {
        let mut sp = self.tx.savepoint("row_write").map_err(from_postgres)?;
        let changed = sp
            .execute(
                UPSERT_IF_NEWER,
                &[&record.resource_id, &epoch_param(record.last_modified)],
            )
            .map_err(|e| {
                from_postgres(e)
                    .with_op("upsert_if_newer")
                    .with_resource_id(record.resource_id.clone())
            })?;
        sp.commit().map_err(from_postgres)?;
        Ok(changed > 0)
    }

    fn clear_all(&mut self) -> Result<usize> {
        self.tx
            .execute("DELETE FROM xml_update", &[])
            .map(|n| n as usize)
            .map_err(|e| from_postgres(e).with_op("clear_all"))
    }

    fn commit(self: Box<Self>) -> Result<()> {
        self.tx
            .commit()
            .map_err(|e| from_postgres(e).with_op("commit"))
    }
}
