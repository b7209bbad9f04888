//! In-memory baseline store
//!
//! Used by tests and dry runs. Writes are staged per batch and swapped in on
//! commit, matching the transactional behaviour of the SQLite store.

use std::collections::BTreeSet;

use super::{BaselineBatch, BaselineStore};
use crate::errors::{ExError, ExErrorKind, PollerError, Result};
use crate::model::{Baseline, SnapshotRecord};

/// Single-threaded baseline held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryBaselineStore {
    committed: Baseline,
    failing_rows: BTreeSet<String>,
    commits: usize,
}

impl MemoryBaselineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already-populated baseline
    pub fn with_records<I: IntoIterator<Item = SnapshotRecord>>(records: I) -> Self {
        Self {
            committed: records.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Make every write touching `resource_id` fail with a persistence error.
    ///
    /// Lets callers exercise per-row failure handling.
    pub fn fail_writes_for(&mut self, resource_id: impl Into<String>) {
        self.failing_rows.insert(resource_id.into());
    }

    /// Number of batches committed so far
    pub fn commit_count(&self) -> usize {
        self.commits
    }

    /// Overwrite a row outside of any batch, standing in for a concurrent
    /// writer.
    pub fn force_set(&mut self, record: SnapshotRecord) {
        self.committed.set(record.resource_id, record.last_modified);
    }
}

impl BaselineStore for MemoryBaselineStore {
    fn get_all(&self) -> Result<Baseline> {
        Ok(self.committed.clone())
    }

    fn begin(&mut self) -> Result<Box<dyn BaselineBatch + '_>> {
        let staged = self.committed.clone();
        Ok(Box::new(MemoryBatch {
            store: self,
            staged,
        }))
    }
}

struct MemoryBatch<'a> {
    store: &'a mut MemoryBaselineStore,
    staged: Baseline,
}

impl MemoryBatch<'_> {
    fn check_failure(&self, op: &str, resource_id: &str) -> Result<()> {
        if self.store.failing_rows.contains(resource_id) {
            return Err(ExError::new(ExErrorKind::Persistence)
                .with_op(op)
                .with_resource_id(resource_id)
                .with_message("injected write failure"));
        }
        Ok(())
    }
}

impl BaselineBatch for MemoryBatch<'_> {
    fn insert(&mut self, record: &SnapshotRecord) -> Result<()> {
        self.check_failure("insert", &record.resource_id)?;
        if self.staged.contains(&record.resource_id) {
            let err: ExError = PollerError::DuplicateBaselineRow {
                resource_id: record.resource_id.clone(),
            }
            .into();
            return Err(err.with_op("insert"));
        }
        self.staged
            .set(record.resource_id.clone(), record.last_modified);
        Ok(())
    }

    fn upsert_if_newer(&mut self, record: &SnapshotRecord) -> Result<bool> {
        self.check_failure("upsert_if_newer", &record.resource_id)?;
        match self.staged.get(&record.resource_id) {
            Some(current) if current >= record.last_modified => Ok(false),
            _ => {
                self.staged
                    .set(record.resource_id.clone(), record.last_modified);
                Ok(true)
            }
        }
    }

    fn clear_all(&mut self) -> Result<usize> {
        let removed = self.staged.len();
        self.staged = Baseline::new();
        Ok(removed)
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let MemoryBatch { store, staged } = *self;
        store.committed = staged;
        store.commits += 1;
        Ok(())
    }
}
