//! Baseline store seam
//!
//! The baseline is the only shared mutable state of the poller. Reads go
//! through [`BaselineStore::get_all`]; every write happens inside a
//! [`BaselineBatch`], which maps onto one storage transaction. Dropping a
//! batch without calling [`BaselineBatch::commit`] discards it.
//!
//! Individual writes inside a batch are isolated from each other: a failed
//! `insert` or `upsert_if_newer` leaves the batch usable and the rows written
//! before it intact.

pub mod memory;

use crate::errors::Result;
use crate::model::{Baseline, SnapshotRecord};

pub use memory::MemoryBaselineStore;

/// Persistent mapping from resource id to last committed timestamp
pub trait BaselineStore {
    /// Snapshot of every committed row
    fn get_all(&self) -> Result<Baseline>;

    /// Open a write batch (one transaction)
    fn begin(&mut self) -> Result<Box<dyn BaselineBatch + '_>>;
}

/// Writes applied as one transactional unit
pub trait BaselineBatch {
    /// Insert a row that must not exist yet.
    ///
    /// # Errors
    ///
    /// `ExErrorKind::AlreadyExists` if the resource id is already stored;
    /// `ExErrorKind::Persistence` for any other storage failure.
    fn insert(&mut self, record: &SnapshotRecord) -> Result<()>;

    /// Write `record` unless the stored timestamp is already at least as new.
    ///
    /// The comparison uses the value current at write time, not the value
    /// read at the start of the run. Returns whether a row was written.
    fn upsert_if_newer(&mut self, record: &SnapshotRecord) -> Result<bool>;

    /// Remove every row; returns how many were removed
    fn clear_all(&mut self) -> Result<usize>;

    /// Make the batch durable
    fn commit(self: Box<Self>) -> Result<()>;
}
