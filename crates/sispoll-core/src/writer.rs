//! Baseline Writer: apply a change set to a baseline store.
//!
//! All rows of one batch are written inside a single store transaction. A row
//! that fails is logged with its resource id, counted, and skipped; the rest
//! of the batch still commits. Only a failure to open or commit the
//! transaction itself is returned as an error.

use std::collections::BTreeSet;

use crate::baseline::{BaselineBatch, BaselineStore};
use crate::errors::{ExError, ExErrorKind, Result};
use crate::model::{Category, ChangeSet, SnapshotRecord};

/// Outcome of a committed batch
#[derive(Debug, Clone, Default)]
pub struct CommitCounts {
    pub added: usize,
    pub updated: usize,
    /// Rows skipped because a newer or equal value was already stored
    pub superseded: usize,
    /// Rows that could not be written
    pub failures: Vec<ExError>,
    /// Categories with at least one applied update
    pub updated_categories: BTreeSet<Category>,
}

impl CommitCounts {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Resource ids of the rows that could not be written
    pub fn failed_resource_ids(&self) -> Vec<&str> {
        self.failures.iter().filter_map(ExError::resource_id).collect()
    }
}

/// Apply `change_set` in one transaction.
///
/// Additions are inserted. An addition that collides with a row written by an
/// overlapping run is retried as an upsert-if-newer. Updates are always
/// upsert-if-newer against the value stored at write time.
///
/// # Errors
///
/// Returns the store error if the transaction cannot be opened or committed.
pub fn commit(store: &mut dyn BaselineStore, change_set: &ChangeSet) -> Result<CommitCounts> {
    let mut counts = CommitCounts::default();
    if change_set.is_empty() {
        return Ok(counts);
    }

    let mut batch = store.begin()?;

    for record in &change_set.additions {
        match batch.insert(record) {
            Ok(()) => counts.added += 1,
            Err(err) if err.kind() == ExErrorKind::AlreadyExists => {
                tracing::debug!(
                    resource_id = %record.resource_id,
                    "Row inserted concurrently; falling back to conditional update"
                );
                apply_if_newer(batch.as_mut(), record, &mut counts, false);
            }
            Err(err) => record_failure(&mut counts, record, err),
        }
    }

    for update in &change_set.updates {
        let record = SnapshotRecord::new(update.resource_id.clone(), update.new_timestamp);
        apply_if_newer(batch.as_mut(), &record, &mut counts, true);
    }

    batch.commit()?;

    for category in &counts.updated_categories {
        tracing::info!(category = %category, "Updated {}", category);
    }
    tracing::info!(
        added = counts.added,
        updated = counts.updated,
        superseded = counts.superseded,
        failed = counts.failed(),
        "Baseline batch committed"
    );

    Ok(counts)
}

/// Clear the store and insert `records` in one transaction.
///
/// Used only when initializing a baseline. Duplicate ids in `records` keep
/// their maximum timestamp.
///
/// # Errors
///
/// Returns the store error if the transaction cannot be opened, cleared or
/// committed.
pub fn replace_all(store: &mut dyn BaselineStore, records: &[SnapshotRecord]) -> Result<CommitCounts> {
    let mut counts = CommitCounts::default();
    let mut batch = store.begin()?;

    let cleared = batch.clear_all()?;
    tracing::info!(cleared, "Cleared baseline before initialization");

    for record in records {
        match batch.insert(record) {
            Ok(()) => counts.added += 1,
            Err(err) if err.kind() == ExErrorKind::AlreadyExists => {
                apply_if_newer(batch.as_mut(), record, &mut counts, false);
            }
            Err(err) => record_failure(&mut counts, record, err),
        }
    }

    batch.commit()?;
    tracing::info!(
        added = counts.added,
        failed = counts.failed(),
        "Baseline replaced"
    );

    Ok(counts)
}

fn apply_if_newer(
    batch: &mut dyn BaselineBatch,
    record: &SnapshotRecord,
    counts: &mut CommitCounts,
    is_update: bool,
) {
    match batch.upsert_if_newer(record) {
        Ok(true) => {
            if is_update {
                counts.updated += 1;
                if let Some(category) = record.category() {
                    counts.updated_categories.insert(category);
                }
            } else {
                counts.added += 1;
            }
        }
        Ok(false) => {
            tracing::debug!(
                resource_id = %record.resource_id,
                "Stored timestamp already newer or equal; row superseded"
            );
            counts.superseded += 1;
        }
        Err(err) => record_failure(counts, record, err),
    }
}

fn record_failure(counts: &mut CommitCounts, record: &SnapshotRecord, err: ExError) {
    let err = if err.resource_id().is_none() {
        err.with_resource_id(record.resource_id.clone())
    } else {
        err
    };
    tracing::error!(
        resource_id = %record.resource_id,
        err.kind = ?err.kind(),
        err.code = err.code(),
        "Failed to write baseline row: {}",
        err
    );
    counts.failures.push(err);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::MemoryBaselineStore;
    use crate::model::{RecordUpdate, Timestamp};

    fn ts(t: i64) -> Timestamp {
        Timestamp::from_unix_seconds(t)
    }

    #[test]
    fn test_commit_applies_additions_and_updates() {
        let mut store = MemoryBaselineStore::with_records([SnapshotRecord::new("UU_A.xml", ts(100))]);
        let mut change_set = ChangeSet::new();
        change_set.additions.push(SnapshotRecord::new("UU_B.xml", ts(5)));
        change_set
            .updates
            .push(RecordUpdate::new("UU_A.xml", ts(100), ts(150)));

        let counts = commit(&mut store, &change_set).unwrap();
        assert_eq!(counts.added, 1);
        assert_eq!(counts.updated, 1);
        assert_eq!(
            counts.updated_categories.iter().map(|c| c.as_str()).collect::<Vec<_>>(),
            vec!["UU"]
        );

        let baseline = store.get_all().unwrap();
        assert_eq!(baseline.get("UU_A.xml"), Some(ts(150)));
        assert_eq!(baseline.get("UU_B.xml"), Some(ts(5)));
    }

    #[test]
    fn test_empty_change_set_opens_no_transaction() {
        let mut store = MemoryBaselineStore::new();
        let counts = commit(&mut store, &ChangeSet::new()).unwrap();
        assert_eq!(counts.added + counts.updated, 0);
        assert_eq!(store.commit_count(), 0);
    }

    #[test]
    fn test_row_failure_does_not_roll_back_batch() {
        let mut store = MemoryBaselineStore::new();
        store.fail_writes_for("UU_BAD.xml");
        let mut change_set = ChangeSet::new();
        change_set.additions.push(SnapshotRecord::new("UU_BAD.xml", ts(1)));
        change_set.additions.push(SnapshotRecord::new("UU_OK.xml", ts(2)));

        let counts = commit(&mut store, &change_set).unwrap();
        assert_eq!(counts.added, 1);
        assert_eq!(counts.failed(), 1);
        assert_eq!(counts.failures[0].resource_id(), Some("UU_BAD.xml"));
        assert_eq!(counts.failed_resource_ids(), vec!["UU_BAD.xml"]);

        let baseline = store.get_all().unwrap();
        assert!(baseline.contains("UU_OK.xml"));
        assert!(!baseline.contains("UU_BAD.xml"));
    }

    #[test]
    fn test_concurrent_newer_value_wins() {
        let mut store = MemoryBaselineStore::with_records([SnapshotRecord::new("A", ts(100))]);
        let mut change_set = ChangeSet::new();
        change_set.updates.push(RecordUpdate::new("A", ts(100), ts(150)));
        // Another run raised the row after reconciliation.
        store.force_set(SnapshotRecord::new("A", ts(200)));

        let counts = commit(&mut store, &change_set).unwrap();
        assert_eq!(counts.updated, 0);
        assert_eq!(counts.superseded, 1);
        assert_eq!(store.get_all().unwrap().get("A"), Some(ts(200)));
    }

    #[test]
    fn test_colliding_addition_falls_back_to_upsert() {
        let mut store = MemoryBaselineStore::new();
        let mut change_set = ChangeSet::new();
        change_set.additions.push(SnapshotRecord::new("A", ts(50)));
        store.force_set(SnapshotRecord::new("A", ts(10)));

        let counts = commit(&mut store, &change_set).unwrap();
        assert_eq!(counts.added, 1);
        assert!(counts.failures.is_empty());
        assert_eq!(store.get_all().unwrap().get("A"), Some(ts(50)));
    }

    #[test]
    fn test_replace_all_clears_previous_rows() {
        let mut store = MemoryBaselineStore::with_records([SnapshotRecord::new("OLD", ts(1))]);
        let counts = replace_all(
            &mut store,
            &[SnapshotRecord::new("A", ts(100)), SnapshotRecord::new("B", ts(200))],
        )
        .unwrap();
        assert_eq!(counts.added, 2);

        let baseline = store.get_all().unwrap();
        assert_eq!(baseline.len(), 2);
        assert!(!baseline.contains("OLD"));
        assert_eq!(baseline.get("B"), Some(ts(200)));
    }
}
