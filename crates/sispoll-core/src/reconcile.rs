//! Reconciler: classify a fetched snapshot against the committed baseline.
//!
//! ## Algorithm
//!
//! 1. **Normalize**: reject records with an empty id or no timestamp, then
//!    collapse duplicate ids to their maximum timestamp. The result does not
//!    depend on the order the provider enumerated records in.
//! 2. **Classify** in ascending `resource_id` order:
//!    - absent from the baseline: addition
//!    - strictly newer than the baseline: update
//!    - older than the baseline: unchanged, logged as a regression anomaly
//!    - equal: unchanged
//!
//! Classification reads the baseline only; nothing is written here.

use std::collections::BTreeMap;

use crate::errors::{ExError, PollerError};
use crate::model::{Baseline, Category, ChangeSet, FetchedRecord, RecordUpdate, SnapshotRecord, Timestamp};

/// Validated, de-duplicated records sorted by resource id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedSnapshot {
    pub records: Vec<SnapshotRecord>,
    /// Records excluded because they were malformed
    pub rejected: Vec<PollerError>,
    /// Number of duplicate rows collapsed into another row
    pub duplicates: usize,
}

/// Result of a reconciliation, with side-channel diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub change_set: ChangeSet,
    pub rejected: Vec<PollerError>,
    /// Fetched timestamps older than the baseline (never applied)
    pub regressions: Vec<RecordUpdate>,
    pub unchanged: usize,
    pub duplicates: usize,
}

impl Reconciliation {
    /// Number of records excluded as malformed
    pub fn warning_count(&self) -> usize {
        self.rejected.len()
    }
}

/// Validate and de-duplicate a fetched snapshot.
///
/// Duplicate ids keep the maximum timestamp. A malformed duplicate is
/// rejected on its own and does not hide a valid row with the same id.
pub fn normalize(fetched: &[FetchedRecord]) -> NormalizedSnapshot {
    let mut by_id: BTreeMap<&str, Timestamp> = BTreeMap::new();
    let mut rejected = Vec::new();
    let mut duplicates = 0;

    for record in fetched {
        if record.resource_id.trim().is_empty() {
            tracing::warn!("Rejecting fetched record with empty resource_id");
            rejected.push(PollerError::EmptyResourceId);
            continue;
        }
        let Some(ts) = record.last_modified else {
            let err = PollerError::InvalidTimestamp {
                resource_id: record.resource_id.clone(),
            };
            let ex: ExError = err.clone().into();
            tracing::warn!(
                resource_id = %record.resource_id,
                err.code = ex.code(),
                "Rejecting fetched record without a usable timestamp"
            );
            rejected.push(err);
            continue;
        };
        by_id
            .entry(record.resource_id.as_str())
            .and_modify(|current| {
                duplicates += 1;
                if ts > *current {
                    *current = ts;
                }
            })
            .or_insert(ts);
    }

    if duplicates > 0 {
        tracing::debug!(duplicates, "Collapsed duplicate records to their newest timestamp");
    }

    NormalizedSnapshot {
        records: by_id
            .into_iter()
            .map(|(id, ts)| SnapshotRecord::new(id, ts))
            .collect(),
        rejected,
        duplicates,
    }
}

/// Classify `fetched` against `baseline`.
///
/// Pure with respect to the baseline: the same inputs always produce the same
/// change set, and the baseline is not touched.
pub fn reconcile(fetched: &[FetchedRecord], baseline: &Baseline) -> Reconciliation {
    let normalized = normalize(fetched);
    let mut result = classify(&normalized.records, baseline);
    result.rejected = normalized.rejected;
    result.duplicates = normalized.duplicates;
    result
}

/// Classify already-normalized records (sorted, unique ids).
pub fn classify(records: &[SnapshotRecord], baseline: &Baseline) -> Reconciliation {
    let mut result = Reconciliation::default();

    for record in records {
        match baseline.get(&record.resource_id) {
            None => {
                tracing::debug!(resource_id = %record.resource_id, "Candidate addition");
                result.change_set.additions.push(record.clone());
            }
            Some(stored) if record.last_modified > stored => {
                tracing::debug!(
                    resource_id = %record.resource_id,
                    stored = %stored,
                    fetched = %record.last_modified,
                    "Candidate update"
                );
                match Category::of(&record.resource_id) {
                    Some(category) => {
                        result.change_set.category_flags.insert(category);
                    }
                    None => tracing::warn!(
                        resource_id = %record.resource_id,
                        "Unhandled network in resource id"
                    ),
                }
                result.change_set.updates.push(RecordUpdate::new(
                    record.resource_id.clone(),
                    stored,
                    record.last_modified,
                ));
            }
            Some(stored) if record.last_modified < stored => {
                tracing::warn!(
                    resource_id = %record.resource_id,
                    stored = %stored,
                    fetched = %record.last_modified,
                    "Fetched timestamp is older than the baseline; ignoring"
                );
                result.regressions.push(RecordUpdate::new(
                    record.resource_id.clone(),
                    stored,
                    record.last_modified,
                ));
                result.unchanged += 1;
            }
            Some(_) => result.unchanged += 1,
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(t: i64) -> Timestamp {
        Timestamp::from_unix_seconds(t)
    }

    fn fetched(id: &str, t: i64) -> FetchedRecord {
        FetchedRecord::new(id, ts(t))
    }

    fn baseline(entries: &[(&str, i64)]) -> Baseline {
        entries
            .iter()
            .map(|(id, t)| SnapshotRecord::new(*id, ts(*t)))
            .collect()
    }

    #[test]
    fn test_addition_update_and_unchanged() {
        let base = baseline(&[("A", 100), ("B", 200)]);
        let result = reconcile(&[fetched("A", 100), fetched("B", 250), fetched("C", 50)], &base);

        assert_eq!(
            result.change_set.additions,
            vec![SnapshotRecord::new("C", ts(50))]
        );
        assert_eq!(
            result.change_set.updates,
            vec![RecordUpdate::new("B", ts(200), ts(250))]
        );
        assert_eq!(result.unchanged, 1);
        assert!(result.rejected.is_empty());
    }

    #[test]
    fn test_older_timestamp_is_not_a_regression_update() {
        let base = baseline(&[("A", 100)]);
        let result = reconcile(&[fetched("A", 90)], &base);
        assert!(result.change_set.is_empty());
        assert_eq!(result.regressions.len(), 1);
        assert_eq!(result.regressions[0].new_timestamp, ts(90));
    }

    #[test]
    fn test_duplicates_collapse_to_maximum() {
        let forward = normalize(&[fetched("A", 10), fetched("A", 20)]);
        let backward = normalize(&[fetched("A", 20), fetched("A", 10)]);
        assert_eq!(forward.records, vec![SnapshotRecord::new("A", ts(20))]);
        assert_eq!(forward.records, backward.records);
        assert_eq!(forward.duplicates, 1);
    }

    #[test]
    fn test_output_sorted_by_resource_id() {
        let result = reconcile(
            &[fetched("WY_B.xml", 1), fetched("UU_Z.xml", 1), fetched("IW_A.xml", 1)],
            &Baseline::new(),
        );
        let ids: Vec<_> = result
            .change_set
            .additions
            .iter()
            .map(|r| r.resource_id.as_str())
            .collect();
        assert_eq!(ids, vec!["IW_A.xml", "UU_Z.xml", "WY_B.xml"]);
    }

    #[test]
    fn test_malformed_record_does_not_block_others() {
        let base = baseline(&[("UU_A.xml", 1)]);
        let result = reconcile(
            &[
                fetched("UU_A.xml", 2),
                FetchedRecord::without_timestamp("UU_B.xml"),
                fetched("UU_C.xml", 3),
                fetched("", 3),
            ],
            &base,
        );
        assert_eq!(result.change_set.len(), 2);
        assert_eq!(result.warning_count(), 2);
        assert!(result.rejected.contains(&PollerError::InvalidTimestamp {
            resource_id: "UU_B.xml".to_string()
        }));
        assert!(result.rejected.contains(&PollerError::EmptyResourceId));
    }

    #[test]
    fn test_malformed_duplicate_does_not_hide_valid_row() {
        let result = reconcile(
            &[FetchedRecord::without_timestamp("A"), fetched("A", 5)],
            &Baseline::new(),
        );
        assert_eq!(result.change_set.additions.len(), 1);
        assert_eq!(result.rejected.len(), 1);
    }

    #[test]
    fn test_category_flags_only_track_updates() {
        let base = baseline(&[("UU_A.xml", 1), ("WY_B.xml", 1), ("NOPREFIX.xml", 1)]);
        let result = reconcile(
            &[
                fetched("UU_A.xml", 2),
                fetched("WY_B.xml", 1),
                fetched("IW_NEW.xml", 1),
                fetched("NOPREFIX.xml", 9),
            ],
            &base,
        );
        let flags: Vec<_> = result
            .change_set
            .category_flags
            .iter()
            .map(|c| c.as_str())
            .collect();
        assert_eq!(flags, vec!["UU"]);
        assert_eq!(result.change_set.updates.len(), 2);
    }
}
