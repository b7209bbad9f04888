use std::collections::BTreeMap;

use super::record::SnapshotRecord;
use super::timestamp::Timestamp;

/// Read-only view of the committed baseline, keyed by resource id.
///
/// Produced by `BaselineStore::get_all`; iteration is in ascending
/// resource id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Baseline {
    entries: BTreeMap<String, Timestamp>,
}

impl Baseline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, resource_id: &str) -> Option<Timestamp> {
        self.entries.get(resource_id).copied()
    }

    pub fn contains(&self, resource_id: &str) -> bool {
        self.entries.contains_key(resource_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = SnapshotRecord> + '_ {
        self.entries
            .iter()
            .map(|(id, ts)| SnapshotRecord::new(id.clone(), *ts))
    }

    /// Insert or overwrite one entry
    pub fn set(&mut self, resource_id: impl Into<String>, last_modified: Timestamp) {
        self.entries.insert(resource_id.into(), last_modified);
    }
}

impl FromIterator<SnapshotRecord> for Baseline {
    fn from_iter<I: IntoIterator<Item = SnapshotRecord>>(iter: I) -> Self {
        let mut baseline = Baseline::new();
        for record in iter {
            baseline.set(record.resource_id, record.last_modified);
        }
        baseline
    }
}
