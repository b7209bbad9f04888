use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::record::{Category, SnapshotRecord};
use super::timestamp::Timestamp;

/// A resource whose timestamp strictly increased
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordUpdate {
    pub resource_id: String,
    pub old_timestamp: Timestamp,
    pub new_timestamp: Timestamp,
}

impl RecordUpdate {
    pub fn new(resource_id: impl Into<String>, old_timestamp: Timestamp, new_timestamp: Timestamp) -> Self {
        Self {
            resource_id: resource_id.into(),
            old_timestamp,
            new_timestamp,
        }
    }

    pub fn category(&self) -> Option<Category> {
        Category::of(&self.resource_id)
    }
}

/// Minimal set of baseline changes produced by one reconciliation.
///
/// `additions` and `updates` are each sorted by `resource_id` and never share
/// an id. `category_flags` only feeds summary logging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub additions: Vec<SnapshotRecord>,
    pub updates: Vec<RecordUpdate>,
    pub category_flags: BTreeSet<Category>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.updates.is_empty()
    }

    /// Total number of rows this change set would touch
    pub fn len(&self) -> usize {
        self.additions.len() + self.updates.len()
    }

    /// Whether `resource_id` is an addition or an update in this set
    pub fn touches(&self, resource_id: &str) -> bool {
        self.additions.iter().any(|r| r.resource_id == resource_id)
            || self.updates.iter().any(|u| u.resource_id == resource_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_change_set() {
        let cs = ChangeSet::new();
        assert!(cs.is_empty());
        assert_eq!(cs.len(), 0);
        assert!(!cs.touches("A"));
    }

    #[test]
    fn test_len_counts_both_sections() {
        let cs = ChangeSet {
            additions: vec![SnapshotRecord::new("C", Timestamp::from_unix_seconds(50))],
            updates: vec![RecordUpdate::new(
                "B",
                Timestamp::from_unix_seconds(200),
                Timestamp::from_unix_seconds(250),
            )],
            category_flags: BTreeSet::new(),
        };
        assert!(!cs.is_empty());
        assert_eq!(cs.len(), 2);
        assert!(cs.touches("B"));
        assert!(cs.touches("C"));
    }
}
