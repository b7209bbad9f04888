use serde::{Deserialize, Serialize};

use super::timestamp::Timestamp;

/// A `(resource_id, last_modified)` pair, the unit of comparison.
///
/// `resource_id` is the remote file name (e.g. `UU_ALP.xml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub resource_id: String,
    pub last_modified: Timestamp,
}

impl SnapshotRecord {
    pub fn new(resource_id: impl Into<String>, last_modified: Timestamp) -> Self {
        Self {
            resource_id: resource_id.into(),
            last_modified,
        }
    }

    /// Network category of this record, if its id carries one
    pub fn category(&self) -> Option<Category> {
        Category::of(&self.resource_id)
    }
}

/// A record as yielded by a snapshot provider, before validation.
///
/// `last_modified` is `None` when the provider found the row but could not
/// read a timestamp from it; the reconciler rejects such records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedRecord {
    pub resource_id: String,
    pub last_modified: Option<Timestamp>,
}

impl FetchedRecord {
    pub fn new(resource_id: impl Into<String>, last_modified: Timestamp) -> Self {
        Self {
            resource_id: resource_id.into(),
            last_modified: Some(last_modified),
        }
    }

    /// A row whose timestamp was missing or unreadable
    pub fn without_timestamp(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            last_modified: None,
        }
    }
}

impl From<SnapshotRecord> for FetchedRecord {
    fn from(record: SnapshotRecord) -> Self {
        Self::new(record.resource_id, record.last_modified)
    }
}

/// Network code a resource belongs to (`UU_ALP.xml` -> `UU`).
///
/// Categories are plain data; nothing in the core branches on a particular
/// network.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Derive the category from the text before the first `_`.
    ///
    /// Returns `None` when there is no `_` or the prefix is empty.
    pub fn of(resource_id: &str) -> Option<Self> {
        match resource_id.split_once('_') {
            Some((prefix, _)) if !prefix.is_empty() => Some(Self(prefix.to_string())),
            _ => None,
        }
    }

    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_prefix() {
        assert_eq!(Category::of("UU_ALP.xml"), Some(Category::new("UU")));
        assert_eq!(Category::of("IW_FLWY.xml").unwrap().as_str(), "IW");
        assert_eq!(Category::of("README.xml"), None);
        assert_eq!(Category::of("_odd.xml"), None);
    }

    #[test]
    fn test_record_category() {
        let rec = SnapshotRecord::new("WY_YMR.xml", Timestamp::from_unix_seconds(1));
        assert_eq!(rec.category().map(|c| c.to_string()), Some("WY".to_string()));
    }
}
