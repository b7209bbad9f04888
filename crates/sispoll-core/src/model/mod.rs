//! Domain model for change detection
//!
//! - [`Timestamp`]: whole-second instant used for every comparison
//! - [`SnapshotRecord`] / [`FetchedRecord`]: the unit of comparison
//! - [`Category`]: network code derived from a resource id
//! - [`Baseline`]: last committed state, keyed by resource id
//! - [`ChangeSet`]: classified result of a reconciliation

pub mod baseline;
pub mod change_set;
pub mod record;
pub mod timestamp;

pub use baseline::Baseline;
pub use change_set::{ChangeSet, RecordUpdate};
pub use record::{Category, FetchedRecord, SnapshotRecord};
pub use timestamp::Timestamp;
