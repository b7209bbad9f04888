//! SIS Poller Core - change detection and reconciliation kernel
//!
//! This crate provides the pieces of a poll run that do not touch the network
//! or a database:
//! - Snapshot and baseline models with whole-second timestamps
//! - The Reconciler, which classifies a fetched snapshot against a baseline
//! - The Baseline Writer, which applies a change set through a store batch
//! - Report rendering for the update notification
//! - Fetch coordination across independent sources
//! - The provider, notifier and baseline store traits, plus an in-memory store
//!
//! Concrete HTTP and SQLite adapters live in `sispoll-remote` and
//! `sispoll-store`.

pub mod baseline;
pub mod errors;
pub mod fetch;
pub mod logging_facility;
pub mod model;
pub mod notify;
pub mod reconcile;
pub mod render;
pub mod writer;

pub use sispoll_core_types as core_types;

// Re-export commonly used types
pub use baseline::{BaselineBatch, BaselineStore, MemoryBaselineStore};
pub use errors::{ExError, ExErrorKind, PollerError, Result};
pub use fetch::{collect_snapshot, FetchOutcome, SnapshotProvider, SourceDescriptor};
pub use model::{Baseline, Category, ChangeSet, FetchedRecord, RecordUpdate, SnapshotRecord, Timestamp};
pub use notify::{Notification, Notifier};
pub use reconcile::{reconcile, Reconciliation};
pub use render::render_report;
pub use writer::{commit, replace_all, CommitCounts};
