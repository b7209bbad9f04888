//! SIS Poller Store - durable persistence for the baseline
//!
//! Provides:
//! - Connection helpers (WAL journal, busy timeout)
//! - Embedded, checksummed schema migrations
//! - `SqliteBaselineStore` and `PgBaselineStore`, the durable implementations
//!   of the baseline traits

pub mod baseline;
pub mod db;
pub mod errors;
pub mod migrations;
pub mod pg;

// Re-export key types
pub use baseline::SqliteBaselineStore;
pub use errors::Result;
pub use pg::{PgBaselineStore, PgSettings};
