//! PostgreSQL persistence for the baseline
//!
//! Shares the `xml_update` layout with the SQLite store, except that
//! `last_modified` is a `TIMESTAMP` column. Timestamps cross the boundary as
//! Unix seconds in a session pinned to UTC.

mod baseline;
mod config;

pub use baseline::PgBaselineStore;
pub use config::{quote_ident, PgSettings, DEFAULT_CONNECT_TIMEOUT, DEFAULT_PORT};
