//! SIS Poller Engine - run orchestration
//!
//! Wires the core pipeline (fetch, reconcile, commit, render, notify) into
//! the three operator modes. Collaborators arrive as trait objects, so the
//! same runs work against SQLite and HTTP in production and against
//! in-memory fakes in tests.

pub mod commands;

pub use commands::outcome::{RunMode, RunOutcome, RunStatus};
pub use commands::{run_init, run_poll, run_test_notify};
