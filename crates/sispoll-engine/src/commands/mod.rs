//! Command orchestration layer.
//!
//! One function per operator mode:
//! - `run_poll`: fetch, reconcile, commit, then notify when something changed
//! - `run_init`: fetch and replace the whole baseline, never notify
//! - `run_test_notify`: send the canned test message only

pub mod init;
pub mod outcome;
pub mod poll;
pub mod test_notify;

pub use init::run_init;
pub use poll::run_poll;
pub use test_notify::run_test_notify;
