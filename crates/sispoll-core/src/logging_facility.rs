//! Structured logging facility for the poller
//!
//! This module provides:
//! - A single initialization point via `init(profile, options)` that returns a
//!   run-scoped [`LoggingGuard`]
//! - Structured logging macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! The reconciler and writer only emit `tracing` events; they work (silently)
//! when no subscriber has been installed, so they are testable without any
//! global setup.
//!
//! # Usage
//!
//! ```no_run
//! use sispoll_core::logging_facility::{init, LogOptions, Profile};
//!
//! let _guard = init(Profile::Development, &LogOptions::default()).unwrap();
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, level_for_verbosity, LogOptions, LoggingGuard, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
