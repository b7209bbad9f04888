//! Core types shared across the SIS poller crates
//!
//! This crate provides small foundational types used by the error and
//! logging facilities as well as the notification path:
//!
//! - **Correlation types**: RunId, MessageId
//! - **Sensitive data**: Sensitive<T> marker for automatic redaction
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::{MessageId, MessageKind, RunId};
pub use sensitive::Sensitive;
