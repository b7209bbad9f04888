//! Canonical schema constants for structured logging and events
//!
//! The logging macros emit these names; the test capture layer reads them
//! back.

// Operation boundary fields
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_MESSAGE: &str = "message";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Context and error fields
pub const FIELD_RESOURCE_ID: &str = "resource_id";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
