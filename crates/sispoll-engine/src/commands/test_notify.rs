//! Canned test notification.
//!
//! Bypasses the provider and the baseline entirely.

use std::time::Instant;

use sispoll_core::errors::Result;
use sispoll_core::notify::{Notification, Notifier};
use sispoll_core::{log_op_end, log_op_error, log_op_start};
use sispoll_core_types::RunId;

use crate::commands::outcome::{RunMode, RunOutcome};

/// Send the test message to `topic`.
///
/// # Errors
///
/// The notifier's error (`Unauthorised` or `ExternalService`).
pub fn run_test_notify(notifier: &dyn Notifier, topic: &str) -> Result<RunOutcome> {
    let start = Instant::now();
    let mut outcome = RunOutcome::new(RunId::new(), RunMode::TestNotify);
    log_op_start!("test_notify", run_id = %outcome.run_id);

    let notification = Notification::test(topic);
    if let Err(err) = notifier.notify(&notification) {
        log_op_error!("test_notify", err, duration_ms = start.elapsed().as_millis() as u64);
        return Err(err);
    }

    outcome.report = notification.body;
    outcome.notified = Some(notification.message_id);
    log_op_end!("test_notify", duration_ms = start.elapsed().as_millis() as u64);
    Ok(outcome)
}
