//! Poll-and-notify run.
//!
//! ## Pipeline (in order):
//! 1. Fetch every source; a run with no successful source aborts
//! 2. Load the baseline (store unavailable aborts)
//! 3. Reconcile the merged snapshot against it
//! 4. Commit the change set in one store transaction
//! 5. Render the report
//! 6. Notify only when the report is non-empty
//!
//! The baseline is committed before the notification is attempted. A failed
//! notification marks the run failed but never rolls the baseline back.

use std::time::Instant;

use sispoll_core::baseline::BaselineStore;
use sispoll_core::errors::Result;
use sispoll_core::fetch::{collect_snapshot, SnapshotProvider, SourceDescriptor};
use sispoll_core::notify::{Notification, Notifier};
use sispoll_core::{commit, log_op_end, log_op_error, log_op_start, reconcile, render_report};
use sispoll_core_types::RunId;

use crate::commands::outcome::{RunMode, RunOutcome};

/// Run one poll cycle.
///
/// # Errors
///
/// - `InvalidConfig` / `NoSnapshot` from fetch coordination
/// - `StoreUnavailable` or `Persistence` when the baseline cannot be read or
///   the batch cannot be committed; nothing is notified in that case
pub fn run_poll(
    provider: &dyn SnapshotProvider,
    store: &mut dyn BaselineStore,
    notifier: &dyn Notifier,
    sources: &[SourceDescriptor],
    topic: &str,
) -> Result<RunOutcome> {
    let start = Instant::now();
    let run_id = RunId::new();
    log_op_start!("poll", run_id = %run_id, sources = sources.len());

    let result = poll_and_commit(provider, store, sources, RunOutcome::new(run_id, RunMode::Poll));
    let mut outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => {
            log_op_error!("poll", err, duration_ms = start.elapsed().as_millis() as u64);
            return Err(err);
        }
    };

    if outcome.report.is_empty() {
        tracing::info!(run_id = %outcome.run_id, "Nothing to update");
    } else {
        let notification = Notification::update(outcome.report.clone(), topic);
        match notifier.notify(&notification) {
            Ok(()) => outcome.notified = Some(notification.message_id),
            Err(err) => {
                tracing::error!(
                    run_id = %outcome.run_id,
                    err.kind = ?err.kind(),
                    err.code = err.code(),
                    "Failed sending update notification: {}",
                    err
                );
                outcome.notify_error = Some(err);
            }
        }
    }

    log_op_end!(
        "poll",
        duration_ms = start.elapsed().as_millis() as u64,
        run_id = %outcome.run_id,
        fetched = outcome.fetched,
        added = outcome.counts.added,
        updated = outcome.counts.updated,
        rejected = outcome.rejected,
        failed = outcome.counts.failed()
    );
    Ok(outcome)
}

fn poll_and_commit(
    provider: &dyn SnapshotProvider,
    store: &mut dyn BaselineStore,
    sources: &[SourceDescriptor],
    mut outcome: RunOutcome,
) -> Result<RunOutcome> {
    let fetched = collect_snapshot(provider, sources)?;
    outcome.fetched = fetched.records.len();
    outcome.failed_sources = fetched.failed;

    let baseline = store.get_all()?;
    let reconciliation = reconcile(&fetched.records, &baseline);
    outcome.rejected = reconciliation.rejected.len();
    outcome.regressions = reconciliation.regressions.len();
    tracing::info!(
        additions = reconciliation.change_set.additions.len(),
        updates = reconciliation.change_set.updates.len(),
        unchanged = reconciliation.unchanged,
        rejected = outcome.rejected,
        "Reconciled snapshot against baseline"
    );

    outcome.counts = commit(store, &reconciliation.change_set)?;
    outcome.report = render_report(&reconciliation.change_set);
    if outcome.counts.failed() > 0 {
        // Unwritten rows stay out of the baseline and are reported again next run.
        tracing::warn!(
            run_id = %outcome.run_id,
            unwritten = ?outcome.counts.failed_resource_ids(),
            "Report lists rows that were not written to the baseline"
        );
    }
    Ok(outcome)
}
