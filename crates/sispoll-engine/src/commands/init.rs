//! Baseline initialization run.
//!
//! Fetches every source and replaces the whole baseline with the result. No
//! notification is sent, whatever changed. Replacing drops every row the
//! snapshot does not list, so a single failed source aborts the run before
//! the store is touched.

use std::time::Instant;

use sispoll_core::baseline::BaselineStore;
use sispoll_core::errors::{PollerError, Result};
use sispoll_core::fetch::{collect_snapshot, SnapshotProvider, SourceDescriptor};
use sispoll_core::reconcile::normalize;
use sispoll_core::{log_op_end, log_op_error, log_op_start, replace_all};
use sispoll_core_types::RunId;

use crate::commands::outcome::{RunMode, RunOutcome};

/// Populate the baseline from a fresh snapshot.
///
/// Malformed records are excluded and counted; duplicates keep their newest
/// timestamp.
///
/// # Errors
///
/// - `InvalidConfig` / `NoSnapshot` from fetch coordination
/// - `IncompleteSnapshot` if any source failed; the baseline is left as is
/// - the store error if the replacement batch cannot be opened or committed
pub fn run_init(
    provider: &dyn SnapshotProvider,
    store: &mut dyn BaselineStore,
    sources: &[SourceDescriptor],
) -> Result<RunOutcome> {
    let start = Instant::now();
    let run_id = RunId::new();
    log_op_start!("init", run_id = %run_id, sources = sources.len());

    match initialize(provider, store, sources, RunOutcome::new(run_id, RunMode::Init)) {
        Ok(outcome) => {
            log_op_end!(
                "init",
                duration_ms = start.elapsed().as_millis() as u64,
                run_id = %outcome.run_id,
                added = outcome.counts.added,
                rejected = outcome.rejected
            );
            Ok(outcome)
        }
        Err(err) => {
            log_op_error!("init", err, duration_ms = start.elapsed().as_millis() as u64);
            Err(err)
        }
    }
}

fn initialize(
    provider: &dyn SnapshotProvider,
    store: &mut dyn BaselineStore,
    sources: &[SourceDescriptor],
    mut outcome: RunOutcome,
) -> Result<RunOutcome> {
    let fetched = collect_snapshot(provider, sources)?;
    if !fetched.failed.is_empty() {
        let failed = fetched
            .failed
            .iter()
            .map(|e| e.source_name().unwrap_or("unknown").to_string())
            .collect();
        return Err(PollerError::IncompleteSnapshot {
            failed,
            attempted: sources.len(),
        }
        .into());
    }
    outcome.fetched = fetched.records.len();

    let normalized = normalize(&fetched.records);
    outcome.rejected = normalized.rejected.len();

    tracing::info!(records = normalized.records.len(), "Initializing baseline");
    outcome.counts = replace_all(store, &normalized.records)?;
    Ok(outcome)
}
