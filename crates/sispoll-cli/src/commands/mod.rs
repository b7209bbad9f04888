pub mod init;
pub mod poll;
pub mod test_notify;

use sispoll_engine::RunOutcome;

/// Print the operator-facing summary of a finished run
pub(crate) fn print_summary(outcome: &RunOutcome) {
    if !outcome.report.is_empty() {
        print!("{}", outcome.report);
    }
    println!(
        "{}: {} fetched, {} added, {} updated, {} rejected, {} failed sources (run {})",
        outcome.mode.as_str(),
        outcome.fetched,
        outcome.counts.added,
        outcome.counts.updated,
        outcome.rejected,
        outcome.failed_sources.len(),
        outcome.run_id
    );
}
