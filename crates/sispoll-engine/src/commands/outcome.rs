//! Run results reported back to the caller.

use sispoll_core::errors::ExError;
use sispoll_core::writer::CommitCounts;
use sispoll_core_types::{MessageId, RunId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Poll,
    Init,
    TestNotify,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Poll => "poll",
            RunMode::Init => "init",
            RunMode::TestNotify => "test_notify",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Everything attempted succeeded
    Succeeded,
    /// Finished, but some sources or rows were skipped
    Degraded,
    /// The baseline is committed but the notification could not be delivered
    Failed,
}

/// Summary of one completed run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: RunId,
    pub mode: RunMode,
    /// Records returned by the sources that succeeded
    pub fetched: usize,
    pub failed_sources: Vec<ExError>,
    /// Malformed records excluded by the reconciler
    pub rejected: usize,
    /// Records whose fetched timestamp was older than the baseline
    pub regressions: usize,
    pub counts: CommitCounts,
    /// Rendered report; empty when nothing changed
    pub report: String,
    /// Identifier of the delivered notification, if one was sent
    pub notified: Option<MessageId>,
    pub notify_error: Option<ExError>,
}

impl RunOutcome {
    pub(crate) fn new(run_id: RunId, mode: RunMode) -> Self {
        Self {
            run_id,
            mode,
            fetched: 0,
            failed_sources: Vec::new(),
            rejected: 0,
            regressions: 0,
            counts: CommitCounts::default(),
            report: String::new(),
            notified: None,
            notify_error: None,
        }
    }

    pub fn status(&self) -> RunStatus {
        if self.notify_error.is_some() {
            RunStatus::Failed
        } else if !self.failed_sources.is_empty()
            || self.rejected > 0
            || !self.counts.failures.is_empty()
        {
            RunStatus::Degraded
        } else {
            RunStatus::Succeeded
        }
    }
}
