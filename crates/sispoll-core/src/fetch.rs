//! Snapshot fetch coordination
//!
//! Every configured source is fetched on its own. A source that fails is
//! excluded from this run and logged; the records of the remaining sources are
//! merged into one snapshot. The run has nothing to reconcile only when every
//! source failed.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::errors::{ExError, ExErrorKind, PollerError, Result};
use crate::model::FetchedRecord;
use crate::{log_op_end, log_op_error, log_op_start};

/// One remote listing to poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Network code, also the expected `<network>_` resource id prefix
    pub network: String,
    pub url: String,
    /// Station allow-list; empty keeps every row of the network
    #[serde(default)]
    pub keep: Vec<String>,
}

impl SourceDescriptor {
    pub fn new(network: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            url: url.into(),
            keep: Vec::new(),
        }
    }

    pub fn with_keep<I, S>(mut self, stations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keep = stations.into_iter().map(Into::into).collect();
        self
    }

    /// Whether a listed resource belongs to this source's snapshot.
    ///
    /// The id must start with `<network>_`. With a keep list, either the
    /// station code (`IW_FLWY.xml` -> `FLWY`) or the full id must be listed.
    pub fn admits(&self, resource_id: &str) -> bool {
        let Some(rest) = resource_id
            .strip_prefix(self.network.as_str())
            .and_then(|r| r.strip_prefix('_'))
        else {
            return false;
        };
        if self.keep.is_empty() {
            return true;
        }
        let station = rest.split_once('.').map_or(rest, |(code, _)| code);
        self.keep
            .iter()
            .any(|k| k == station || k == resource_id)
    }
}

/// Source of fetched records, one listing at a time
pub trait SnapshotProvider {
    /// Fetch every record listed by `source`.
    ///
    /// # Errors
    ///
    /// Returns a `Fetch` (or `Timeout`) error when the listing cannot be
    /// retrieved or parsed.
    fn fetch(&self, source: &SourceDescriptor) -> Result<Vec<FetchedRecord>>;
}

/// Merged snapshot plus per-source diagnostics
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub records: Vec<FetchedRecord>,
    /// Networks that contributed records
    pub succeeded: Vec<String>,
    pub failed: Vec<ExError>,
}

/// Fetch all sources and merge the ones that succeeded.
///
/// Rows a source lists but does not admit are dropped here.
///
/// # Errors
///
/// - `InvalidConfig` if `sources` is empty
/// - `NoSnapshot` if every source failed
pub fn collect_snapshot(
    provider: &dyn SnapshotProvider,
    sources: &[SourceDescriptor],
) -> Result<FetchOutcome> {
    if sources.is_empty() {
        return Err(PollerError::NoSources.into());
    }

    let mut outcome = FetchOutcome::default();

    for source in sources {
        let start = Instant::now();
        log_op_start!("fetch_source", source = %source.network);

        match provider.fetch(source) {
            Ok(rows) => {
                let listed = rows.len();
                let kept: Vec<FetchedRecord> = rows
                    .into_iter()
                    .filter(|r| source.admits(&r.resource_id))
                    .collect();
                log_op_end!(
                    "fetch_source",
                    duration_ms = start.elapsed().as_millis() as u64,
                    source = %source.network,
                    listed = listed,
                    fetched = kept.len()
                );
                outcome.records.extend(kept);
                outcome.succeeded.push(source.network.clone());
            }
            Err(err) => {
                let err = classify_fetch_error(err, source);
                log_op_error!(
                    "fetch_source",
                    err,
                    duration_ms = start.elapsed().as_millis() as u64,
                    source = %source.network
                );
                outcome.failed.push(err);
            }
        }
    }

    if outcome.succeeded.is_empty() {
        return Err(PollerError::NoSnapshot {
            attempted: sources.len(),
        }
        .into());
    }

    if !outcome.failed.is_empty() {
        tracing::warn!(
            failed = outcome.failed.len(),
            succeeded = outcome.succeeded.len(),
            "Continuing with a partial snapshot"
        );
    }

    Ok(outcome)
}

fn classify_fetch_error(err: ExError, source: &SourceDescriptor) -> ExError {
    let err = match err.kind() {
        ExErrorKind::Fetch | ExErrorKind::Timeout => err,
        _ => ExError::from(PollerError::SourceFetchFailed {
            source_name: source.network.clone(),
            reason: format!("listing at {} unusable", source.url),
        })
        .with_op("fetch_source")
        .with_cause(err),
    };
    if err.source_name().is_none() {
        err.with_source_name(source.network.clone())
    } else {
        err
    }
}
