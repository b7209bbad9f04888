#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;

use sispoll_core::errors::{ExError, ExErrorKind, Result};
use sispoll_core::fetch::{SnapshotProvider, SourceDescriptor};
use sispoll_core::model::{FetchedRecord, Timestamp};
use sispoll_core::notify::{Notification, Notifier};

/// Provider serving canned listings per network; unknown networks fail
#[derive(Default)]
pub struct FakeProvider {
    listings: BTreeMap<String, Vec<FetchedRecord>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing(mut self, network: &str, rows: &[(&str, i64)]) -> Self {
        self.listings.insert(
            network.to_string(),
            rows.iter()
                .map(|(id, t)| FetchedRecord::new(*id, Timestamp::from_unix_seconds(*t)))
                .collect(),
        );
        self
    }

    pub fn with_raw_listing(mut self, network: &str, rows: Vec<FetchedRecord>) -> Self {
        self.listings.insert(network.to_string(), rows);
        self
    }
}

impl SnapshotProvider for FakeProvider {
    fn fetch(&self, source: &SourceDescriptor) -> Result<Vec<FetchedRecord>> {
        self.listings.get(&source.network).cloned().ok_or_else(|| {
            ExError::new(ExErrorKind::Fetch)
                .with_source_name(source.network.clone())
                .with_message("connection refused")
        })
    }
}

/// Notifier recording every delivered message
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: RefCell<Vec<Notification>>,
    pub fail_with: Option<ExErrorKind>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(kind: ExErrorKind) -> Self {
        Self {
            sent: RefCell::new(Vec::new()),
            fail_with: Some(kind),
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        if let Some(kind) = self.fail_with {
            return Err(ExError::new(kind).with_op("notify"));
        }
        self.sent.borrow_mut().push(notification.clone());
        Ok(())
    }
}

pub fn sources(networks: &[&str]) -> Vec<SourceDescriptor> {
    networks
        .iter()
        .map(|n| SourceDescriptor::new(*n, format!("http://sis.test/{}/", n)))
        .collect()
}

pub fn ts(t: i64) -> Timestamp {
    Timestamp::from_unix_seconds(t)
}
