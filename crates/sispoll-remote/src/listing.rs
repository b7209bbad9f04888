//! Directory listing provider
//!
//! A listing page holds one HTML table. File rows have exactly five cells:
//! cell 1 carries the file anchor and cell 2 the `YYYY-MM-DD HH:MM`
//! modification time. Every other row is ignored.

use std::time::Duration;

use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use sispoll_core::errors::{ExError, ExErrorKind, Result};
use sispoll_core::fetch::{SnapshotProvider, SourceDescriptor};
use sispoll_core::model::{FetchedRecord, Timestamp};

const LISTING_ROW_CELLS: usize = 5;

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| {
        ExError::new(ExErrorKind::Internal)
            .with_op("parse_listing")
            .with_message(format!("invalid selector {}: {}", css, e))
    })
}

fn cell_text(cell: &ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Extract `(file name, last modified)` rows from a listing page.
///
/// A row whose timestamp cell is empty or unreadable is still returned, with
/// no timestamp, so the reconciler can reject it visibly.
///
/// # Errors
///
/// Returns a `Fetch` error when the page has no table.
pub fn parse_listing(html: &str) -> Result<Vec<FetchedRecord>> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("td")?;
    let anchor_sel = selector("a")?;

    let table = document.select(&table_sel).next().ok_or_else(|| {
        ExError::new(ExErrorKind::Fetch)
            .with_op("parse_listing")
            .with_message("listing page has no table")
    })?;

    let mut records = Vec::new();
    for row in table.select(&row_sel) {
        let cells: Vec<ElementRef<'_>> = row.select(&cell_sel).collect();
        if cells.len() != LISTING_ROW_CELLS {
            continue;
        }

        let name = cells[1]
            .select(&anchor_sel)
            .next()
            .map(|a| cell_text(&a))
            .unwrap_or_else(|| cell_text(&cells[1]));
        if name.is_empty() {
            continue;
        }

        let modified = cell_text(&cells[2]);
        match Timestamp::parse_listing(&modified) {
            Ok(ts) => records.push(FetchedRecord::new(name, ts)),
            Err(err) => {
                tracing::debug!(resource_id = %name, "{}", err);
                records.push(FetchedRecord::without_timestamp(name));
            }
        }
    }

    Ok(records)
}

/// Fetches listing pages over HTTP
pub struct HttpListingProvider {
    client: Client,
}

impl HttpListingProvider {
    /// Build a provider whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            ExError::new(ExErrorKind::InvalidConfig)
                .with_op("http_client")
                .with_message(e.to_string())
        })?;
        Ok(Self { client })
    }

    fn get_page(&self, source: &SourceDescriptor) -> Result<String> {
        let transport = |e: reqwest::Error| {
            let kind = if e.is_timeout() {
                ExErrorKind::Timeout
            } else {
                ExErrorKind::Fetch
            };
            ExError::new(kind)
                .with_op("fetch_source")
                .with_source_name(source.network.clone())
                .with_message(format!("GET {} failed: {}", source.url, e))
        };

        let response = self.client.get(&source.url).send().map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExError::new(ExErrorKind::Fetch)
                .with_op("fetch_source")
                .with_source_name(source.network.clone())
                .with_message(format!("GET {} returned HTTP {}", source.url, status)));
        }
        response.text().map_err(transport)
    }
}

impl SnapshotProvider for HttpListingProvider {
    fn fetch(&self, source: &SourceDescriptor) -> Result<Vec<FetchedRecord>> {
        tracing::debug!(source = %source.network, url = %source.url, "Fetching listing");
        let page = self.get_page(source)?;
        parse_listing(&page).map_err(|e| e.with_source_name(source.network.clone()))
    }
}
