use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::PollerError;

/// Listing format published by the SIS directory pages (minute resolution)
pub const LISTING_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Listing format with seconds, accepted for forward compatibility
pub const LISTING_FORMAT_SECONDS: &str = "%Y-%m-%d %H:%M:%S";

/// Server-reported modification time at whole-second resolution.
///
/// Stored as Unix seconds (UTC). Conversions from finer-grained instants
/// truncate toward negative infinity, so two instants within the same second
/// always compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn from_unix_seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    pub const fn as_unix_seconds(self) -> i64 {
        self.0
    }

    /// Truncate a UTC instant to whole seconds
    pub fn from_datetime(instant: DateTime<Utc>) -> Self {
        // timestamp() is the floor; sub-second nanos are always non-negative
        Self(instant.timestamp())
    }

    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.0, 0).single()
    }

    /// Parse a directory-listing timestamp such as `2023-05-30 09:29`.
    ///
    /// The text is interpreted as UTC; missing seconds are zero.
    ///
    /// # Errors
    ///
    /// Returns `PollerError::UnparseableTimestamp` if the text matches neither
    /// listing format.
    pub fn parse_listing(text: &str) -> Result<Self, PollerError> {
        let trimmed = text.trim();
        let naive = NaiveDateTime::parse_from_str(trimmed, LISTING_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(trimmed, LISTING_FORMAT_SECONDS))
            .map_err(|e| PollerError::UnparseableTimestamp {
                text: trimmed.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self::from_datetime(Utc.from_utc_datetime(&naive)))
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format(LISTING_FORMAT_SECONDS)),
            None => write!(f, "@{}", self.0),
        }
    }
}
