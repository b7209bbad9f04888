//! SIS Poller Remote - HTTP adapters for the provider and notifier seams
//!
//! - [`HttpListingProvider`] reads a SIS directory listing page per network
//! - [`ApiGatewayNotifier`] submits notifications to the e-mail API gateway
//!
//! Both use a blocking `reqwest` client with a per-request timeout.

pub mod gateway;
pub mod listing;

pub use gateway::{default_source_name, ApiGatewayNotifier};
pub use listing::{parse_listing, HttpListingProvider};
