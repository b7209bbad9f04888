//! E-mail API gateway notifier
//!
//! Messages are submitted as `PUT <host>/Email` with an `x-api-key` header and
//! a JSON body of the form
//! `{"payload": {"subject", "message", "topic", "messageIdentifier", "source"}}`.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use sispoll_core::errors::{ExError, ExErrorKind, Result};
use sispoll_core::notify::{Notification, Notifier};
use sispoll_core_types::Sensitive;

const EMAIL_ENDPOINT: &str = "Email";
const FALLBACK_SOURCE: &str = "sispoll";

/// Short host name used as the message source.
///
/// Reads `HOSTNAME`, keeps the part before the first `.`, and falls back to
/// `sispoll`.
pub fn default_source_name() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .and_then(|h| h.split('.').next().map(str::to_string))
        .filter(|h| !h.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_SOURCE.to_string())
}

/// Submits notifications to the API gateway
pub struct ApiGatewayNotifier {
    client: Client,
    endpoint: String,
    api_key: Sensitive<String>,
    source: String,
}

impl std::fmt::Debug for ApiGatewayNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiGatewayNotifier")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key)
            .field("source", &self.source)
            .finish()
    }
}

impl ApiGatewayNotifier {
    /// # Errors
    ///
    /// `InvalidConfig` when the host URL or API key is empty, or the HTTP
    /// client cannot be built.
    pub fn new(host: &str, api_key: Sensitive<String>, timeout: Duration) -> Result<Self> {
        if host.trim().is_empty() {
            return Err(ExError::new(ExErrorKind::InvalidConfig)
                .with_op("notifier_config")
                .with_message("e-mail API URL is not set"));
        }
        if api_key.is_empty() {
            return Err(ExError::new(ExErrorKind::InvalidConfig)
                .with_op("notifier_config")
                .with_message("e-mail API key is not set"));
        }
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            ExError::new(ExErrorKind::InvalidConfig)
                .with_op("http_client")
                .with_message(e.to_string())
        })?;
        Ok(Self {
            client,
            endpoint: endpoint_url(host),
            api_key,
            source: default_source_name(),
        })
    }

    /// Override the `source` reported with every message
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// JSON body submitted for `notification`
    pub fn payload(&self, notification: &Notification) -> Value {
        json!({
            "payload": {
                "subject": notification.subject,
                "message": notification.body,
                "topic": notification.topic.to_lowercase(),
                "messageIdentifier": notification.message_id.as_str(),
                "source": self.source,
            }
        })
    }
}

fn endpoint_url(host: &str) -> String {
    format!("{}/{}", host.trim_end_matches('/'), EMAIL_ENDPOINT)
}

/// Map a gateway response status to the notification outcome
fn check_status(status: StatusCode, body: &str) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    if status == StatusCode::FORBIDDEN {
        return Err(ExError::new(ExErrorKind::Unauthorised)
            .with_op("notify")
            .with_message("Failed to access API with credentials"));
    }
    Err(ExError::new(ExErrorKind::ExternalService)
        .with_op("notify")
        .with_message(format!("API request failed with {} {}", status, body.trim())))
}

impl Notifier for ApiGatewayNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        tracing::info!(
            endpoint = %self.endpoint,
            message_id = %notification.message_id,
            subject = %notification.subject,
            "Sending notification"
        );

        let response = self
            .client
            .put(&self.endpoint)
            .header("x-api-key", self.api_key.expose().as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&self.payload(notification))
            .send()
            .map_err(|e| {
                ExError::new(ExErrorKind::ExternalService)
                    .with_op("notify")
                    .with_message(format!("PUT {} failed: {}", self.endpoint, e))
            })?;

        let status = response.status();
        let body = response.text().unwrap_or_default();
        check_status(status, &body)?;

        tracing::info!(
            message_id = %notification.message_id,
            "Successfully submitted message to API"
        );
        Ok(())
    }
}
