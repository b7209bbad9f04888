//! Notification seam

use crate::core_types::{MessageId, MessageKind};
use crate::errors::Result;

pub const UPDATE_SUBJECT: &str = "SIS Update";
pub const TEST_SUBJECT: &str = "SIS Test";
pub const TEST_BODY: &str = "Test email from SIS poller";
pub const DEFAULT_TOPIC: &str = "production";

/// A rendered message ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
    /// Delivery topic, always lower-case
    pub topic: String,
    pub message_id: MessageId,
}

impl Notification {
    /// Update report produced by a poll run
    pub fn update(report: impl Into<String>, topic: &str) -> Self {
        Self {
            subject: UPDATE_SUBJECT.to_string(),
            body: report.into(),
            topic: topic.to_lowercase(),
            message_id: MessageId::new(MessageKind::Update),
        }
    }

    /// Canned message used to check the delivery path
    pub fn test(topic: &str) -> Self {
        Self {
            subject: TEST_SUBJECT.to_string(),
            body: TEST_BODY.to_string(),
            topic: topic.to_lowercase(),
            message_id: MessageId::new(MessageKind::Test),
        }
    }
}

/// Delivers notifications
pub trait Notifier {
    /// Deliver one notification.
    ///
    /// # Errors
    ///
    /// `Unauthorised` when credentials are rejected, `ExternalService` for any
    /// other delivery failure.
    fn notify(&self, notification: &Notification) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_notification() {
        let n = Notification::update("Adding: C\n", "Production");
        assert_eq!(n.subject, "SIS Update");
        assert_eq!(n.topic, "production");
        assert!(n.message_id.as_str().starts_with("sisUpdateMessage_"));
    }

    #[test]
    fn test_canned_test_notification() {
        let n = Notification::test("TEST");
        assert_eq!(n.subject, "SIS Test");
        assert_eq!(n.body, "Test email from SIS poller");
        assert_eq!(n.topic, "test");
        assert!(n.message_id.as_str().starts_with("sisTestMessage_"));
    }
}
