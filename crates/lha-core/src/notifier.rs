//! Administrator notification for completed calculations.
//!
//! The notifier never fails the calculation: whatever happens to the email,
//! the caller gets a [`Delivery`] describing it and carries on.

use chrono::Local;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::mailer::{EmailMessage, Mailer};
use crate::rate::RateResult;
use crate::settings::Settings;
use crate::submission::Submission;

/// Outcome of a notification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// No notification address configured; nothing was sent.
    Skipped,
    Sent,
    Failed(String),
}

/// Sends the "new calculation" email to the configured address.
#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    /// Email the administrator about `submission` and the API `response`.
    pub async fn notify(&self, settings: &Settings, submission: &Submission, response: &Value) -> Delivery {
        if !settings.notifications_enabled() {
            debug!("Notification address not set, skipping email");
            return Delivery::Skipped;
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let message = compose(&settings.notification_email, submission, response, &timestamp);

        match self.mailer.send(&message).await {
            Ok(()) => {
                debug!(postcode = %submission.postcode, "Calculation notification sent");
                Delivery::Sent
            }
            Err(e) => {
                warn!(error = %e, "Calculation notification failed");
                Delivery::Failed(e.to_string())
            }
        }
    }
}

/// Build the notification email.
pub fn compose(to: &str, submission: &Submission, response: &Value, timestamp: &str) -> EmailMessage {
    let result = RateResult::extract(response);

    let mut body = String::from("New LHA Rate calculation submitted:\n\n");
    body.push_str("User Details:\n");
    body.push_str(&format!("Name: {}\n", submission.name));
    body.push_str(&format!("Email: {}\n\n", submission.email));
    body.push_str("Calculation Details:\n");
    body.push_str(&format!("Postcode: {}\n", submission.postcode));
    body.push_str(&format!("Bedrooms: {}\n\n", submission.bedrooms));
    body.push_str("Result:\n");
    body.push_str(&format!("BRMA: {}\n", result.brma));
    body.push_str(&format!("Rate: \u{a3}{}\n\n", result.rate));
    body.push_str("---\n");
    body.push_str("This email was sent from LHA Rates Calculator.\n");
    body.push_str(&format!("Time: {}", timestamp));

    EmailMessage {
        to: to.to_string(),
        subject: format!("New LHA Rate Calculation - {}", submission.name),
        body,
        reply_to: Some(submission.email.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingMailer;
    use serde_json::json;

    fn submission() -> Submission {
        Submission {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            postcode: "W14 9JH".to_string(),
            bedrooms: 2,
        }
    }

    fn settings(notification_email: &str) -> Settings {
        Settings {
            api_key: "key".to_string(),
            notification_email: notification_email.to_string(),
        }
    }

    #[test]
    fn test_compose_template() {
        let response = json!({ "data": { "brma": "Central London", "rate": "350.00" } });
        let message = compose("admin@example.com", &submission(), &response, "2025-01-02 03:04:05");

        assert_eq!(message.to, "admin@example.com");
        assert_eq!(message.subject, "New LHA Rate Calculation - Jane Doe");
        assert_eq!(message.reply_to.as_deref(), Some("jane@example.com"));
        assert_eq!(
            message.body,
            "New LHA Rate calculation submitted:\n\n\
             User Details:\nName: Jane Doe\nEmail: jane@example.com\n\n\
             Calculation Details:\nPostcode: W14 9JH\nBedrooms: 2\n\n\
             Result:\nBRMA: Central London\nRate: \u{a3}350.00\n\n\
             ---\nThis email was sent from LHA Rates Calculator.\n\
             Time: 2025-01-02 03:04:05"
        );
    }

    #[test]
    fn test_compose_with_unrecognised_response() {
        let message = compose("admin@example.com", &submission(), &json!({ "x": 1 }), "now");
        assert!(message.body.contains("BRMA: \n"));
        assert!(message.body.contains("Rate: \u{a3}\n"));
    }

    #[tokio::test]
    async fn test_no_address_means_no_send_attempt() {
        let mailer = Arc::new(RecordingMailer::default());
        let notifier = Notifier::new(mailer.clone());

        let delivery = notifier.notify(&settings(""), &submission(), &json!({})).await;

        assert_eq!(delivery, Delivery::Skipped);
        assert_eq!(mailer.attempts(), 0);
    }

    #[tokio::test]
    async fn test_sends_to_configured_address() {
        let mailer = Arc::new(RecordingMailer::default());
        let notifier = Notifier::new(mailer.clone());

        let delivery = notifier
            .notify(&settings("admin@example.com"), &submission(), &json!({ "brma": "Leeds", "rate": "172.60" }))
            .await;

        assert_eq!(delivery, Delivery::Sent);
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "admin@example.com");
        assert!(sent[0].body.contains("BRMA: Leeds"));
    }

    #[tokio::test]
    async fn test_failure_is_reported_not_raised() {
        let mailer = Arc::new(RecordingMailer::failing());
        let notifier = Notifier::new(mailer.clone());

        let delivery = notifier.notify(&settings("admin@example.com"), &submission(), &json!({})).await;

        assert!(matches!(delivery, Delivery::Failed(_)));
        assert_eq!(mailer.attempts(), 1);
    }
}
