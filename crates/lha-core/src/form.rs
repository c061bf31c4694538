//! Two-step calculator form flow.
//!
//! Step one collects the visitor's contact details without any network
//! traffic; step two collects the postcode and bedroom count and hands a
//! [`LookupRequest`] to whoever performs the call. The flow owns the message
//! area, which is in exactly one state at a time, and an in-flight flag that
//! turns away a second submit until the first one settles.

use serde::{Deserialize, Serialize};

use crate::envelope::ResponseEnvelope;
use crate::rate::model::render_payload;
use crate::sanitize::looks_like_email;
use crate::submission::{RateRequest, FETCH_ACTION};

pub const DETAILS_REQUIRED: &str = "Please enter both your name and email.";
pub const EMAIL_INVALID: &str = "Please enter a valid email address.";
pub const LOOKUP_REQUIRED: &str = "Please enter both postcode and number of bedrooms.";
pub const LOADING: &str = "Loading\u{2026}";
pub const UNKNOWN_API_ERROR: &str = "Unknown API error";

/// Contact details carried from step one into step two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Details,
    Calculator(Applicant),
}

/// What the message area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Hidden,
    Error(String),
    Info(String),
    Success(String),
}

impl Message {
    pub fn text(&self) -> &str {
        match self {
            Self::Hidden => "",
            Self::Error(t) | Self::Info(t) | Self::Success(t) => t,
        }
    }
}

/// Everything needed to post a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub applicant: Applicant,
    pub postcode: String,
    pub bedrooms: String,
}

impl LookupRequest {
    /// The fields the form posts for this lookup.
    pub fn to_rate_request(&self, nonce: &str) -> RateRequest {
        RateRequest {
            action: Some(FETCH_ACTION.to_string()),
            nonce: Some(nonce.to_string()),
            name: Some(self.applicant.name.clone()),
            email: Some(self.applicant.email.clone()),
            postcode: Some(self.postcode.clone()),
            bedrooms: Some(self.bedrooms.clone()),
        }
    }
}

/// How a posted lookup ended, as seen by the form.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// The endpoint answered 2xx with an envelope.
    Envelope(ResponseEnvelope),
    /// The endpoint answered with a non-2xx status.
    HttpStatus(u16),
    /// The call itself failed.
    Failed(String),
}

/// Why a step-two submit did not produce a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    /// Still on step one.
    WrongStep,
    /// A lookup is already in flight.
    Busy,
    /// Field validation failed; the message area says why.
    Invalid,
}

#[derive(Debug, Clone)]
pub struct FormFlow {
    step: Step,
    message: Message,
    in_flight: bool,
}

impl Default for FormFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl FormFlow {
    pub fn new() -> Self {
        Self {
            step: Step::Details,
            message: Message::Hidden,
            in_flight: false,
        }
    }

    pub fn step(&self) -> &Step {
        &self.step
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Step one. On success the flow moves to step two with the applicant.
    pub fn submit_details(&mut self, name: &str, email: &str) -> Result<Applicant, Message> {
        let name = name.trim();
        let email = email.trim();

        if name.is_empty() || email.is_empty() {
            self.show(Message::Error(DETAILS_REQUIRED.to_string()));
            return Err(self.message.clone());
        }
        if !looks_like_email(email) {
            self.show(Message::Error(EMAIL_INVALID.to_string()));
            return Err(self.message.clone());
        }

        let applicant = Applicant {
            name: name.to_string(),
            email: email.to_string(),
        };
        self.show(Message::Hidden);
        self.step = Step::Calculator(applicant.clone());
        Ok(applicant)
    }

    /// Step two. Validates the fields, shows the loading message, and marks
    /// the flow busy until [`finish_lookup`](Self::finish_lookup).
    pub fn begin_lookup(&mut self, postcode: &str, bedrooms: &str) -> Result<LookupRequest, SubmitRejected> {
        let Step::Calculator(applicant) = &self.step else {
            return Err(SubmitRejected::WrongStep);
        };
        let applicant = applicant.clone();
        if self.in_flight {
            return Err(SubmitRejected::Busy);
        }

        let postcode = postcode.trim();
        let bedrooms = bedrooms.trim();
        if postcode.is_empty() || bedrooms.is_empty() {
            self.show(Message::Error(LOOKUP_REQUIRED.to_string()));
            return Err(SubmitRejected::Invalid);
        }

        let request = LookupRequest {
            applicant,
            postcode: postcode.to_string(),
            bedrooms: bedrooms.to_string(),
        };
        self.in_flight = true;
        self.show(Message::Info(LOADING.to_string()));
        Ok(request)
    }

    /// Settle the in-flight lookup and show its result.
    pub fn finish_lookup(&mut self, outcome: LookupOutcome) -> &Message {
        self.in_flight = false;
        let message = match outcome {
            LookupOutcome::Envelope(envelope) if envelope.success => {
                Message::Success(render_payload(&envelope.data))
            }
            LookupOutcome::Envelope(envelope) => Message::Error(failure_text(&envelope)),
            LookupOutcome::HttpStatus(status) => Message::Error(format!("Network error ({})", status)),
            LookupOutcome::Failed(reason) if reason.is_empty() => {
                Message::Error("Something went wrong.".to_string())
            }
            LookupOutcome::Failed(reason) => Message::Error(reason),
        };
        self.show(message);
        &self.message
    }

    /// Replace the message; the previous state is always cleared first.
    fn show(&mut self, message: Message) {
        self.message = message;
    }
}

fn failure_text(envelope: &ResponseEnvelope) -> String {
    match envelope.data.as_str() {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => UNKNOWN_API_ERROR.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn on_step_two() -> FormFlow {
        let mut flow = FormFlow::new();
        flow.submit_details("Jane", "jane@example.com").unwrap();
        flow
    }

    #[test]
    fn test_details_validation() {
        let mut flow = FormFlow::new();
        assert_eq!(
            flow.submit_details("", "jane@example.com").unwrap_err(),
            Message::Error(DETAILS_REQUIRED.to_string())
        );
        assert_eq!(
            flow.submit_details("Jane", "jane@example").unwrap_err(),
            Message::Error(EMAIL_INVALID.to_string())
        );
        assert_eq!(flow.step(), &Step::Details);
    }

    #[test]
    fn test_valid_details_move_to_step_two_once() {
        let mut flow = FormFlow::new();
        let applicant = flow.submit_details("Jane", "jane@example.com").unwrap();
        assert_eq!(flow.step(), &Step::Calculator(applicant));
        assert_eq!(
            flow.step(),
            &Step::Calculator(Applicant {
                name: "Jane".to_string(),
                email: "jane@example.com".to_string(),
            })
        );
        assert_eq!(flow.message(), &Message::Hidden);
    }

    #[test]
    fn test_error_cleared_when_details_pass() {
        let mut flow = FormFlow::new();
        let _ = flow.submit_details("", "");
        assert!(matches!(flow.message(), Message::Error(_)));
        flow.submit_details(" Jane ", " jane@example.com ").unwrap();
        assert_eq!(flow.message(), &Message::Hidden);
    }

    #[test]
    fn test_step_two_is_reenterable_after_validation_failure() {
        let mut flow = on_step_two();
        assert_eq!(flow.begin_lookup("", "2"), Err(SubmitRejected::Invalid));
        assert_eq!(flow.message(), &Message::Error(LOOKUP_REQUIRED.to_string()));
        assert!(!flow.in_flight());
        assert!(matches!(flow.step(), Step::Calculator(_)));

        let request = flow.begin_lookup("W14 9JH", "2").unwrap();
        assert_eq!(request.applicant.name, "Jane");
        assert_eq!(request.postcode, "W14 9JH");
        assert_eq!(flow.message(), &Message::Info(LOADING.to_string()));
    }

    #[test]
    fn test_lookup_posts_fields_the_handler_accepts() {
        let mut flow = on_step_two();
        let fields = flow.begin_lookup(" W14 9JH ", "3").unwrap().to_rate_request("token");
        assert_eq!(fields.action.as_deref(), Some(FETCH_ACTION));
        assert_eq!(fields.nonce.as_deref(), Some("token"));

        let submission = fields.validate().unwrap();
        assert_eq!(submission.email, "jane@example.com");
        assert_eq!(submission.postcode, "W14 9JH");
        assert_eq!(submission.bedrooms, 3);
    }

    #[test]
    fn test_lookup_requires_step_two() {
        let mut flow = FormFlow::new();
        assert_eq!(flow.begin_lookup("W14 9JH", "2"), Err(SubmitRejected::WrongStep));
    }

    #[test]
    fn test_second_submit_rejected_while_in_flight() {
        let mut flow = on_step_two();
        flow.begin_lookup("W14 9JH", "2").unwrap();
        assert_eq!(flow.begin_lookup("SW1A 1AA", "3"), Err(SubmitRejected::Busy));
        assert_eq!(flow.message(), &Message::Info(LOADING.to_string()));

        flow.finish_lookup(LookupOutcome::Failed("offline".to_string()));
        assert!(flow.begin_lookup("SW1A 1AA", "3").is_ok());
    }

    #[test]
    fn test_success_renders_rate_line() {
        let mut flow = on_step_two();
        flow.begin_lookup("W14 9JH", "2").unwrap();
        let envelope = ResponseEnvelope::ok(json!({ "data": { "brma": "Central London", "rate": "350.00" } }));
        assert_eq!(
            flow.finish_lookup(LookupOutcome::Envelope(envelope)),
            &Message::Success("Central London  |  \u{a3}350.00".to_string())
        );
        assert!(!flow.in_flight());
    }

    #[test]
    fn test_unknown_shape_renders_json_dump() {
        let mut flow = on_step_two();
        flow.begin_lookup("W14 9JH", "2").unwrap();
        let envelope = ResponseEnvelope::ok(json!({ "status": "success" }));
        assert_eq!(
            flow.finish_lookup(LookupOutcome::Envelope(envelope)),
            &Message::Success(r#"{"status":"success"}"#.to_string())
        );
    }

    #[test]
    fn test_failures_render_as_errors() {
        let mut flow = on_step_two();

        flow.begin_lookup("W14 9JH", "2").unwrap();
        let envelope = ResponseEnvelope::error("Missing name or email.");
        assert_eq!(
            flow.finish_lookup(LookupOutcome::Envelope(envelope)).text(),
            "Missing name or email."
        );

        flow.begin_lookup("W14 9JH", "2").unwrap();
        let envelope = ResponseEnvelope { success: false, data: json!(null) };
        assert_eq!(
            flow.finish_lookup(LookupOutcome::Envelope(envelope)),
            &Message::Error(UNKNOWN_API_ERROR.to_string())
        );

        flow.begin_lookup("W14 9JH", "2").unwrap();
        assert_eq!(
            flow.finish_lookup(LookupOutcome::HttpStatus(403)).text(),
            "Network error (403)"
        );
    }
}
