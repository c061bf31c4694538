//! Test doubles for the rate API and the mail transport.
//!
//! Available to this crate's tests and, through the `testing` feature, to
//! downstream crates' tests.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::{LhaError, LhaResult};
use crate::mailer::{EmailMessage, Mailer};
use crate::rate::RateLookup;

/// Records every message; optionally fails each send.
#[derive(Default)]
pub struct RecordingMailer {
    attempts: AtomicUsize,
    sent: Mutex<Vec<EmailMessage>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> LhaResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(LhaError::Mail("transport down".to_string()));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message.clone());
        }
        Ok(())
    }
}

/// Canned reply for [`StubRates`].
#[derive(Debug, Clone)]
pub enum StubReply {
    Json(Value),
    Status(u16, String),
    InvalidJson,
    Unreachable(String),
}

/// Rate lookup that replies from a script and counts calls.
pub struct StubRates {
    reply: StubReply,
    calls: AtomicUsize,
    last: Mutex<Option<(String, String, u32)>>,
}

impl StubRates {
    pub fn new(reply: StubReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    pub fn json(body: Value) -> Self {
        Self::new(StubReply::Json(body))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(api_key, postcode, bedrooms)` of the most recent call.
    pub fn last_call(&self) -> Option<(String, String, u32)> {
        self.last.lock().ok().and_then(|l| l.clone())
    }
}

#[async_trait]
impl RateLookup for StubRates {
    async fn fetch_rate(&self, api_key: &str, postcode: &str, bedrooms: u32) -> LhaResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last.lock() {
            *last = Some((api_key.to_string(), postcode.to_string(), bedrooms));
        }
        match &self.reply {
            StubReply::Json(body) => Ok(body.clone()),
            StubReply::Status(status, excerpt) => Err(LhaError::Api {
                status: *status,
                excerpt: excerpt.clone(),
            }),
            StubReply::InvalidJson => {
                let source = serde_json::from_str::<Value>("<html>").unwrap_err();
                Err(LhaError::Parse(source))
            }
            StubReply::Unreachable(message) => Err(LhaError::Network(message.clone())),
        }
    }
}
