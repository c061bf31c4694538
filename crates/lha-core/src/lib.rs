//! LHA Rates Core Library
//!
//! Domain types and business logic for the LHA rates calculator: input
//! validation, the rate API client, notification email, anti-forgery tokens
//! and the two-step form flow.

pub mod config;
pub mod envelope;
pub mod error;
pub mod form;
pub mod handler;
pub mod mailer;
pub mod nonce;
pub mod notifier;
pub mod rate;
pub mod sanitize;
pub mod settings;
pub mod submission;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use envelope::ResponseEnvelope;
pub use error::{LhaError, LhaResult};
pub use handler::{RateService, Reply};
