//! Calculator submissions: raw request fields and the validated form.

use serde::{Deserialize, Serialize};

use crate::error::{LhaError, LhaResult};
use crate::sanitize::{leading_int, sanitize_email, sanitize_text};

/// The only action the AJAX endpoint answers.
pub const FETCH_ACTION: &str = "lha_rates_fetch";

pub const MISSING_LOOKUP_FIELDS: &str = "Missing postcode or bedrooms.";
pub const MISSING_CONTACT_FIELDS: &str = "Missing name or email.";

/// Fields as posted by the form. Everything is optional and untrusted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateRequest {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub bedrooms: Option<String>,
}

/// A validated submission, alive for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub postcode: String,
    pub bedrooms: u32,
}

impl RateRequest {
    /// Sanitize and validate the lookup fields first, then the contact
    /// fields, so a request missing both reports the lookup fields.
    pub fn validate(&self) -> LhaResult<Submission> {
        let field = |f: &Option<String>| f.as_deref().unwrap_or_default().to_string();

        let postcode = sanitize_text(&field(&self.postcode));
        // Negative reads as zero; anything past u32 saturates.
        let bedrooms = u32::try_from(leading_int(&field(&self.bedrooms)).max(0)).unwrap_or(u32::MAX);
        if postcode.is_empty() || bedrooms == 0 {
            return Err(LhaError::validation(MISSING_LOOKUP_FIELDS));
        }

        let name = sanitize_text(&field(&self.name));
        let email = sanitize_email(&field(&self.email));
        if name.is_empty() || email.is_empty() {
            return Err(LhaError::validation(MISSING_CONTACT_FIELDS));
        }

        Ok(Submission {
            name,
            email,
            postcode,
            bedrooms,
        })
    }
}
