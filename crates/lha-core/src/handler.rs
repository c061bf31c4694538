//! The rate lookup request handler.
//!
//! Runs a submission through a fixed chain of gates: action, token, lookup
//! fields, contact fields, configuration, then the API call. The first gate
//! to fail ends the request with a failure envelope.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::envelope::ResponseEnvelope;
use crate::error::{LhaError, LhaResult};
use crate::nonce::{NonceIssuer, RATE_ACTION};
use crate::notifier::{Delivery, Notifier};
use crate::rate::RateLookup;
use crate::settings::SettingsStore;
use crate::submission::{RateRequest, FETCH_ACTION};

pub const API_KEY_MISSING: &str = "API key not configured. Go to Settings > LHA Rates.";

/// A handled request: the envelope to send and the error it was built from.
#[derive(Debug)]
pub struct Reply {
    pub envelope: ResponseEnvelope,
    /// Lets transports pick a status code for the failure.
    pub error: Option<LhaError>,
}

/// Everything a lookup needs, shared across requests.
#[derive(Clone)]
pub struct RateService {
    settings: Arc<dyn SettingsStore>,
    rates: Arc<dyn RateLookup>,
    notifier: Notifier,
    nonces: NonceIssuer,
}

impl RateService {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        rates: Arc<dyn RateLookup>,
        notifier: Notifier,
        nonces: NonceIssuer,
    ) -> Self {
        Self {
            settings,
            rates,
            notifier,
            nonces,
        }
    }

    pub fn settings(&self) -> &Arc<dyn SettingsStore> {
        &self.settings
    }

    pub fn nonces(&self) -> &NonceIssuer {
        &self.nonces
    }

    /// Handle one request and wrap the outcome in an envelope.
    pub async fn handle(&self, request: &RateRequest) -> Reply {
        match self.lookup(request).await {
            Ok(payload) => Reply {
                envelope: ResponseEnvelope::ok(payload),
                error: None,
            },
            Err(e) => {
                debug!(kind = e.kind(), "Rate lookup failed");
                Reply {
                    envelope: ResponseEnvelope::from(&e),
                    error: Some(e),
                }
            }
        }
    }

    /// The gate chain. Errors are terminal; nothing is retried.
    pub async fn lookup(&self, request: &RateRequest) -> LhaResult<Value> {
        let action = request.action.as_deref().unwrap_or_default();
        if action != FETCH_ACTION {
            return Err(LhaError::UnknownAction(action.to_string()));
        }

        let token = request.nonce.as_deref().unwrap_or_default();
        if !self.nonces.verify(RATE_ACTION, token) {
            warn!("Rejected rate lookup with invalid token");
            return Err(LhaError::Auth);
        }

        let submission = request.validate().inspect_err(|e| {
            debug!(error = %e, "Rejected rate lookup with invalid fields");
        })?;

        let settings = self.settings.load().await?;
        if !settings.has_api_key() {
            warn!("Rate lookup attempted before the API key was configured");
            return Err(LhaError::config(API_KEY_MISSING));
        }

        let payload = self
            .rates
            .fetch_rate(&settings.api_key, &submission.postcode, submission.bedrooms)
            .await?;

        info!(
            postcode = %submission.postcode,
            bedrooms = submission.bedrooms,
            "LHA rate lookup succeeded"
        );

        // The delivery outcome never changes the envelope.
        let _delivery: Delivery = self.notifier.notify(&settings, &submission, &payload).await;

        Ok(payload)
    }
}
