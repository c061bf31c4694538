//! Anti-forgery tokens bound to an action name.
//!
//! A token is a truncated HMAC over the current time tick and the action.
//! Ticks are half a lifetime long and a token verifies for its own tick and
//! the next one, so it stays valid for between half and one full lifetime.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

/// Action bound to tokens for the rate lookup endpoint.
pub const RATE_ACTION: &str = "lha_rates_nonce";

/// Action bound to tokens for the settings form.
pub const SETTINGS_ACTION: &str = "lha_rates_settings";

/// Bytes of the MAC kept in a token.
const TAG_LEN: usize = 12;

#[derive(Clone)]
pub struct NonceIssuer {
    secret: Vec<u8>,
    tick_secs: i64,
}

impl NonceIssuer {
    pub fn new(secret: impl AsRef<[u8]>, lifetime: Duration) -> Self {
        let tick_secs = (lifetime.as_secs() / 2).max(1) as i64;
        Self {
            secret: secret.as_ref().to_vec(),
            tick_secs,
        }
    }

    /// Issuer with a random per-process secret.
    pub fn ephemeral(lifetime: Duration) -> Self {
        let secret = format!("{}{}", uuid::Uuid::new_v4(), uuid::Uuid::new_v4());
        Self::new(secret, lifetime)
    }

    /// Mint a token for `action` valid from now.
    pub fn create(&self, action: &str) -> String {
        self.create_at(action, Utc::now().timestamp())
    }

    /// Check `token` against `action` at the current time.
    pub fn verify(&self, action: &str, token: &str) -> bool {
        self.verify_at(action, token, Utc::now().timestamp())
    }

    pub fn create_at(&self, action: &str, unix_secs: i64) -> String {
        let tag = self.mac(action, self.tick(unix_secs)).finalize().into_bytes();
        URL_SAFE_NO_PAD.encode(&tag[..TAG_LEN])
    }

    pub fn verify_at(&self, action: &str, token: &str, unix_secs: i64) -> bool {
        let Ok(tag) = URL_SAFE_NO_PAD.decode(token.trim()) else {
            return false;
        };
        if tag.len() != TAG_LEN {
            return false;
        }
        let tick = self.tick(unix_secs);
        [tick, tick - 1]
            .into_iter()
            .any(|t| self.mac(action, t).verify_truncated_left(&tag).is_ok())
    }

    fn tick(&self, unix_secs: i64) -> i64 {
        unix_secs.div_euclid(self.tick_secs)
    }

    fn mac(&self, action: &str, tick: i64) -> HmacSha256 {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC can take key of any size");
        mac.update(format!("{}|{}", tick, action).as_bytes());
        mac
    }
}
