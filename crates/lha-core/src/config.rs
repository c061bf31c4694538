//! Service configuration.
//!
//! Loaded from an optional TOML file, then overridden by `LHA_*`
//! environment variables. The API key and notification address are not
//! here: they are runtime settings kept in the settings store.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::{LhaError, LhaResult};

/// Production endpoint of the rate API.
pub const DEFAULT_RATE_API_URL: &str = "https://api.propertydata.co.uk";

/// Default outbound request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Default anti-forgery token lifetime (one day).
pub const DEFAULT_NONCE_LIFETIME_SECS: u64 = 86_400;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the rate API; `/lha-rate` is appended.
    pub rate_api_url: String,
    pub request_timeout_secs: u64,
    /// Secret for anti-forgery tokens. A random one is drawn per process
    /// when unset, which invalidates outstanding tokens on restart.
    pub nonce_secret: Option<String>,
    pub nonce_lifetime_secs: u64,
    pub mail: MailConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// Postmark server token. Without it mail is only logged.
    pub postmark_token: Option<String>,
    pub from: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: String,
    /// The settings form is disabled while this is unset.
    pub password: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            rate_api_url: DEFAULT_RATE_API_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            nonce_secret: None,
            nonce_lifetime_secs: DEFAULT_NONCE_LIFETIME_SECS,
            mail: MailConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: None,
        }
    }
}

impl ServiceConfig {
    /// Load from `path` if given, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> LhaResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Parse a TOML file.
    pub fn from_file(path: &Path) -> LhaResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            LhaError::config(format!("Cannot read config {}: {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> LhaResult<Self> {
        toml::from_str(text).map_err(|e| LhaError::config(format!("Invalid config: {}", e)))
    }

    /// Apply `LHA_*` overrides read through `lookup`. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("LHA_RATE_API_URL") {
            self.rate_api_url = url;
        }
        if let Some(secs) = get("LHA_REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.request_timeout_secs = secs;
        }
        if let Some(secret) = get("LHA_NONCE_SECRET") {
            self.nonce_secret = Some(secret);
        }
        if let Some(secs) = get("LHA_NONCE_LIFETIME_SECS").and_then(|v| v.parse().ok()) {
            self.nonce_lifetime_secs = secs;
        }
        if let Some(token) = get("LHA_POSTMARK_TOKEN") {
            self.mail.postmark_token = Some(token);
        }
        if let Some(from) = get("LHA_MAIL_FROM") {
            self.mail.from = from;
        }
        if let Some(user) = get("LHA_ADMIN_USER") {
            self.admin.username = user;
        }
        if let Some(password) = get("LHA_ADMIN_PASSWORD") {
            self.admin.password = Some(password);
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn nonce_lifetime(&self) -> Duration {
        Duration::from_secs(self.nonce_lifetime_secs.max(2))
    }
}
