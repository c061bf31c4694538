//! Application state.

use lha_core::config::{AdminConfig, ServiceConfig};
use lha_core::mailer;
use lha_core::nonce::NonceIssuer;
use lha_core::notifier::Notifier;
use lha_core::rate::RateClient;
use lha_core::settings::SettingsStore;
use lha_core::RateService;
use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: RateService,
    pub admin: Arc<AdminConfig>,
    /// Absolute origin the page is served from, or empty for same-origin
    /// links. Embeds on other sites need it set.
    pub public_url: Arc<str>,
}

impl AppState {
    pub fn new(service: RateService, admin: AdminConfig, public_url: &str) -> Self {
        Self {
            service,
            admin: Arc::new(admin),
            public_url: Arc::from(public_url.trim_end_matches('/')),
        }
    }

    /// Wire the production collaborators from configuration.
    pub fn from_config(config: &ServiceConfig, settings: Arc<dyn SettingsStore>, public_url: &str) -> Self {
        let rates = Arc::new(RateClient::new(&config.rate_api_url, config.request_timeout()));
        let notifier = Notifier::new(mailer::from_config(&config.mail));
        let nonces = match config.nonce_secret.as_deref() {
            Some(secret) => NonceIssuer::new(secret, config.nonce_lifetime()),
            None => {
                tracing::info!("No nonce secret configured, tokens will not survive a restart");
                NonceIssuer::ephemeral(config.nonce_lifetime())
            }
        };
        let service = RateService::new(settings, rates, notifier, nonces);
        Self::new(service, config.admin.clone(), public_url)
    }

    /// URL the form posts to.
    pub fn ajax_url(&self) -> String {
        format!("{}/ajax", self.public_url)
    }

    pub fn asset_url(&self, name: &str) -> String {
        format!("{}/assets/{}", self.public_url, name)
    }
}
