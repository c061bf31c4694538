//! Administrator settings: the rate API key and the notification address.

use async_trait::async_trait;
use lha_redis::settings::{self as queries, SettingsRow};
use lha_redis::RedisPool;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::LhaResult;
use crate::sanitize::{sanitize_email, sanitize_text};

/// Settings read on every calculation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub api_key: String,
    /// Empty means notifications are off.
    pub notification_email: String,
}

impl Settings {
    /// Build settings from raw administrator input.
    ///
    /// The key is sanitized as text; an invalid notification address is
    /// stored empty, which turns notifications off.
    pub fn from_input(api_key: &str, notification_email: &str) -> Self {
        Self {
            api_key: sanitize_text(api_key),
            notification_email: sanitize_email(notification_email),
        }
    }

    /// Apply raw input for the fields given, leaving the others unchanged.
    pub fn update(&mut self, api_key: Option<&str>, notification_email: Option<&str>) {
        if let Some(key) = api_key {
            self.api_key = sanitize_text(key);
        }
        if let Some(email) = notification_email {
            self.notification_email = sanitize_email(email);
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub fn notifications_enabled(&self) -> bool {
        !self.notification_email.is_empty()
    }

    /// API key with everything but the last four characters hidden.
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }
        let visible: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}", "*".repeat(chars.len() - 4), visible)
    }

    fn from_row(row: SettingsRow) -> Self {
        Self {
            api_key: row.api_key,
            notification_email: row.notification_email,
        }
    }

    fn to_row(&self) -> SettingsRow {
        SettingsRow {
            api_key: self.api_key.clone(),
            notification_email: self.notification_email.clone(),
        }
    }
}

/// Persistence for [`Settings`].
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> LhaResult<Settings>;

    async fn save(&self, settings: &Settings) -> LhaResult<()>;
}

/// Settings stored in a Redis hash.
#[derive(Clone)]
pub struct RedisSettingsStore {
    pool: RedisPool,
}

impl RedisSettingsStore {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for RedisSettingsStore {
    async fn load(&self) -> LhaResult<Settings> {
        let row = queries::get_settings(&self.pool).await?;
        Ok(Settings::from_row(row))
    }

    async fn save(&self, settings: &Settings) -> LhaResult<()> {
        queries::save_settings(&self.pool, &settings.to_row()).await?;
        tracing::info!(
            notifications = settings.notifications_enabled(),
            "Settings saved"
        );
        Ok(())
    }
}

/// Process-local settings, lost on restart.
#[derive(Default)]
pub struct MemorySettingsStore {
    inner: RwLock<Settings>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self { inner: RwLock::new(settings) }
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> LhaResult<Settings> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, settings: &Settings) -> LhaResult<()> {
        *self.inner.write().await = settings.clone();
        Ok(())
    }
}
