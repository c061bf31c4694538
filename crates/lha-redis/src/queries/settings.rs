//! Settings queries: Redis implementation.
//!
//! Both settings live in a single hash so a read is one round trip.

use crate::client::{RedisPool, RedisResult};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

/// Hash holding the administrator settings.
pub const SETTINGS_KEY: &str = "lha:settings";

const FIELD_API_KEY: &str = "api_key";
const FIELD_NOTIFICATION_EMAIL: &str = "notification_email";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsRow {
    pub api_key: String,
    pub notification_email: String,
}

/// Read both settings. Missing fields come back empty.
pub async fn get_settings(pool: &RedisPool) -> RedisResult<SettingsRow> {
    let mut conn = pool.clone();
    let (api_key, notification_email): (Option<String>, Option<String>) = redis::cmd("HMGET")
        .arg(SETTINGS_KEY)
        .arg(FIELD_API_KEY)
        .arg(FIELD_NOTIFICATION_EMAIL)
        .query_async(&mut conn)
        .await?;
    Ok(SettingsRow {
        api_key: api_key.unwrap_or_default(),
        notification_email: notification_email.unwrap_or_default(),
    })
}

/// Replace both settings at once.
pub async fn save_settings(pool: &RedisPool, row: &SettingsRow) -> RedisResult<()> {
    let mut conn = pool.clone();
    conn.hset_multiple::<_, _, _, ()>(
        SETTINGS_KEY,
        &[
            (FIELD_API_KEY, row.api_key.as_str()),
            (FIELD_NOTIFICATION_EMAIL, row.notification_email.as_str()),
        ],
    )
    .await?;
    Ok(())
}
