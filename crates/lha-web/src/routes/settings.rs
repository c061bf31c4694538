//! Administrator settings form.

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::calculator::render;
use crate::state::AppState;
use lha_core::nonce::SETTINGS_ACTION;
use lha_core::settings::Settings;

pub const SAVED: &str = "Settings saved.";
pub const FORGED: &str = "Security check failed. Reload the page and try again.";
pub const UNAVAILABLE: &str = "Settings store unavailable.";

#[derive(Template)]
#[template(path = "settings.html")]
struct SettingsTemplate {
    api_key: String,
    notification_email: String,
    nonce: String,
    notice: String,
    style_url: String,
}

#[derive(Debug, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub nonce: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub notification_email: String,
}

fn page(state: &AppState, settings: &Settings, notice: &str) -> SettingsTemplate {
    SettingsTemplate {
        api_key: settings.api_key.clone(),
        notification_email: settings.notification_email.clone(),
        nonce: state.service.nonces().create(SETTINGS_ACTION),
        notice: notice.to_string(),
        style_url: state.asset_url("styles.css"),
    }
}

/// GET /admin/settings
pub async fn show_settings(State(state): State<AppState>) -> Response {
    match state.service.settings().load().await {
        Ok(settings) => render(page(&state, &settings, "")),
        Err(e) => {
            error!(error = %e, "Failed to load settings");
            (StatusCode::INTERNAL_SERVER_ERROR, UNAVAILABLE).into_response()
        }
    }
}

/// POST /admin/settings
pub async fn save_settings(State(state): State<AppState>, Form(form): Form<SettingsForm>) -> Response {
    let store = state.service.settings();

    if !state.service.nonces().verify(SETTINGS_ACTION, &form.nonce) {
        warn!("Rejected settings form with invalid token");
        let current = store.load().await.unwrap_or_default();
        let response = render(page(&state, &current, FORGED));
        return (StatusCode::FORBIDDEN, response).into_response();
    }

    let settings = Settings::from_input(&form.api_key, &form.notification_email);
    if let Err(e) = store.save(&settings).await {
        error!(error = %e, "Failed to save settings");
        return (StatusCode::INTERNAL_SERVER_ERROR, UNAVAILABLE).into_response();
    }

    info!(
        api_key_set = settings.has_api_key(),
        notifications = settings.notifications_enabled(),
        "Settings updated"
    );
    render(page(&state, &settings, SAVED))
}
