//! The calculator's AJAX endpoint.
//!
//! Browsers post `FormData` (multipart); other clients post urlencoded
//! forms. Both end up as a [`RateRequest`].

use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::Serialize;
use tracing::debug;

use crate::state::AppState;
use lha_core::nonce::RATE_ACTION;
use lha_core::submission::RateRequest;
use lha_core::{LhaError, ResponseEnvelope};

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub ajax_url: String,
    pub nonce: String,
}

/// POST /ajax - Look up a rate and reply with an envelope.
pub async fn fetch_rate(State(state): State<AppState>, request: Request) -> Response {
    let fields = match read_fields(request, &state).await {
        Ok(fields) => fields,
        Err(reason) => {
            debug!(reason = %reason, "Unreadable calculator request body");
            return (StatusCode::BAD_REQUEST, Json(ResponseEnvelope::error(reason))).into_response();
        }
    };

    let reply = state.service.handle(&fields).await;
    let status = reply.error.as_ref().map_or(StatusCode::OK, status_for);
    (status, Json(reply.envelope)).into_response()
}

/// GET /api/session - Endpoint URL and a fresh token for non-browser clients.
pub async fn session(State(state): State<AppState>) -> Json<SessionInfo> {
    Json(SessionInfo {
        ajax_url: state.ajax_url(),
        nonce: state.service.nonces().create(RATE_ACTION),
    })
}

/// HTTP status for a failed lookup. Input and upstream failures are normal
/// replies; only protocol-level problems get an error status.
pub fn status_for(err: &LhaError) -> StatusCode {
    match err {
        LhaError::UnknownAction(_) => StatusCode::BAD_REQUEST,
        LhaError::Auth => StatusCode::FORBIDDEN,
        LhaError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    }
}

async fn read_fields(request: Request, state: &AppState) -> Result<RateRequest, String> {
    let multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    if !multipart {
        let Form(fields) = Form::<RateRequest>::from_request(request, state)
            .await
            .map_err(|e| e.body_text())?;
        return Ok(fields);
    }

    let mut body = Multipart::from_request(request, state)
        .await
        .map_err(|e| e.body_text())?;
    let mut fields = RateRequest::default();
    while let Some(field) = body.next_field().await.map_err(|e| e.body_text())? {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.map_err(|e| e.body_text())?;
        let slot = match name.as_str() {
            "action" => &mut fields.action,
            "nonce" => &mut fields.nonce,
            "name" => &mut fields.name,
            "email" => &mut fields.email,
            "postcode" => &mut fields.postcode,
            "bedrooms" => &mut fields.bedrooms,
            _ => continue,
        };
        *slot = Some(value);
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for() {
        assert_eq!(status_for(&LhaError::Auth), StatusCode::FORBIDDEN);
        assert_eq!(status_for(&LhaError::UnknownAction("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&LhaError::validation("Missing name or email.")), StatusCode::OK);
        assert_eq!(
            status_for(&LhaError::Api { status: 500, excerpt: String::new() }),
            StatusCode::OK
        );
    }
}
