//! HTTP Basic authentication for the administrator routes.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

use crate::state::AppState;

const REALM: &str = "Basic realm=\"LHA Rates\", charset=\"UTF-8\"";

type HmacSha256 = Hmac<Sha256>;

/// Let the request through only with the configured admin credentials.
///
/// Without a configured password the admin routes do not exist.
pub async fn require_admin(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(password) = state.admin.password.as_deref().filter(|p| !p.is_empty()) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(decode_basic);

    match presented {
        Some((user, pass))
            if credentials_match(&user, &state.admin.username) & credentials_match(&pass, password) =>
        {
            next.run(request).await
        }
        Some(_) => {
            warn!("Rejected admin credentials");
            challenge()
        }
        None => challenge(),
    }
}

fn challenge() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, REALM)],
        "Authentication required",
    )
        .into_response()
}

/// Compare a presented credential with the configured one in constant time.
///
/// Both sides are MACed under the configured value so the comparison runs
/// over equal-length tags whatever the input lengths.
pub fn credentials_match(presented: &str, expected: &str) -> bool {
    let tag = |value: &str| {
        HmacSha256::new_from_slice(expected.as_bytes()).map(|mut mac| {
            mac.update(value.as_bytes());
            mac
        })
    };
    match (tag(presented), tag(expected)) {
        (Ok(presented), Ok(expected)) => presented.verify(&expected.finalize().into_bytes()).is_ok(),
        _ => false,
    }
}

/// Split an `Authorization: Basic ...` value into user and password.
pub fn decode_basic(value: &str) -> Option<(String, String)> {
    let encoded = value.strip_prefix("Basic ")?.trim();
    let decoded = STANDARD.decode(encoded).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (user, pass) = text.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}
