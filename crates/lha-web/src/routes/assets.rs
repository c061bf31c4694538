//! Static assets served alongside the calculator.

use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

const SCRIPT: &str = include_str!("../../assets/script.js");
const STYLES: &str = include_str!("../../assets/styles.css");

/// GET /assets/{name}
pub async fn asset(Path(name): Path<String>) -> Response {
    let (body, content_type) = match name.as_str() {
        "script.js" => (SCRIPT, "application/javascript; charset=utf-8"),
        "styles.css" => (STYLES, "text/css; charset=utf-8"),
        _ => return StatusCode::NOT_FOUND.into_response(),
    };
    ([(header::CONTENT_TYPE, content_type)], body).into_response()
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}
