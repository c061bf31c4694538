//! Calculator page and embeddable fragment.
//!
//! Every render carries a fresh token for the AJAX endpoint.

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::state::AppState;
use lha_core::nonce::RATE_ACTION;

// ============================================================
// TEMPLATES
// ============================================================

/// Standalone page wrapping the calculator.
#[derive(Template)]
#[template(path = "page.html")]
struct PageTemplate {
    calculator: CalculatorView,
}

/// The calculator fragment alone, for embedding in another page.
#[derive(Template)]
#[template(path = "calculator.html")]
struct EmbedTemplate {
    calculator: CalculatorView,
}

/// Client session data rendered into the markup.
struct CalculatorView {
    ajax_url: String,
    nonce: String,
    script_url: String,
    style_url: String,
}

impl CalculatorView {
    fn for_state(state: &AppState) -> Self {
        Self {
            ajax_url: state.ajax_url(),
            nonce: state.service.nonces().create(RATE_ACTION),
            script_url: state.asset_url("script.js"),
            style_url: state.asset_url("styles.css"),
        }
    }
}

// ============================================================
// HANDLERS
// ============================================================

/// GET / - Full calculator page.
pub async fn page(State(state): State<AppState>) -> Response {
    render(PageTemplate {
        calculator: CalculatorView::for_state(&state),
    })
}

/// GET /embed - Calculator markup with its asset tags.
pub async fn embed(State(state): State<AppState>) -> Response {
    render(EmbedTemplate {
        calculator: CalculatorView::for_state(&state),
    })
}

pub(crate) fn render<T: Template>(template: T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("Template error: {}", e))).into_response(),
    }
}
