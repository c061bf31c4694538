//! LHA Rates Web Server
//!
//! Axum server for the calculator page, its AJAX endpoint and the
//! administrator settings form.

pub mod auth;
pub mod routes;
pub mod state;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    // The calculator may be embedded on other origins.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let admin_routes = Router::new()
        .route(
            "/admin/settings",
            get(routes::settings::show_settings).post(routes::settings::save_settings),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_admin));

    Router::new()
        .route("/", get(routes::calculator::page))
        .route("/embed", get(routes::calculator::embed))
        .route("/ajax", post(routes::ajax::fetch_rate))
        .route("/api/session", get(routes::ajax::session))
        .route("/assets/{name}", get(routes::assets::asset))
        .route("/health", get(routes::assets::health))
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the web server.
pub async fn run_server(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("Web server listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;
    Ok(())
}
