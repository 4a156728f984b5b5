//! Dashboard: Axum web server exposing the composed debate views.
//!
//! Read-only JSON API. CORS enabled for local front-end development.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use routes::AppState;

/// Start the dashboard web server.
///
/// Binds before returning so port conflicts surface at startup; serving
/// runs on a background task.
pub async fn spawn_dashboard(state: AppState, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind dashboard port {port}"))?;
    info!(port, "Dashboard server starting on http://localhost:{port}");

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "Dashboard server error");
        }
    });

    Ok(())
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/debates", get(routes::get_debates))
        .route("/api/summary", get(routes::get_summary))
        .route("/api/debates/:address", get(routes::get_debate))
        .route("/api/debates/:address/quote", get(routes::get_quote))
        .route("/api/debates/:address/actions", get(routes::get_actions))
        .route("/api/debates/:address/arguments", get(routes::get_arguments))
        .route("/api/users/:user/stats", get(routes::get_user_stats))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
