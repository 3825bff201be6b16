//! HTTP/WebSocket API for the game server.
//!
//! # Endpoints
//!
//! - `GET /health` - Server health status
//! - `GET /ws` - WebSocket carrying the game events, see [`websocket`]
//!
//! CORS is configured permissively so a browser client served from another
//! origin can connect.

pub mod websocket;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use jungle_speed::table::TableHandle;
use serde_json::json;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers and WebSocket connections.
#[derive(Clone)]
pub struct AppState {
    pub table: TableHandle,
}

/// Create the API router with all endpoints and middleware.
///
/// # Example
///
/// ```rust,no_run
/// # use js_server::api::{create_router, AppState};
/// # use jungle_speed::table::{TableActor, TableConfig};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (actor, table) = TableActor::new(TableConfig::default());
/// tokio::spawn(actor.run());
///
/// let app = create_router(AppState { table });
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:3001").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(websocket::websocket_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` while the table actor answers, or `503 Service Unavailable`
/// once it has shut down.
///
/// ```bash
/// curl http://localhost:3001/health
/// # {"status":"healthy","version":"1.0.0","phase":"waiting","players":0,"timestamp":"..."}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.table.state().await {
        Ok(view) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "version": env!("CARGO_PKG_VERSION"),
                "phase": view.phase,
                "players": view.players.len(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "version": env!("CARGO_PKG_VERSION"),
                "error": e.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            })),
        ),
    }
}
