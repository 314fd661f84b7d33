//! HTTP surface: the WebSocket endpoint, a state snapshot and the static client.

use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::projection;
use crate::protocol::ServerMessage;
use crate::state::AppState;
use crate::ws;

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/health", get(health))
        .route("/api/state", get(current_state))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Snapshot of the projection for the current stage.
///
/// GET /api/state
///
/// Same payload the WebSocket pushes, for pages that render before their
/// socket is up.
pub async fn current_state(State(state): State<Arc<AppState>>) -> Json<ServerMessage> {
    let session = state.session.lock().await;
    Json(projection::current_view(&session))
}
