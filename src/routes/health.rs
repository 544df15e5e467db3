use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    database: String,
}

/// `GET /health` — lightweight liveness probe.
async fn liveness() -> &'static str {
    "ok"
}

/// `GET /api/v1/health` — detailed health check including DB connectivity.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.db.ping().await {
        Ok(()) => "connected",
        Err(_) => "disconnected",
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    })
}

/// Root-level health route (used by the deployment platform).
pub fn root_router() -> Router<AppState> {
    Router::new().route("/health", get(liveness))
}

/// API-level health route.
pub fn api_router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
