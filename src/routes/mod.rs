mod health;
mod rooms;

use axum::Router;

use crate::state::AppState;

/// Build the complete application router.
///
/// Structure:
/// - `GET /health` — lightweight health check (used by the platform)
/// - `GET /api/v1/health` — detailed health check with database connectivity
/// - `/api/v1/rooms/...` — room lifecycle operations
pub fn router() -> Router<AppState> {
    let api_v1 = Router::new()
        .merge(health::api_router())
        .nest("/rooms", rooms::router());

    Router::new().merge(health::root_router()).nest("/api/v1", api_v1)
}
