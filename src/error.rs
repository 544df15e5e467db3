use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Unified application error type that maps to JSON HTTP responses.
///
/// Response format: `{ "error": { "code": "...", "message": "..." } }`.
///
/// Every error is terminal to the caller; no operation retries internally.
pub enum AppError {
    /// 400 Bad Request — input validation failure
    BadRequest(String),
    /// 401 Unauthorized — no resolvable caller identity
    Unauthenticated(String),
    /// 403 Forbidden — caller is not the resource owner / not the host
    Forbidden(String),
    /// 404 Not Found — room or participant reference does not resolve
    NotFound(String),
    /// 409 Conflict — operation forbidden by the room's current status
    InvalidState(String),
    /// 409 Conflict — join attempted on a full room
    RoomFull(String),
    /// 500 Internal Server Error (wraps any error, logs details, returns generic message)
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            Self::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", msg),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            Self::InvalidState(msg) => (StatusCode::CONFLICT, "INVALID_STATE", msg),
            Self::RoomFull(msg) => (StatusCode::CONFLICT, "ROOM_FULL", msg),
            Self::Internal(err) => {
                tracing::error!("Internal server error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        (
            status,
            Json(json!({
                "error": {
                    "code": code,
                    "message": message,
                }
            })),
        )
            .into_response()
    }
}

/// Allow `?` to automatically convert any `anyhow::Error` into `AppError::Internal`.
impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}
