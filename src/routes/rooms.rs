use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::{participant, room};
use crate::error::AppError;
use crate::services::match_results::RankingEntry;
use crate::services::membership::{JoinOutcome, JoinRoomParams};
use crate::services::room_registry::CreateRoomParams;
use crate::services::{match_results, membership, room_registry};
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Build the room route group: `/rooms/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_room))
        .route("/join", post(join_room))
        .route("/{room_code}", get(get_room))
        .route("/{room_id}/leave", post(leave_room))
        .route("/{room_id}/ready", post(set_player_ready))
        .route("/{room_id}/start", post(start_game))
        .route("/{room_id}/state", post(update_player_state))
        .route("/{room_id}/end", post(end_game))
}

// ─────────────────────────────────────────────────────────────────────────────
// DTOs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRoomRequest {
    game_id: String,
    name: String,
    max_players: i32,
    #[serde(default)]
    is_private: bool,
    game_mode: Option<String>,
    settings: Option<serde_json::Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRoomResponse {
    room_id: Uuid,
    room_code: String,
    player_id: Uuid,
    status: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RoomResponse {
    room_id: Uuid,
    room_code: String,
    game_id: String,
    name: String,
    max_players: i32,
    is_private: bool,
    game_mode: Option<String>,
    host_user_id: Uuid,
    status: String,
    created_at: String,
    last_activity: String,
    started_at: Option<String>,
    finished_at: Option<String>,
    players: Vec<PlayerResponse>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    player_id: Uuid,
    display_name: String,
    is_host: bool,
    is_ready: bool,
    is_connected: bool,
    is_spectator: bool,
    score: i64,
    joined_at: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinRoomRequest {
    room_code: Option<String>,
    room_id: Option<Uuid>,
    display_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JoinRoomResponse {
    room_id: Uuid,
    player_id: Uuid,
    already_joined: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeaveRoomRequest {
    player_id: Uuid,
}

#[derive(Serialize)]
struct SuccessResponse {
    success: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetReadyRequest {
    player_id: Uuid,
    is_ready: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SetReadyResponse {
    success: bool,
    all_ready: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateStateRequest {
    player_id: Uuid,
    game_state: String,
    score: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EndGameResponse {
    success: bool,
    rankings: Vec<RankingEntry>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Build a `RoomResponse` from a room model and its roster.
fn build_room_response(r: &room::Model, roster: Vec<participant::Model>) -> RoomResponse {
    RoomResponse {
        room_id: r.id,
        room_code: r.room_code.clone(),
        game_id: r.game_id.clone(),
        name: r.name.clone(),
        max_players: r.max_players,
        is_private: r.is_private,
        game_mode: r.game_mode.clone(),
        host_user_id: r.host_user_id,
        status: r.status.clone(),
        created_at: r.created_at.to_rfc3339(),
        last_activity: r.last_activity.to_rfc3339(),
        started_at: r.started_at.map(|t| t.to_rfc3339()),
        finished_at: r.finished_at.map(|t| t.to_rfc3339()),
        players: roster.into_iter().map(build_player_response).collect(),
    }
}

/// Build a `PlayerResponse` from a participant model.
fn build_player_response(p: participant::Model) -> PlayerResponse {
    PlayerResponse {
        player_id: p.id,
        display_name: p.display_name,
        is_host: p.is_host,
        is_ready: p.is_ready,
        is_connected: p.is_connected,
        is_spectator: p.is_spectator,
        score: p.score,
        joined_at: p.joined_at.to_rfc3339(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// `POST /api/v1/rooms` — Create a room; the caller becomes sole participant
/// and host.
async fn create_room(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(body): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<CreateRoomResponse>), AppError> {
    let (created, host) = room_registry::create_room(
        &state.db,
        &caller,
        CreateRoomParams {
            game_id: body.game_id,
            name: body.name,
            max_players: body.max_players,
            is_private: body.is_private,
            game_mode: body.game_mode,
            settings: body.settings,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateRoomResponse {
            room_id: created.id,
            room_code: created.room_code,
            player_id: host.id,
            status: created.status,
        }),
    ))
}

/// `GET /api/v1/rooms/{roomCode}` — Room details with current roster.
/// Unauthenticated: the shareable code is the only credential for reading a
/// lobby.
async fn get_room(
    State(state): State<AppState>,
    Path(room_code): Path<String>,
) -> Result<Json<RoomResponse>, AppError> {
    let found = room_registry::find_room_by_code(&state.db, &room_code).await?;
    let roster = room_registry::active_roster(&state.db, found.id).await?;

    Ok(Json(build_room_response(&found, roster)))
}

/// `POST /api/v1/rooms/join` — Join by code or id. Idempotent per user.
async fn join_room(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(body): Json<JoinRoomRequest>,
) -> Result<(StatusCode, Json<JoinRoomResponse>), AppError> {
    let JoinOutcome {
        room: joined_room,
        participant: membership,
        already_joined,
    } = membership::join_room(
        &state.db,
        &caller,
        JoinRoomParams {
            room_code: body.room_code,
            room_id: body.room_id,
            display_name: body.display_name,
        },
    )
    .await?;

    let status = if already_joined {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    Ok((
        status,
        Json(JoinRoomResponse {
            room_id: joined_room.id,
            player_id: membership.id,
            already_joined,
        }),
    ))
}

/// `POST /api/v1/rooms/{roomId}/leave` — Leave a room (owner of the player
/// slot only). May migrate the host or delete an emptied room.
async fn leave_room(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(room_id): Path<Uuid>,
    Json(body): Json<LeaveRoomRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    membership::leave_room(&state.db, &caller, room_id, body.player_id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// `POST /api/v1/rooms/{roomId}/ready` — Set readiness; runs the ready-check.
async fn set_player_ready(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(room_id): Path<Uuid>,
    Json(body): Json<SetReadyRequest>,
) -> Result<Json<SetReadyResponse>, AppError> {
    let all_ready =
        membership::set_ready(&state.db, &caller, room_id, body.player_id, body.is_ready).await?;
    Ok(Json(SetReadyResponse {
        success: true,
        all_ready,
    }))
}

/// `POST /api/v1/rooms/{roomId}/start` — Start the game (host only).
async fn start_game(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(room_id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, AppError> {
    room_registry::start_game(&state.db, room_id, caller.user_id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// `POST /api/v1/rooms/{roomId}/state` — Relay per-player game state
/// (last-write-wins, opaque payload).
async fn update_player_state(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(room_id): Path<Uuid>,
    Json(body): Json<UpdateStateRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    membership::update_state(
        &state.db,
        &caller,
        room_id,
        body.player_id,
        body.game_state,
        body.score,
    )
    .await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// `POST /api/v1/rooms/{roomId}/end` — End the game (host only); compiles and
/// returns the final rankings.
async fn end_game(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(room_id): Path<Uuid>,
) -> Result<Json<EndGameResponse>, AppError> {
    let (_result, rankings) = match_results::end_game(&state.db, caller.user_id, room_id).await?;
    Ok(Json(EndGameResponse {
        success: true,
        rankings,
    }))
}
