mod common;

use axum::Router;
use axum::http::StatusCode;
use serde_json::json;

/// Create a room, returning (`room_id`, `room_code`, host `player_id`).
async fn create_room(app: &Router, token: &str) -> (String, String, String) {
    let (status, body) = common::post_json_with_auth(
        app,
        "/api/v1/rooms",
        &json!({
            "gameId": "arena",
            "name": "Match night",
            "maxPlayers": 8,
            "gameMode": "classic",
        }),
        token,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create room failed: {body}");
    let room: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    (
        room["roomId"].as_str().unwrap_or_default().to_string(),
        room["roomCode"].as_str().unwrap_or_default().to_string(),
        room["playerId"].as_str().unwrap_or_default().to_string(),
    )
}

async fn join(app: &Router, token: &str, code: &str) -> String {
    let (status, body) = common::post_json_with_auth(
        app,
        "/api/v1/rooms/join",
        &json!({ "roomCode": code }),
        token,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "join failed: {body}");
    let joined: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    joined["playerId"].as_str().unwrap_or_default().to_string()
}

async fn start(app: &Router, token: &str, room_id: &str) -> StatusCode {
    let (status, _body) = common::post_json_with_auth(
        app,
        &format!("/api/v1/rooms/{room_id}/start"),
        &json!({}),
        token,
    )
    .await;
    status
}

async fn push_state(
    app: &Router,
    token: &str,
    room_id: &str,
    player_id: &str,
    score: i64,
) -> StatusCode {
    let (status, _body) = common::post_json_with_auth(
        app,
        &format!("/api/v1/rooms/{room_id}/state"),
        &json!({
            "playerId": player_id,
            "gameState": "{\"pos\":[0,0]}",
            "score": score,
        }),
        token,
    )
    .await;
    status
}

async fn end(app: &Router, token: &str, room_id: &str) -> (StatusCode, serde_json::Value) {
    let (status, body) = common::post_json_with_auth(
        app,
        &format!("/api/v1/rooms/{room_id}/end"),
        &json!({}),
        token,
    )
    .await;
    (status, serde_json::from_str(&body).unwrap_or_default())
}

// ──────────────────────────────────────────────────────────────────────────────
// POST /api/v1/rooms/{roomId}/start
// ──────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn start_from_waiting_is_allowed() {
    // Host override: no completed ready-check required to start.
    let app = common::test_app().await;
    let (host_token, _host_id) = common::new_user("Host");
    let (room_id, code, _host_player) = create_room(&app, &host_token).await;

    assert_eq!(start(&app, &host_token, &room_id).await, StatusCode::OK);

    let (_, body) = common::get(&app, &format!("/api/v1/rooms/{code}")).await;
    let room: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    assert_eq!(room["status"], "playing");
    assert!(!room["startedAt"].as_str().unwrap_or_default().is_empty());
}

#[tokio::test]
async fn start_by_non_host_returns_403() {
    let app = common::test_app().await;
    let (host_token, _host_id) = common::new_user("Host");
    let (room_id, code, _host_player) = create_room(&app, &host_token).await;

    let (guest_token, _guest_id) = common::new_user("Guest");
    join(&app, &guest_token, &code).await;

    assert_eq!(
        start(&app, &guest_token, &room_id).await,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn start_twice_returns_invalid_state() {
    let app = common::test_app().await;
    let (host_token, _host_id) = common::new_user("Host");
    let (room_id, _code, _host_player) = create_room(&app, &host_token).await;

    assert_eq!(start(&app, &host_token, &room_id).await, StatusCode::OK);
    assert_eq!(
        start(&app, &host_token, &room_id).await,
        StatusCode::CONFLICT
    );
}

#[tokio::test]
async fn start_finished_room_returns_invalid_state() {
    let app = common::test_app().await;
    let (host_token, _host_id) = common::new_user("Host");
    let (room_id, _code, _host_player) = create_room(&app, &host_token).await;

    assert_eq!(start(&app, &host_token, &room_id).await, StatusCode::OK);
    let (status, _json) = end(&app, &host_token, &room_id).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(
        start(&app, &host_token, &room_id).await,
        StatusCode::CONFLICT
    );
}

#[tokio::test]
async fn start_unknown_room_returns_404() {
    let app = common::test_app().await;
    let (token, _user_id) = common::new_user("Host");
    let status = start(&app, &token, &uuid::Uuid::new_v4().to_string()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ──────────────────────────────────────────────────────────────────────────────
// POST /api/v1/rooms/{roomId}/state
// ──────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_state_persists_score_last_write_wins() {
    let app = common::test_app().await;
    let (host_token, _host_id) = common::new_user("Host");
    let (room_id, code, host_player) = create_room(&app, &host_token).await;

    assert_eq!(start(&app, &host_token, &room_id).await, StatusCode::OK);

    assert_eq!(
        push_state(&app, &host_token, &room_id, &host_player, 10).await,
        StatusCode::OK
    );
    assert_eq!(
        push_state(&app, &host_token, &room_id, &host_player, 25).await,
        StatusCode::OK
    );

    let (_, body) = common::get(&app, &format!("/api/v1/rooms/{code}")).await;
    let room: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    assert_eq!(room["players"][0]["score"], 25);
    // Relayed state never advances the status machine
    assert_eq!(room["status"], "playing");
}

#[tokio::test]
async fn update_state_on_someone_elses_player_returns_403() {
    let app = common::test_app().await;
    let (host_token, _host_id) = common::new_user("Host");
    let (room_id, code, _host_player) = create_room(&app, &host_token).await;

    let (guest_token, _guest_id) = common::new_user("Guest");
    let guest_player = join(&app, &guest_token, &code).await;

    assert_eq!(
        push_state(&app, &host_token, &room_id, &guest_player, 99).await,
        StatusCode::FORBIDDEN
    );
}

// ──────────────────────────────────────────────────────────────────────────────
// POST /api/v1/rooms/{roomId}/end
// ──────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn end_game_ranks_players_by_score() {
    let app = common::test_app().await;
    let (host_token, _host_id) = common::new_user("Host");
    let (room_id, code, host_player) = create_room(&app, &host_token).await;

    let (a_token, _a_id) = common::new_user("Alice");
    let a_player = join(&app, &a_token, &code).await;
    let (b_token, _b_id) = common::new_user("Bob");
    let b_player = join(&app, &b_token, &code).await;

    assert_eq!(start(&app, &host_token, &room_id).await, StatusCode::OK);

    push_state(&app, &host_token, &room_id, &host_player, 10).await;
    push_state(&app, &a_token, &room_id, &a_player, 30).await;
    push_state(&app, &b_token, &room_id, &b_player, 20).await;

    let (status, json) = end(&app, &host_token, &room_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let empty = vec![];
    let rankings = json["rankings"].as_array().unwrap_or(&empty);
    assert_eq!(rankings.len(), 3);

    let scores: Vec<i64> = rankings
        .iter()
        .map(|r| r["score"].as_i64().unwrap_or_default())
        .collect();
    assert_eq!(scores, vec![30, 20, 10]);
    let ranks: Vec<i64> = rankings
        .iter()
        .map(|r| r["rank"].as_i64().unwrap_or_default())
        .collect();
    assert_eq!(ranks, vec![1, 2, 3]);
    assert_eq!(rankings[0]["displayName"], "Alice");

    let (_, body) = common::get(&app, &format!("/api/v1/rooms/{code}")).await;
    let room: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    assert_eq!(room["status"], "finished");
    assert!(!room["finishedAt"].as_str().unwrap_or_default().is_empty());
}

#[tokio::test]
async fn end_by_non_host_returns_403() {
    let app = common::test_app().await;
    let (host_token, _host_id) = common::new_user("Host");
    let (room_id, code, _host_player) = create_room(&app, &host_token).await;

    let (guest_token, _guest_id) = common::new_user("Guest");
    join(&app, &guest_token, &code).await;

    assert_eq!(start(&app, &host_token, &room_id).await, StatusCode::OK);

    let (status, _json) = end(&app, &guest_token, &room_id).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn end_before_start_returns_invalid_state() {
    let app = common::test_app().await;
    let (host_token, _host_id) = common::new_user("Host");
    let (room_id, _code, _host_player) = create_room(&app, &host_token).await;

    let (status, json) = end(&app, &host_token, &room_id).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "INVALID_STATE");
}

#[tokio::test]
async fn end_twice_cannot_duplicate_result() {
    let app = common::test_app().await;
    let (host_token, _host_id) = common::new_user("Host");
    let (room_id, _code, _host_player) = create_room(&app, &host_token).await;

    assert_eq!(start(&app, &host_token, &room_id).await, StatusCode::OK);

    let (status, _json) = end(&app, &host_token, &room_id).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = end(&app, &host_token, &room_id).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "INVALID_STATE");
}

#[tokio::test]
async fn departed_player_still_appears_in_rankings() {
    let app = common::test_app().await;
    let (host_token, _host_id) = common::new_user("Host");
    let (room_id, code, host_player) = create_room(&app, &host_token).await;

    let (a_token, _a_id) = common::new_user("Quitter");
    let a_player = join(&app, &a_token, &code).await;

    assert_eq!(start(&app, &host_token, &room_id).await, StatusCode::OK);

    push_state(&app, &host_token, &room_id, &host_player, 5).await;
    push_state(&app, &a_token, &room_id, &a_player, 50).await;

    let (status, _body) = common::post_json_with_auth(
        &app,
        &format!("/api/v1/rooms/{room_id}/leave"),
        &json!({ "playerId": a_player }),
        &a_token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = end(&app, &host_token, &room_id).await;
    assert_eq!(status, StatusCode::OK);

    // The departed player keeps the score they earned
    let empty = vec![];
    let rankings = json["rankings"].as_array().unwrap_or(&empty);
    assert_eq!(rankings.len(), 2);
    assert_eq!(rankings[0]["displayName"], "Quitter");
    assert_eq!(rankings[0]["score"], 50);
}
