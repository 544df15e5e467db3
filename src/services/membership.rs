//! Membership ledger: join, leave, readiness, and relayed per-player state.
//!
//! All operations are at-most-one-attempt; the idempotent join is the sole
//! exception to "retries are the caller's problem".

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde_json::json;
use uuid::Uuid;

use crate::auth::Identity;
use crate::entities::{participant, room};
use crate::error::AppError;
use crate::services::room_registry::ReconcileOutcome;
use crate::services::{audit, ready_check, room_registry};

/// Parameters for joining a room; exactly one of `room_code` / `room_id`
/// must be provided (`room_id` wins if both are).
pub struct JoinRoomParams {
    pub room_code: Option<String>,
    pub room_id: Option<Uuid>,
    pub display_name: Option<String>,
}

/// Result of a join: the room, the membership, and whether it already existed.
pub struct JoinOutcome {
    pub room: room::Model,
    pub participant: participant::Model,
    pub already_joined: bool,
}

/// Join a room by code or id.
///
/// Idempotent per user: if the caller is already on the roster the existing
/// membership is returned with `already_joined = true`, even for a room that
/// has moved past `waiting`. This is what makes reconnect retries safe.
///
/// # Errors
///
/// `NotFound` if the room is absent or deleted, `InvalidState` unless the
/// room is `waiting`, `RoomFull` at capacity, `BadRequest` for missing
/// references or an invalid display name.
pub async fn join_room(
    db: &DatabaseConnection,
    caller: &Identity,
    params: JoinRoomParams,
) -> Result<JoinOutcome, AppError> {
    let found = match (params.room_id, params.room_code.as_deref()) {
        (Some(id), _) => room_registry::find_room(db, id).await?,
        (None, Some(code)) => room_registry::find_room_by_code(db, code).await?,
        (None, None) => {
            return Err(AppError::BadRequest(
                "Either roomId or roomCode is required.".to_string(),
            ));
        }
    };

    // Idempotence check first so reconnects succeed regardless of status.
    let existing = participant::Entity::find()
        .filter(participant::Column::RoomId.eq(found.id))
        .filter(participant::Column::UserId.eq(caller.user_id))
        .filter(participant::Column::DeletedAt.is_null())
        .one(db)
        .await?;

    if let Some(membership) = existing {
        return Ok(JoinOutcome {
            room: found,
            participant: membership,
            already_joined: true,
        });
    }

    if !room_registry::status_of(&found).can_join() {
        return Err(AppError::InvalidState(format!(
            "Cannot join a room in status '{}'.",
            found.status
        )));
    }

    let roster = room_registry::active_roster(db, found.id).await?;
    let max = usize::try_from(found.max_players).unwrap_or(usize::MAX);
    if roster.len() >= max {
        return Err(AppError::RoomFull("Room is full.".to_string()));
    }

    let display_name = params
        .display_name
        .unwrap_or_else(|| caller.display_name.clone())
        .trim()
        .to_string();
    if display_name.is_empty() || display_name.len() > 100 {
        return Err(AppError::BadRequest(
            "Display name must be between 1 and 100 characters.".to_string(),
        ));
    }

    let now = Utc::now().fixed_offset();
    let new_member = participant::ActiveModel {
        id: Set(Uuid::new_v4()),
        room_id: Set(found.id),
        user_id: Set(caller.user_id),
        display_name: Set(display_name),
        is_host: Set(false),
        is_ready: Set(false),
        is_connected: Set(true),
        is_spectator: Set(false),
        score: Set(0),
        game_state: Set(None),
        joined_at: Set(now),
        last_seen_at: Set(now),
        deleted_at: Set(None),
    };
    let inserted = new_member.insert(db).await?;

    let room_id = found.id;
    let mut active: room::ActiveModel = found.into();
    active.last_activity = Set(now);
    let touched = active.update(db).await?;

    audit::record(
        db,
        Some(room_id),
        caller.user_id,
        "room.join",
        json!({ "playerId": inserted.id }),
    )
    .await;

    Ok(JoinOutcome {
        room: touched,
        participant: inserted,
        already_joined: false,
    })
}

/// Load a participant the caller owns.
///
/// # Errors
///
/// `NotFound` if the membership does not exist (or is deleted, or belongs to
/// another room), `Forbidden` if it belongs to a different user.
async fn find_owned_participant(
    db: &DatabaseConnection,
    room_id: Uuid,
    player_id: Uuid,
    caller_user_id: Uuid,
) -> Result<participant::Model, AppError> {
    let membership = participant::Entity::find_by_id(player_id)
        .filter(participant::Column::RoomId.eq(room_id))
        .filter(participant::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Player not found in this room.".to_string()))?;

    if membership.user_id != caller_user_id {
        return Err(AppError::Forbidden(
            "You can only act on your own player.".to_string(),
        ));
    }

    Ok(membership)
}

/// Leave a room: soft-delete the membership, then reconcile the room
/// (host migration or deletion of an emptied room).
///
/// # Errors
///
/// `NotFound` for a missing room/membership, `Forbidden` if the membership
/// belongs to another user.
pub async fn leave_room(
    db: &DatabaseConnection,
    caller: &Identity,
    room_id: Uuid,
    player_id: Uuid,
) -> Result<ReconcileOutcome, AppError> {
    let found = room_registry::find_room(db, room_id).await?;
    let membership = find_owned_participant(db, room_id, player_id, caller.user_id).await?;

    let now = Utc::now().fixed_offset();
    let mut active: participant::ActiveModel = membership.into();
    active.deleted_at = Set(Some(now));
    active.is_connected = Set(false);
    active.update(db).await?;

    let outcome = room_registry::reconcile(db, found).await?;

    audit::record(
        db,
        Some(room_id),
        caller.user_id,
        "room.leave",
        json!({
            "playerId": player_id,
            "roomDeleted": outcome == ReconcileOutcome::RoomDeleted,
        }),
    )
    .await;

    Ok(outcome)
}

/// Update the caller's readiness, then run the ready-check over the roster.
///
/// Returns whether the full roster is now ready (quorum included).
///
/// # Errors
///
/// `NotFound` / `Forbidden` as for any owned-participant operation.
pub async fn set_ready(
    db: &DatabaseConnection,
    caller: &Identity,
    room_id: Uuid,
    player_id: Uuid,
    is_ready: bool,
) -> Result<bool, AppError> {
    let found = room_registry::find_room(db, room_id).await?;
    let membership = find_owned_participant(db, room_id, player_id, caller.user_id).await?;

    let now = Utc::now().fixed_offset();
    let mut active: participant::ActiveModel = membership.into();
    active.is_ready = Set(is_ready);
    active.last_seen_at = Set(now);
    active.update(db).await?;

    let all_ready = ready_check::evaluate(db, found).await?;

    audit::record(
        db,
        Some(room_id),
        caller.user_id,
        "room.ready",
        json!({ "playerId": player_id, "isReady": is_ready, "allReady": all_ready }),
    )
    .await;

    Ok(all_ready)
}

/// Record relayed game state (and optionally score) for the caller's player.
///
/// Last-write-wins on both fields; the payload is opaque and never parsed.
/// Never changes room status.
///
/// # Errors
///
/// `NotFound` / `Forbidden` as for any owned-participant operation.
pub async fn update_state(
    db: &DatabaseConnection,
    caller: &Identity,
    room_id: Uuid,
    player_id: Uuid,
    game_state: String,
    score: Option<i64>,
) -> Result<(), AppError> {
    let found = room_registry::find_room(db, room_id).await?;
    let membership = find_owned_participant(db, room_id, player_id, caller.user_id).await?;

    let now = Utc::now().fixed_offset();
    let mut active: participant::ActiveModel = membership.into();
    active.game_state = Set(Some(game_state));
    if let Some(score) = score {
        active.score = Set(score);
    }
    active.last_seen_at = Set(now);
    active.update(db).await?;

    let mut active_room: room::ActiveModel = found.into();
    active_room.last_activity = Set(now);
    active_room.update(db).await?;

    audit::record(
        db,
        Some(room_id),
        caller.user_id,
        "room.state",
        json!({ "playerId": player_id, "scoreUpdated": score.is_some() }),
    )
    .await;

    Ok(())
}
