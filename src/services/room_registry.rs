//! Room lifecycle: creation, lookup, the forward-only status machine, and
//! roster-driven reconciliation (host migration, empty-room deletion).

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use serde_json::json;
use uuid::Uuid;

use crate::auth::Identity;
use crate::entities::{RoomStatus, participant, room};
use crate::error::AppError;
use crate::services::audit;
use crate::utils::{generate_room_code, is_valid_room_code, normalize_room_code};

/// Maximum attempts to generate a unique room code before giving up.
const MAX_CODE_GENERATION_ATTEMPTS: u32 = 20;

/// Upper bound on room capacity.
const MAX_ROOM_CAPACITY: i32 = 32;

/// Parameters for creating a room.
pub struct CreateRoomParams {
    pub game_id: String,
    pub name: String,
    pub max_players: i32,
    pub is_private: bool,
    pub game_mode: Option<String>,
    pub settings: Option<serde_json::Value>,
}

/// Parse a room's stored status, treating anything unrecognized as terminal.
#[must_use]
pub fn status_of(room: &room::Model) -> RoomStatus {
    RoomStatus::parse(&room.status).unwrap_or(RoomStatus::Finished)
}

/// Create a room in `waiting` status with the caller as sole participant and host.
///
/// # Errors
///
/// Returns `BadRequest` if `max_players < 2`, or an internal error if a unique
/// room code cannot be generated.
pub async fn create_room(
    db: &DatabaseConnection,
    caller: &Identity,
    params: CreateRoomParams,
) -> Result<(room::Model, participant::Model), AppError> {
    if params.max_players < 2 {
        return Err(AppError::BadRequest(
            "maxPlayers must be at least 2.".to_string(),
        ));
    }
    let max_players = params.max_players.min(MAX_ROOM_CAPACITY);

    let name = params.name.trim().to_string();
    if name.is_empty() || name.len() > 100 {
        return Err(AppError::BadRequest(
            "Room name must be between 1 and 100 characters.".to_string(),
        ));
    }

    let room_code = generate_unique_code(db, generate_room_code).await?;
    let now = Utc::now().fixed_offset();
    let room_id = Uuid::new_v4();

    let new_room = room::ActiveModel {
        id: Set(room_id),
        room_code: Set(room_code),
        game_id: Set(params.game_id),
        name: Set(name),
        max_players: Set(max_players),
        is_private: Set(params.is_private),
        game_mode: Set(params.game_mode),
        settings: Set(params.settings),
        host_user_id: Set(caller.user_id),
        status: Set(RoomStatus::Waiting.as_str().to_string()),
        created_at: Set(now),
        last_activity: Set(now),
        started_at: Set(None),
        finished_at: Set(None),
        deleted_at: Set(None),
    };
    let inserted_room = new_room.insert(db).await?;

    let host_participant = participant::ActiveModel {
        id: Set(Uuid::new_v4()),
        room_id: Set(room_id),
        user_id: Set(caller.user_id),
        display_name: Set(caller.display_name.clone()),
        is_host: Set(true),
        is_ready: Set(false),
        is_connected: Set(true),
        is_spectator: Set(false),
        score: Set(0),
        game_state: Set(None),
        joined_at: Set(now),
        last_seen_at: Set(now),
        deleted_at: Set(None),
    };
    let inserted_host = host_participant.insert(db).await?;

    audit::record(
        db,
        Some(room_id),
        caller.user_id,
        "room.create",
        json!({
            "roomCode": inserted_room.room_code,
            "gameId": inserted_room.game_id,
            "maxPlayers": inserted_room.max_players,
        }),
    )
    .await;

    tracing::info!(%room_id, code = %inserted_room.room_code, "Room created");

    Ok((inserted_room, inserted_host))
}

/// Generate a unique room code, retrying on collision.
///
/// The code source is injected (production passes [`generate_room_code`]) so
/// the collision path can be driven deterministically in tests. Collisions
/// are checked against non-deleted rooms only, so codes recycle once a room
/// is gone.
async fn generate_unique_code(
    db: &DatabaseConnection,
    mut next_code: impl FnMut() -> String,
) -> Result<String, AppError> {
    for _ in 0..MAX_CODE_GENERATION_ATTEMPTS {
        let code = next_code();

        let existing = room::Entity::find()
            .filter(room::Column::RoomCode.eq(&code))
            .filter(room::Column::DeletedAt.is_null())
            .one(db)
            .await?;

        if existing.is_none() {
            return Ok(code);
        }
    }

    Err(AppError::Internal(anyhow::anyhow!(
        "Failed to generate unique room code after {MAX_CODE_GENERATION_ATTEMPTS} attempts"
    )))
}

/// Look up a non-deleted room by id.
///
/// # Errors
///
/// Returns `NotFound` if the room does not exist or has been deleted.
pub async fn find_room(db: &DatabaseConnection, room_id: Uuid) -> Result<room::Model, AppError> {
    room::Entity::find_by_id(room_id)
        .filter(room::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Room not found.".to_string()))
}

/// Look up a non-deleted room by its shareable code.
///
/// # Errors
///
/// Returns `BadRequest` for a malformed code, `NotFound` if no live room has it.
pub async fn find_room_by_code(
    db: &DatabaseConnection,
    code: &str,
) -> Result<room::Model, AppError> {
    let normalized = normalize_room_code(code);
    if !is_valid_room_code(&normalized) {
        return Err(AppError::BadRequest("Invalid room code format.".to_string()));
    }

    room::Entity::find()
        .filter(room::Column::RoomCode.eq(&normalized))
        .filter(room::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Room not found.".to_string()))
}

/// Load the current roster: non-deleted participants in deterministic order
/// (earliest `joined_at` first, participant id as tiebreak).
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn active_roster(
    db: &DatabaseConnection,
    room_id: Uuid,
) -> Result<Vec<participant::Model>, AppError> {
    let roster = participant::Entity::find()
        .filter(participant::Column::RoomId.eq(room_id))
        .filter(participant::Column::DeletedAt.is_null())
        .order_by_asc(participant::Column::JoinedAt)
        .order_by_asc(participant::Column::Id)
        .all(db)
        .await?;
    Ok(roster)
}

/// Start the game: `waiting | ready → playing`. Host-only.
///
/// Starting from `waiting` (ready-check not completed) is allowed; the
/// ready-check is advisory.
///
/// # Errors
///
/// `NotFound` if the room is gone, `Forbidden` for non-hosts, `InvalidState`
/// if the game already started or finished.
pub async fn start_game(
    db: &DatabaseConnection,
    room_id: Uuid,
    caller_user_id: Uuid,
) -> Result<room::Model, AppError> {
    let found = find_room(db, room_id).await?;

    if found.host_user_id != caller_user_id {
        return Err(AppError::Forbidden(
            "Only the host can start the game.".to_string(),
        ));
    }

    if !status_of(&found).can_start() {
        return Err(AppError::InvalidState(format!(
            "Cannot start a game from status '{}'.",
            found.status
        )));
    }

    let now = Utc::now().fixed_offset();
    let mut active: room::ActiveModel = found.into();
    active.status = Set(RoomStatus::Playing.as_str().to_string());
    active.started_at = Set(Some(now));
    active.last_activity = Set(now);
    let updated = active.update(db).await?;

    audit::record(
        db,
        Some(room_id),
        caller_user_id,
        "room.start",
        json!({ "status": updated.status }),
    )
    .await;

    tracing::info!(%room_id, "Game started");

    Ok(updated)
}

/// Outcome of a roster reconciliation pass.
#[derive(Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Roster is empty; the room was soft-deleted.
    RoomDeleted,
    /// A new host was assigned (earliest-joined participant).
    HostMigrated { new_host_user_id: Uuid },
    /// Roster and host were already consistent.
    Unchanged,
}

/// Recompute room derived state from the current roster snapshot.
///
/// Idempotent and safe to re-run: rather than incrementally patching on each
/// departure (which races under concurrent leaves), this derives the correct
/// end state from what the store holds right now:
/// - empty roster → soft-delete the room;
/// - no host on the roster → promote the earliest-joined participant and
///   update the room's `host_user_id` to match.
///
/// # Errors
///
/// Returns an error if any store operation fails.
pub async fn reconcile(
    db: &DatabaseConnection,
    found: room::Model,
) -> Result<ReconcileOutcome, AppError> {
    let roster = active_roster(db, found.id).await?;
    let now = Utc::now().fixed_offset();

    if roster.is_empty() {
        let room_id = found.id;
        let mut active: room::ActiveModel = found.into();
        active.deleted_at = Set(Some(now));
        active.last_activity = Set(now);
        active.update(db).await?;
        tracing::info!(%room_id, "Room deleted (empty roster)");
        return Ok(ReconcileOutcome::RoomDeleted);
    }

    if let Some(current_host) = roster.iter().find(|p| p.is_host) {
        // Host present; make sure the room record agrees.
        if found.host_user_id == current_host.user_id {
            return Ok(ReconcileOutcome::Unchanged);
        }
        let host_user_id = current_host.user_id;
        let mut active: room::ActiveModel = found.into();
        active.host_user_id = Set(host_user_id);
        active.last_activity = Set(now);
        active.update(db).await?;
        return Ok(ReconcileOutcome::HostMigrated {
            new_host_user_id: host_user_id,
        });
    }

    // No host on the roster: promote the earliest-joined participant.
    // `active_roster` ordering makes this deterministic.
    let successor = roster
        .first()
        .cloned()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Roster unexpectedly empty")))?;
    let new_host_user_id = successor.user_id;
    let successor_id = successor.id;

    let mut active_successor: participant::ActiveModel = successor.into();
    active_successor.is_host = Set(true);
    active_successor.update(db).await?;

    let room_id = found.id;
    let mut active: room::ActiveModel = found.into();
    active.host_user_id = Set(new_host_user_id);
    active.last_activity = Set(now);
    active.update(db).await?;

    tracing::info!(%room_id, new_host = %successor_id, "Host migrated");

    Ok(ReconcileOutcome::HostMigrated { new_host_user_id })
}
