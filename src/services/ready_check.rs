//! Ready-check coordination.
//!
//! On every readiness-affecting call, the full roster is rescanned (host
//! included) and the room is promoted `waiting → ready` when everyone is
//! ready and the quorum is met. The scan is cheap: roster size is bounded by
//! `max_players`. No timeout exists; a room can sit in `waiting` forever.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, DatabaseConnection};

use crate::entities::{RoomStatus, participant, room};
use crate::error::AppError;
use crate::services::room_registry;

/// Minimum participant count before a ready-check can promote a room.
pub const MIN_READY_QUORUM: usize = 2;

/// True when the roster meets quorum and every member is ready.
#[must_use]
pub fn roster_all_ready(roster: &[participant::Model]) -> bool {
    roster.len() >= MIN_READY_QUORUM && roster.iter().all(|p| p.is_ready)
}

/// Recompute readiness over the current roster and promote the room to
/// `ready` if it is still `waiting`.
///
/// Returns whether the roster is all-ready, regardless of whether a
/// transition happened: a `ready`/`playing` room reports its roster state
/// without touching status.
///
/// # Errors
///
/// Returns an error if the roster query or status update fails.
pub async fn evaluate(db: &DatabaseConnection, found: room::Model) -> Result<bool, AppError> {
    let roster = room_registry::active_roster(db, found.id).await?;
    let all_ready = roster_all_ready(&roster);

    if all_ready && room_registry::status_of(&found) == RoomStatus::Waiting {
        let room_id = found.id;
        let now = Utc::now().fixed_offset();
        let mut active: room::ActiveModel = found.into();
        active.status = Set(RoomStatus::Ready.as_str().to_string());
        active.last_activity = Set(now);
        active.update(db).await?;
        tracing::info!(%room_id, "Room promoted to ready");
    }

    Ok(all_ready)
}
