//! Match result compilation: rank the roster by score at game end and
//! persist one immutable result record.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::entities::{RoomStatus, match_result, participant, room};
use crate::error::AppError;
use crate::services::{audit, room_registry};

/// One entry in a match result's ranking list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub player_id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub score: i64,
    pub rank: u32,
}

/// Rank participants descending by score. The sort is stable, so tied scores
/// keep the incoming (insertion) order rather than applying any further rule.
#[must_use]
pub fn compile_rankings(participants: &[participant::Model]) -> Vec<RankingEntry> {
    let mut sorted: Vec<&participant::Model> = participants.iter().collect();
    sorted.sort_by_key(|p| std::cmp::Reverse(p.score));

    sorted
        .into_iter()
        .enumerate()
        .map(|(index, p)| RankingEntry {
            player_id: p.id,
            user_id: p.user_id,
            display_name: p.display_name.clone(),
            score: p.score,
            rank: u32::try_from(index + 1).unwrap_or(u32::MAX),
        })
        .collect()
}

/// End the game: compile rankings, persist the immutable result, and move
/// the room to `finished`. Host-only, and only from `playing`, so a repeated
/// `end` call can never mint a duplicate result.
///
/// Departed (soft-deleted) participants still appear in the rankings: a
/// player who leaves mid-game keeps the score they earned.
///
/// # Errors
///
/// `NotFound` if the room is gone, `Forbidden` for non-hosts, `InvalidState`
/// unless the room is `playing`.
pub async fn end_game(
    db: &DatabaseConnection,
    caller_user_id: Uuid,
    room_id: Uuid,
) -> Result<(match_result::Model, Vec<RankingEntry>), AppError> {
    let found = room_registry::find_room(db, room_id).await?;

    if found.host_user_id != caller_user_id {
        return Err(AppError::Forbidden(
            "Only the host can end the game.".to_string(),
        ));
    }

    if !room_registry::status_of(&found).can_end() {
        return Err(AppError::InvalidState(format!(
            "Cannot end a game from status '{}'.",
            found.status
        )));
    }

    // Full participant list, deleted included, in insertion order.
    let participants = participant::Entity::find()
        .filter(participant::Column::RoomId.eq(room_id))
        .order_by_asc(participant::Column::JoinedAt)
        .order_by_asc(participant::Column::Id)
        .all(db)
        .await?;

    let rankings = compile_rankings(&participants);
    let winner = rankings.first();

    let now = Utc::now().fixed_offset();
    let duration_ms = found
        .started_at
        .map_or(0, |started| (now - started).num_milliseconds().max(0));

    let result = match_result::ActiveModel {
        id: Set(Uuid::new_v4()),
        room_id: Set(room_id),
        game_id: Set(found.game_id.clone()),
        game_mode: Set(found.game_mode.clone()),
        duration_ms: Set(duration_ms),
        rankings: Set(serde_json::to_value(&rankings)?),
        winner_id: Set(winner.map(|w| w.player_id)),
        winner_score: Set(winner.map_or(0, |w| w.score)),
        started_at: Set(found.started_at),
        finished_at: Set(now),
        created_at: Set(now),
    };
    let inserted = result.insert(db).await?;

    let mut active: room::ActiveModel = found.into();
    active.status = Set(RoomStatus::Finished.as_str().to_string());
    active.finished_at = Set(Some(now));
    active.last_activity = Set(now);
    active.update(db).await?;

    audit::record(
        db,
        Some(room_id),
        caller_user_id,
        "room.end",
        json!({
            "winnerId": inserted.winner_id,
            "winnerScore": inserted.winner_score,
            "playerCount": rankings.len(),
        }),
    )
    .await;

    tracing::info!(%room_id, players = rankings.len(), "Game ended");

    Ok((inserted, rankings))
}
