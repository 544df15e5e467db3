use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Immutable record of a finished game. Created exactly once per room
/// end-game transition; never updated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "match_result")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub room_id: Uuid,
    pub game_id: String,
    pub game_mode: Option<String>,
    pub duration_ms: i64,
    /// Ordered ranking entries: `{playerId, userId, displayName, score, rank}`.
    pub rankings: Json,
    pub winner_id: Option<Uuid>,
    pub winner_score: i64,
    pub started_at: Option<DateTimeWithTimeZone>,
    pub finished_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::room::Entity",
        from = "Column::RoomId",
        to = "super::room::Column::Id"
    )]
    Room,
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
