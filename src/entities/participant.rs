use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "participant")]
pub struct Model {
    /// Per-membership identifier, exposed to clients as `playerId`.
    /// Distinct from `user_id` so one user could hold multiple slots.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub room_id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub is_host: bool,
    pub is_ready: bool,
    pub is_connected: bool,
    pub is_spectator: bool,
    pub score: i64,
    /// Opaque relayed payload, last-write-wins. Never parsed by the service.
    pub game_state: Option<String>,
    pub joined_at: DateTimeWithTimeZone,
    pub last_seen_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
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
