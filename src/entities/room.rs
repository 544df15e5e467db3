use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "room")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub room_code: String,
    /// Opaque identifier of the game type; never interpreted by this service.
    pub game_id: String,
    pub name: String,
    pub max_players: i32,
    pub is_private: bool,
    pub game_mode: Option<String>,
    pub settings: Option<Json>,
    pub host_user_id: Uuid,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub last_activity: DateTimeWithTimeZone,
    pub started_at: Option<DateTimeWithTimeZone>,
    pub finished_at: Option<DateTimeWithTimeZone>,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::participant::Entity")]
    Participants,
    #[sea_orm(has_many = "super::match_result::Entity")]
    MatchResults,
}

impl Related<super::participant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl Related<super::match_result::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MatchResults.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
