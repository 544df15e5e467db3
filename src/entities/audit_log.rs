use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only audit entry, one per mutating operation. Write-only from the
/// service's point of view: nothing in this crate reads these rows back.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub room_id: Option<Uuid>,
    pub user_id: Uuid,
    pub action: String,
    pub detail: Json,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
