use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, DatabaseConnection};
use uuid::Uuid;

use crate::entities::audit_log;

/// Append one audit entry for a mutating operation.
///
/// Best-effort: the audit log is a write-only sink, so a failed insert is
/// logged and swallowed rather than failing the operation it annotates.
pub async fn record(
    db: &DatabaseConnection,
    room_id: Option<Uuid>,
    user_id: Uuid,
    action: &str,
    detail: serde_json::Value,
) {
    let entry = audit_log::ActiveModel {
        id: Set(Uuid::new_v4()),
        room_id: Set(room_id),
        user_id: Set(user_id),
        action: Set(action.to_string()),
        detail: Set(detail),
        created_at: Set(Utc::now().fixed_offset()),
    };

    if let Err(err) = entry.insert(db).await {
        tracing::warn!(action, %user_id, "Failed to write audit entry: {err}");
    }
}
