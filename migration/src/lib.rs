pub use sea_orm_migration::prelude::*;

mod m20260815_000001_create_room_table;
mod m20260815_000002_create_participant_table;
mod m20260815_000003_create_match_result_table;
mod m20260815_000004_create_audit_log_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260815_000001_create_room_table::Migration),
            Box::new(m20260815_000002_create_participant_table::Migration),
            Box::new(m20260815_000003_create_match_result_table::Migration),
            Box::new(m20260815_000004_create_audit_log_table::Migration),
        ]
    }
}
