use sea_orm_migration::prelude::*;

/// Creates the `match_result` table: one immutable record per finished game.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum MatchResult {
    Table,
    Id,
    RoomId,
    GameId,
    GameMode,
    DurationMs,
    Rankings,
    WinnerId,
    WinnerScore,
    StartedAt,
    FinishedAt,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MatchResult::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MatchResult::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MatchResult::RoomId).uuid().not_null())
                    .col(ColumnDef::new(MatchResult::GameId).string().not_null())
                    .col(ColumnDef::new(MatchResult::GameMode).string().null())
                    .col(
                        ColumnDef::new(MatchResult::DurationMs)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MatchResult::Rankings).json_binary().not_null())
                    .col(ColumnDef::new(MatchResult::WinnerId).uuid().null())
                    .col(
                        ColumnDef::new(MatchResult::WinnerScore)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MatchResult::StartedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(MatchResult::FinishedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MatchResult::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_match_result_room_id")
                    .table(MatchResult::Table)
                    .col(MatchResult::RoomId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MatchResult::Table).to_owned())
            .await
    }
}
