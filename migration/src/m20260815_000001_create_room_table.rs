use sea_orm_migration::prelude::*;

/// Creates the `room` table for multiplayer room records.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Room {
    Table,
    Id,
    RoomCode,
    GameId,
    Name,
    MaxPlayers,
    IsPrivate,
    GameMode,
    Settings,
    HostUserId,
    Status,
    CreatedAt,
    LastActivity,
    StartedAt,
    FinishedAt,
    DeletedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Room::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Room::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Room::RoomCode)
                            .string_len(10)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Room::GameId).string().not_null())
                    .col(ColumnDef::new(Room::Name).string().not_null())
                    .col(
                        ColumnDef::new(Room::MaxPlayers)
                            .integer()
                            .not_null()
                            .default(8),
                    )
                    .col(
                        ColumnDef::new(Room::IsPrivate)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Room::GameMode).string().null())
                    .col(ColumnDef::new(Room::Settings).json_binary().null())
                    .col(ColumnDef::new(Room::HostUserId).uuid().not_null())
                    .col(
                        ColumnDef::new(Room::Status)
                            .string_len(20)
                            .not_null()
                            .default("waiting"),
                    )
                    .col(
                        ColumnDef::new(Room::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Room::LastActivity)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Room::StartedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Room::FinishedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Room::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_room_room_code")
                    .table(Room::Table)
                    .col(Room::RoomCode)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Room::Table).to_owned())
            .await
    }
}
