//! Migration to create the event_admins join table.
//!
//! Backs the many-to-many relation between events and the users who
//! administer them.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EventAdmins::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EventAdmins::EventId).uuid().not_null())
                    .col(ColumnDef::new(EventAdmins::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(EventAdmins::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(EventAdmins::EventId)
                            .col(EventAdmins::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_admins_event_id")
                            .from(EventAdmins::Table, EventAdmins::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_admins_user_id")
                            .from(EventAdmins::Table, EventAdmins::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_admins_user_id")
                    .table(EventAdmins::Table)
                    .col(EventAdmins::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_event_admins_user_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(EventAdmins::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum EventAdmins {
    Table,
    EventId,
    UserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
