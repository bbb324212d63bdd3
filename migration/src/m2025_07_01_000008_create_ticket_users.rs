//! Migration to create the ticket_users join table.
//!
//! Backs the many-to-many relation between tickets and users.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TicketUsers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TicketUsers::TicketId).uuid().not_null())
                    .col(ColumnDef::new(TicketUsers::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(TicketUsers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(TicketUsers::TicketId)
                            .col(TicketUsers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_users_ticket_id")
                            .from(TicketUsers::Table, TicketUsers::TicketId)
                            .to(Tickets::Table, Tickets::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_users_user_id")
                            .from(TicketUsers::Table, TicketUsers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ticket_users_user_id")
                    .table(TicketUsers::Table)
                    .col(TicketUsers::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_ticket_users_user_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(TicketUsers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TicketUsers {
    Table,
    TicketId,
    UserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Tickets {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
