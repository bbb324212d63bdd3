//! Migration to create the ticket_usages table.
//!
//! Each row records one redemption of a ticket; reusable tickets may
//! accumulate several usages.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TicketUsages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TicketUsages::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TicketUsages::TicketId).uuid().not_null())
                    .col(
                        ColumnDef::new(TicketUsages::UsedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TicketUsages::Metadata).json_binary().null())
                    .col(
                        ColumnDef::new(TicketUsages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TicketUsages::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TicketUsages::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_usages_ticket_id")
                            .from(TicketUsages::Table, TicketUsages::TicketId)
                            .to(Tickets::Table, Tickets::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ticket_usages_ticket_id")
                    .table(TicketUsages::Table)
                    .col(TicketUsages::TicketId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_ticket_usages_ticket_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(TicketUsages::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TicketUsages {
    Table,
    Id,
    TicketId,
    UsedAt,
    Metadata,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Tickets {
    Table,
    Id,
}
