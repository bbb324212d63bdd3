//! Migration to create the ticket_send_results table.
//!
//! At most one send result exists per ticket (unique ticket_id), recording
//! the delivery outcome and the contact details used.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TicketSendResults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TicketSendResults::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TicketSendResults::TicketId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TicketSendResults::Status).text().not_null())
                    .col(ColumnDef::new(TicketSendResults::Name).text().not_null())
                    .col(ColumnDef::new(TicketSendResults::Phone).text().null())
                    .col(ColumnDef::new(TicketSendResults::Email).text().null())
                    .col(
                        ColumnDef::new(TicketSendResults::SendType)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TicketSendResults::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TicketSendResults::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TicketSendResults::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_send_results_ticket_id")
                            .from(TicketSendResults::Table, TicketSendResults::TicketId)
                            .to(Tickets::Table, Tickets::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ticket_send_results_ticket_id")
                    .table(TicketSendResults::Table)
                    .col(TicketSendResults::TicketId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_ticket_send_results_ticket_id")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(TicketSendResults::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TicketSendResults {
    Table,
    Id,
    TicketId,
    Status,
    Name,
    Phone,
    Email,
    SendType,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Tickets {
    Table,
    Id,
}
