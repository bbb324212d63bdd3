//! Migration to create the ticket_settings table.
//!
//! Ticket settings describe the branding and reuse policy applied to the
//! tickets issued for an event.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TicketSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TicketSettings::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TicketSettings::EventId).uuid().not_null())
                    .col(ColumnDef::new(TicketSettings::LogoUrl).text().null())
                    .col(ColumnDef::new(TicketSettings::ImageUrl).text().null())
                    .col(
                        ColumnDef::new(TicketSettings::MetaData)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TicketSettings::AllowReuseable)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(TicketSettings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TicketSettings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TicketSettings::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_settings_event_id")
                            .from(TicketSettings::Table, TicketSettings::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ticket_settings_event_id")
                    .table(TicketSettings::Table)
                    .col(TicketSettings::EventId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_ticket_settings_event_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(TicketSettings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TicketSettings {
    Table,
    Id,
    EventId,
    LogoUrl,
    ImageUrl,
    MetaData,
    AllowReuseable,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
}
