//! Database migrations for the ticketstore client.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2025_07_01_000001_create_users;
mod m2025_07_01_000002_create_accounts;
mod m2025_07_01_000003_create_events;
mod m2025_07_01_000004_create_event_admins;
mod m2025_07_01_000005_create_participants;
mod m2025_07_01_000006_create_ticket_settings;
mod m2025_07_01_000007_create_tickets;
mod m2025_07_01_000008_create_ticket_users;
mod m2025_07_01_000009_create_ticket_usages;
mod m2025_07_01_000010_create_ticket_send_results;
mod m2025_07_01_000011_create_payments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_07_01_000001_create_users::Migration),
            Box::new(m2025_07_01_000002_create_accounts::Migration),
            Box::new(m2025_07_01_000003_create_events::Migration),
            Box::new(m2025_07_01_000004_create_event_admins::Migration),
            Box::new(m2025_07_01_000005_create_participants::Migration),
            Box::new(m2025_07_01_000006_create_ticket_settings::Migration),
            Box::new(m2025_07_01_000007_create_tickets::Migration),
            Box::new(m2025_07_01_000008_create_ticket_users::Migration),
            Box::new(m2025_07_01_000009_create_ticket_usages::Migration),
            Box::new(m2025_07_01_000010_create_ticket_send_results::Migration),
            Box::new(m2025_07_01_000011_create_payments::Migration),
        ]
    }
}
