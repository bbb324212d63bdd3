//! Shared helpers for integration tests: an in-memory store with the full
//! schema applied, plus seed fixtures for the entity graph.
#![allow(dead_code)]

use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use ticketstore::Client;
use ticketstore::models::event::EventType;
use ticketstore::repositories::event::CreateEventRequest;
use ticketstore::repositories::participant::CreateParticipantRequest;
use ticketstore::repositories::ticket::CreateTicketRequest;
use ticketstore::repositories::ticket_setting::CreateTicketSettingRequest;
use ticketstore::repositories::user::CreateUserRequest;
use uuid::Uuid;

pub async fn setup_client() -> Result<Client> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(Client::from_connection(db))
}

pub async fn seed_user(client: &Client, name: &str, email: &str) -> Result<Uuid> {
    let user = client
        .users()
        .create(CreateUserRequest {
            id: None,
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            image: None,
        })
        .await?;
    Ok(user.id)
}

pub async fn seed_event(client: &Client, creator_id: Uuid, name: &str) -> Result<Uuid> {
    let event = client
        .events()
        .create(CreateEventRequest {
            id: None,
            name: name.to_string(),
            description: String::new(),
            event_type: EventType::OneTime,
            max_ticket_count: 100,
            creator_id,
        })
        .await?;
    Ok(event.id)
}

pub async fn seed_participant(
    client: &Client,
    event_id: Uuid,
    user_id: Uuid,
    name: &str,
) -> Result<Uuid> {
    let participant = client
        .participants()
        .create(CreateParticipantRequest {
            id: None,
            event_id,
            user_id,
            invited_at: None,
            name: name.to_string(),
            phone: None,
            email: Some(format!("{}@x.com", name.to_lowercase())),
            send_type: "EMAIL".to_string(),
        })
        .await?;
    Ok(participant.id)
}

pub async fn seed_ticket_setting(client: &Client, event_id: Uuid) -> Result<Uuid> {
    let setting = client
        .ticket_settings()
        .create(CreateTicketSettingRequest {
            id: None,
            event_id,
            logo_url: None,
            image_url: None,
            meta_data: None,
            allow_reuseable: true,
        })
        .await?;
    Ok(setting.id)
}

pub async fn seed_ticket(
    client: &Client,
    participant_id: Uuid,
    ticket_setting_id: Uuid,
) -> Result<Uuid> {
    let ticket = client
        .tickets()
        .create(CreateTicketRequest {
            id: None,
            participant_id,
            ticket_setting_id,
            sent_at: None,
        })
        .await?;
    Ok(ticket.id)
}
