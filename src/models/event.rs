//! Event entity model
//!
//! This module contains the SeaORM entity model for the events table, plus
//! the [`EventType`] enum. Events are created by a user and fan out into
//! participants, ticket settings and payments. The admin user set is reached
//! through the event_admins join entity.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Scheduling flavour of an event, stored as text
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum EventType {
    #[sea_orm(string_value = "ONE_TIME")]
    OneTime,
    #[sea_orm(string_value = "RECURRING")]
    Recurring,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

/// Event entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    /// Unique identifier for the event (primary key)
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// Event name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Scheduling flavour
    pub event_type: EventType,

    /// Upper bound on tickets issued for this event
    pub max_ticket_count: i32,

    /// User who created the event; no cascade, deleting the creator fails
    /// while this row exists
    pub creator_id: Uuid,

    /// Timestamp when the event was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the event was last updated
    pub updated_at: DateTimeWithTimeZone,

    /// Soft-delete marker; None means the row is live
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatorId",
        to = "super::user::Column::Id"
    )]
    Creator,
    #[sea_orm(has_many = "super::participant::Entity")]
    Participant,
    #[sea_orm(has_many = "super::ticket_setting::Entity")]
    TicketSetting,
    #[sea_orm(has_many = "super::payment::Entity")]
    Payment,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::participant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participant.def()
    }
}

impl Related<super::ticket_setting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TicketSetting.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
