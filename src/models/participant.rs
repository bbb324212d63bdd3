//! Participant entity model
//!
//! A participant is a user invited to an event, carrying the contact details
//! and channel used when tickets are sent out.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Participant entity representing an invitation of a user to an event
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "participants")]
pub struct Model {
    /// Unique identifier for the participant (primary key)
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// Event the user is invited to
    pub event_id: Uuid,

    /// Invited user
    pub user_id: Uuid,

    /// When the invitation was issued
    pub invited_at: DateTimeWithTimeZone,

    /// Name snapshot used for ticket delivery
    pub name: String,

    /// Phone snapshot used for ticket delivery (optional)
    pub phone: Option<String>,

    /// Email snapshot used for ticket delivery (optional)
    pub email: Option<String>,

    /// Delivery channel (e.g. "SMS", "EMAIL", "KAKAO")
    pub send_type: String,

    /// Timestamp when the participant was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the participant was last updated
    pub updated_at: DateTimeWithTimeZone,

    /// Soft-delete marker; None means the row is live
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id"
    )]
    Event,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::ticket::Entity")]
    Ticket,
    #[sea_orm(has_many = "super::payment::Entity")]
    Payment,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ticket.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
