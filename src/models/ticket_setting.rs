//! TicketSetting entity model
//!
//! Ticket settings describe the branding and reuse policy applied to the
//! tickets issued for an event. meta_data is an opaque JSON document owned
//! by the caller.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// TicketSetting entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ticket_settings")]
pub struct Model {
    /// Unique identifier for the setting (primary key)
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// Event these settings belong to
    pub event_id: Uuid,

    /// Logo image URL (optional)
    pub logo_url: Option<String>,

    /// Ticket background image URL (optional)
    pub image_url: Option<String>,

    /// Opaque caller-owned JSON metadata
    #[sea_orm(column_type = "JsonBinary")]
    pub meta_data: JsonValue,

    /// Whether tickets issued under these settings may be redeemed more
    /// than once
    pub allow_reuseable: bool,

    /// Timestamp when the setting was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the setting was last updated
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
    #[sea_orm(has_many = "super::ticket::Entity")]
    Ticket,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ticket.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
