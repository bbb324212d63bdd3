//! TicketUsage entity model
//!
//! Each row records one redemption of a ticket.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// TicketUsage entity representing a single redemption of a ticket
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ticket_usages")]
pub struct Model {
    /// Unique identifier for the usage (primary key)
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// Ticket that was redeemed
    pub ticket_id: Uuid,

    /// When the redemption happened
    pub used_at: DateTimeWithTimeZone,

    /// Opaque redemption metadata (gate, scanner, ...); optional
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub metadata: Option<JsonValue>,

    /// Timestamp when the usage was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the usage was last updated
    pub updated_at: DateTimeWithTimeZone,

    /// Soft-delete marker; None means the row is live
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ticket::Entity",
        from = "Column::TicketId",
        to = "super::ticket::Column::Id"
    )]
    Ticket,
}

impl Related<super::ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ticket.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
