//! TicketSendResult entity model
//!
//! Zero-or-one per ticket (unique ticket_id), recording the delivery
//! outcome and a snapshot of the contact details used.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// TicketSendResult entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ticket_send_results")]
pub struct Model {
    /// Unique identifier for the send result (primary key)
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// Ticket this result belongs to (unique)
    pub ticket_id: Uuid,

    /// Delivery status reported by the sending channel
    pub status: String,

    /// Recipient name snapshot
    pub name: String,

    /// Recipient phone snapshot (optional)
    pub phone: Option<String>,

    /// Recipient email snapshot (optional)
    pub email: Option<String>,

    /// Delivery channel used (e.g. "SMS", "EMAIL", "KAKAO")
    pub send_type: String,

    /// Timestamp when the result was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the result was last updated
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
