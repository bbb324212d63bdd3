//! Ticket entity model
//!
//! A ticket is issued to a participant under a ticket setting. It has at
//! most one send result, any number of usages, and a many-to-many holder
//! relation to users through the ticket_users join entity.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ticket entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tickets")]
pub struct Model {
    /// Unique identifier for the ticket (primary key)
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// Participant the ticket was issued to
    pub participant_id: Uuid,

    /// Settings the ticket was issued under
    pub ticket_setting_id: Uuid,

    /// When the ticket was sent, if it has been
    pub sent_at: Option<DateTimeWithTimeZone>,

    /// Timestamp when the ticket was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the ticket was last updated
    pub updated_at: DateTimeWithTimeZone,

    /// Soft-delete marker; None means the row is live
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::participant::Entity",
        from = "Column::ParticipantId",
        to = "super::participant::Column::Id"
    )]
    Participant,
    #[sea_orm(
        belongs_to = "super::ticket_setting::Entity",
        from = "Column::TicketSettingId",
        to = "super::ticket_setting::Column::Id"
    )]
    TicketSetting,
    #[sea_orm(has_many = "super::ticket_usage::Entity")]
    TicketUsage,
    #[sea_orm(has_one = "super::ticket_send_result::Entity")]
    TicketSendResult,
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

impl Related<super::ticket_usage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TicketUsage.def()
    }
}

impl Related<super::ticket_send_result::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TicketSendResult.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
