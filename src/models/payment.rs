//! Payment entity model
//!
//! This module contains the SeaORM entity model for the payments table plus
//! the [`PaymentStatus`] enum. Amounts are exact decimals; currency is an
//! ISO 4217 code.

use rust_decimal::Decimal;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a payment, stored as text
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "FAILED")]
    Failed,
    #[sea_orm(string_value = "REFUNDED")]
    Refunded,
}

/// Payment entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment (primary key)
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// Event the payment is for
    pub event_id: Uuid,

    /// Participant the payment is attributed to
    pub participant_id: Uuid,

    /// Amount charged
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount: Decimal,

    /// ISO 4217 currency code
    pub currency: String,

    /// Lifecycle state
    pub status: PaymentStatus,

    /// When the payment completed, if it has
    pub paid_at: Option<DateTimeWithTimeZone>,

    /// When the payment flow was started
    pub initiated_at: DateTimeWithTimeZone,

    /// Timestamp when the payment was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the payment was last updated
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
        belongs_to = "super::participant::Entity",
        from = "Column::ParticipantId",
        to = "super::participant::Column::Id"
    )]
    Participant,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::participant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
