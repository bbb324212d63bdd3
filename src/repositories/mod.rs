//! # Repository Layer
//!
//! This module contains repository implementations that encapsulate SeaORM
//! operations for each entity, providing a typed CRUD API. Repositories are
//! generic over the connection so the same code runs against the pool or
//! against a transaction handle.

pub mod account;
pub mod event;
pub mod participant;
pub mod payment;
pub mod ticket;
pub mod ticket_send_result;
pub mod ticket_setting;
pub mod ticket_usage;
pub mod user;

pub use account::AccountRepository;
pub use event::EventRepository;
pub use participant::ParticipantRepository;
pub use payment::PaymentRepository;
pub use ticket::TicketRepository;
pub use ticket_send_result::TicketSendResultRepository;
pub use ticket_setting::TicketSettingRepository;
pub use ticket_usage::TicketUsageRepository;
pub use user::UserRepository;

use crate::error::StoreError;
use sea_orm::ColumnTrait;
use sea_orm::sea_query::SimpleExpr;

/// Hard cap applied to every list query.
pub const MAX_PAGE_SIZE: u64 = 200;

/// Limit/offset pagination window.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}

impl Page {
    pub(crate) fn clamped(self) -> Self {
        Self {
            limit: self.limit.clamp(1, MAX_PAGE_SIZE),
            offset: self.offset,
        }
    }
}

/// Sort direction for list queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl From<SortOrder> for sea_orm::Order {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => sea_orm::Order::Asc,
            SortOrder::Desc => sea_orm::Order::Desc,
        }
    }
}

/// Soft-delete visibility selector.
///
/// The client does not filter soft-deleted rows automatically; `Any` is the
/// default everywhere and callers opt in to narrowing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletedFilter {
    #[default]
    Any,
    ExcludeDeleted,
    OnlyDeleted,
}

pub(crate) fn deleted_condition<C: ColumnTrait>(
    column: C,
    filter: DeletedFilter,
) -> Option<SimpleExpr> {
    match filter {
        DeletedFilter::Any => None,
        DeletedFilter::ExcludeDeleted => Some(column.is_null()),
        DeletedFilter::OnlyDeleted => Some(column.is_not_null()),
    }
}

/// Validate an email address shape (local@domain, both parts non-empty).
pub(crate) fn validate_email(email: &str) -> Result<(), StoreError> {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(StoreError::validation_error(format!(
            "invalid email address '{email}'"
        )));
    }
    Ok(())
}

/// Validate a human-readable name field: non-empty, at most 255 characters.
pub(crate) fn validate_name(field: &str, value: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::validation_error(format!(
            "{field} cannot be empty"
        )));
    }
    if value.len() > 255 {
        return Err(StoreError::validation_error(format!(
            "{field} cannot exceed 255 characters"
        )));
    }
    Ok(())
}

/// Validate an ISO 4217 currency code: exactly three ASCII uppercase letters.
pub(crate) fn validate_currency(code: &str) -> Result<(), StoreError> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(StoreError::validation_error(format!(
            "invalid currency code '{code}'"
        )));
    }
    Ok(())
}
