//! # Payment Repository
//!
//! Repository for payments, including the amount aggregates (count, sum,
//! avg, min, max) and the per-status count used by reporting.

use crate::error::StoreError;
use crate::models::payment::{
    ActiveModel as PaymentActiveModel, Column, Entity as Payment, Model as PaymentModel,
    PaymentStatus,
};
use crate::repositories::{DeletedFilter, Page, SortOrder, deleted_condition, validate_currency};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, IntoActiveModel,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

/// Request data for creating a payment
#[derive(Debug, Clone)]
pub struct CreatePaymentRequest {
    pub id: Option<Uuid>,
    pub event_id: Uuid,
    pub participant_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentStatus,
    pub paid_at: Option<DateTimeWithTimeZone>,
    /// Flow start timestamp; defaults to now
    pub initiated_at: Option<DateTimeWithTimeZone>,
}

/// Request data for updating a payment
#[derive(Debug, Clone, Default)]
pub struct UpdatePaymentRequest {
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub status: Option<PaymentStatus>,
    pub paid_at: Option<Option<DateTimeWithTimeZone>>,
}

/// Filter predicates for listing payments
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub event_id: Option<Uuid>,
    pub participant_id: Option<Uuid>,
    pub status: Option<PaymentStatus>,
    pub currency: Option<String>,
    pub deleted: DeletedFilter,
}

/// Sortable columns for payment listings
#[derive(Debug, Clone, Copy, Default)]
pub enum PaymentSortField {
    #[default]
    InitiatedAt,
    Amount,
    PaidAt,
}

/// Sort specification for payment listings
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentSort {
    pub field: PaymentSortField,
    pub direction: SortOrder,
}

/// Amount aggregates over a payment selection
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct PaymentAggregates {
    pub count: i64,
    pub sum: Option<Decimal>,
    pub avg: Option<Decimal>,
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

/// One row of the per-status payment count aggregate
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct PaymentStatusCount {
    pub status: PaymentStatus,
    pub count: i64,
}

/// Repository for Payment database operations
pub struct PaymentRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> PaymentRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Create a payment
    pub async fn create(&self, request: CreatePaymentRequest) -> Result<PaymentModel, StoreError> {
        validate_currency(&request.currency)?;
        if request.amount < Decimal::ZERO {
            return Err(StoreError::validation_error("amount cannot be negative"));
        }

        let id = request.id.unwrap_or_else(Uuid::new_v4);
        let now = Utc::now();
        let payment = PaymentActiveModel {
            id: Set(id),
            event_id: Set(request.event_id),
            participant_id: Set(request.participant_id),
            amount: Set(request.amount),
            currency: Set(request.currency),
            status: Set(request.status),
            paid_at: Set(request.paid_at),
            initiated_at: Set(request.initiated_at.unwrap_or_else(|| now.into())),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        };

        // uuid keys cannot ride sqlite's last_insert_rowid readback
        Payment::insert(payment)
            .exec_without_returning(self.db)
            .await
            .map_err(StoreError::database_error)?;

        self.get_by_id(id).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PaymentModel>, StoreError> {
        Payment::find_by_id(id)
            .one(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<PaymentModel, StoreError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound("Payment".to_string()))
    }

    /// List payments matching the filter with sorting and pagination
    pub async fn find_many(
        &self,
        filter: &PaymentFilter,
        sort: PaymentSort,
        page: Page,
    ) -> Result<Vec<PaymentModel>, StoreError> {
        let page = page.clamped();
        let column = match sort.field {
            PaymentSortField::InitiatedAt => Column::InitiatedAt,
            PaymentSortField::Amount => Column::Amount,
            PaymentSortField::PaidAt => Column::PaidAt,
        };

        self.apply_filter(Payment::find(), filter)
            .order_by(column, sort.direction.into())
            .offset(page.offset)
            .limit(page.limit)
            .all(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    pub async fn count(&self, filter: &PaymentFilter) -> Result<u64, StoreError> {
        self.apply_filter(Payment::find(), filter)
            .count(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    /// Compute count/sum/avg/min/max over the amounts selected by the filter.
    /// All amount aggregates are None when no row matches.
    pub async fn aggregate_amounts(
        &self,
        filter: &PaymentFilter,
    ) -> Result<PaymentAggregates, StoreError> {
        let aggregates = self
            .apply_filter(Payment::find(), filter)
            .select_only()
            .column_as(Column::Id.count(), "count")
            .column_as(Column::Amount.sum(), "sum")
            .column_as(
                SimpleExpr::from(Func::avg(Expr::col(Column::Amount))),
                "avg",
            )
            .column_as(Column::Amount.min(), "min")
            .column_as(Column::Amount.max(), "max")
            .into_model::<PaymentAggregates>()
            .one(self.db)
            .await
            .map_err(StoreError::database_error)?;

        aggregates.ok_or_else(|| {
            StoreError::Internal("aggregate query returned no row".to_string())
        })
    }

    /// Count payments grouped by status, restricted by the filter
    pub async fn group_by_status(
        &self,
        filter: &PaymentFilter,
    ) -> Result<Vec<PaymentStatusCount>, StoreError> {
        self.apply_filter(Payment::find(), filter)
            .select_only()
            .column(Column::Status)
            .column_as(Column::Id.count(), "count")
            .group_by(Column::Status)
            .into_model::<PaymentStatusCount>()
            .all(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    /// Update a payment, touching only the provided fields
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdatePaymentRequest,
    ) -> Result<PaymentModel, StoreError> {
        if let Some(ref currency) = request.currency {
            validate_currency(currency)?;
        }
        if let Some(amount) = request.amount {
            if amount < Decimal::ZERO {
                return Err(StoreError::validation_error("amount cannot be negative"));
            }
        }

        let payment = self.get_by_id(id).await?;
        let mut active = payment.into_active_model();
        if let Some(amount) = request.amount {
            active.amount = Set(amount);
        }
        if let Some(currency) = request.currency {
            active.currency = Set(currency);
        }
        if let Some(status) = request.status {
            active.status = Set(status);
        }
        if let Some(paid_at) = request.paid_at {
            active.paid_at = Set(paid_at);
        }
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    /// Transition a payment to Completed, stamping paid_at
    pub async fn mark_completed(&self, id: Uuid) -> Result<PaymentModel, StoreError> {
        self.update(
            id,
            UpdatePaymentRequest {
                status: Some(PaymentStatus::Completed),
                paid_at: Some(Some(Utc::now().into())),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let payment = self.get_by_id(id).await?;

        payment
            .delete(self.db)
            .await
            .map_err(StoreError::database_error)?;

        Ok(())
    }

    /// Mark a payment deleted by setting deleted_at; idempotent
    pub async fn soft_delete(&self, id: Uuid) -> Result<PaymentModel, StoreError> {
        let payment = self.get_by_id(id).await?;
        if payment.deleted_at.is_some() {
            return Ok(payment);
        }

        let mut active = payment.into_active_model();
        active.deleted_at = Set(Some(Utc::now().into()));
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    fn apply_filter(&self, mut query: Select<Payment>, filter: &PaymentFilter) -> Select<Payment> {
        if let Some(event_id) = filter.event_id {
            query = query.filter(Column::EventId.eq(event_id));
        }
        if let Some(participant_id) = filter.participant_id {
            query = query.filter(Column::ParticipantId.eq(participant_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(Column::Status.eq(status));
        }
        if let Some(ref currency) = filter.currency {
            query = query.filter(Column::Currency.eq(currency));
        }
        if let Some(condition) = deleted_condition(Column::DeletedAt, filter.deleted) {
            query = query.filter(condition);
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::EventType;
    use crate::repositories::event::{CreateEventRequest, EventRepository};
    use crate::repositories::participant::{CreateParticipantRequest, ParticipantRepository};
    use crate::repositories::user::{CreateUserRequest, UserRepository};
    use migration::{Migrator, MigratorTrait};
    use rust_decimal_macros::dec;
    use sea_orm::{Database, DatabaseConnection};

    async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn seed_participant(db: &DatabaseConnection) -> (Uuid, Uuid) {
        let user = UserRepository::new(db)
            .create(CreateUserRequest {
                id: None,
                name: "Ann".to_string(),
                email: "ann@x.com".to_string(),
                phone: None,
                image: None,
            })
            .await
            .unwrap();

        let event = EventRepository::new(db)
            .create(CreateEventRequest {
                id: None,
                name: "Launch Party".to_string(),
                description: "".to_string(),
                event_type: EventType::OneTime,
                max_ticket_count: 10,
                creator_id: user.id,
            })
            .await
            .unwrap();

        let participant = ParticipantRepository::new(db)
            .create(CreateParticipantRequest {
                id: None,
                event_id: event.id,
                user_id: user.id,
                invited_at: None,
                name: "Ann".to_string(),
                phone: None,
                email: Some("ann@x.com".to_string()),
                send_type: "EMAIL".to_string(),
            })
            .await
            .unwrap();

        (event.id, participant.id)
    }

    fn pay(event_id: Uuid, participant_id: Uuid, amount: Decimal) -> CreatePaymentRequest {
        CreatePaymentRequest {
            id: None,
            event_id,
            participant_id,
            amount,
            currency: "KRW".to_string(),
            status: PaymentStatus::Pending,
            paid_at: None,
            initiated_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_validation() {
        let db = setup_test_db().await;
        let (event_id, participant_id) = seed_participant(&db).await;
        let repo = PaymentRepository::new(&db);

        let err = repo
            .create(CreatePaymentRequest {
                currency: "krw".to_string(),
                ..pay(event_id, participant_id, dec!(10.00))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let err = repo
            .create(pay(event_id, participant_id, dec!(-1.00)))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn test_mark_completed() {
        let db = setup_test_db().await;
        let (event_id, participant_id) = seed_participant(&db).await;
        let repo = PaymentRepository::new(&db);

        let created = repo
            .create(pay(event_id, participant_id, dec!(10.00)))
            .await
            .unwrap();
        assert_eq!(created.status, PaymentStatus::Pending);
        assert!(created.paid_at.is_none());

        let completed = repo.mark_completed(created.id).await.unwrap();
        assert_eq!(completed.status, PaymentStatus::Completed);
        assert!(completed.paid_at.is_some());
    }

    #[tokio::test]
    async fn test_aggregate_amounts() {
        let db = setup_test_db().await;
        let (event_id, participant_id) = seed_participant(&db).await;
        let repo = PaymentRepository::new(&db);

        // Dyadic amounts survive the sqlite REAL round trip exactly
        for amount in [dec!(10.00), dec!(2.50), dec!(0.25), dec!(7.25)] {
            repo.create(pay(event_id, participant_id, amount))
                .await
                .unwrap();
        }

        let agg = repo
            .aggregate_amounts(&PaymentFilter::default())
            .await
            .unwrap();
        assert_eq!(agg.count, 4);
        assert_eq!(agg.sum, Some(dec!(20.00)));
        assert_eq!(agg.avg, Some(dec!(5.00)));
        assert_eq!(agg.min, Some(dec!(0.25)));
        assert_eq!(agg.max, Some(dec!(10.00)));
    }

    #[tokio::test]
    async fn test_aggregate_amounts_empty_selection() {
        let db = setup_test_db().await;
        seed_participant(&db).await;
        let repo = PaymentRepository::new(&db);

        let agg = repo
            .aggregate_amounts(&PaymentFilter::default())
            .await
            .unwrap();
        assert_eq!(agg.count, 0);
        assert_eq!(agg.sum, None);
        assert_eq!(agg.min, None);
    }

    #[tokio::test]
    async fn test_group_by_status() {
        let db = setup_test_db().await;
        let (event_id, participant_id) = seed_participant(&db).await;
        let repo = PaymentRepository::new(&db);

        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Completed,
            PaymentStatus::Completed,
        ] {
            repo.create(CreatePaymentRequest {
                status,
                ..pay(event_id, participant_id, dec!(1.00))
            })
            .await
            .unwrap();
        }

        let mut counts = repo
            .group_by_status(&PaymentFilter::default())
            .await
            .unwrap();
        counts.sort_by_key(|c| c.count);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].status, PaymentStatus::Pending);
        assert_eq!(counts[0].count, 1);
        assert_eq!(counts[1].status, PaymentStatus::Completed);
        assert_eq!(counts[1].count, 2);
    }

    #[tokio::test]
    async fn test_filter_scoping() {
        let db = setup_test_db().await;
        let (event_id, participant_id) = seed_participant(&db).await;
        let repo = PaymentRepository::new(&db);

        repo.create(pay(event_id, participant_id, dec!(3.00)))
            .await
            .unwrap();
        repo.create(CreatePaymentRequest {
            status: PaymentStatus::Failed,
            ..pay(event_id, participant_id, dec!(4.00))
        })
        .await
        .unwrap();

        let filter = PaymentFilter {
            event_id: Some(event_id),
            status: Some(PaymentStatus::Failed),
            ..Default::default()
        };
        let rows = repo
            .find_many(&filter, PaymentSort::default(), Page::default())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, dec!(4.00));
        assert_eq!(repo.count(&filter).await.unwrap(), 1);
    }
}
