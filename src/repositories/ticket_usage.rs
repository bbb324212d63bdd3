//! # TicketUsage Repository
//!
//! Repository for ticket redemptions. A usage is an append-mostly record;
//! only the metadata document can be amended after the fact.

use crate::error::StoreError;
use crate::models::ticket_usage::{
    ActiveModel as TicketUsageActiveModel, Column, Entity as TicketUsage,
    Model as TicketUsageModel,
};
use crate::repositories::{DeletedFilter, Page, SortOrder, deleted_condition};
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Request data for recording a redemption
#[derive(Debug, Clone)]
pub struct CreateTicketUsageRequest {
    pub id: Option<Uuid>,
    pub ticket_id: Uuid,
    /// Redemption timestamp; defaults to now
    pub used_at: Option<DateTimeWithTimeZone>,
    pub metadata: Option<JsonValue>,
}

/// Request data for amending a redemption record
#[derive(Debug, Clone, Default)]
pub struct UpdateTicketUsageRequest {
    pub metadata: Option<Option<JsonValue>>,
}

/// Filter predicates for listing redemptions
#[derive(Debug, Clone, Default)]
pub struct TicketUsageFilter {
    pub ticket_id: Option<Uuid>,
    pub used_after: Option<DateTimeWithTimeZone>,
    pub used_before: Option<DateTimeWithTimeZone>,
    pub deleted: DeletedFilter,
}

/// Repository for TicketUsage database operations
pub struct TicketUsageRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> TicketUsageRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Record a redemption of a ticket
    pub async fn create(
        &self,
        request: CreateTicketUsageRequest,
    ) -> Result<TicketUsageModel, StoreError> {
        let id = request.id.unwrap_or_else(Uuid::new_v4);
        let now = Utc::now();
        let usage = TicketUsageActiveModel {
            id: Set(id),
            ticket_id: Set(request.ticket_id),
            used_at: Set(request.used_at.unwrap_or_else(|| now.into())),
            metadata: Set(request.metadata),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        };

        // uuid keys cannot ride sqlite's last_insert_rowid readback
        TicketUsage::insert(usage)
            .exec_without_returning(self.db)
            .await
            .map_err(StoreError::database_error)?;

        self.get_by_id(id).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TicketUsageModel>, StoreError> {
        TicketUsage::find_by_id(id)
            .one(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<TicketUsageModel, StoreError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound("TicketUsage".to_string()))
    }

    /// List redemptions matching the filter, ordered by redemption time
    pub async fn find_many(
        &self,
        filter: &TicketUsageFilter,
        order: SortOrder,
        page: Page,
    ) -> Result<Vec<TicketUsageModel>, StoreError> {
        let page = page.clamped();

        self.apply_filter(TicketUsage::find(), filter)
            .order_by(Column::UsedAt, order.into())
            .offset(page.offset)
            .limit(page.limit)
            .all(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    pub async fn count(&self, filter: &TicketUsageFilter) -> Result<u64, StoreError> {
        self.apply_filter(TicketUsage::find(), filter)
            .count(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    /// Amend the metadata on a redemption record
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateTicketUsageRequest,
    ) -> Result<TicketUsageModel, StoreError> {
        let usage = self.get_by_id(id).await?;
        let mut active = usage.into_active_model();
        if let Some(metadata) = request.metadata {
            active.metadata = Set(metadata);
        }
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let usage = self.get_by_id(id).await?;

        usage
            .delete(self.db)
            .await
            .map_err(StoreError::database_error)?;

        Ok(())
    }

    /// Mark a redemption record deleted by setting deleted_at; idempotent
    pub async fn soft_delete(&self, id: Uuid) -> Result<TicketUsageModel, StoreError> {
        let usage = self.get_by_id(id).await?;
        if usage.deleted_at.is_some() {
            return Ok(usage);
        }

        let mut active = usage.into_active_model();
        active.deleted_at = Set(Some(Utc::now().into()));
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    fn apply_filter(
        &self,
        mut query: Select<TicketUsage>,
        filter: &TicketUsageFilter,
    ) -> Select<TicketUsage> {
        if let Some(ticket_id) = filter.ticket_id {
            query = query.filter(Column::TicketId.eq(ticket_id));
        }
        if let Some(used_after) = filter.used_after {
            query = query.filter(Column::UsedAt.gte(used_after));
        }
        if let Some(used_before) = filter.used_before {
            query = query.filter(Column::UsedAt.lt(used_before));
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
    use crate::repositories::ticket::{CreateTicketRequest, TicketRepository};
    use crate::repositories::ticket_setting::{
        CreateTicketSettingRequest, TicketSettingRepository,
    };
    use crate::repositories::user::{CreateUserRequest, UserRepository};
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, DatabaseConnection};
    use serde_json::json;

    async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn seed_ticket(db: &DatabaseConnection) -> Uuid {
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

        let setting = TicketSettingRepository::new(db)
            .create(CreateTicketSettingRequest {
                id: None,
                event_id: event.id,
                logo_url: None,
                image_url: None,
                meta_data: None,
                allow_reuseable: true,
            })
            .await
            .unwrap();

        TicketRepository::new(db)
            .create(CreateTicketRequest {
                id: None,
                participant_id: participant.id,
                ticket_setting_id: setting.id,
                sent_at: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_record_and_list_redemptions() {
        let db = setup_test_db().await;
        let ticket_id = seed_ticket(&db).await;
        let repo = TicketUsageRepository::new(&db);

        repo.create(CreateTicketUsageRequest {
            id: None,
            ticket_id,
            used_at: None,
            metadata: Some(json!({"gate": "A"})),
        })
        .await
        .unwrap();
        repo.create(CreateTicketUsageRequest {
            id: None,
            ticket_id,
            used_at: None,
            metadata: None,
        })
        .await
        .unwrap();

        let filter = TicketUsageFilter {
            ticket_id: Some(ticket_id),
            ..Default::default()
        };
        let usages = repo
            .find_many(&filter, SortOrder::Asc, Page::default())
            .await
            .unwrap();
        assert_eq!(usages.len(), 2);
        assert_eq!(usages[0].metadata, Some(json!({"gate": "A"})));
        assert_eq!(repo.count(&filter).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_amend_metadata() {
        let db = setup_test_db().await;
        let ticket_id = seed_ticket(&db).await;
        let repo = TicketUsageRepository::new(&db);

        let usage = repo
            .create(CreateTicketUsageRequest {
                id: None,
                ticket_id,
                used_at: None,
                metadata: Some(json!({"gate": "A"})),
            })
            .await
            .unwrap();

        let amended = repo
            .update(
                usage.id,
                UpdateTicketUsageRequest {
                    metadata: Some(Some(json!({"gate": "B", "scanner": 3}))),
                },
            )
            .await
            .unwrap();
        assert_eq!(amended.metadata, Some(json!({"gate": "B", "scanner": 3})));

        let cleared = repo
            .update(
                usage.id,
                UpdateTicketUsageRequest {
                    metadata: Some(None),
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.metadata, None);
    }

    #[tokio::test]
    async fn test_unknown_ticket_is_fk_violation() {
        let db = setup_test_db().await;
        seed_ticket(&db).await;
        let repo = TicketUsageRepository::new(&db);

        let err = repo
            .create(CreateTicketUsageRequest {
                id: None,
                ticket_id: Uuid::new_v4(),
                used_at: None,
                metadata: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation { .. }));
    }
}
