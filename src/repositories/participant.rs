//! # Participant Repository
//!
//! Repository for event invitations. Contact details are snapshotted on the
//! participant row so ticket delivery keeps working even after the user
//! edits their profile.

use crate::error::StoreError;
use crate::models::participant::{
    ActiveModel as ParticipantActiveModel, Column, Entity as Participant,
    Model as ParticipantModel,
};
use crate::repositories::{
    DeletedFilter, Page, SortOrder, deleted_condition, validate_email, validate_name,
};
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

/// Request data for inviting a user to an event
#[derive(Debug, Clone)]
pub struct CreateParticipantRequest {
    pub id: Option<Uuid>,
    pub event_id: Uuid,
    pub user_id: Uuid,
    /// Invitation timestamp; defaults to now
    pub invited_at: Option<DateTimeWithTimeZone>,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub send_type: String,
}

/// Request data for updating a participant's delivery snapshot
#[derive(Debug, Clone, Default)]
pub struct UpdateParticipantRequest {
    pub name: Option<String>,
    pub phone: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub send_type: Option<String>,
}

/// Filter predicates for listing participants
#[derive(Debug, Clone, Default)]
pub struct ParticipantFilter {
    pub event_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub send_type: Option<String>,
    pub deleted: DeletedFilter,
}

/// Repository for Participant database operations
pub struct ParticipantRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> ParticipantRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Invite a user to an event
    pub async fn create(
        &self,
        request: CreateParticipantRequest,
    ) -> Result<ParticipantModel, StoreError> {
        validate_name("participant name", &request.name)?;
        if request.send_type.trim().is_empty() {
            return Err(StoreError::validation_error("send_type cannot be empty"));
        }
        if let Some(ref email) = request.email {
            validate_email(email)?;
        }

        let id = request.id.unwrap_or_else(Uuid::new_v4);
        let now = Utc::now();
        let participant = ParticipantActiveModel {
            id: Set(id),
            event_id: Set(request.event_id),
            user_id: Set(request.user_id),
            invited_at: Set(request.invited_at.unwrap_or_else(|| now.into())),
            name: Set(request.name),
            phone: Set(request.phone),
            email: Set(request.email),
            send_type: Set(request.send_type),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        };

        // uuid keys cannot ride sqlite's last_insert_rowid readback
        Participant::insert(participant)
            .exec_without_returning(self.db)
            .await
            .map_err(StoreError::database_error)?;

        self.get_by_id(id).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ParticipantModel>, StoreError> {
        Participant::find_by_id(id)
            .one(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ParticipantModel, StoreError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound("Participant".to_string()))
    }

    /// List participants matching the filter, ordered by invitation time
    pub async fn find_many(
        &self,
        filter: &ParticipantFilter,
        order: SortOrder,
        page: Page,
    ) -> Result<Vec<ParticipantModel>, StoreError> {
        let page = page.clamped();

        self.apply_filter(Participant::find(), filter)
            .order_by(Column::InvitedAt, order.into())
            .offset(page.offset)
            .limit(page.limit)
            .all(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    pub async fn count(&self, filter: &ParticipantFilter) -> Result<u64, StoreError> {
        self.apply_filter(Participant::find(), filter)
            .count(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    /// Update a participant, touching only the provided fields
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateParticipantRequest,
    ) -> Result<ParticipantModel, StoreError> {
        if let Some(ref name) = request.name {
            validate_name("participant name", name)?;
        }
        if let Some(ref send_type) = request.send_type {
            if send_type.trim().is_empty() {
                return Err(StoreError::validation_error("send_type cannot be empty"));
            }
        }
        if let Some(Some(ref email)) = request.email {
            validate_email(email)?;
        }

        let participant = self.get_by_id(id).await?;
        let mut active = participant.into_active_model();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(phone) = request.phone {
            active.phone = Set(phone);
        }
        if let Some(email) = request.email {
            active.email = Set(email);
        }
        if let Some(send_type) = request.send_type {
            active.send_type = Set(send_type);
        }
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    /// Hard-delete a participant; fails while tickets or payments reference it
    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let participant = self.get_by_id(id).await?;

        participant
            .delete(self.db)
            .await
            .map_err(StoreError::database_error)?;

        Ok(())
    }

    /// Mark a participant deleted by setting deleted_at; idempotent
    pub async fn soft_delete(&self, id: Uuid) -> Result<ParticipantModel, StoreError> {
        let participant = self.get_by_id(id).await?;
        if participant.deleted_at.is_some() {
            return Ok(participant);
        }

        let mut active = participant.into_active_model();
        active.deleted_at = Set(Some(Utc::now().into()));
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    fn apply_filter(
        &self,
        mut query: Select<Participant>,
        filter: &ParticipantFilter,
    ) -> Select<Participant> {
        if let Some(event_id) = filter.event_id {
            query = query.filter(Column::EventId.eq(event_id));
        }
        if let Some(user_id) = filter.user_id {
            query = query.filter(Column::UserId.eq(user_id));
        }
        if let Some(ref send_type) = filter.send_type {
            query = query.filter(Column::SendType.eq(send_type));
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
    use crate::repositories::user::{CreateUserRequest, UserRepository};
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, DatabaseConnection};

    async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn seed_event(db: &DatabaseConnection) -> (Uuid, Uuid) {
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

        (event.id, user.id)
    }

    fn invite(event_id: Uuid, user_id: Uuid) -> CreateParticipantRequest {
        CreateParticipantRequest {
            id: None,
            event_id,
            user_id,
            invited_at: None,
            name: "Ann".to_string(),
            phone: Some("+82-10-0000-0001".to_string()),
            email: Some("ann@x.com".to_string()),
            send_type: "SMS".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_defaults_invited_at() {
        let db = setup_test_db().await;
        let (event_id, user_id) = seed_event(&db).await;
        let repo = ParticipantRepository::new(&db);

        let created = repo.create(invite(event_id, user_id)).await.unwrap();
        assert_eq!(created.invited_at, created.created_at);
        assert_eq!(created.send_type, "SMS");
    }

    #[tokio::test]
    async fn test_email_shape_is_checked_before_sql() {
        let db = setup_test_db().await;
        let (event_id, user_id) = seed_event(&db).await;
        let repo = ParticipantRepository::new(&db);

        let err = repo
            .create(CreateParticipantRequest {
                email: Some("not-an-email".to_string()),
                ..invite(event_id, user_id)
            })
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");

        let created = repo.create(invite(event_id, user_id)).await.unwrap();
        let err = repo
            .update(
                created.id,
                UpdateParticipantRequest {
                    email: Some(Some("still-not-an-email".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        // Clearing the email is still allowed
        let cleared = repo
            .update(
                created.id,
                UpdateParticipantRequest {
                    email: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.email, None);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_event() {
        let db = setup_test_db().await;
        let (_, user_id) = seed_event(&db).await;
        let repo = ParticipantRepository::new(&db);

        let err = repo
            .create(invite(Uuid::new_v4(), user_id))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_snapshot_fields() {
        let db = setup_test_db().await;
        let (event_id, user_id) = seed_event(&db).await;
        let repo = ParticipantRepository::new(&db);

        let created = repo.create(invite(event_id, user_id)).await.unwrap();
        let updated = repo
            .update(
                created.id,
                UpdateParticipantRequest {
                    send_type: Some("EMAIL".to_string()),
                    phone: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.send_type, "EMAIL");
        assert_eq!(updated.phone, None);
        assert_eq!(updated.name, created.name);
    }

    #[tokio::test]
    async fn test_find_many_by_event_and_send_type() {
        let db = setup_test_db().await;
        let (event_id, user_id) = seed_event(&db).await;
        let repo = ParticipantRepository::new(&db);

        repo.create(invite(event_id, user_id)).await.unwrap();
        repo.create(CreateParticipantRequest {
            send_type: "EMAIL".to_string(),
            ..invite(event_id, user_id)
        })
        .await
        .unwrap();

        let filter = ParticipantFilter {
            event_id: Some(event_id),
            send_type: Some("EMAIL".to_string()),
            ..Default::default()
        };
        let rows = repo
            .find_many(&filter, SortOrder::Asc, Page::default())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(repo.count(&filter).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_soft_delete_then_hard_delete() {
        let db = setup_test_db().await;
        let (event_id, user_id) = seed_event(&db).await;
        let repo = ParticipantRepository::new(&db);

        let created = repo.create(invite(event_id, user_id)).await.unwrap();

        let softened = repo.soft_delete(created.id).await.unwrap();
        assert!(softened.deleted_at.is_some());

        let only_deleted = repo
            .find_many(
                &ParticipantFilter {
                    deleted: DeletedFilter::OnlyDeleted,
                    ..Default::default()
                },
                SortOrder::Asc,
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(only_deleted.len(), 1);

        repo.delete(created.id).await.unwrap();
        assert!(repo.find_by_id(created.id).await.unwrap().is_none());
    }
}
