//! # Ticket Repository
//!
//! Repository for issued tickets, the holder set managed through the
//! ticket_users join table, and convenience loaders for a ticket's usages
//! and send result.

use crate::error::StoreError;
use crate::models::ticket::{
    ActiveModel as TicketActiveModel, Column, Entity as Ticket, Model as TicketModel,
};
use crate::models::ticket_send_result::{
    Entity as TicketSendResult, Model as TicketSendResultModel,
};
use crate::models::ticket_usage::{
    Column as TicketUsageColumn, Entity as TicketUsage, Model as TicketUsageModel,
};
use crate::models::ticket_user::{
    ActiveModel as TicketUserActiveModel, Column as TicketUserColumn, Entity as TicketUser,
};
use crate::models::user::{Entity as User, Model as UserModel};
use crate::repositories::{DeletedFilter, Page, SortOrder, deleted_condition};
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

/// Request data for issuing a new ticket
#[derive(Debug, Clone)]
pub struct CreateTicketRequest {
    pub id: Option<Uuid>,
    pub participant_id: Uuid,
    pub ticket_setting_id: Uuid,
    pub sent_at: Option<DateTimeWithTimeZone>,
}

/// Request data for updating a ticket
#[derive(Debug, Clone, Default)]
pub struct UpdateTicketRequest {
    pub ticket_setting_id: Option<Uuid>,
    pub sent_at: Option<Option<DateTimeWithTimeZone>>,
}

/// Filter predicates for listing tickets
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub participant_id: Option<Uuid>,
    pub ticket_setting_id: Option<Uuid>,
    /// Some(true) keeps only sent tickets, Some(false) only unsent
    pub sent: Option<bool>,
    pub deleted: DeletedFilter,
}

/// Ticket with its usages and optional send result loaded
#[derive(Debug, Clone)]
pub struct TicketWithDetails {
    pub ticket: TicketModel,
    pub usages: Vec<TicketUsageModel>,
    pub send_result: Option<TicketSendResultModel>,
}

/// Repository for Ticket database operations
pub struct TicketRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> TicketRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Issue a new ticket to a participant
    pub async fn create(&self, request: CreateTicketRequest) -> Result<TicketModel, StoreError> {
        let id = request.id.unwrap_or_else(Uuid::new_v4);
        let now = Utc::now();
        let ticket = TicketActiveModel {
            id: Set(id),
            participant_id: Set(request.participant_id),
            ticket_setting_id: Set(request.ticket_setting_id),
            sent_at: Set(request.sent_at),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        };

        // uuid keys cannot ride sqlite's last_insert_rowid readback
        Ticket::insert(ticket)
            .exec_without_returning(self.db)
            .await
            .map_err(StoreError::database_error)?;

        self.get_by_id(id).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TicketModel>, StoreError> {
        Ticket::find_by_id(id)
            .one(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<TicketModel, StoreError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound("Ticket".to_string()))
    }

    /// Load a ticket together with its usages and send result
    pub async fn get_with_details(&self, id: Uuid) -> Result<TicketWithDetails, StoreError> {
        let ticket = self.get_by_id(id).await?;

        let usages = TicketUsage::find()
            .filter(TicketUsageColumn::TicketId.eq(id))
            .order_by_asc(TicketUsageColumn::UsedAt)
            .all(self.db)
            .await
            .map_err(StoreError::database_error)?;

        let send_result = ticket
            .find_related(TicketSendResult)
            .one(self.db)
            .await
            .map_err(StoreError::database_error)?;

        Ok(TicketWithDetails {
            ticket,
            usages,
            send_result,
        })
    }

    /// List tickets matching the filter
    pub async fn find_many(
        &self,
        filter: &TicketFilter,
        order: SortOrder,
        page: Page,
    ) -> Result<Vec<TicketModel>, StoreError> {
        let page = page.clamped();

        self.apply_filter(Ticket::find(), filter)
            .order_by(Column::CreatedAt, order.into())
            .offset(page.offset)
            .limit(page.limit)
            .all(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    pub async fn count(&self, filter: &TicketFilter) -> Result<u64, StoreError> {
        self.apply_filter(Ticket::find(), filter)
            .count(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    /// Update a ticket, touching only the provided fields
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateTicketRequest,
    ) -> Result<TicketModel, StoreError> {
        let ticket = self.get_by_id(id).await?;
        let mut active = ticket.into_active_model();
        if let Some(ticket_setting_id) = request.ticket_setting_id {
            active.ticket_setting_id = Set(ticket_setting_id);
        }
        if let Some(sent_at) = request.sent_at {
            active.sent_at = Set(sent_at);
        }
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    /// Stamp a ticket as sent now
    pub async fn mark_sent(&self, id: Uuid) -> Result<TicketModel, StoreError> {
        self.update(
            id,
            UpdateTicketRequest {
                sent_at: Some(Some(Utc::now().into())),
                ..Default::default()
            },
        )
        .await
    }

    /// Hard-delete a ticket; fails while usages or a send result reference it
    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let ticket = self.get_by_id(id).await?;

        ticket
            .delete(self.db)
            .await
            .map_err(StoreError::database_error)?;

        Ok(())
    }

    /// Mark a ticket deleted by setting deleted_at; idempotent
    pub async fn soft_delete(&self, id: Uuid) -> Result<TicketModel, StoreError> {
        let ticket = self.get_by_id(id).await?;
        if ticket.deleted_at.is_some() {
            return Ok(ticket);
        }

        let mut active = ticket.into_active_model();
        active.deleted_at = Set(Some(Utc::now().into()));
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    /// Make a user a holder of a ticket; already-held is a no-op
    pub async fn assign_user(&self, ticket_id: Uuid, user_id: Uuid) -> Result<(), StoreError> {
        let existing = TicketUser::find_by_id((ticket_id, user_id))
            .one(self.db)
            .await
            .map_err(StoreError::database_error)?;
        if existing.is_some() {
            return Ok(());
        }

        let row = TicketUserActiveModel {
            ticket_id: Set(ticket_id),
            user_id: Set(user_id),
            created_at: Set(Utc::now().into()),
        };

        TicketUser::insert(row)
            .exec_without_returning(self.db)
            .await
            .map_err(StoreError::database_error)?;

        Ok(())
    }

    /// Remove a user from a ticket's holder set; missing link is NotFound
    pub async fn unassign_user(&self, ticket_id: Uuid, user_id: Uuid) -> Result<(), StoreError> {
        let row = TicketUser::find_by_id((ticket_id, user_id))
            .one(self.db)
            .await
            .map_err(StoreError::database_error)?
            .ok_or_else(|| StoreError::NotFound("TicketUser".to_string()))?;

        row.delete(self.db)
            .await
            .map_err(StoreError::database_error)?;

        Ok(())
    }

    /// List the users holding a ticket
    pub async fn list_holders(&self, ticket_id: Uuid) -> Result<Vec<UserModel>, StoreError> {
        let rows = TicketUser::find()
            .filter(TicketUserColumn::TicketId.eq(ticket_id))
            .find_also_related(User)
            .all(self.db)
            .await
            .map_err(StoreError::database_error)?;

        Ok(rows.into_iter().filter_map(|(_, user)| user).collect())
    }

    fn apply_filter(&self, mut query: Select<Ticket>, filter: &TicketFilter) -> Select<Ticket> {
        if let Some(participant_id) = filter.participant_id {
            query = query.filter(Column::ParticipantId.eq(participant_id));
        }
        if let Some(ticket_setting_id) = filter.ticket_setting_id {
            query = query.filter(Column::TicketSettingId.eq(ticket_setting_id));
        }
        match filter.sent {
            Some(true) => query = query.filter(Column::SentAt.is_not_null()),
            Some(false) => query = query.filter(Column::SentAt.is_null()),
            None => {}
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
    use crate::repositories::ticket_setting::{
        CreateTicketSettingRequest, TicketSettingRepository,
    };
    use crate::repositories::user::{CreateUserRequest, UserRepository};
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, DatabaseConnection};

    async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    struct Seed {
        user_id: Uuid,
        participant_id: Uuid,
        setting_id: Uuid,
    }

    async fn seed(db: &DatabaseConnection) -> Seed {
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

        Seed {
            user_id: user.id,
            participant_id: participant.id,
            setting_id: setting.id,
        }
    }

    fn issue(seed: &Seed) -> CreateTicketRequest {
        CreateTicketRequest {
            id: None,
            participant_id: seed.participant_id,
            ticket_setting_id: seed.setting_id,
            sent_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_mark_sent() {
        let db = setup_test_db().await;
        let seeded = seed(&db).await;
        let repo = TicketRepository::new(&db);

        let created = repo.create(issue(&seeded)).await.unwrap();
        assert!(created.sent_at.is_none());

        let sent = repo.mark_sent(created.id).await.unwrap();
        assert!(sent.sent_at.is_some());

        let unsent = repo
            .find_many(
                &TicketFilter {
                    sent: Some(false),
                    ..Default::default()
                },
                SortOrder::Asc,
                Page::default(),
            )
            .await
            .unwrap();
        assert!(unsent.is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_participant() {
        let db = setup_test_db().await;
        let seeded = seed(&db).await;
        let repo = TicketRepository::new(&db);

        let err = repo
            .create(CreateTicketRequest {
                participant_id: Uuid::new_v4(),
                ..issue(&seeded)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_holder_assignment() {
        let db = setup_test_db().await;
        let seeded = seed(&db).await;
        let repo = TicketRepository::new(&db);

        let ticket = repo.create(issue(&seeded)).await.unwrap();

        repo.assign_user(ticket.id, seeded.user_id).await.unwrap();
        // Assigning twice is a no-op
        repo.assign_user(ticket.id, seeded.user_id).await.unwrap();

        let holders = repo.list_holders(ticket.id).await.unwrap();
        assert_eq!(holders.len(), 1);
        assert_eq!(holders[0].id, seeded.user_id);

        repo.unassign_user(ticket.id, seeded.user_id).await.unwrap();
        assert!(repo.list_holders(ticket.id).await.unwrap().is_empty());

        assert!(matches!(
            repo.unassign_user(ticket.id, seeded.user_id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_get_with_details_empty() {
        let db = setup_test_db().await;
        let seeded = seed(&db).await;
        let repo = TicketRepository::new(&db);

        let ticket = repo.create(issue(&seeded)).await.unwrap();

        let details = repo.get_with_details(ticket.id).await.unwrap();
        assert_eq!(details.ticket.id, ticket.id);
        assert!(details.usages.is_empty());
        assert!(details.send_result.is_none());
    }

    #[tokio::test]
    async fn test_count_matches_find_many() {
        let db = setup_test_db().await;
        let seeded = seed(&db).await;
        let repo = TicketRepository::new(&db);

        for _ in 0..3 {
            repo.create(issue(&seeded)).await.unwrap();
        }

        let filter = TicketFilter {
            participant_id: Some(seeded.participant_id),
            ..Default::default()
        };
        let listed = repo
            .find_many(&filter, SortOrder::Asc, Page::default())
            .await
            .unwrap();
        assert_eq!(listed.len() as u64, repo.count(&filter).await.unwrap());
    }
}
