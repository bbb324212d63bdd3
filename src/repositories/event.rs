//! # Event Repository
//!
//! Repository for events, including the admin set managed through the
//! event_admins join table and the per-type count aggregate.

use crate::error::StoreError;
use crate::models::event::{
    ActiveModel as EventActiveModel, Column, Entity as Event, EventType, Model as EventModel,
};
use crate::models::event_admin::{
    ActiveModel as EventAdminActiveModel, Column as EventAdminColumn, Entity as EventAdmin,
};
use crate::models::user::{Entity as User, Model as UserModel};
use crate::repositories::{DeletedFilter, Page, SortOrder, deleted_condition, validate_name};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, IntoActiveModel,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

/// Request data for creating a new event
#[derive(Debug, Clone)]
pub struct CreateEventRequest {
    pub id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub event_type: EventType,
    pub max_ticket_count: i32,
    pub creator_id: Uuid,
}

/// Request data for updating an event
#[derive(Debug, Clone, Default)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub event_type: Option<EventType>,
    pub max_ticket_count: Option<i32>,
}

/// Filter predicates for listing events
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub name_contains: Option<String>,
    pub event_type: Option<EventType>,
    pub creator_id: Option<Uuid>,
    pub deleted: DeletedFilter,
}

/// Sortable columns for event listings
#[derive(Debug, Clone, Copy, Default)]
pub enum EventSortField {
    #[default]
    CreatedAt,
    Name,
    MaxTicketCount,
}

/// Sort specification for event listings
#[derive(Debug, Clone, Copy, Default)]
pub struct EventSort {
    pub field: EventSortField,
    pub direction: SortOrder,
}

/// One row of the per-type event count aggregate
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct EventTypeCount {
    pub event_type: EventType,
    pub count: i64,
}

/// Repository for Event database operations
pub struct EventRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> EventRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Create a new event
    pub async fn create(&self, request: CreateEventRequest) -> Result<EventModel, StoreError> {
        validate_name("event name", &request.name)?;
        if request.max_ticket_count < 0 {
            return Err(StoreError::validation_error(
                "max_ticket_count cannot be negative",
            ));
        }

        let id = request.id.unwrap_or_else(Uuid::new_v4);
        let now = Utc::now();
        let event = EventActiveModel {
            id: Set(id),
            name: Set(request.name),
            description: Set(request.description),
            event_type: Set(request.event_type),
            max_ticket_count: Set(request.max_ticket_count),
            creator_id: Set(request.creator_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        };

        // uuid keys cannot ride sqlite's last_insert_rowid readback
        Event::insert(event)
            .exec_without_returning(self.db)
            .await
            .map_err(StoreError::database_error)?;

        self.get_by_id(id).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<EventModel>, StoreError> {
        Event::find_by_id(id)
            .one(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<EventModel, StoreError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound("Event".to_string()))
    }

    /// List events matching the filter with sorting and pagination
    pub async fn find_many(
        &self,
        filter: &EventFilter,
        sort: EventSort,
        page: Page,
    ) -> Result<Vec<EventModel>, StoreError> {
        let page = page.clamped();
        let column = match sort.field {
            EventSortField::CreatedAt => Column::CreatedAt,
            EventSortField::Name => Column::Name,
            EventSortField::MaxTicketCount => Column::MaxTicketCount,
        };

        self.apply_filter(Event::find(), filter)
            .order_by(column, sort.direction.into())
            .offset(page.offset)
            .limit(page.limit)
            .all(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    pub async fn count(&self, filter: &EventFilter) -> Result<u64, StoreError> {
        self.apply_filter(Event::find(), filter)
            .count(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    /// Count events grouped by type, restricted by the filter
    pub async fn count_by_type(
        &self,
        filter: &EventFilter,
    ) -> Result<Vec<EventTypeCount>, StoreError> {
        self.apply_filter(Event::find(), filter)
            .select_only()
            .column(Column::EventType)
            .column_as(Column::Id.count(), "count")
            .group_by(Column::EventType)
            .into_model::<EventTypeCount>()
            .all(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    /// Update an event, touching only the provided fields
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateEventRequest,
    ) -> Result<EventModel, StoreError> {
        if let Some(ref name) = request.name {
            validate_name("event name", name)?;
        }
        if let Some(max) = request.max_ticket_count {
            if max < 0 {
                return Err(StoreError::validation_error(
                    "max_ticket_count cannot be negative",
                ));
            }
        }

        let event = self.get_by_id(id).await?;
        let mut active = event.into_active_model();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(description) = request.description {
            active.description = Set(description);
        }
        if let Some(event_type) = request.event_type {
            active.event_type = Set(event_type);
        }
        if let Some(max_ticket_count) = request.max_ticket_count {
            active.max_ticket_count = Set(max_ticket_count);
        }
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    /// Hard-delete an event; fails with a foreign-key violation while
    /// participants, settings or payments still reference it
    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let event = self.get_by_id(id).await?;

        event
            .delete(self.db)
            .await
            .map_err(StoreError::database_error)?;

        Ok(())
    }

    /// Mark an event deleted by setting deleted_at; idempotent
    pub async fn soft_delete(&self, id: Uuid) -> Result<EventModel, StoreError> {
        let event = self.get_by_id(id).await?;
        if event.deleted_at.is_some() {
            return Ok(event);
        }

        let mut active = event.into_active_model();
        active.deleted_at = Set(Some(Utc::now().into()));
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    /// Grant a user admin rights on an event; already-granted is a no-op
    pub async fn add_admin(&self, event_id: Uuid, user_id: Uuid) -> Result<(), StoreError> {
        let existing = EventAdmin::find_by_id((event_id, user_id))
            .one(self.db)
            .await
            .map_err(StoreError::database_error)?;
        if existing.is_some() {
            return Ok(());
        }

        let row = EventAdminActiveModel {
            event_id: Set(event_id),
            user_id: Set(user_id),
            created_at: Set(Utc::now().into()),
        };

        EventAdmin::insert(row)
            .exec_without_returning(self.db)
            .await
            .map_err(StoreError::database_error)?;

        Ok(())
    }

    /// Revoke admin rights; missing grant is NotFound
    pub async fn remove_admin(&self, event_id: Uuid, user_id: Uuid) -> Result<(), StoreError> {
        let row = EventAdmin::find_by_id((event_id, user_id))
            .one(self.db)
            .await
            .map_err(StoreError::database_error)?
            .ok_or_else(|| StoreError::NotFound("EventAdmin".to_string()))?;

        row.delete(self.db)
            .await
            .map_err(StoreError::database_error)?;

        Ok(())
    }

    /// List the users administering an event
    pub async fn list_admins(&self, event_id: Uuid) -> Result<Vec<UserModel>, StoreError> {
        let rows = EventAdmin::find()
            .filter(EventAdminColumn::EventId.eq(event_id))
            .find_also_related(User)
            .all(self.db)
            .await
            .map_err(StoreError::database_error)?;

        Ok(rows.into_iter().filter_map(|(_, user)| user).collect())
    }

    fn apply_filter(&self, mut query: Select<Event>, filter: &EventFilter) -> Select<Event> {
        if let Some(ref fragment) = filter.name_contains {
            query = query.filter(Column::Name.contains(fragment));
        }
        if let Some(event_type) = filter.event_type {
            query = query.filter(Column::EventType.eq(event_type));
        }
        if let Some(creator_id) = filter.creator_id {
            query = query.filter(Column::CreatorId.eq(creator_id));
        }
        if let Some(condition) = deleted_condition(Column::DeletedAt, filter.deleted) {
            query = query.filter(condition);
        }
        query
    }
}
