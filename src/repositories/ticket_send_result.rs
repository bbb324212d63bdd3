//! # TicketSendResult Repository
//!
//! Repository for delivery outcomes. Each ticket has at most one send
//! result (unique ticket_id); re-sending a ticket upserts the row.

use crate::error::StoreError;
use crate::models::ticket_send_result::{
    ActiveModel as TicketSendResultActiveModel, Column, Entity as TicketSendResult,
    Model as TicketSendResultModel,
};
use crate::repositories::{
    DeletedFilter, Page, SortOrder, deleted_condition, validate_email, validate_name,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

/// Request data for recording a delivery outcome
#[derive(Debug, Clone)]
pub struct CreateTicketSendResultRequest {
    pub id: Option<Uuid>,
    pub ticket_id: Uuid,
    pub status: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub send_type: String,
}

/// Request data for updating a delivery outcome
#[derive(Debug, Clone, Default)]
pub struct UpdateTicketSendResultRequest {
    pub status: Option<String>,
    pub name: Option<String>,
    pub phone: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub send_type: Option<String>,
}

/// Filter predicates for listing delivery outcomes
#[derive(Debug, Clone, Default)]
pub struct TicketSendResultFilter {
    pub status: Option<String>,
    pub send_type: Option<String>,
    pub deleted: DeletedFilter,
}

/// Repository for TicketSendResult database operations
pub struct TicketSendResultRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> TicketSendResultRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Record the delivery outcome for a ticket
    pub async fn create(
        &self,
        request: CreateTicketSendResultRequest,
    ) -> Result<TicketSendResultModel, StoreError> {
        validate_name("recipient name", &request.name)?;
        if request.status.trim().is_empty() {
            return Err(StoreError::validation_error("status cannot be empty"));
        }
        if let Some(ref email) = request.email {
            validate_email(email)?;
        }

        let id = request.id.unwrap_or_else(Uuid::new_v4);
        let now = Utc::now();
        let result = TicketSendResultActiveModel {
            id: Set(id),
            ticket_id: Set(request.ticket_id),
            status: Set(request.status),
            name: Set(request.name),
            phone: Set(request.phone),
            email: Set(request.email),
            send_type: Set(request.send_type),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        };

        // uuid keys cannot ride sqlite's last_insert_rowid readback
        TicketSendResult::insert(result)
            .exec_without_returning(self.db)
            .await
            .map_err(StoreError::database_error)?;

        self.get_by_id(id).await
    }

    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<TicketSendResultModel>, StoreError> {
        TicketSendResult::find_by_id(id)
            .one(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<TicketSendResultModel, StoreError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound("TicketSendResult".to_string()))
    }

    /// Look up the send result for a ticket via the unique ticket_id key
    pub async fn find_by_ticket(
        &self,
        ticket_id: Uuid,
    ) -> Result<Option<TicketSendResultModel>, StoreError> {
        TicketSendResult::find()
            .filter(Column::TicketId.eq(ticket_id))
            .one(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    pub async fn find_many(
        &self,
        filter: &TicketSendResultFilter,
        order: SortOrder,
        page: Page,
    ) -> Result<Vec<TicketSendResultModel>, StoreError> {
        let page = page.clamped();

        self.apply_filter(TicketSendResult::find(), filter)
            .order_by(Column::CreatedAt, order.into())
            .offset(page.offset)
            .limit(page.limit)
            .all(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    pub async fn count(&self, filter: &TicketSendResultFilter) -> Result<u64, StoreError> {
        self.apply_filter(TicketSendResult::find(), filter)
            .count(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    /// Update a delivery outcome, touching only the provided fields
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateTicketSendResultRequest,
    ) -> Result<TicketSendResultModel, StoreError> {
        let result = self.get_by_id(id).await?;
        self.apply_update(result, request).await
    }

    /// Create-or-update keyed on the unique ticket_id, used when a ticket is
    /// re-sent
    pub async fn upsert_by_ticket(
        &self,
        ticket_id: Uuid,
        create: CreateTicketSendResultRequest,
        update: UpdateTicketSendResultRequest,
    ) -> Result<TicketSendResultModel, StoreError> {
        match self.find_by_ticket(ticket_id).await? {
            Some(existing) => self.apply_update(existing, update).await,
            None => self.create(create).await,
        }
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = self.get_by_id(id).await?;

        result
            .delete(self.db)
            .await
            .map_err(StoreError::database_error)?;

        Ok(())
    }

    /// Mark a delivery outcome deleted by setting deleted_at; idempotent
    pub async fn soft_delete(&self, id: Uuid) -> Result<TicketSendResultModel, StoreError> {
        let result = self.get_by_id(id).await?;
        if result.deleted_at.is_some() {
            return Ok(result);
        }

        let mut active = result.into_active_model();
        active.deleted_at = Set(Some(Utc::now().into()));
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    async fn apply_update(
        &self,
        result: TicketSendResultModel,
        request: UpdateTicketSendResultRequest,
    ) -> Result<TicketSendResultModel, StoreError> {
        if let Some(ref name) = request.name {
            validate_name("recipient name", name)?;
        }
        if let Some(Some(ref email)) = request.email {
            validate_email(email)?;
        }

        let mut active = result.into_active_model();
        if let Some(status) = request.status {
            active.status = Set(status);
        }
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

    fn apply_filter(
        &self,
        mut query: Select<TicketSendResult>,
        filter: &TicketSendResultFilter,
    ) -> Select<TicketSendResult> {
        if let Some(ref status) = filter.status {
            query = query.filter(Column::Status.eq(status));
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
