//! # TicketSetting Repository
//!
//! Repository for the branding and reuse policy applied to tickets issued
//! for an event. meta_data is stored and returned verbatim.

use crate::error::StoreError;
use crate::models::ticket_setting::{
    ActiveModel as TicketSettingActiveModel, Column, Entity as TicketSetting,
    Model as TicketSettingModel,
};
use crate::repositories::{DeletedFilter, Page, SortOrder, deleted_condition};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Request data for creating ticket settings
#[derive(Debug, Clone)]
pub struct CreateTicketSettingRequest {
    pub id: Option<Uuid>,
    pub event_id: Uuid,
    pub logo_url: Option<String>,
    pub image_url: Option<String>,
    /// Defaults to an empty JSON object
    pub meta_data: Option<JsonValue>,
    pub allow_reuseable: bool,
}

/// Request data for updating ticket settings
#[derive(Debug, Clone, Default)]
pub struct UpdateTicketSettingRequest {
    pub logo_url: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
    pub meta_data: Option<JsonValue>,
    pub allow_reuseable: Option<bool>,
}

/// Filter predicates for listing ticket settings
#[derive(Debug, Clone, Default)]
pub struct TicketSettingFilter {
    pub event_id: Option<Uuid>,
    pub allow_reuseable: Option<bool>,
    pub deleted: DeletedFilter,
}

/// Repository for TicketSetting database operations
pub struct TicketSettingRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> TicketSettingRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        request: CreateTicketSettingRequest,
    ) -> Result<TicketSettingModel, StoreError> {
        let id = request.id.unwrap_or_else(Uuid::new_v4);
        let now = Utc::now();
        let setting = TicketSettingActiveModel {
            id: Set(id),
            event_id: Set(request.event_id),
            logo_url: Set(request.logo_url),
            image_url: Set(request.image_url),
            meta_data: Set(request
                .meta_data
                .unwrap_or_else(|| JsonValue::Object(Default::default()))),
            allow_reuseable: Set(request.allow_reuseable),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        };

        // uuid keys cannot ride sqlite's last_insert_rowid readback
        TicketSetting::insert(setting)
            .exec_without_returning(self.db)
            .await
            .map_err(StoreError::database_error)?;

        self.get_by_id(id).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TicketSettingModel>, StoreError> {
        TicketSetting::find_by_id(id)
            .one(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<TicketSettingModel, StoreError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound("TicketSetting".to_string()))
    }

    pub async fn find_many(
        &self,
        filter: &TicketSettingFilter,
        order: SortOrder,
        page: Page,
    ) -> Result<Vec<TicketSettingModel>, StoreError> {
        let page = page.clamped();

        self.apply_filter(TicketSetting::find(), filter)
            .order_by(Column::CreatedAt, order.into())
            .offset(page.offset)
            .limit(page.limit)
            .all(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    pub async fn count(&self, filter: &TicketSettingFilter) -> Result<u64, StoreError> {
        self.apply_filter(TicketSetting::find(), filter)
            .count(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    /// Update settings, touching only the provided fields
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateTicketSettingRequest,
    ) -> Result<TicketSettingModel, StoreError> {
        let setting = self.get_by_id(id).await?;
        let mut active = setting.into_active_model();
        if let Some(logo_url) = request.logo_url {
            active.logo_url = Set(logo_url);
        }
        if let Some(image_url) = request.image_url {
            active.image_url = Set(image_url);
        }
        if let Some(meta_data) = request.meta_data {
            active.meta_data = Set(meta_data);
        }
        if let Some(allow_reuseable) = request.allow_reuseable {
            active.allow_reuseable = Set(allow_reuseable);
        }
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    /// Hard-delete a setting; fails while tickets still reference it
    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let setting = self.get_by_id(id).await?;

        setting
            .delete(self.db)
            .await
            .map_err(StoreError::database_error)?;

        Ok(())
    }

    /// Mark a setting deleted by setting deleted_at; idempotent
    pub async fn soft_delete(&self, id: Uuid) -> Result<TicketSettingModel, StoreError> {
        let setting = self.get_by_id(id).await?;
        if setting.deleted_at.is_some() {
            return Ok(setting);
        }

        let mut active = setting.into_active_model();
        active.deleted_at = Set(Some(Utc::now().into()));
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    fn apply_filter(
        &self,
        mut query: Select<TicketSetting>,
        filter: &TicketSettingFilter,
    ) -> Select<TicketSetting> {
        if let Some(event_id) = filter.event_id {
            query = query.filter(Column::EventId.eq(event_id));
        }
        if let Some(allow_reuseable) = filter.allow_reuseable {
            query = query.filter(Column::AllowReuseable.eq(allow_reuseable));
        }
        if let Some(condition) = deleted_condition(Column::DeletedAt, filter.deleted) {
            query = query.filter(condition);
        }
        query
    }
}
