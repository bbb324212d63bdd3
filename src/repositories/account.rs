//! # Account Repository
//!
//! Repository for linked OAuth identities. The natural key is the
//! (provider, provider_account_id) pair, which backs the upsert used when a
//! user signs in through a provider again.

use crate::error::StoreError;
use crate::models::account::{
    ActiveModel as AccountActiveModel, Column, Entity as Account, Model as AccountModel,
};
use crate::repositories::{DeletedFilter, Page, SortOrder, deleted_condition};
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

/// Request data for linking a new account
#[derive(Debug, Clone, Default)]
pub struct CreateAccountRequest {
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub provider: String,
    pub provider_account_id: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    pub id_token: Option<String>,
    pub expires_at: Option<DateTimeWithTimeZone>,
}

/// Request data for updating an account's token material
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountRequest {
    pub access_token: Option<Option<String>>,
    pub refresh_token: Option<Option<String>>,
    pub token_type: Option<Option<String>>,
    pub scope: Option<Option<String>>,
    pub id_token: Option<Option<String>>,
    pub expires_at: Option<Option<DateTimeWithTimeZone>>,
}

/// Filter predicates for listing accounts
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    pub user_id: Option<Uuid>,
    pub provider: Option<String>,
    pub deleted: DeletedFilter,
}

/// Repository for Account database operations
pub struct AccountRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> AccountRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Link a new account to a user
    pub async fn create(&self, request: CreateAccountRequest) -> Result<AccountModel, StoreError> {
        if request.provider.trim().is_empty() {
            return Err(StoreError::validation_error("provider cannot be empty"));
        }
        if request.provider_account_id.trim().is_empty() {
            return Err(StoreError::validation_error(
                "provider account id cannot be empty",
            ));
        }

        let id = request.id.unwrap_or_else(Uuid::new_v4);
        let now = Utc::now();
        let account = AccountActiveModel {
            id: Set(id),
            user_id: Set(request.user_id),
            provider: Set(request.provider),
            provider_account_id: Set(request.provider_account_id),
            access_token: Set(request.access_token),
            refresh_token: Set(request.refresh_token),
            token_type: Set(request.token_type),
            scope: Set(request.scope),
            id_token: Set(request.id_token),
            expires_at: Set(request.expires_at),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        };

        // uuid keys cannot ride sqlite's last_insert_rowid readback
        Account::insert(account)
            .exec_without_returning(self.db)
            .await
            .map_err(StoreError::database_error)?;

        self.get_by_id(id).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AccountModel>, StoreError> {
        Account::find_by_id(id)
            .one(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<AccountModel, StoreError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound("Account".to_string()))
    }

    /// Look up an account by its unique (provider, provider_account_id) pair
    pub async fn find_by_provider_account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<AccountModel>, StoreError> {
        Account::find()
            .filter(Column::Provider.eq(provider))
            .filter(Column::ProviderAccountId.eq(provider_account_id))
            .one(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    /// List accounts matching the filter, newest first
    pub async fn find_many(
        &self,
        filter: &AccountFilter,
        order: SortOrder,
        page: Page,
    ) -> Result<Vec<AccountModel>, StoreError> {
        let page = page.clamped();

        self.apply_filter(Account::find(), filter)
            .order_by(Column::CreatedAt, order.into())
            .offset(page.offset)
            .limit(page.limit)
            .all(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    pub async fn count(&self, filter: &AccountFilter) -> Result<u64, StoreError> {
        self.apply_filter(Account::find(), filter)
            .count(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    /// Update token material on an account, touching only the provided fields
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateAccountRequest,
    ) -> Result<AccountModel, StoreError> {
        let account = self.get_by_id(id).await?;
        self.apply_update(account, request).await
    }

    /// Create-or-update keyed on (provider, provider_account_id)
    pub async fn upsert_by_provider_account(
        &self,
        provider: &str,
        provider_account_id: &str,
        create: CreateAccountRequest,
        update: UpdateAccountRequest,
    ) -> Result<AccountModel, StoreError> {
        match self
            .find_by_provider_account(provider, provider_account_id)
            .await?
        {
            Some(existing) => self.apply_update(existing, update).await,
            None => self.create(create).await,
        }
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let account = self.get_by_id(id).await?;

        account
            .delete(self.db)
            .await
            .map_err(StoreError::database_error)?;

        Ok(())
    }

    /// Mark an account deleted by setting deleted_at; idempotent
    pub async fn soft_delete(&self, id: Uuid) -> Result<AccountModel, StoreError> {
        let account = self.get_by_id(id).await?;
        if account.deleted_at.is_some() {
            return Ok(account);
        }

        let mut active = account.into_active_model();
        active.deleted_at = Set(Some(Utc::now().into()));
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    async fn apply_update(
        &self,
        account: AccountModel,
        request: UpdateAccountRequest,
    ) -> Result<AccountModel, StoreError> {
        let mut active = account.into_active_model();
        if let Some(access_token) = request.access_token {
            active.access_token = Set(access_token);
        }
        if let Some(refresh_token) = request.refresh_token {
            active.refresh_token = Set(refresh_token);
        }
        if let Some(token_type) = request.token_type {
            active.token_type = Set(token_type);
        }
        if let Some(scope) = request.scope {
            active.scope = Set(scope);
        }
        if let Some(id_token) = request.id_token {
            active.id_token = Set(id_token);
        }
        if let Some(expires_at) = request.expires_at {
            active.expires_at = Set(expires_at);
        }
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    fn apply_filter(&self, mut query: Select<Account>, filter: &AccountFilter) -> Select<Account> {
        if let Some(user_id) = filter.user_id {
            query = query.filter(Column::UserId.eq(user_id));
        }
        if let Some(ref provider) = filter.provider {
            query = query.filter(Column::Provider.eq(provider));
        }
        if let Some(condition) = deleted_condition(Column::DeletedAt, filter.deleted) {
            query = query.filter(condition);
        }
        query
    }
}
