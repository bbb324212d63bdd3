//! # User Repository
//!
//! This module contains the repository implementation for User entities,
//! providing CRUD operations plus lookups on the unique email and phone
//! keys.

use crate::error::StoreError;
use crate::models::account::{Entity as Account, Model as AccountModel};
use crate::models::user::{ActiveModel as UserActiveModel, Column, Entity as User, Model as UserModel};
use crate::repositories::{
    DeletedFilter, Page, SortOrder, deleted_condition, validate_email, validate_name,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

/// Request data for creating a new user
#[derive(Debug, Clone, Default)]
pub struct CreateUserRequest {
    /// Explicit id; generated when absent
    pub id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub image: Option<String>,
}

/// Request data for updating a user; None fields are left untouched,
/// Some(None) clears a nullable column
#[derive(Debug, Clone, Default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub image: Option<Option<String>>,
}

/// Filter predicates for listing users
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub name_contains: Option<String>,
    pub email: Option<String>,
    pub deleted: DeletedFilter,
}

/// Sortable columns for user listings
#[derive(Debug, Clone, Copy, Default)]
pub enum UserSortField {
    #[default]
    CreatedAt,
    Name,
    Email,
}

/// Sort specification for user listings
#[derive(Debug, Clone, Copy, Default)]
pub struct UserSort {
    pub field: UserSortField,
    pub direction: SortOrder,
}

/// Repository for User database operations
pub struct UserRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> UserRepository<'a, C> {
    /// Create a new UserRepository with the given connection
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Create a new user
    pub async fn create(&self, request: CreateUserRequest) -> Result<UserModel, StoreError> {
        validate_name("user name", &request.name)?;
        validate_email(&request.email)?;

        let id = request.id.unwrap_or_else(Uuid::new_v4);
        let now = Utc::now();
        let user = UserActiveModel {
            id: Set(id),
            name: Set(request.name),
            email: Set(request.email),
            phone: Set(request.phone),
            image: Set(request.image),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
        };

        // The id is known up front, so skip the driver's insert-id readback
        // (sqlite cannot unpack a uuid key from last_insert_rowid)
        User::insert(user)
            .exec_without_returning(self.db)
            .await
            .map_err(StoreError::database_error)?;

        self.get_by_id(id).await
    }

    /// Get user by ID, if it exists
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserModel>, StoreError> {
        let user = User::find_by_id(id)
            .one(self.db)
            .await
            .map_err(StoreError::database_error)?;

        Ok(user)
    }

    /// Get user by ID, failing with NotFound when missing
    pub async fn get_by_id(&self, id: Uuid) -> Result<UserModel, StoreError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound("User".to_string()))
    }

    /// Look up a user by the unique email key
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, StoreError> {
        let user = User::find()
            .filter(Column::Email.eq(email))
            .one(self.db)
            .await
            .map_err(StoreError::database_error)?;

        Ok(user)
    }

    /// Load a user together with their linked accounts
    pub async fn find_with_accounts(
        &self,
        id: Uuid,
    ) -> Result<Option<(UserModel, Vec<AccountModel>)>, StoreError> {
        let mut rows = User::find_by_id(id)
            .find_with_related(Account)
            .all(self.db)
            .await
            .map_err(StoreError::database_error)?;

        Ok(rows.pop())
    }

    /// Look up a user by the unique phone key
    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<UserModel>, StoreError> {
        let user = User::find()
            .filter(Column::Phone.eq(phone))
            .one(self.db)
            .await
            .map_err(StoreError::database_error)?;

        Ok(user)
    }

    /// List users matching the filter with sorting and pagination
    pub async fn find_many(
        &self,
        filter: &UserFilter,
        sort: UserSort,
        page: Page,
    ) -> Result<Vec<UserModel>, StoreError> {
        let page = page.clamped();
        let column = match sort.field {
            UserSortField::CreatedAt => Column::CreatedAt,
            UserSortField::Name => Column::Name,
            UserSortField::Email => Column::Email,
        };

        let users = self
            .apply_filter(User::find(), filter)
            .order_by(column, sort.direction.into())
            .offset(page.offset)
            .limit(page.limit)
            .all(self.db)
            .await
            .map_err(StoreError::database_error)?;

        Ok(users)
    }

    /// Count users matching the filter
    pub async fn count(&self, filter: &UserFilter) -> Result<u64, StoreError> {
        self.apply_filter(User::find(), filter)
            .count(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    /// Update a user, touching only the provided fields
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateUserRequest,
    ) -> Result<UserModel, StoreError> {
        let user = self.get_by_id(id).await?;
        self.apply_update(user, request).await
    }

    /// Create-or-update keyed on the unique email
    pub async fn upsert_by_email(
        &self,
        email: &str,
        create: CreateUserRequest,
        update: UpdateUserRequest,
    ) -> Result<UserModel, StoreError> {
        match self.find_by_email(email).await? {
            Some(existing) => self.apply_update(existing, update).await,
            None => self.create(create).await,
        }
    }

    /// Hard-delete a user
    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let user = self.get_by_id(id).await?;

        user.delete(self.db)
            .await
            .map_err(StoreError::database_error)?;

        Ok(())
    }

    /// Mark a user deleted by setting deleted_at; idempotent
    pub async fn soft_delete(&self, id: Uuid) -> Result<UserModel, StoreError> {
        let user = self.get_by_id(id).await?;
        if user.deleted_at.is_some() {
            return Ok(user);
        }

        let mut active = user.into_active_model();
        active.deleted_at = Set(Some(Utc::now().into()));
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    async fn apply_update(
        &self,
        user: UserModel,
        request: UpdateUserRequest,
    ) -> Result<UserModel, StoreError> {
        if let Some(ref name) = request.name {
            validate_name("user name", name)?;
        }
        if let Some(ref email) = request.email {
            validate_email(email)?;
        }

        let mut active = user.into_active_model();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(email) = request.email {
            active.email = Set(email);
        }
        if let Some(phone) = request.phone {
            active.phone = Set(phone);
        }
        if let Some(image) = request.image {
            active.image = Set(image);
        }
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db)
            .await
            .map_err(StoreError::database_error)
    }

    fn apply_filter(&self, mut query: Select<User>, filter: &UserFilter) -> Select<User> {
        if let Some(ref fragment) = filter.name_contains {
            query = query.filter(Column::Name.contains(fragment));
        }
        if let Some(ref email) = filter.email {
            query = query.filter(Column::Email.eq(email));
        }
        if let Some(condition) = deleted_condition(Column::DeletedAt, filter.deleted) {
            query = query.filter(condition);
        }
        query
    }
}
